use crate::config::Config;
use crate::zodiac::ZodiacSign;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

const RAPIDAPI_HOST: &str = "horoscope-astrology.p.rapidapi.com";

#[derive(Debug, Deserialize)]
struct HoroscopeResponse {
    horoscope: String,
}

/// Fetch today's horoscope for a sign from the hosted provider.
pub async fn fetch_daily_horoscope(
    client: &Client,
    cfg: &Config,
    sign: ZodiacSign,
) -> Result<String> {
    let url = format!("https://{}/horoscope", RAPIDAPI_HOST);

    let resp = client
        .get(&url)
        .query(&[("day", "today"), ("sunsign", sign.slug())])
        .header("X-RapidAPI-Key", &cfg.horoscope_key)
        .header("X-RapidAPI-Host", RAPIDAPI_HOST)
        .timeout(std::time::Duration::from_secs(30))
        .send()
        .await
        .context("Horoscope request failed")?;

    let status = resp.status();
    if !status.is_success() {
        let raw = resp.text().await.unwrap_or_default();
        if !raw.is_empty() {
            let snippet = raw.chars().take(400).collect::<String>();
            warn!("horoscope raw body: {}", snippet);
        }
        anyhow::bail!("Horoscope provider returned HTTP {}", status.as_u16());
    }

    let data: HoroscopeResponse = resp
        .json()
        .await
        .context("Horoscope response parse failed")?;

    let text = data.horoscope.trim().to_string();
    if text.is_empty() {
        anyhow::bail!("Horoscope provider returned empty text for {}", sign);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_payload() {
        let raw = r#"{"horoscope": "A good day to start something new.", "date": "2024-03-01"}"#;
        let parsed: HoroscopeResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.horoscope, "A good day to start something new.");
    }
}
