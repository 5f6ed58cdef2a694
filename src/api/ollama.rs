use crate::config::Config;
use crate::zodiac::ZodiacSign;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

fn horoscope_prompt(sign: ZodiacSign) -> String {
    format!(
        "Generate a creative daily horoscope for {sign}s. Imagine yourself as an expert in \
         astrology, deeply attuned to the cosmic energies that influence our lives. Craft a \
         personalized horoscope that offers insightful guidance and inspiration for {sign} based \
         on today's celestial alignments. Ensure each horoscope is unique and tailored to the \
         individual characteristics and current planetary positions. Your goal is to provide a \
         fresh and engaging perspective with each reading, avoiding repetition and clichés. \
         Please keep it to 4 sentences at most and respond only with the daily horoscope \
         message. You do not need to specify it as 'daily horoscope', just return the message \
         and nothing else",
        sign = sign.display_name()
    )
}

/// Generate a horoscope with the local Ollama runtime instead of the hosted API.
pub async fn generate_horoscope(client: &Client, cfg: &Config, sign: ZodiacSign) -> Result<String> {
    let url = format!("{}/api/generate", cfg.ollama_url.trim_end_matches('/'));

    let body = GenerateRequest {
        model: &cfg.ollama_model,
        prompt: horoscope_prompt(sign),
        stream: false,
    };

    let resp = client
        .post(&url)
        .json(&body)
        .timeout(std::time::Duration::from_secs(300))
        .send()
        .await
        .with_context(|| format!("Ollama request failed ({})", url))?;

    let status = resp.status();
    if !status.is_success() {
        let raw = resp.text().await.unwrap_or_default();
        if !raw.is_empty() {
            let snippet = raw.chars().take(400).collect::<String>();
            warn!("ollama raw body: {}", snippet);
        }
        anyhow::bail!("Ollama returned HTTP {}", status.as_u16());
    }

    let data: GenerateResponse = resp.json().await.context("Ollama response parse failed")?;

    let text = data.response.trim().to_string();
    if text.is_empty() {
        anyhow::bail!("Ollama model {} returned empty text", cfg.ollama_model);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_sign() {
        let prompt = horoscope_prompt(ZodiacSign::Leo);
        assert!(prompt.contains("Leo"));
        assert!(prompt.contains("4 sentences"));
    }

    #[test]
    fn parses_generate_payload() {
        let raw = r#"{"model":"mistral","response":" The stars favor patience today. ","done":true}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.response.trim(), "The stars favor patience today.");
    }
}
