use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Where the daily horoscope text comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoroscopeSource {
    /// The hosted horoscope REST API (needs `horoscope_api_key`).
    #[default]
    Api,
    /// A local Ollama runtime generating fresh text.
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "pexels_api_key")]
    pub pexels_key: String,
    #[serde(rename = "elevenlabs_api_key")]
    pub elevenlabs_key: String,
    #[serde(rename = "eleven_voice_id")]
    #[serde(default = "default_voice_id")]
    pub eleven_voice_id: String,
    #[serde(rename = "eleven_model_id")]
    #[serde(default = "default_model_id")]
    pub eleven_model_id: String,
    #[serde(rename = "horoscope_api_key")]
    #[serde(default)]
    pub horoscope_key: String,
    #[serde(rename = "horoscope_source")]
    #[serde(default)]
    pub horoscope_source: HoroscopeSource,
    #[serde(rename = "ollama_url")]
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    #[serde(rename = "ollama_model")]
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,
    #[serde(rename = "whisper_bin")]
    #[serde(default = "default_whisper_bin")]
    pub whisper_bin: String,
    #[serde(rename = "whisper_model")]
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,
    #[serde(rename = "music_path")]
    #[serde(default = "default_music_path")]
    pub music_path: String,
}

fn default_voice_id() -> String {
    "pFZP5JQG7iQjIQuC4Bku".to_string()
}

fn default_model_id() -> String {
    "eleven_monolingual_v1".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "mistral".to_string()
}

fn default_whisper_bin() -> String {
    "whisper-cli".to_string()
}

fn default_whisper_model() -> String {
    "models/ggml-base.en.bin".to_string()
}

fn default_music_path() -> String {
    "audio/oneheart.mp3".to_string()
}

impl Config {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;

        if config.pexels_key.is_empty() {
            anyhow::bail!("config.json: pexels_api_key missing");
        }
        if config.elevenlabs_key.is_empty() {
            anyhow::bail!("config.json: elevenlabs_api_key missing");
        }
        if config.horoscope_source == HoroscopeSource::Api && config.horoscope_key.is_empty() {
            anyhow::bail!(
                "config.json: horoscope_api_key missing (required with horoscope_source = \"api\")"
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let cfg = Config::parse(
            r#"{
                "pexels_api_key": "px",
                "elevenlabs_api_key": "el",
                "horoscope_api_key": "hs"
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.horoscope_source, HoroscopeSource::Api);
        assert_eq!(cfg.eleven_voice_id, "pFZP5JQG7iQjIQuC4Bku");
        assert_eq!(cfg.eleven_model_id, "eleven_monolingual_v1");
        assert_eq!(cfg.ollama_url, "http://localhost:11434");
        assert_eq!(cfg.ollama_model, "mistral");
        assert_eq!(cfg.music_path, "audio/oneheart.mp3");
    }

    #[test]
    fn ollama_source_does_not_need_horoscope_key() {
        let cfg = Config::parse(
            r#"{
                "pexels_api_key": "px",
                "elevenlabs_api_key": "el",
                "horoscope_source": "ollama",
                "ollama_model": "llama3"
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.horoscope_source, HoroscopeSource::Ollama);
        assert_eq!(cfg.ollama_model, "llama3");
        assert!(cfg.horoscope_key.is_empty());
    }

    #[test]
    fn api_source_requires_horoscope_key() {
        let err = Config::parse(
            r#"{
                "pexels_api_key": "px",
                "elevenlabs_api_key": "el"
            }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("horoscope_api_key"));
    }

    #[test]
    fn missing_provider_keys_fail() {
        assert!(Config::parse(r#"{"elevenlabs_api_key": "el"}"#).is_err());
        assert!(Config::parse(r#"{"pexels_api_key": "px"}"#).is_err());
    }
}
