use crate::config::Config;
use anyhow::Result;
use std::path::Path;
use tokio::fs;

const REQUIRED_DIRS: &[&str] = &[
    "videos",
    "output",
    "audio",
    "models",
];

pub async fn ensure_directories() -> Result<()> {
    for dir in REQUIRED_DIRS {
        if !Path::new(dir).exists() {
            fs::create_dir_all(dir).await?;
            eprintln!("[INFO] Created directory: {}", dir);
        }
    }
    Ok(())
}

pub async fn check_ffmpeg() -> bool {
    match tokio::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
    {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

/// The transcription step needs both the whisper binary and a model file.
pub async fn check_whisper(cfg: &Config) -> bool {
    let bin_ok = tokio::process::Command::new(&cfg.whisper_bin)
        .arg("--help")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false);

    bin_ok && fs::metadata(&cfg.whisper_model).await.map(|m| m.is_file()).unwrap_or(false)
}
