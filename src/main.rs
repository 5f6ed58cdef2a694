use anyhow::Result;
use astro_shorts::config::Config;
use astro_shorts::{init, server};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 5000;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // Initialize directories first
    init::ensure_directories().await?;

    if !init::check_ffmpeg().await {
        eprintln!("[WARNING] FFmpeg not found in PATH. Please install FFmpeg.");
    }

    let cfg = Config::load("config.json").await?;

    if !init::check_whisper(&cfg).await {
        eprintln!(
            "[WARNING] Whisper not usable ({} / {}). Transcription will fail.",
            cfg.whisper_bin, cfg.whisper_model
        );
    }

    server::run_server(HOST, PORT, cfg).await
}
