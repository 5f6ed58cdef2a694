use anyhow::{Context, Result};
use astro_shorts::config::{Config, HoroscopeSource};
use astro_shorts::generator::{self, DEFAULT_CLIP_COUNT, DEFAULT_SEARCH_QUERY, GenerateOptions};
use astro_shorts::init;
use astro_shorts::zodiac::ZodiacSign;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "astro-shorts-cli", about = "Generate one daily horoscope short video")]
struct Args {
    /// Zodiac sign to generate for (e.g. aries)
    sign: String,

    /// Path to the config file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Override the configured horoscope source: "api" or "ollama"
    #[arg(long)]
    source: Option<String>,

    /// Number of background clips
    #[arg(long, default_value_t = DEFAULT_CLIP_COUNT)]
    clips: usize,

    /// Stock-video search query
    #[arg(long, default_value = DEFAULT_SEARCH_QUERY)]
    query: String,

    /// Use the curated popular feed instead of portrait search
    #[arg(long)]
    popular: bool,

    /// Directory for the rendered video
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,
}

fn parse_source(raw: &str) -> Result<HoroscopeSource> {
    match raw.to_ascii_lowercase().as_str() {
        "api" => Ok(HoroscopeSource::Api),
        "ollama" => Ok(HoroscopeSource::Ollama),
        other => anyhow::bail!("Unknown horoscope source: {} (expected api or ollama)", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    init::ensure_directories().await?;
    if !init::check_ffmpeg().await {
        eprintln!("[WARNING] FFmpeg not found in PATH. Please install FFmpeg.");
    }

    let cfg = Config::load(&args.config).await?;
    if !init::check_whisper(&cfg).await {
        eprintln!(
            "[WARNING] Whisper not usable ({} / {}). Transcription will fail.",
            cfg.whisper_bin, cfg.whisper_model
        );
    }

    let sign: ZodiacSign = args.sign.parse()?;
    let source = args.source.as_deref().map(parse_source).transpose()?;

    let opts = GenerateOptions {
        clip_count: args.clips,
        query: args.query,
        source,
        use_popular: args.popular,
        output_dir: args.out_dir,
    };

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;

    let outcome = generator::run_generation(&cfg, &client, sign, &opts).await?;
    println!("{}", outcome.output.display());
    Ok(())
}
