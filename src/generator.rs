use crate::api::{elevenlabs, horoscope, ollama, pexels};
use crate::captions::{self, CaptionStyle};
use crate::clip_plan;
use crate::config::{Config, HoroscopeSource};
use crate::ffmpeg;
use crate::transcribe::{self, Transcript};
use crate::zodiac::ZodiacSign;
use anyhow::{Context, Result};
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Seconds of background video before the narration starts.
const START_DELAY_S: f64 = 2.0;
/// Seconds of background video and music after the narration ends.
const END_DELAY_S: f64 = 8.0;

pub const DEFAULT_CLIP_COUNT: usize = 3;
pub const DEFAULT_SEARCH_QUERY: &str = "scenic";
const SEARCH_PER_PAGE: u32 = 20;

const DOWNLOAD_SETTLE: Duration = Duration::from_secs(2);
const WORK_DIR: &str = "videos";

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub clip_count: usize,
    pub query: String,
    /// Overrides the configured horoscope source when set.
    pub source: Option<HoroscopeSource>,
    /// Use the curated popular feed instead of portrait search.
    pub use_popular: bool,
    pub output_dir: PathBuf,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            clip_count: DEFAULT_CLIP_COUNT,
            query: DEFAULT_SEARCH_QUERY.to_string(),
            source: None,
            use_popular: false,
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub output: PathBuf,
    pub horoscope: String,
}

fn now_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

async fn file_exists(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

async fn dir_exists(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

async fn ensure_dir(path: &Path) -> Result<()> {
    if !dir_exists(path).await {
        fs::create_dir_all(path).await?;
    }
    Ok(())
}

async fn clear_directory_contents(dir_path: &Path) -> Result<bool> {
    if !dir_exists(dir_path).await {
        return Ok(true);
    }

    for entry in WalkDir::new(dir_path).min_depth(1).contents_first(true) {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            fs::remove_dir(path).await.ok();
        } else {
            fs::remove_file(path).await.ok();
        }
    }

    Ok(true)
}

async fn fetch_horoscope_text(
    cfg: &Config,
    client: &reqwest::Client,
    sign: ZodiacSign,
    source: HoroscopeSource,
) -> Result<String> {
    match source {
        HoroscopeSource::Api => horoscope::fetch_daily_horoscope(client, cfg, sign).await,
        HoroscopeSource::Ollama => ollama::generate_horoscope(client, cfg, sign).await,
    }
}

/// Run the whole pipeline for one sign and return the rendered file.
pub async fn run_generation(
    cfg: &Config,
    client: &reqwest::Client,
    sign: ZodiacSign,
    opts: &GenerateOptions,
) -> Result<GenerationOutcome> {
    let work = Path::new(WORK_DIR);
    ensure_dir(work).await?;
    ensure_dir(&opts.output_dir).await?;

    info!("Clearing {}/ folder...", WORK_DIR);
    if !clear_directory_contents(work).await? {
        warn!("Failed to fully clear {}/ (continuing anyway).", WORK_DIR);
    }
    ensure_dir(work).await?;

    let source = opts.source.unwrap_or(cfg.horoscope_source);
    info!("=== Generating daily horoscope video: {} ({:?} source) ===", sign, source);

    let horoscope_text = fetch_horoscope_text(cfg, client, sign, source).await?;
    info!("Horoscope: {}", horoscope_text);

    let narration_path = work.join("narration.mp3");
    info!("Synthesizing narration -> {}", narration_path.display());
    if !elevenlabs::elevenlabs_tts_to_mp3(client, cfg, &horoscope_text, &narration_path).await? {
        anyhow::bail!("Narration synthesis failed for {}", sign);
    }
    let narration_dur = ffmpeg::ffprobe_duration_seconds(&narration_path)
        .await
        .context("Bad narration duration")?;
    info!("Narration duration: {:.2}s", narration_dur);

    let words = transcribe::transcribe_audio(cfg, &narration_path).await?;
    let mut transcript = Transcript::from_words(words);
    if transcript.is_empty() {
        anyhow::bail!("Transcription produced no words for {}", sign);
    }
    transcript.align_with_script(&horoscope_text);
    transcript.apply_start_delay(START_DELAY_S);

    let clip_count = opts.clip_count.max(1);
    let mut windows = clip_plan::plan_windows(&transcript, START_DELAY_S, END_DELAY_S, clip_count)?;
    let total_dur = transcript.end() + END_DELAY_S;
    let longest_window = windows
        .iter()
        .map(|w| w.duration())
        .fold(0.0f64, f64::max);
    info!(
        "Planned {} background windows over {:.2}s (longest {:.2}s)",
        windows.len(),
        total_dur,
        longest_window
    );

    let candidates = if opts.use_popular {
        pexels::popular_videos(client, cfg, SEARCH_PER_PAGE).await?
    } else {
        pexels::search_portrait_videos(client, cfg, &opts.query, SEARCH_PER_PAGE).await?
    };
    info!("Pexels returned {} candidate clips", candidates.len());

    let mut rng = rand::rngs::StdRng::seed_from_u64(now_seed());
    let urls = pexels::pick_clip_urls(&candidates, longest_window, windows.len(), &mut rng)?;

    info!("Downloading {} background clips...", urls.len());
    let downloaded = pexels::download_videos(client, &urls, work).await?;
    if downloaded.is_empty() {
        anyhow::bail!("No background clips could be downloaded");
    }
    if downloaded.len() < windows.len() {
        warn!(
            "Only {} of {} clips downloaded; shrinking the plan",
            downloaded.len(),
            windows.len()
        );
        windows = clip_plan::plan_windows(&transcript, START_DELAY_S, END_DELAY_S, downloaded.len())?;
    }

    // Let the filesystem catch up after the downloads.
    tokio::time::sleep(DOWNLOAD_SETTLE).await;

    let concat_list_path = work.join("background_concat.txt");
    let mut listf = fs::File::create(&concat_list_path).await?;
    for (i, (clip, window)) in downloaded.iter().zip(windows.iter()).enumerate() {
        let out_name = format!("bg_{}.mp4", i + 1);
        let out_path = work.join(&out_name);
        info!(
            "Normalizing clip {}/{} ({:.2}s window) -> {}",
            i + 1,
            windows.len(),
            window.duration(),
            out_path.display()
        );
        if !ffmpeg::ffmpeg_normalize_background(clip, window.duration(), &out_path).await? {
            anyhow::bail!("Failed to normalize background clip {}", i + 1);
        }
        listf.write_all(format!("file '{}'\n", out_name).as_bytes()).await?;
    }
    listf.flush().await?;

    let background_path = work.join("background.mp4");
    info!("Concatenating background -> {}", background_path.display());
    if !ffmpeg::ffmpeg_concat_videos(&concat_list_path, &background_path).await? {
        anyhow::bail!("Background concat failed");
    }

    let style = CaptionStyle::default();
    let header = format!("{} Daily Horoscope:", sign.display_name());
    let ass_path = work.join("captions.ass");
    let ass_doc = captions::build_ass_document(&transcript, &style, &header, total_dur);
    fs::write(&ass_path, ass_doc).await?;
    info!("Wrote captions: {}", ass_path.display());

    let music_path = PathBuf::from(&cfg.music_path);
    if !file_exists(&music_path).await {
        anyhow::bail!("Background music not found: {}", music_path.display());
    }

    let date = chrono::Local::now().format("%Y-%m-%d");
    let output = opts.output_dir.join(format!("{}_{}.mp4", sign.slug(), date));
    info!("Saving video -> {}", output.display());
    if !ffmpeg::ffmpeg_composite_final(
        &background_path,
        &narration_path,
        &music_path,
        &ass_path,
        START_DELAY_S,
        total_dur,
        &output,
    )
    .await?
    {
        anyhow::bail!("Final composite failed for {}", sign);
    }

    info!("Done: {}", output.display());
    Ok(GenerationOutcome {
        output,
        horoscope: horoscope_text,
    })
}
