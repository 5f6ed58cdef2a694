use crate::config::Config;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

const PEXELS_BASE: &str = "https://api.pexels.com/videos";

#[derive(Debug, Clone, Deserialize)]
pub struct PexelsVideoFile {
    pub link: String,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PexelsVideo {
    pub id: u64,
    pub duration: f64,
    pub video_files: Vec<PexelsVideoFile>,
}

#[derive(Debug, Deserialize)]
struct PexelsPage {
    videos: Vec<PexelsVideo>,
}

async fn fetch_page(client: &Client, cfg: &Config, url: &str, query: &[(&str, String)]) -> Result<Vec<PexelsVideo>> {
    let resp = client
        .get(url)
        .query(query)
        .header("Authorization", &cfg.pexels_key)
        .timeout(std::time::Duration::from_secs(60))
        .send()
        .await
        .context("Pexels request failed")?;

    let status = resp.status();
    if !status.is_success() {
        let raw = resp.text().await.unwrap_or_default();
        if !raw.is_empty() {
            let snippet = raw.chars().take(400).collect::<String>();
            warn!("pexels raw body: {}", snippet);
        }
        anyhow::bail!("Pexels returned HTTP {}", status.as_u16());
    }

    let page: PexelsPage = resp.json().await.context("Pexels response parse failed")?;
    Ok(page.videos)
}

/// Portrait stock-clip search, the primary background source.
pub async fn search_portrait_videos(
    client: &Client,
    cfg: &Config,
    query: &str,
    per_page: u32,
) -> Result<Vec<PexelsVideo>> {
    let url = format!("{}/search", PEXELS_BASE);
    fetch_page(
        client,
        cfg,
        &url,
        &[
            ("query", query.to_string()),
            ("orientation", "portrait".to_string()),
            ("size", "medium".to_string()),
            ("per_page", per_page.to_string()),
        ],
    )
    .await
}

/// Curated popular clips, filtered server-side to roughly vertical dimensions.
pub async fn popular_videos(client: &Client, cfg: &Config, per_page: u32) -> Result<Vec<PexelsVideo>> {
    let url = format!("{}/popular", PEXELS_BASE);
    fetch_page(
        client,
        cfg,
        &url,
        &[
            ("min_width", "1000".to_string()),
            ("min_height", "1800".to_string()),
            ("per_page", per_page.to_string()),
        ],
    )
    .await
}

/// Filter candidates by minimum duration and sample `clip_count` download URLs.
pub fn pick_clip_urls(
    videos: &[PexelsVideo],
    min_duration: f64,
    clip_count: usize,
    rng: &mut StdRng,
) -> Result<Vec<String>> {
    let candidates: Vec<&PexelsVideo> = videos
        .iter()
        .filter(|v| v.duration > min_duration && !v.video_files.is_empty())
        .collect();

    if candidates.len() < clip_count {
        anyhow::bail!(
            "Only {} of {} candidate clips are longer than {:.1}s (need {})",
            candidates.len(),
            videos.len(),
            min_duration,
            clip_count
        );
    }

    let picked = candidates
        .choose_multiple(rng, clip_count)
        .map(|v| v.video_files[0].link.clone())
        .collect();
    Ok(picked)
}

/// Download each URL to `video-downloaded{N}.mp4` under `dest_dir`.
///
/// A failed download is logged and skipped; the caller shrinks its plan to the
/// clips that actually landed on disk.
pub async fn download_videos(client: &Client, urls: &[String], dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut downloaded = Vec::new();

    for (i, url) in urls.iter().enumerate() {
        let dest = dest_dir.join(format!("video-downloaded{}.mp4", i + 1));

        let resp = match client
            .get(url)
            .timeout(std::time::Duration::from_secs(300))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                warn!("Failed to download video {}: {}", url, err);
                continue;
            }
        };

        if !resp.status().is_success() {
            warn!("Failed to download video {} (HTTP {})", url, resp.status().as_u16());
            continue;
        }

        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Failed to read video body {}: {}", url, err);
                continue;
            }
        };

        fs::write(&dest, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        info!("Video downloaded successfully as {}", dest.display());
        downloaded.push(dest);
    }

    Ok(downloaded)
}
