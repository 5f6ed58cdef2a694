use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;

pub const TARGET_W: i32 = 1080;
pub const TARGET_H: i32 = 1920;

/// RGB multiplier applied to background clips so the captions stay readable.
const BACKGROUND_DARKEN: f64 = 0.7;

const NARRATION_VOLUME: f64 = 2.5;
const MUSIC_VOLUME: f64 = 0.1;

async fn run_cmd(args: &[String]) -> Result<()> {
    if args.is_empty() {
        return Ok(());
    }

    let mut cmd = Command::new(&args[0]);
    if args.len() > 1 {
        cmd.args(&args[1..]);
    }

    let status = cmd.status().await.context("Command execution failed")?;
    if !status.success() {
        return Err(anyhow::anyhow!("Command failed: {:?}", args));
    }

    Ok(())
}

pub async fn ffprobe_duration_seconds(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .context("ffprobe duration failed")?;

    if !output.status.success() {
        return Err(anyhow::anyhow!("ffprobe failed"));
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let duration = text.parse::<f64>().unwrap_or(-1.0);
    if duration <= 0.1 {
        return Err(anyhow::anyhow!("Invalid duration"));
    }
    Ok(duration)
}

/// Resample any audio file to the 16 kHz mono PCM wav whisper.cpp expects.
pub async fn ffmpeg_extract_wav_16k(in_audio: &Path, out_wav: &Path) -> Result<bool> {
    let args = vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        in_audio.display().to_string(),
        "-ar".to_string(),
        "16000".to_string(),
        "-ac".to_string(),
        "1".to_string(),
        "-c:a".to_string(),
        "pcm_s16le".to_string(),
        out_wav.display().to_string(),
    ];
    run_cmd(&args).await?;
    Ok(out_wav.exists())
}

/// Normalize one background clip to the vertical frame and its window length:
/// cover-scale, center-crop to 1080x1920, darken, fix the frame rate, and
/// loop the source so the output is exactly `dur_s` seconds even when the
/// clip is shorter than its window.
pub async fn ffmpeg_normalize_background(in_mp4: &Path, dur_s: f64, out_mp4: &Path) -> Result<bool> {
    let filter = format!(
        "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},colorchannelmixer=rr={d}:gg={d}:bb={d},fps=30,setsar=1",
        w = TARGET_W,
        h = TARGET_H,
        d = BACKGROUND_DARKEN,
    );

    let args = vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-stream_loop".to_string(),
        "-1".to_string(),
        "-i".to_string(),
        in_mp4.display().to_string(),
        "-t".to_string(),
        format!("{:.3}", dur_s),
        "-vf".to_string(),
        filter,
        "-an".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-crf".to_string(),
        "22".to_string(),
        out_mp4.display().to_string(),
    ];

    run_cmd(&args).await?;
    Ok(out_mp4.exists())
}

pub async fn ffmpeg_concat_videos(list_txt: &Path, out_mp4: &Path) -> Result<bool> {
    let args = vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        list_txt.display().to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-crf".to_string(),
        "22".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        out_mp4.display().to_string(),
    ];
    run_cmd(&args).await?;
    Ok(out_mp4.exists())
}

/// Final composite: burn the ASS captions onto the assembled background,
/// delay the narration by the lead-in, loop the music under it, and mix.
pub async fn ffmpeg_composite_final(
    background_mp4: &Path,
    narration_audio: &Path,
    music_audio: &Path,
    ass_path: &Path,
    start_delay_s: f64,
    total_dur_s: f64,
    out_mp4: &Path,
) -> Result<bool> {
    let delay_ms = (start_delay_s * 1000.0).round() as i64;
    let filter = format!(
        "[0:v]ass={ass}[v];\
         [1:a]adelay={ms}|{ms},volume={nv}[nar];\
         [2:a]volume={mv}[bgm];\
         [nar][bgm]amix=inputs=2:duration=longest:dropout_transition=2[a]",
        ass = ass_path.display(),
        ms = delay_ms,
        nv = NARRATION_VOLUME,
        mv = MUSIC_VOLUME,
    );

    let args = vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        background_mp4.display().to_string(),
        "-i".to_string(),
        narration_audio.display().to_string(),
        "-stream_loop".to_string(),
        "-1".to_string(),
        "-i".to_string(),
        music_audio.display().to_string(),
        "-filter_complex".to_string(),
        filter,
        "-map".to_string(),
        "[v]".to_string(),
        "-map".to_string(),
        "[a]".to_string(),
        "-t".to_string(),
        format!("{:.3}", total_dur_s),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-crf".to_string(),
        "22".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        out_mp4.display().to_string(),
    ];

    run_cmd(&args).await?;
    Ok(out_mp4.exists())
}
