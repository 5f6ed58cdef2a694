use crate::config::Config;
use crate::ffmpeg;
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio::process::Command;
use tracing::info;

/// A gap this long between words starts a new segment even without punctuation.
const SEGMENT_GAP_S: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// A sentence-sized run of words, the unit the clip planner partitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    pub words: Vec<Word>,
}

impl Segment {
    pub fn start(&self) -> f64 {
        self.words.first().map(|w| w.start).unwrap_or(0.0)
    }

    pub fn end(&self) -> f64 {
        self.words.last().map(|w| w.end).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub segments: Vec<Segment>,
}

impl Transcript {
    pub fn from_words(words: Vec<Word>) -> Self {
        Self {
            segments: group_into_segments(words),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.words.is_empty())
    }

    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }

    pub fn start(&self) -> f64 {
        self.segments.first().map(|s| s.start()).unwrap_or(0.0)
    }

    pub fn end(&self) -> f64 {
        self.segments.last().map(|s| s.end()).unwrap_or(0.0)
    }

    /// Shift every word by the narration lead-in.
    pub fn apply_start_delay(&mut self, delay: f64) {
        for segment in &mut self.segments {
            for word in &mut segment.words {
                word.start += delay;
                word.end += delay;
            }
        }
    }

    /// Replace recognized words with the words of the script that was narrated.
    ///
    /// Matching is positional; when the counts disagree the shorter side wins
    /// and the remaining recognized words keep their transcribed text.
    pub fn align_with_script(&mut self, script: &str) {
        let mut original = script.split_whitespace();
        'outer: for segment in &mut self.segments {
            for word in &mut segment.words {
                match original.next() {
                    Some(text) => word.text = text.to_string(),
                    None => break 'outer,
                }
            }
        }
    }
}

fn sentence_end_regex() -> &'static Regex {
    static SENTENCE_RE: OnceCell<Regex> = OnceCell::new();
    SENTENCE_RE.get_or_init(|| {
        Regex::new(r#"[.!?…]["')\]]*$"#).expect("sentence regex is valid")
    })
}

/// Group a word stream into sentence-sized segments.
///
/// A segment ends on terminal punctuation or on a silence gap longer than
/// [`SEGMENT_GAP_S`].
pub fn group_into_segments(words: Vec<Word>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Segment::default();

    for word in words {
        if let Some(prev) = current.words.last() {
            if word.start - prev.end > SEGMENT_GAP_S {
                segments.push(std::mem::take(&mut current));
            }
        }

        let ends_sentence = sentence_end_regex().is_match(word.text.trim());
        current.words.push(word);
        if ends_sentence {
            segments.push(std::mem::take(&mut current));
        }
    }

    if !current.words.is_empty() {
        segments.push(current);
    }

    segments
}

// whisper.cpp JSON output (-oj): per-entry millisecond offsets.
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    transcription: Vec<WhisperEntry>,
}

#[derive(Debug, Deserialize)]
struct WhisperEntry {
    offsets: WhisperOffsets,
    text: String,
}

#[derive(Debug, Deserialize)]
struct WhisperOffsets {
    from: u64,
    to: u64,
}

fn words_from_output(output: WhisperOutput) -> Vec<Word> {
    output
        .transcription
        .into_iter()
        .filter_map(|entry| {
            let text = entry.text.trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(Word {
                text,
                start: entry.offsets.from as f64 / 1000.0,
                end: entry.offsets.to as f64 / 1000.0,
            })
        })
        .collect()
}

/// Transcribe a narration file with the local whisper.cpp model.
///
/// The audio is first resampled to 16 kHz mono (whisper.cpp's input format);
/// the model runs with one word per segment so the JSON offsets are
/// word-level timestamps.
pub async fn transcribe_audio(cfg: &Config, audio_path: &Path) -> Result<Vec<Word>> {
    info!("Transcribing {}", audio_path.display());

    let scratch = tempfile::tempdir().context("Failed to create transcription scratch dir")?;
    let wav_path = scratch.path().join("narration16k.wav");
    if !ffmpeg::ffmpeg_extract_wav_16k(audio_path, &wav_path).await? {
        anyhow::bail!("Failed to resample {} for transcription", audio_path.display());
    }

    let out_base = scratch.path().join("transcript");
    let status = Command::new(&cfg.whisper_bin)
        .arg("-m")
        .arg(&cfg.whisper_model)
        .arg("-f")
        .arg(&wav_path)
        .args(["-l", "en", "-ml", "1", "-sow", "-oj", "-np"])
        .arg("-of")
        .arg(&out_base)
        .status()
        .await
        .with_context(|| format!("Failed to run {}", cfg.whisper_bin))?;

    if !status.success() {
        anyhow::bail!("{} exited with {}", cfg.whisper_bin, status);
    }

    let json_path = out_base.with_extension("json");
    let raw = fs::read_to_string(&json_path)
        .await
        .with_context(|| format!("Missing whisper output {}", json_path.display()))?;

    let output: WhisperOutput =
        serde_json::from_str(&raw).context("Failed to parse whisper JSON output")?;

    let words = words_from_output(output);
    info!("Transcribed {} words", words.len());
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> Word {
        Word {
            text: text.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn parses_whisper_json() {
        let raw = r#"{
            "systeminfo": "AVX = 1",
            "result": {"language": "en"},
            "transcription": [
                {"timestamps": {"from": "00:00:00,000", "to": "00:00:00,320"},
                 "offsets": {"from": 0, "to": 320}, "text": " Today"},
                {"timestamps": {"from": "00:00:00,320", "to": "00:00:00,550"},
                 "offsets": {"from": 320, "to": 550}, "text": " brings"},
                {"offsets": {"from": 550, "to": 560}, "text": "  "}
            ]
        }"#;
        let output: WhisperOutput = serde_json::from_str(raw).unwrap();
        let words = words_from_output(output);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Today");
        assert_eq!(words[0].start, 0.0);
        assert_eq!(words[1].end, 0.55);
    }

    #[test]
    fn groups_on_terminal_punctuation() {
        let words = vec![
            word("Trust", 0.0, 0.3),
            word("yourself.", 0.3, 0.8),
            word("New", 0.9, 1.1),
            word("doors", 1.1, 1.4),
            word("open!", 1.4, 1.9),
        ];
        let segments = group_into_segments(words);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].words.len(), 2);
        assert_eq!(segments[1].words.len(), 3);
        assert_eq!(segments[1].start(), 0.9);
    }

    #[test]
    fn groups_on_long_silence() {
        let words = vec![
            word("one", 0.0, 0.3),
            word("two", 2.0, 2.3),
            word("three", 2.4, 2.7),
        ];
        let segments = group_into_segments(words);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].words.len(), 1);
        assert_eq!(segments[1].words.len(), 2);
    }

    #[test]
    fn trailing_words_form_a_segment() {
        let words = vec![word("no", 0.0, 0.2), word("punctuation", 0.2, 0.8)];
        let segments = group_into_segments(words);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].end(), 0.8);
    }

    #[test]
    fn start_delay_shifts_every_word() {
        let mut transcript = Transcript::from_words(vec![
            word("stars.", 0.5, 1.0),
            word("align.", 1.2, 1.8),
        ]);
        transcript.apply_start_delay(2.0);
        assert_eq!(transcript.start(), 2.5);
        assert_eq!(transcript.end(), 3.8);
    }

    #[test]
    fn script_alignment_is_positional_and_clamped() {
        let mut transcript = Transcript::from_words(vec![
            word("the", 0.0, 0.2),
            word("starz", 0.2, 0.6),
            word("align.", 0.6, 1.0),
            word("extra", 1.1, 1.4),
        ]);
        transcript.align_with_script("The stars align.");

        let words: Vec<String> = transcript
            .segments
            .iter()
            .flat_map(|s| s.words.iter().map(|w| w.text.clone()))
            .collect();
        assert_eq!(words, vec!["The", "stars", "align.", "extra"]);
    }

    #[test]
    fn empty_transcript_reports_empty() {
        let transcript = Transcript::from_words(Vec::new());
        assert!(transcript.is_empty());
        assert_eq!(transcript.word_count(), 0);
    }
}
