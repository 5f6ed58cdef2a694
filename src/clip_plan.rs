use crate::transcribe::Transcript;
use anyhow::Result;

/// A background clip's time window on the final video timeline, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    pub start: f64,
    pub end: f64,
}

impl ClipWindow {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Derive per-clip windows from the transcript so background cuts land on
/// speech-group boundaries.
///
/// Segments are split into `clip_count` contiguous groups (front groups take
/// the remainder). The first window opens `start_delay` before the first word
/// (clamped to zero), each window starts where the previous ended, and the
/// last one runs `end_delay` past the final word.
///
/// When there are fewer segments than requested clips the plan shrinks to one
/// window per segment.
pub fn plan_windows(
    transcript: &Transcript,
    start_delay: f64,
    end_delay: f64,
    clip_count: usize,
) -> Result<Vec<ClipWindow>> {
    if clip_count == 0 {
        anyhow::bail!("clip_count must be at least 1");
    }
    let segments = &transcript.segments;
    if segments.is_empty() {
        anyhow::bail!("Cannot plan clips for an empty transcript");
    }

    let count = clip_count.min(segments.len());
    let base = segments.len() / count;
    let remainder = segments.len() % count;

    let mut windows = Vec::with_capacity(count);
    let mut cursor = 0usize;
    let mut prev_end = (segments[0].start() - start_delay).max(0.0);

    for group in 0..count {
        let take = base + usize::from(group < remainder);
        let last = &segments[cursor + take - 1];
        cursor += take;

        let mut end = last.end();
        if group == count - 1 {
            end += end_delay;
        }

        windows.push(ClipWindow {
            start: prev_end,
            end,
        });
        prev_end = end;
    }

    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::{Segment, Word};

    fn transcript(bounds: &[(f64, f64)]) -> Transcript {
        Transcript {
            segments: bounds
                .iter()
                .map(|&(start, end)| Segment {
                    words: vec![Word {
                        text: "w.".to_string(),
                        start,
                        end,
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn splits_evenly_and_stays_contiguous() {
        let t = transcript(&[
            (2.0, 3.0),
            (3.2, 5.0),
            (5.1, 7.0),
            (7.2, 9.0),
            (9.1, 11.0),
            (11.2, 13.0),
        ]);
        let windows = plan_windows(&t, 2.0, 8.0, 3).unwrap();

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start, 0.0);
        assert_eq!(windows[0].end, 5.0);
        assert_eq!(windows[1].start, 5.0);
        assert_eq!(windows[1].end, 9.0);
        assert_eq!(windows[2].start, 9.0);
        assert_eq!(windows[2].end, 21.0);
    }

    #[test]
    fn front_groups_take_the_remainder() {
        let t = transcript(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0), (3.0, 4.0)]);
        let windows = plan_windows(&t, 0.0, 1.0, 3).unwrap();

        // Groups of 2, 1, 1 segments.
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].end, 2.0);
        assert_eq!(windows[1].end, 3.0);
        assert_eq!(windows[2].end, 5.0);
    }

    #[test]
    fn first_window_clamps_at_zero() {
        let t = transcript(&[(0.5, 2.0)]);
        let windows = plan_windows(&t, 2.0, 3.0, 1).unwrap();
        assert_eq!(windows[0].start, 0.0);
        assert_eq!(windows[0].end, 5.0);
    }

    #[test]
    fn shrinks_when_fewer_segments_than_clips() {
        let t = transcript(&[(1.0, 2.0), (2.5, 4.0)]);
        let windows = plan_windows(&t, 1.0, 2.0, 5).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start, 0.0);
        assert_eq!(windows[1].end, 6.0);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        let t = transcript(&[(0.0, 1.0)]);
        assert!(plan_windows(&t, 1.0, 1.0, 0).is_err());
        assert!(plan_windows(&Transcript::default(), 1.0, 1.0, 3).is_err());
    }

    #[test]
    fn windows_tile_the_timeline() {
        let t = transcript(&[(2.0, 4.0), (4.5, 8.0), (8.2, 12.0), (12.5, 15.0), (15.2, 18.0)]);
        let windows = plan_windows(&t, 2.0, 8.0, 3).unwrap();
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].duration() > 0.0);
        }
    }
}
