use crate::transcribe::{Segment, Transcript, Word};

/// Rendering parameters for the burned-in captions.
///
/// Widths are in pixels of the output frame; the width estimate charges every
/// character a full `font_size` like the layout the captions were tuned
/// against, which overestimates and keeps chunks comfortably on screen.
#[derive(Debug, Clone)]
pub struct CaptionStyle {
    pub font: String,
    pub font_size: u32,
    pub screen_width: u32,
    pub stroke_width: u32,
    pub color: String,
    pub emphasis_color: String,
    pub stroke_color: String,
    pub header_font_size: u32,
    pub header_margin_v: u32,
    pub play_res_x: u32,
    pub play_res_y: u32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: "Arial".to_string(),
            font_size: 100,
            screen_width: 1000,
            stroke_width: 7,
            color: "#ffffff".to_string(),
            emphasis_color: "#79f035".to_string(),
            stroke_color: "#000000".to_string(),
            header_font_size: 100,
            header_margin_v: 100,
            play_res_x: 1080,
            play_res_y: 1920,
        }
    }
}

fn estimated_width(words: &[Word], font_size: u32) -> u32 {
    words
        .iter()
        .map(|w| w.text.chars().count() as u32 * font_size)
        .sum()
}

/// Greedy width-based packing of each segment's words into caption chunks.
///
/// A chunk never crosses a segment boundary. A word too wide for the screen
/// on its own becomes a single-word chunk.
pub fn chunk_words(segments: &[Segment], style: &CaptionStyle) -> Vec<Vec<Word>> {
    let mut chunks = Vec::new();

    for segment in segments {
        let mut current: Vec<Word> = Vec::new();
        for word in &segment.words {
            let word_width = word.text.chars().count() as u32 * style.font_size;
            if !current.is_empty()
                && estimated_width(&current, style.font_size) + word_width > style.screen_width
            {
                chunks.push(std::mem::take(&mut current));
            }
            current.push(word.clone());
        }
        if !current.is_empty() {
            chunks.push(current);
        }
    }

    chunks
}

/// `#rrggbb` to the ASS `&HAABBGGRR` style color.
fn ass_color(hex: &str) -> String {
    let hex = hex.trim_start_matches('#');
    if hex.len() == 6 {
        let r = &hex[0..2];
        let g = &hex[2..4];
        let b = &hex[4..6];
        format!("&H00{}{}{}", b.to_uppercase(), g.to_uppercase(), r.to_uppercase())
    } else {
        "&H00FFFFFF".to_string()
    }
}

/// `#rrggbb` to an inline `\1c` override tag.
fn ass_inline_color(hex: &str) -> String {
    let full = ass_color(hex);
    format!("{{\\1c&H{}&}}", &full[4..])
}

/// ASS timestamps are `H:MM:SS.CC` (centisecond resolution).
fn ass_timestamp(seconds: f64) -> String {
    let cs_total = (seconds.max(0.0) * 100.0).round() as u64;
    let h = cs_total / 360_000;
    let m = (cs_total % 360_000) / 6_000;
    let s = (cs_total % 6_000) / 100;
    let cs = cs_total % 100;
    format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
}

fn escape_ass_text(text: &str) -> String {
    text.replace('\\', "\\\\").replace('{', "\\{").replace('}', "\\}")
}

fn chunk_text_with_emphasis(chunk: &[Word], emphasized: usize, style: &CaptionStyle) -> String {
    let emphasis = ass_inline_color(&style.emphasis_color);
    let reset = ass_inline_color(&style.color);

    let mut out = String::new();
    for (i, word) in chunk.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let text = escape_ass_text(&word.text);
        if i == emphasized {
            out.push_str(&emphasis);
            out.push_str(&text);
            out.push_str(&reset);
        } else {
            out.push_str(&text);
        }
    }
    out
}

/// Build the full ASS subtitle document: a static header pinned near the top
/// for the whole video, and one dialogue event per (chunk, spoken word) with
/// the spoken word in the emphasis color.
///
/// Within a chunk each word's event ends where the next begins, so the chunk
/// stays on screen without flicker between words.
pub fn build_ass_document(
    transcript: &Transcript,
    style: &CaptionStyle,
    header_text: &str,
    total_duration: f64,
) -> String {
    let mut doc = format!(
        "[Script Info]\n\
         ScriptType: v4.00+\n\
         PlayResX: {rx}\n\
         PlayResY: {ry}\n\
         ScaledBorderAndShadow: yes\n\
         \n\
         [V4+ Styles]\n\
         Format: Name,Fontname,Fontsize,PrimaryColour,SecondaryColour,OutlineColour,BackColour,Bold,Italic,Underline,StrikeOut,ScaleX,ScaleY,Spacing,Angle,BorderStyle,Outline,Shadow,Alignment,MarginL,MarginR,MarginV,Encoding\n\
         Style: Caption,{font},{size},{primary},{primary},{outline},&H64000000,1,0,0,0,100,100,0,0,1,{ow},0,5,40,40,0,1\n\
         Style: Header,{font},{hsize},{primary},{primary},{outline},&H64000000,1,0,0,0,100,100,0,0,1,{ow},0,8,40,40,{hmv},1\n\
         \n\
         [Events]\n\
         Format: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text\n",
        rx = style.play_res_x,
        ry = style.play_res_y,
        font = style.font,
        size = style.font_size,
        hsize = style.header_font_size,
        primary = ass_color(&style.color),
        outline = ass_color(&style.stroke_color),
        ow = style.stroke_width,
        hmv = style.header_margin_v,
    );

    doc.push_str(&format!(
        "Dialogue: 0,{},{},Header,,0,0,0,,{}\n",
        ass_timestamp(0.0),
        ass_timestamp(total_duration),
        escape_ass_text(header_text)
    ));

    for chunk in chunk_words(&transcript.segments, style) {
        if chunk.len() == 1 {
            let word = &chunk[0];
            doc.push_str(&format!(
                "Dialogue: 0,{},{},Caption,,0,0,0,,{}\n",
                ass_timestamp(word.start),
                ass_timestamp(word.end),
                escape_ass_text(&word.text)
            ));
            continue;
        }

        for i in 0..chunk.len() {
            let start = chunk[i].start;
            let end = if i + 1 < chunk.len() {
                chunk[i + 1].start
            } else {
                chunk[i].end
            };
            doc.push_str(&format!(
                "Dialogue: 0,{},{},Caption,,0,0,0,,{}\n",
                ass_timestamp(start),
                ass_timestamp(end.max(start + 0.01)),
                chunk_text_with_emphasis(&chunk, i, style)
            ));
        }
    }

    doc
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

    fn segment(words: Vec<Word>) -> Segment {
        Segment { words }
    }

    fn small_style() -> CaptionStyle {
        CaptionStyle {
            font_size: 10,
            screen_width: 100,
            ..CaptionStyle::default()
        }
    }

    #[test]
    fn chunks_respect_estimated_width() {
        // Widths at font_size 10: "cosmic" = 60, "tides" = 50, "turn" = 40.
        let segments = vec![segment(vec![
            word("cosmic", 0.0, 0.4),
            word("tides", 0.4, 0.8),
            word("turn", 0.8, 1.2),
        ])];
        let chunks = chunk_words(&segments, &small_style());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 1);
        assert_eq!(chunks[1].len(), 2);
    }

    #[test]
    fn oversized_word_gets_its_own_chunk() {
        let segments = vec![segment(vec![
            word("unquestionably", 0.0, 1.0),
            word("so", 1.0, 1.2),
        ])];
        let chunks = chunk_words(&segments, &small_style());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0][0].text, "unquestionably");
    }

    #[test]
    fn chunks_never_cross_segments() {
        let segments = vec![
            segment(vec![word("hi.", 0.0, 0.3)]),
            segment(vec![word("yes", 0.5, 0.8)]),
        ];
        let chunks = chunk_words(&segments, &small_style());
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn timestamps_are_centisecond_ass_format() {
        assert_eq!(ass_timestamp(0.0), "0:00:00.00");
        assert_eq!(ass_timestamp(61.239), "0:01:01.24");
        assert_eq!(ass_timestamp(3601.5), "1:00:01.50");
    }

    #[test]
    fn colors_convert_to_bgr() {
        assert_eq!(ass_color("#79f035"), "&H0035F079");
        assert_eq!(ass_color("#ffffff"), "&H00FFFFFF");
        assert_eq!(ass_inline_color("#79f035"), "{\\1c&H35F079&}");
    }

    #[test]
    fn document_contains_header_and_emphasis_events() {
        let transcript = Transcript {
            segments: vec![segment(vec![
                word("good", 0.0, 0.4),
                word("luck", 0.5, 0.9),
            ])],
        };
        let style = CaptionStyle::default();
        let doc = build_ass_document(&transcript, &style, "Aries Daily Horoscope:", 10.0);

        assert!(doc.contains("PlayResX: 1080"));
        assert!(doc.contains("Style: Caption,Arial,100"));
        assert!(doc.contains("Aries Daily Horoscope:"));
        // Two words in one chunk: one event per emphasized word.
        assert!(doc.contains("{\\1c&H35F079&}good{\\1c&HFFFFFF&} luck"));
        assert!(doc.contains("good {\\1c&H35F079&}luck{\\1c&HFFFFFF&}"));
        // First word's event runs until the second word starts.
        assert!(doc.contains("Dialogue: 0,0:00:00.00,0:00:00.50,Caption"));
    }

    #[test]
    fn single_word_chunk_has_no_markup() {
        let transcript = Transcript {
            segments: vec![segment(vec![word("Breathe.", 1.0, 1.8)])],
        };
        let doc = build_ass_document(&transcript, &CaptionStyle::default(), "H", 5.0);
        assert!(doc.contains("Dialogue: 0,0:00:01.00,0:00:01.80,Caption,,0,0,0,,Breathe.\n"));
    }

    #[test]
    fn braces_are_escaped() {
        assert_eq!(escape_ass_text("a{b}c"), "a\\{b\\}c");
    }
}
