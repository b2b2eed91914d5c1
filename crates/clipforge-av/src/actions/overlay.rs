//! Text overlay burn-in using the ffmpeg drawtext filter.

use super::run_ffmpeg;
use crate::Result;
use std::path::Path;

/// Frame width assumed for word-wrap estimation. The wrap is a deliberate
/// heuristic, not exact glyph layout; see [`OverlayParams::wrapped_text`].
const ASSUMED_FRAME_WIDTH: u32 = 720;

/// Average glyph width as a fraction of the font size.
const CHAR_WIDTH_RATIO: f64 = 0.55;

/// Vertical anchor for the burned-in text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextAnchor {
    /// Fixed margin from the top edge.
    Top,
    /// Vertically centered.
    Center,
    /// Fixed margin from the bottom edge.
    Bottom,
    /// Percentage-based placement: 0 is the left/top edge, 100 the
    /// right/bottom edge, measured over the space the text can occupy.
    Custom { x_pct: f64, y_pct: f64 },
}

/// Parameters for a text overlay operation.
#[derive(Debug, Clone)]
pub struct OverlayParams {
    pub text: String,
    pub font_size: u32,
    pub font_color: String,
    pub anchor: TextAnchor,
    /// Optional drawtext box color behind the text.
    pub bg_color: Option<String>,
    /// Word-wrap margins in pixels. Non-zero padding enables wrapping.
    pub padding_left: u32,
    pub padding_right: u32,
    /// Overlay active from this time (seconds). Absent with `duration`
    /// absent means the overlay covers the whole clip.
    pub start_time: Option<f64>,
    /// Overlay active for this long after `start_time`.
    pub duration: Option<f64>,
}

impl OverlayParams {
    pub fn new(
        text: impl Into<String>,
        font_size: u32,
        font_color: impl Into<String>,
        anchor: TextAnchor,
    ) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_color: font_color.into(),
            anchor,
            bg_color: None,
            padding_left: 0,
            padding_right: 0,
            start_time: None,
            duration: None,
        }
    }

    /// The overlay text with wrap line breaks applied.
    ///
    /// drawtext has no auto-wrap, so when horizontal padding is set the text
    /// is greedily packed into lines that fit an estimated character budget
    /// for a 720px frame.
    fn wrapped_text(&self) -> String {
        if self.padding_left == 0 && self.padding_right == 0 {
            return self.text.clone();
        }
        let available_width = ASSUMED_FRAME_WIDTH
            .saturating_sub(self.padding_left)
            .saturating_sub(self.padding_right);
        let char_width = self.font_size as f64 * CHAR_WIDTH_RATIO;
        let max_chars = ((available_width as f64 / char_width).floor() as usize).max(5);
        wrap_text(&self.text, max_chars)
    }
}

/// Word-wrap text to fit within a max character width per line.
///
/// Greedy packing: words join the current line while it stays within
/// `max_chars`, otherwise they start a new line. Words longer than the
/// budget get a line of their own. Pure and deterministic.
pub fn wrap_text(text: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line = word.to_string();
        } else if line.len() + 1 + word.len() <= max_chars {
            line.push(' ');
            line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut line));
            line = word.to_string();
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

/// Escape text for the drawtext filter (backslashes, quotes, colons).
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "'\\''")
        .replace(':', "\\:")
}

/// Build the complete drawtext filter expression for the given parameters.
fn build_drawtext_filter(params: &OverlayParams) -> String {
    let text = escape_drawtext(&params.wrapped_text());

    // Centered horizontally, shifted when the margins differ
    let h_offset = (params.padding_left as i64 - params.padding_right as i64) as f64 / 2.0;
    let x_expr = match params.anchor {
        TextAnchor::Custom { x_pct, .. } => format!("(w-text_w)*{}/100", x_pct),
        _ if h_offset == 0.0 => "(w-text_w)/2".to_string(),
        _ => format!("(w-text_w)/2+{}", h_offset),
    };

    let y_expr = match params.anchor {
        TextAnchor::Top => "50".to_string(),
        TextAnchor::Center => "(h-text_h)/2".to_string(),
        TextAnchor::Bottom => "h-text_h-50".to_string(),
        TextAnchor::Custom { y_pct, .. } => format!("(h-text_h)*{}/100", y_pct),
    };

    let mut filter = format!(
        "drawtext=text='{}':fontsize={}:fontcolor={}:x={}:y={}",
        text, params.font_size, params.font_color, x_expr, y_expr
    );

    if let Some(bg) = &params.bg_color {
        filter.push_str(&format!(":box=1:boxcolor={}@0.7:boxborderw=10", bg));
    }

    // Time-based enable
    match (params.start_time, params.duration) {
        (start, Some(duration)) => {
            let start = start.unwrap_or(0.0);
            filter.push_str(&format!(":enable='between(t,{},{})'", start, start + duration));
        }
        (Some(start), None) => {
            filter.push_str(&format!(":enable='gte(t,{})'", start));
        }
        (None, None) => {}
    }

    filter
}

/// Burn a text overlay onto a video.
///
/// The audio stream is passed through unmodified. A transcoder failure
/// (unreadable input, malformed filter) surfaces as an error and is not
/// retried.
pub async fn add_text_overlay(input: &Path, output: &Path, params: &OverlayParams) -> Result<()> {
    let filter = build_drawtext_filter(params);
    tracing::debug!(filter = %filter, input = %input.display(), "Applying text overlay");

    run_ffmpeg([
        "-y".as_ref(),
        "-i".as_ref(),
        input.as_os_str(),
        "-vf".as_ref(),
        filter.as_ref(),
        "-c:a".as_ref(),
        "copy".as_ref(),
        output.as_os_str(),
    ])
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(text: &str) -> OverlayParams {
        OverlayParams::new(text, 48, "#FFFFFF", TextAnchor::Bottom)
    }

    #[test]
    fn test_wrap_splits_every_word_when_budget_is_tight() {
        assert_eq!(wrap_text("a b c d", 3), "a b\nc d");
    }

    #[test]
    fn test_wrap_single_chars_budget_too_small_to_join() {
        assert_eq!(wrap_text("aa bb cc dd", 3), "aa\nbb\ncc\ndd");
    }

    #[test]
    fn test_wrap_exact_fit_stays_on_one_line() {
        assert_eq!(wrap_text("hello world", 11), "hello world");
    }

    #[test]
    fn test_wrap_is_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog";
        assert_eq!(wrap_text(text, 10), wrap_text(text, 10));
    }

    #[test]
    fn test_wrap_oversized_word_gets_own_line() {
        assert_eq!(wrap_text("hi extraordinary no", 5), "hi\nextraordinary\nno");
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        assert_eq!(wrap_text("  a   b  ", 10), "a b");
    }

    #[test]
    fn test_escape_drawtext() {
        assert_eq!(escape_drawtext("a:b"), "a\\:b");
        assert_eq!(escape_drawtext("it's"), "it'\\''s");
        assert_eq!(escape_drawtext("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_filter_bottom_anchor_defaults() {
        let filter = build_drawtext_filter(&params("Hi"));
        assert_eq!(
            filter,
            "drawtext=text='Hi':fontsize=48:fontcolor=#FFFFFF:x=(w-text_w)/2:y=h-text_h-50"
        );
    }

    #[test]
    fn test_filter_anchors() {
        let mut p = params("Hi");
        p.anchor = TextAnchor::Top;
        assert!(build_drawtext_filter(&p).contains(":y=50"));

        p.anchor = TextAnchor::Center;
        assert!(build_drawtext_filter(&p).contains(":y=(h-text_h)/2"));

        p.anchor = TextAnchor::Custom {
            x_pct: 25.0,
            y_pct: 75.0,
        };
        let filter = build_drawtext_filter(&p);
        assert!(filter.contains(":x=(w-text_w)*25/100"));
        assert!(filter.contains(":y=(h-text_h)*75/100"));
    }

    #[test]
    fn test_filter_padding_offsets_and_wraps() {
        let mut p = params("one two three four five six seven");
        p.padding_left = 100;
        p.padding_right = 40;
        let filter = build_drawtext_filter(&p);

        // offset = (100 - 40) / 2
        assert!(filter.contains(":x=(w-text_w)/2+30"));
        // 720 - 140 = 580; 580 / (48 * 0.55) = 21 chars -> wrapped
        assert!(filter.contains("\\n") || filter.contains('\n'));
    }

    #[test]
    fn test_filter_min_chars_per_line_floor() {
        let mut p = params("aaaa bbbb");
        p.font_size = 400; // char budget would be < 5 without the floor
        p.padding_left = 10;
        p.padding_right = 10;
        assert_eq!(p.wrapped_text(), "aaaa\nbbbb");
    }

    #[test]
    fn test_filter_time_windows() {
        let mut p = params("Hi");
        p.start_time = Some(1.5);
        p.duration = Some(2.0);
        assert!(build_drawtext_filter(&p).ends_with(":enable='between(t,1.5,3.5)'"));

        p.duration = None;
        assert!(build_drawtext_filter(&p).ends_with(":enable='gte(t,1.5)'"));

        p.start_time = None;
        p.duration = Some(4.0);
        assert!(build_drawtext_filter(&p).ends_with(":enable='between(t,0,4)'"));

        p.duration = None;
        assert!(!build_drawtext_filter(&p).contains("enable"));
    }

    #[test]
    fn test_filter_bg_box() {
        let mut p = params("Hi");
        p.bg_color = Some("black".to_string());
        assert!(build_drawtext_filter(&p).contains(":box=1:boxcolor=black@0.7:boxborderw=10"));
    }

    #[test]
    fn test_no_wrap_without_padding() {
        let p = params("a very long line that would normally wrap at some width");
        assert_eq!(p.wrapped_text(), p.text);
    }
}
