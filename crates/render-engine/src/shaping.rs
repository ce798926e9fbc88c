//! Arabic reshaping and bidirectional reordering.
//!
//! Glyph drawers place codepoints left to right in the order they are given.
//! Right-to-left text therefore has to be turned into its visual form first:
//! letters are swapped for their contextual presentation forms, then the line
//! is reordered per UAX #9 so RTL runs come out reversed and LTR runs (Latin,
//! digits) keep their order.

use ar_reshaper::ArabicReshaper;
use cueframe_common::BaseDirection;
use unicode_bidi::{BidiInfo, Level};

/// One line in visual order, ready for left-to-right placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedLine {
    /// Reshaped, reordered text.
    pub visual: String,
    /// Resolved paragraph direction.
    pub rtl: bool,
}

/// A line could not be shaped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapingError {
    #[error("line contains a line or paragraph separator at byte {offset}")]
    EmbeddedBreak { offset: usize },
}

/// Reshapes and reorders single lines.
pub struct Shaper {
    reshaper: ArabicReshaper,
    direction: BaseDirection,
}

impl Shaper {
    pub fn new(direction: BaseDirection) -> Self {
        Self {
            reshaper: ArabicReshaper::default(),
            direction,
        }
    }

    /// Shape one line. Callers split cues into lines and drop blank ones
    /// before this point.
    pub fn shape(&self, line: &str) -> Result<ShapedLine, ShapingError> {
        if let Some(offset) = line.find(is_paragraph_break) {
            return Err(ShapingError::EmbeddedBreak { offset });
        }
        let reshaped = self.reshaper.reshape(line);
        Ok(reorder(&reshaped, self.direction))
    }
}

/// Bidi class B characters, plus the Unicode line separator.
fn is_paragraph_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{1C}'..='\u{1E}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn base_level(direction: BaseDirection) -> Option<Level> {
    match direction {
        BaseDirection::Auto => None,
        BaseDirection::Ltr => Some(Level::ltr()),
        BaseDirection::Rtl => Some(Level::rtl()),
    }
}

/// Reorder a single-paragraph string from logical to visual order.
pub fn reorder(text: &str, direction: BaseDirection) -> ShapedLine {
    let bidi = BidiInfo::new(text, base_level(direction));
    let Some(para) = bidi.paragraphs.first() else {
        return ShapedLine {
            visual: String::new(),
            rtl: direction == BaseDirection::Rtl,
        };
    };

    let (levels, runs) = bidi.visual_runs(para, para.range.clone());
    let mut visual = String::with_capacity(text.len());
    for run in runs {
        let slice = &text[run.clone()];
        if levels[run.start].is_rtl() {
            visual.extend(slice.chars().rev().map(mirror));
        } else {
            visual.push_str(slice);
        }
    }

    ShapedLine {
        visual,
        rtl: para.level.is_rtl(),
    }
}

/// Bidi-mirrored pairs commonly found in subtitles.
fn mirror(c: char) -> char {
    match c {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '«' => '»',
        '»' => '«',
        '‹' => '›',
        '›' => '‹',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reshaped(text: &str) -> String {
        ArabicReshaper::default().reshape(text)
    }

    fn reversed(text: &str) -> String {
        text.chars().rev().collect()
    }

    #[test]
    fn test_latin_is_untouched() {
        let shaper = Shaper::new(BaseDirection::Auto);
        let line = shaper.shape("Hello, world").unwrap();
        assert_eq!(line.visual, "Hello, world");
        assert!(!line.rtl);
    }

    #[test]
    fn test_arabic_is_reshaped_and_reversed() {
        let shaper = Shaper::new(BaseDirection::Auto);
        let line = shaper.shape("مرحبا").unwrap();
        assert!(line.rtl);
        assert_eq!(line.visual, reversed(&reshaped("مرحبا")));
        assert_ne!(line.visual, reversed("مرحبا"));
    }

    #[test]
    fn test_mixed_direction_keeps_latin_order_and_reverses_arabic() {
        let shaper = Shaper::new(BaseDirection::Auto);
        let line = shaper.shape("English سلام English").unwrap();
        assert!(!line.rtl);
        let expected = format!("English {} English", reversed(&reshaped("سلام")));
        assert_eq!(line.visual, expected);
    }

    #[test]
    fn test_digits_keep_order_inside_arabic() {
        let shaper = Shaper::new(BaseDirection::Auto);
        let line = shaper.shape("عام 2024").unwrap();
        assert!(line.rtl);
        assert!(line.visual.starts_with("2024"));
    }

    #[test]
    fn test_base_direction_decides_run_order() {
        let auto = Shaper::new(BaseDirection::Auto).shape("abc سلام").unwrap();
        assert!(!auto.rtl);
        assert_eq!(auto.visual, format!("abc {}", reversed(&reshaped("سلام"))));

        let rtl = Shaper::new(BaseDirection::Rtl).shape("abc سلام").unwrap();
        assert!(rtl.rtl);
        assert_eq!(rtl.visual, format!("{} abc", reversed(&reshaped("سلام"))));
    }

    #[test]
    fn test_brackets_are_mirrored_in_rtl_runs() {
        let line = reorder(&reshaped("(نعم)"), BaseDirection::Auto);
        assert!(line.visual.starts_with('('));
        assert!(line.visual.ends_with(')'));
    }

    #[test]
    fn test_embedded_break_is_rejected() {
        let shaper = Shaper::new(BaseDirection::Auto);
        assert_eq!(
            shaper.shape("one\ntwo").unwrap_err(),
            ShapingError::EmbeddedBreak { offset: 3 }
        );
        assert!(shaper.shape("a\u{2029}b").is_err());
    }
}
