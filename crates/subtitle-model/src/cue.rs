//! The cue type and parser errors shared by every format.

use std::time::Duration;

/// One subtitle entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// 1-based ordinal position in the source document.
    pub index: usize,

    /// Display start, carried through from the source.
    pub start: Duration,

    /// Display end, carried through from the source.
    pub end: Duration,

    /// Text lines in source order. May be empty or contain blank lines.
    pub lines: Vec<String>,
}

impl Cue {
    /// Create an untimed cue from raw text, splitting on line breaks.
    pub fn from_text(index: usize, text: &str) -> Self {
        Self {
            index,
            start: Duration::ZERO,
            end: Duration::ZERO,
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Lines that still have content after trimming.
    pub fn non_blank_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
    }

    /// Whether the cue has nothing to draw.
    pub fn is_blank(&self) -> bool {
        self.non_blank_lines().next().is_none()
    }
}

/// Document does not follow the subtitle grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: expected a cue number, found {found:?}")]
    InvalidIndex { line: usize, found: String },

    #[error("line {line}: cue number is not followed by a timing line")]
    MissingTiming { line: usize },

    #[error("line {line}: invalid timing {found:?}")]
    InvalidTiming { line: usize, found: String },

    #[error("no [Events] section found")]
    MissingEvents,

    #[error("line {line}: Format line has no Text field")]
    MissingTextField { line: usize },

    #[error("line {line}: dialogue has {found} field(s), expected {expected}")]
    MalformedDialogue {
        line: usize,
        found: usize,
        expected: usize,
    },
}

impl From<ParseError> for cueframe_common::CueframeError {
    fn from(err: ParseError) -> Self {
        Self::parse(err.to_string())
    }
}

/// Remove inline markup that a plain renderer cannot honour.
///
/// Handles HTML-like tags (`<i>`, `</b>`, `<font color=…>`) and ASS override
/// blocks (`{\an8}`). Anything else in angle or curly brackets is kept.
pub fn strip_markup(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(pos) = rest.find(['<', '{']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let close = if tail.starts_with('<') { '>' } else { '}' };

        match tail.find(close) {
            Some(end) if is_markup(&tail[..=end]) => rest = &tail[end + 1..],
            _ => {
                // Not markup: keep the bracket and continue after it.
                out.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_markup(token: &str) -> bool {
    if let Some(inner) = token.strip_prefix('{') {
        return inner.starts_with('\\');
    }
    let inner = token
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_start_matches('/');
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(name.as_str(), "i" | "b" | "u" | "s" | "font")
}

/// Parse `H:MM:SS,mmm` / `HH:MM:SS.mmm` / `MM:SS,mmm`.
///
/// The fractional part may have 1-3 digits; ASS centiseconds (`0:00:01.50`)
/// are read as 500 ms.
pub(crate) fn parse_timestamp(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (clock, fraction) = match raw.find([',', '.']) {
        Some(pos) => (&raw[..pos], &raw[pos + 1..]),
        None => (raw, ""),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => ("0", *m, *s),
        _ => return None,
    };

    let parse = |s: &str| -> Option<u64> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    };

    let hours = parse(hours)?;
    let minutes = parse(minutes)?;
    let seconds = parse(seconds)?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let millis = if fraction.is_empty() {
        0
    } else {
        if fraction.len() > 3 {
            return None;
        }
        let value = parse(fraction)?;
        value * 10u64.pow(3 - fraction.len() as u32)
    };

    // Hours are unbounded in the text, so the total can overflow.
    let total = hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1000)?
        .checked_add(millis)?;
    Some(Duration::from_millis(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_lines_trims_and_filters() {
        let cue = Cue {
            index: 1,
            start: Duration::ZERO,
            end: Duration::ZERO,
            lines: vec!["  hello ".into(), "   ".into(), "".into(), "world".into()],
        };
        let lines: Vec<&str> = cue.non_blank_lines().collect();
        assert_eq!(lines, vec!["hello", "world"]);
        assert!(!cue.is_blank());
    }

    #[test]
    fn test_blank_cue() {
        let cue = Cue::from_text(2, " \n\t\n");
        assert!(cue.is_blank());
        assert!(Cue::from_text(3, "").is_blank());
    }

    #[test]
    fn test_strip_markup_removes_known_tags() {
        assert_eq!(strip_markup("<i>Hello</i> <b>there</b>"), "Hello there");
        assert_eq!(
            strip_markup("<font color=\"#ff0000\">red</font>"),
            "red"
        );
        assert_eq!(strip_markup("{\\an8}top"), "top");
    }

    #[test]
    fn test_strip_markup_keeps_plain_brackets() {
        assert_eq!(strip_markup("a < b and c > d"), "a < b and c > d");
        assert_eq!(strip_markup("<3 {braces}"), "<3 {braces}");
        assert_eq!(strip_markup("<unclosed"), "<unclosed");
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert_eq!(
            parse_timestamp("00:01:02,345"),
            Some(Duration::from_millis(62_345))
        );
        assert_eq!(
            parse_timestamp("1:00:00.5"),
            Some(Duration::from_millis(3_600_500))
        );
        assert_eq!(
            parse_timestamp("0:00:01.50"),
            Some(Duration::from_millis(1_500))
        );
        assert_eq!(parse_timestamp("02:03,004"), Some(Duration::from_millis(123_004)));
        assert_eq!(parse_timestamp("00:61:00,000"), None);
        assert_eq!(parse_timestamp("aa:bb:cc,ddd"), None);
        assert_eq!(parse_timestamp("00:00:00,1234"), None);
    }

    #[test]
    fn test_parse_timestamp_rejects_overflowing_hours() {
        assert_eq!(parse_timestamp("99999999999999999:00:00,000"), None);
        assert_eq!(parse_timestamp("18446744073709551615:00:00,000"), None);
        assert_eq!(
            parse_timestamp("1000:00:00,000"),
            Some(Duration::from_secs(3_600_000))
        );
    }
}
