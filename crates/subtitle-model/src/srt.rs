//! SubRip (`.srt`) parser.
//!
//! A document is a sequence of blocks separated by blank lines:
//!
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! First line
//! Second line
//! ```
//!
//! Cues get their index from their position, not from the number in the
//! file, so renumbered or sloppy files still produce stable artifact names.

use std::time::Duration;

use crate::cue::{parse_timestamp, strip_markup, Cue, ParseError};

/// Parse an SRT document.
pub fn parse_srt(text: &str) -> Result<Vec<Cue>, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut cues = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim().is_empty() {
            i += 1;
            continue;
        }

        let number_line = i + 1;
        let number = lines[i].trim();
        if !is_cue_number(number) {
            return Err(ParseError::InvalidIndex {
                line: number_line,
                found: number.to_string(),
            });
        }
        i += 1;

        let Some(timing) = lines.get(i) else {
            return Err(ParseError::MissingTiming { line: number_line });
        };
        let (start, end) = parse_timing(timing).ok_or_else(|| {
            if timing.trim().is_empty() {
                ParseError::MissingTiming { line: number_line }
            } else {
                ParseError::InvalidTiming {
                    line: i + 1,
                    found: timing.trim().to_string(),
                }
            }
        })?;
        i += 1;

        let mut body = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            // Some files omit the blank separator before the next block.
            if starts_block(&lines, i) {
                break;
            }
            body.push(strip_markup(lines[i].trim_end()));
            i += 1;
        }

        let index = cues.len() + 1;
        if number.parse::<usize>().ok() != Some(index) {
            tracing::debug!(index, number, "SRT cue number does not match its position");
        }

        cues.push(Cue {
            index,
            start,
            end,
            lines: body,
        });
    }

    Ok(cues)
}

fn is_cue_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn starts_block(lines: &[&str], i: usize) -> bool {
    is_cue_number(lines[i].trim())
        && lines
            .get(i + 1)
            .is_some_and(|next| parse_timing(next).is_some())
}

/// Parse `start --> end`, ignoring any trailing position coordinates.
fn parse_timing(line: &str) -> Option<(Duration, Duration)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    Some((start, end))
}
