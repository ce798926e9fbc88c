//! SubStation Alpha (`.ssa` / `.ass`) event parser.
//!
//! Only the `[Events]` section matters here. Styles, fonts and positioning
//! are ignored; every `Dialogue:` line becomes one cue in file order.

use crate::cue::{parse_timestamp, strip_markup, Cue, ParseError};

const DEFAULT_FORMAT: [&str; 10] = [
    "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
];

struct EventFormat {
    fields: Vec<String>,
    start: Option<usize>,
    end: Option<usize>,
    text: usize,
}

impl EventFormat {
    fn new(fields: Vec<String>, line: usize) -> Result<Self, ParseError> {
        let position = |name: &str| fields.iter().position(|f| f == name);
        let text = position("text").ok_or(ParseError::MissingTextField { line })?;
        Ok(Self {
            start: position("start"),
            end: position("end"),
            text,
            fields,
        })
    }

    fn default_format() -> Self {
        let fields: Vec<String> = DEFAULT_FORMAT.iter().map(|f| f.to_string()).collect();
        Self {
            start: Some(1),
            end: Some(2),
            text: 9,
            fields,
        }
    }
}

/// Parse an ASS/SSA document.
pub fn parse_ass(text: &str) -> Result<Vec<Cue>, ParseError> {
    let mut in_events = false;
    let mut saw_events = false;
    let mut format: Option<EventFormat> = None;
    let mut cues = Vec::new();

    for (n, raw) in text.lines().enumerate() {
        let line_no = n + 1;
        let line = raw.trim();

        if line.starts_with('[') && line.ends_with(']') {
            in_events = line.eq_ignore_ascii_case("[events]");
            saw_events |= in_events;
            continue;
        }
        if !in_events {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "format" => {
                let fields = value
                    .split(',')
                    .map(|f| f.trim().to_ascii_lowercase())
                    .collect();
                format = Some(EventFormat::new(fields, line_no)?);
            }
            "dialogue" => {
                let format = format.get_or_insert_with(EventFormat::default_format);
                cues.push(parse_dialogue(value, format, line_no, cues.len() + 1)?);
            }
            _ => {}
        }
    }

    if !saw_events {
        return Err(ParseError::MissingEvents);
    }
    Ok(cues)
}

fn parse_dialogue(
    value: &str,
    format: &EventFormat,
    line: usize,
    index: usize,
) -> Result<Cue, ParseError> {
    let expected = format.fields.len();
    // The text field may itself contain commas, so split no further than it.
    let parts: Vec<&str> = value.trim_start().splitn(format.text + 1, ',').collect();
    if parts.len() <= format.text {
        return Err(ParseError::MalformedDialogue {
            line,
            found: parts.len(),
            expected,
        });
    }

    let timestamp = |slot: Option<usize>| -> Result<std::time::Duration, ParseError> {
        let Some(i) = slot else {
            return Ok(std::time::Duration::ZERO);
        };
        // A timing column listed after Text is swallowed by the text split.
        let raw = parts.get(i).ok_or(ParseError::MalformedDialogue {
            line,
            found: parts.len(),
            expected,
        })?;
        parse_timestamp(raw).ok_or_else(|| ParseError::InvalidTiming {
            line,
            found: raw.trim().to_string(),
        })
    };

    Ok(Cue {
        index,
        start: timestamp(format.start)?,
        end: timestamp(format.end)?,
        lines: split_event_text(parts[format.text]),
    })
}

/// Turn ASS event text into plain lines.
fn split_event_text(text: &str) -> Vec<String> {
    let plain = strip_markup(text).replace("\\h", " ");
    plain
        .split("\\N")
        .flat_map(|part| part.split("\\n"))
        .map(|part| part.trim_end().to_string())
        .collect()
}
