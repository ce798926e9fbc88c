//! List the cues parsed from a subtitle file.

use std::path::PathBuf;
use std::time::Duration;

use cueframe_subtitle_model::{decode_document, parse_document, SubtitleFormat};

pub fn run(input: PathBuf) -> anyhow::Result<()> {
    let bytes = std::fs::read(&input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?;
    let text = decode_document(&bytes).map_err(|e| anyhow::anyhow!("{e}"))?;

    let file_name = input.file_name().and_then(|n| n.to_str());
    let format = SubtitleFormat::detect(file_name, text);
    let cues = parse_document(text, format).map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("File: {}", input.display());
    println!("  Format: {format}");
    println!("  Cues: {}", cues.len());
    println!();

    for cue in &cues {
        let marker = if cue.is_blank() { "  (blank, will be skipped)" } else { "" };
        println!(
            "#{:<4} {} --> {}{marker}",
            cue.index,
            format_timestamp(cue.start),
            format_timestamp(cue.end)
        );
        for line in &cue.lines {
            println!("      {line}");
        }
    }

    Ok(())
}

/// `HH:MM:SS,mmm`, as written in SRT files.
fn format_timestamp(t: Duration) -> String {
    let total_ms = t.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}
