//! Block placement on the canvas.
//!
//! A cue's lines form one block: each line is `font_size` tall, consecutive
//! lines are `line_spacing` apart, and the block is anchored to the bottom
//! margin or the vertical centre. Lines are centred horizontally on their
//! inked extent rather than their pen advance, so side bearings do not pull
//! text off centre.

use cueframe_common::{HorizontalAlign, MissingGlyphPolicy, RenderConfig, VerticalAnchor};
use cueframe_subtitle_model::Cue;

use crate::font::{is_invisible, GlyphFace, MeasureError, TextExtent};
use crate::shaping::ShapedLine;

/// Where one line is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    /// Visual-order text.
    pub text: String,
    /// Pen x.
    pub x: i32,
    /// Top of the line box.
    pub y: i32,
    pub extent: TextExtent,
}

/// Non-blank lines of a cue, capped at `max_lines` when set.
pub fn select_lines(cue: &Cue, max_lines: Option<usize>) -> Vec<&str> {
    let mut lines: Vec<&str> = cue.non_blank_lines().collect();
    if let Some(limit) = max_lines {
        if lines.len() > limit {
            tracing::debug!(
                cue = cue.index,
                lines = lines.len(),
                limit,
                "Dropping lines beyond max_lines"
            );
            lines.truncate(limit);
        }
    }
    lines
}

/// Block height in pixels for `count` lines.
pub fn block_height(count: usize, config: &RenderConfig) -> f32 {
    if count == 0 {
        return 0.0;
    }
    count as f32 * config.font_size + (count - 1) as f32 * config.line_spacing
}

/// Top edge of the block, never above the canvas.
pub fn block_top(count: usize, config: &RenderConfig) -> f32 {
    let height = config.height as f32;
    let block = block_height(count, config);
    let top = match config.anchor {
        VerticalAnchor::Bottom => height - block - config.bottom_margin,
        VerticalAnchor::Center => (height - block) / 2.0,
    };
    top.max(0.0)
}

/// Lay out shaped lines. On failure returns the zero-based line number
/// alongside the measurement error.
pub fn layout_block(
    lines: &[ShapedLine],
    face: &dyn GlyphFace,
    config: &RenderConfig,
) -> Result<Vec<DrawInstruction>, (usize, MeasureError)> {
    let mut extents = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if config.missing_glyphs == MissingGlyphPolicy::Fail {
            if let Some(ch) = line
                .visual
                .chars()
                .find(|&c| !c.is_whitespace() && !is_invisible(c) && !face.covers(c))
            {
                return Err((
                    i,
                    MeasureError::MissingGlyph {
                        ch,
                        face: face.name().to_string(),
                    },
                ));
            }
        }
        extents.push(face.measure(&line.visual).map_err(|e| (i, e))?);
    }

    let width = config.width as f32;
    let block_ink = extents
        .iter()
        .map(TextExtent::ink_width)
        .fold(0.0_f32, f32::max);
    let block_top = block_top(lines.len(), config);

    let bottom = block_top + block_height(lines.len(), config);
    if bottom > config.height as f32 {
        tracing::warn!(
            lines = lines.len(),
            block_bottom = bottom,
            canvas_height = config.height,
            "Text block is taller than the canvas and will be clipped"
        );
    }

    let instructions = lines
        .iter()
        .zip(extents)
        .enumerate()
        .map(|(i, (line, extent))| {
            if extent.ink_width() > width {
                tracing::warn!(
                    line = i,
                    ink_width = extent.ink_width(),
                    canvas_width = config.width,
                    "Line is wider than the canvas and will be clipped"
                );
            }
            let x = match config.align {
                HorizontalAlign::PerLine => (width - extent.ink_width()) / 2.0 - extent.ink_left,
                HorizontalAlign::SharedBlock => (width - block_ink) / 2.0 - extent.ink_left,
            };
            let y = block_top + i as f32 * config.line_height();
            DrawInstruction {
                text: line.visual.clone(),
                x: x.round() as i32,
                y: y.round() as i32,
                extent,
            }
        })
        .collect();

    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::TofuFace;
    use std::time::Duration;

    fn shaped(text: &str) -> ShapedLine {
        ShapedLine {
            visual: text.to_string(),
            rtl: false,
        }
    }

    fn config() -> RenderConfig {
        RenderConfig {
            width: 200,
            height: 100,
            font_size: 20.0,
            line_spacing: 5.0,
            bottom_margin: 10.0,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_single_line_bottom_anchor() {
        let face = TofuFace::new(20.0);
        let out = layout_block(&[shaped("abcd")], &face, &config()).unwrap();
        // 4 boxes of advance 12 -> ink 1..47, width 46.
        assert_eq!(out[0].x, 76);
        assert_eq!(out[0].y, 70);
    }

    #[test]
    fn test_multi_line_block_stacks_upwards() {
        let face = TofuFace::new(20.0);
        let out = layout_block(&[shaped("a"), shaped("b"), shaped("c")], &face, &config()).unwrap();
        // block 3*20 + 2*5 = 70, top = 100 - 70 - 10 = 20.
        let ys: Vec<i32> = out.iter().map(|d| d.y).collect();
        assert_eq!(ys, vec![20, 45, 70]);
    }

    #[test]
    fn test_center_anchor() {
        let face = TofuFace::new(20.0);
        let config = RenderConfig {
            anchor: VerticalAnchor::Center,
            ..config()
        };
        let out = layout_block(&[shaped("a")], &face, &config).unwrap();
        assert_eq!(out[0].y, 40);
    }

    #[test]
    fn test_tall_block_is_clamped_to_top() {
        let face = TofuFace::new(20.0);
        let lines: Vec<ShapedLine> = (0..6).map(|_| shaped("x")).collect();
        let out = layout_block(&lines, &face, &config()).unwrap();
        assert_eq!(out[0].y, 0);
        assert_eq!(out[5].y, 125);
    }

    #[test]
    fn test_shared_block_alignment() {
        let face = TofuFace::new(20.0);
        let config = RenderConfig {
            align: HorizontalAlign::SharedBlock,
            ..config()
        };
        let out = layout_block(&[shaped("abcd"), shaped("ab")], &face, &config).unwrap();
        // Widest ink is 46 px, so every line's ink starts at (200 - 46) / 2.
        assert_eq!(out[0].x + 1, 77);
        assert_eq!(out[1].x + 1, 77);
    }

    #[test]
    fn test_missing_glyph_policy_fail() {
        let face = TofuFace::new(20.0);
        let config = RenderConfig {
            missing_glyphs: MissingGlyphPolicy::Fail,
            ..config()
        };
        let err = layout_block(&[shaped("ok"), shaped("a\u{7}")], &face, &config).unwrap_err();
        assert_eq!(err.0, 1);
        assert!(matches!(err.1, MeasureError::MissingGlyph { ch: '\u{7}', .. }));
    }

    #[test]
    fn test_select_lines_drops_blank_and_caps() {
        let cue = Cue {
            index: 3,
            start: Duration::ZERO,
            end: Duration::from_secs(1),
            lines: vec!["one".into(), "   ".into(), "two".into(), "three".into()],
        };
        assert_eq!(select_lines(&cue, None), vec!["one", "two", "three"]);
        assert_eq!(select_lines(&cue, Some(2)), vec!["one", "two"]);
    }

    proptest::proptest! {
        #[test]
        fn centred_ink_has_balanced_gaps(text in "[a-zA-Z\u{0621}-\u{064A}][a-zA-Z\u{0621}-\u{064A} ]{0,20}") {
            let face = TofuFace::new(20.0);
            let config = RenderConfig { width: 720, ..config() };
            let out = layout_block(&[shaped(&text)], &face, &config).unwrap();
            let line = &out[0];
            let left = line.x as f32 + line.extent.ink_left;
            let right = config.width as f32 - (line.x as f32 + line.extent.ink_right);
            proptest::prop_assert!((left - right).abs() <= 1.0, "gaps {} / {}", left, right);
        }
    }
}
