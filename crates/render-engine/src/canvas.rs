//! Raster canvas and image encoding.

use std::io::Cursor;

use cueframe_common::{OutputFormat, RgbColor};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use tiff::encoder::compression::Lzw;
use tiff::encoder::{colortype, TiffEncoder};

use crate::font::{DrawError, GlyphFace};
use crate::layout::DrawInstruction;

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("TIFF encoding failed: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// A solid-filled RGB frame that text is drawn onto.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
    foreground: Rgb<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: RgbColor, foreground: RgbColor) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(background)),
            foreground: Rgb(foreground),
        }
    }

    /// Draw one laid-out line. Pixels falling outside the canvas are dropped.
    pub fn draw_line(
        &mut self,
        face: &dyn GlyphFace,
        line: &DrawInstruction,
    ) -> Result<(), DrawError> {
        face.draw(
            &mut self.image,
            &line.text,
            line.x as f32,
            line.y as f32,
            self.foreground,
        )
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// Encode a frame. TIFF output is LZW-compressed; PNG uses best compression.
pub fn encode_image(image: &RgbImage, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    match format {
        OutputFormat::Tiff => {
            let mut buf = Cursor::new(Vec::new());
            let mut encoder = TiffEncoder::new(&mut buf)?;
            encoder.write_image_with_compression::<colortype::RGB8, _>(
                width,
                height,
                Lzw::default(),
                image.as_raw(),
            )?;
            Ok(buf.into_inner())
        }
        OutputFormat::Png => {
            let mut buf = Vec::new();
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
            encoder.write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            Ok(buf)
        }
    }
}

/// Decode an encoded frame back to RGB pixels.
pub fn decode_artifact(bytes: &[u8]) -> Result<RgbImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::TofuFace;
    use crate::font::TextExtent;

    fn sample_canvas() -> Canvas {
        let mut canvas = Canvas::new(64, 32, [0, 0, 255], [255, 255, 255]);
        let line = DrawInstruction {
            text: "ab".to_string(),
            x: 10,
            y: 4,
            extent: TextExtent::default(),
        };
        canvas.draw_line(&TofuFace::new(16.0), &line).unwrap();
        canvas
    }

    #[test]
    fn test_new_canvas_is_filled() {
        let canvas = Canvas::new(4, 3, [0, 0, 255], [255, 255, 255]);
        assert_eq!(canvas.image().dimensions(), (4, 3));
        assert!(canvas.image().pixels().all(|p| *p == Rgb([0, 0, 255])));
    }

    #[test]
    fn test_tiff_is_lossless() {
        let canvas = sample_canvas();
        let bytes = encode_image(canvas.image(), OutputFormat::Tiff).unwrap();
        assert!(bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*"));
        assert_eq!(&decode_artifact(&bytes).unwrap(), canvas.image());
    }

    #[test]
    fn test_png_is_lossless() {
        let canvas = sample_canvas();
        let bytes = encode_image(canvas.image(), OutputFormat::Png).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
        assert_eq!(&decode_artifact(&bytes).unwrap(), canvas.image());
    }

    #[test]
    fn test_lines_outside_canvas_are_clipped() {
        let mut canvas = Canvas::new(20, 20, [0, 0, 0], [255, 255, 255]);
        let line = DrawInstruction {
            text: "abcdef".to_string(),
            x: -30,
            y: 15,
            extent: TextExtent::default(),
        };
        canvas.draw_line(&TofuFace::new(16.0), &line).unwrap();
        assert_eq!(canvas.image().dimensions(), (20, 20));
    }
}
