//! Text rendering module.
//! Uses fontdue for CPU-based font rasterization.

use std::collections::HashMap;
use std::path::Path;

use fontdue::{Font, FontSettings, Metrics};
use pixelfeed_core::{Color, FeedError, FeedResult, FrameBuffer};

/// Draws a single line of text into a frame buffer.
pub trait TextPainter: Sync {
    /// Draw `text` with its top-left corner at `position`, blending `color`
    /// over the existing pixels. Glyphs falling outside the buffer are clipped.
    fn draw_text(&self, buffer: &mut FrameBuffer, position: (i32, i32), text: &str, color: Color);
}

/// Glyphs pre-rasterized at load time; the counter only ever draws digits.
const PRELOADED_GLYPHS: &str = "0123456789";

/// Font-backed painter at a fixed pixel size.
pub struct FontPainter {
    font: Font,
    pixel_size: f32,
    ascent: i32,
    glyphs: HashMap<char, (Metrics, Vec<u8>)>,
}

impl FontPainter {
    /// Load a TrueType/OpenType font from a file path.
    pub fn load(path: &Path, pixel_size: f32) -> FeedResult<Self> {
        let data = std::fs::read(path).map_err(|e| {
            FeedError::font_load(format!("failed to read font file: {}", e), path)
        })?;
        Self::from_bytes(&data, pixel_size).map_err(|e| match e {
            FeedError::FontLoad { message, .. } => FeedError::font_load(message, path),
            other => other,
        })
    }

    /// Parse a font from memory.
    pub fn from_bytes(data: &[u8], pixel_size: f32) -> FeedResult<Self> {
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(FeedError::config(format!("invalid font pixel size {}", pixel_size)));
        }
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| FeedError::font_load(format!("failed to parse font: {}", e), "<memory>"))?;

        let ascent = match font.horizontal_line_metrics(pixel_size) {
            Some(line) => line.ascent.ceil() as i32,
            None => pixel_size.ceil() as i32,
        };

        let glyphs = PRELOADED_GLYPHS
            .chars()
            .map(|ch| (ch, font.rasterize(ch, pixel_size)))
            .collect();

        tracing::debug!(pixel_size, ascent, "loaded font");
        Ok(Self {
            font,
            pixel_size,
            ascent,
            glyphs,
        })
    }

    fn with_glyph<R>(&self, ch: char, f: impl FnOnce(&Metrics, &[u8]) -> R) -> R {
        match self.glyphs.get(&ch) {
            Some((metrics, bitmap)) => f(metrics, bitmap),
            None => {
                let (metrics, bitmap) = self.font.rasterize(ch, self.pixel_size);
                f(&metrics, &bitmap)
            }
        }
    }
}

impl TextPainter for FontPainter {
    fn draw_text(&self, buffer: &mut FrameBuffer, position: (i32, i32), text: &str, color: Color) {
        let (x0, y0) = position;
        let mut cursor_x = x0;

        for ch in text.chars() {
            let advance = self.with_glyph(ch, |metrics, bitmap| {
                let glyph_x = cursor_x + metrics.xmin;
                let glyph_y = y0 + self.ascent - (metrics.height as i32 + metrics.ymin);

                for gy in 0..metrics.height {
                    let py = glyph_y + gy as i32;
                    if py < 0 || py >= buffer.height as i32 {
                        continue;
                    }
                    for gx in 0..metrics.width {
                        let px = glyph_x + gx as i32;
                        if px < 0 || px >= buffer.width as i32 {
                            continue;
                        }
                        let coverage = bitmap[gy * metrics.width + gx];
                        paint_coverage(buffer, px as u32, py as u32, color, coverage);
                    }
                }
                metrics.advance_width
            });
            cursor_x += advance.round() as i32;
        }
    }
}

/// Paint one glyph sample. Full coverage of an opaque color writes the
/// color exactly; partial coverage and color alpha scale the blend.
fn paint_coverage(buffer: &mut FrameBuffer, x: u32, y: u32, color: Color, coverage: u8) {
    let alpha = ((coverage as u32 * color.a as u32 + 127) / 255) as u8;
    buffer.blend_pixel(x, y, color.rgb8(), alpha);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_coverage_writes_text_color() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.data.copy_from_slice(&[200, 150, 100, 37, 91, 250]);
        paint_coverage(&mut fb, 0, 0, Color::BLACK, 255);
        paint_coverage(&mut fb, 1, 0, Color::rgb(10, 20, 30), 255);
        assert_eq!(fb.get_pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(fb.get_pixel(1, 0), Some([10, 20, 30]));
    }

    #[test]
    fn test_partial_coverage_antialiases() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.data.fill(255);
        paint_coverage(&mut fb, 0, 0, Color::BLACK, 0);
        paint_coverage(&mut fb, 1, 0, Color::BLACK, 128);
        assert_eq!(fb.get_pixel(0, 0), Some([255, 255, 255]));
        assert_eq!(fb.get_pixel(1, 0), Some([127, 127, 127]));
    }

    #[test]
    fn test_translucent_color_is_opt_in() {
        let mut fb = FrameBuffer::new(1, 1);
        fb.data.fill(255);
        paint_coverage(&mut fb, 0, 0, Color::rgba(0, 0, 0, 127), 255);
        assert_eq!(fb.get_pixel(0, 0), Some([128, 128, 128]));
    }

    #[test]
    fn test_load_missing_font_is_font_load_error() {
        let result = FontPainter::load(Path::new("/nonexistent/font.ttf"), 24.0);
        assert!(matches!(result, Err(FeedError::FontLoad { .. })));
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let result = FontPainter::from_bytes(b"definitely not a font", 24.0);
        assert!(matches!(result, Err(FeedError::FontLoad { .. })));
    }

    #[test]
    fn test_invalid_pixel_size_is_rejected() {
        assert!(matches!(
            FontPainter::from_bytes(&[], 0.0),
            Err(FeedError::Config(_))
        ));
    }
}
