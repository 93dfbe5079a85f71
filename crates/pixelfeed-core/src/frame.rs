/// Zero-based index of a frame within one feed render.
pub type FrameIndex = u64;

/// Bytes per pixel of every frame buffer (packed 8-bit RGB).
pub const BYTES_PER_PIXEL: usize = 3;

/// A single video frame as a raw, row-major, packed RGB buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with zeros.
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        Self {
            data: vec![0u8; size],
            width,
            height,
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * BYTES_PER_PIXEL
    }

    /// Get the RGB value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        Some([self.data[offset], self.data[offset + 1], self.data[offset + 2]])
    }

    /// Set the RGB value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = self.offset(x, y);
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgb);
    }

    /// Blend `rgb` at opacity `alpha` over the pixel at (x, y).
    /// No-op if out of bounds.
    pub fn blend_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3], alpha: u8) {
        if x >= self.width || y >= self.height || alpha == 0 {
            return;
        }
        let offset = self.offset(x, y);
        if alpha == 255 {
            self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgb);
            return;
        }
        let sa = alpha as u32;
        let inv = 255 - sa;
        for c in 0..BYTES_PER_PIXEL {
            let d = self.data[offset + c] as u32;
            let s = rgb[c] as u32;
            self.data[offset + c] = ((s * sa + d * inv + 127) / 255) as u8;
        }
    }
}
