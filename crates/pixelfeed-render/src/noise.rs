//! Seeded noise field.
//!
//! The grid is generated once per feed from an explicit generator seeded
//! per call; identical inputs always give identical grids.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use pixelfeed_core::{FeedError, FeedResult};

/// A small grid of RGB cells, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseGrid {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl NoiseGrid {
    /// Wrap raw RGB cells.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> FeedResult<Self> {
        if width == 0 || height == 0 || data.len() != (width as usize) * (height as usize) * 3 {
            return Err(FeedError::config(format!(
                "noise grid {}x{} needs {} bytes, got {}",
                width,
                height,
                (width as usize) * (height as usize) * 3,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// One row of cells as packed RGB bytes.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 3;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Circularly shift columns by `offset`; positive moves cells right.
    /// Cells pushed past one edge come back on the other.
    pub fn rolled(&self, offset: i64) -> NoiseGrid {
        let width = self.width as i64;
        let shift = offset.rem_euclid(width) as usize;
        if shift == 0 {
            return self.clone();
        }
        let stride = self.width as usize * 3;
        let split = (self.width as usize - shift) * 3;
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.data.chunks_exact(stride) {
            data.extend_from_slice(&row[split..]);
            data.extend_from_slice(&row[..split]);
        }
        NoiseGrid {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Generate a `(frame_width / downsample) x (frame_height / downsample)`
/// grid with each channel drawn uniformly from `levels` evenly spaced values.
pub fn generate(
    frame_width: u32,
    frame_height: u32,
    seed: u64,
    downsample: u32,
    levels: u16,
) -> FeedResult<NoiseGrid> {
    if downsample == 0 {
        return Err(FeedError::config("downsample must be non-zero"));
    }
    if !(2..=256).contains(&levels) {
        return Err(FeedError::config(format!("noise levels {} must be within 2..=256", levels)));
    }
    let width = frame_width / downsample;
    let height = frame_height / downsample;
    if width == 0 || height == 0 {
        return Err(FeedError::config(format!(
            "downsample {} leaves no noise cells for a {}x{} frame",
            downsample, frame_width, frame_height
        )));
    }

    let step = 256 / levels;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let data = (0..(width as usize) * (height as usize) * 3)
        .map(|_| (rng.gen_range(0..levels) * step) as u8)
        .collect();

    tracing::debug!(width, height, seed, levels, "generated noise grid");
    Ok(NoiseGrid { width, height, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate(64, 32, 42, 4, 256).unwrap();
        let b = generate(64, 32, 42, 4, 256).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_depends_on_seed() {
        let a = generate(64, 32, 42, 4, 256).unwrap();
        let b = generate(64, 32, 43, 4, 256).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_shape() {
        let grid = generate(1920, 1080, 1, 8, 256).unwrap();
        assert_eq!((grid.width(), grid.height()), (240, 135));
        assert_eq!(grid.as_bytes().len(), 240 * 135 * 3);
    }

    #[test]
    fn test_quantized_levels() {
        let grid = generate(64, 64, 7, 1, 8).unwrap();
        assert!(grid.as_bytes().iter().all(|v| v % 32 == 0));
        assert!(grid.as_bytes().iter().any(|&v| v == 224));
    }

    #[test]
    fn test_generate_rejects_empty_grid() {
        assert!(generate(4, 4, 0, 8, 256).is_err());
        assert!(generate(4, 4, 0, 0, 256).is_err());
        assert!(generate(4, 4, 0, 1, 1).is_err());
    }

    #[test]
    fn test_roll_full_cycle_is_identity() {
        let grid = generate(40, 20, 3, 2, 256).unwrap();
        assert_eq!(grid.rolled(grid.width() as i64), grid);
        assert_eq!(grid.rolled(-(grid.width() as i64) * 3), grid);
    }

    #[test]
    fn test_roll_wraps_both_directions() {
        let grid = NoiseGrid::from_raw(3, 1, vec![1, 1, 1, 2, 2, 2, 3, 3, 3]).unwrap();
        assert_eq!(grid.rolled(1).as_bytes(), &[3, 3, 3, 1, 1, 1, 2, 2, 2]);
        assert_eq!(grid.rolled(-1).as_bytes(), &[2, 2, 2, 3, 3, 3, 1, 1, 1]);
    }
}
