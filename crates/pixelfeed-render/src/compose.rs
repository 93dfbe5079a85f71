//! Frame composition: scrolled noise plus the feed's counter digits.

use pixelfeed_core::{FeedIndex, FeedResult, FrameBuffer, FrameIndex, RenderPlan};

use crate::noise::NoiseGrid;
use crate::text::TextPainter;

/// Horizontal noise shift for `frame`: `floor(-frame / roll_factor)`.
pub fn roll_offset(frame: FrameIndex, roll_factor: u64) -> i64 {
    // Both fit in i64 for any frame count the counter can express.
    (-(frame as i64)).div_euclid(roll_factor.max(1) as i64)
}

/// Nearest-neighbor resample of `grid` to `width` x `height`.
pub fn upsample_nearest(grid: &NoiseGrid, width: u32, height: u32) -> FrameBuffer {
    let mut fb = FrameBuffer::new(width, height);
    let columns: Vec<usize> = (0..width as u64)
        .map(|x| (x * grid.width() as u64 / width as u64) as usize * 3)
        .collect();
    let stride = width as usize * 3;

    let mut previous: Option<u32> = None;
    for y in 0..height {
        let gy = (y as u64 * grid.height() as u64 / height as u64) as u32;
        let row_start = y as usize * stride;
        if previous == Some(gy) {
            let (done, rest) = fb.data.split_at_mut(row_start);
            rest[..stride].copy_from_slice(&done[row_start - stride..]);
            continue;
        }
        let src = grid.row(gy);
        let dst = &mut fb.data[row_start..row_start + stride];
        for (px, &sx) in dst.chunks_exact_mut(3).zip(&columns) {
            px.copy_from_slice(&src[sx..sx + 3]);
        }
        previous = Some(gy);
    }
    fb
}

/// Builds full-resolution frames for one render plan.
pub struct FrameComposer<'a> {
    plan: &'a RenderPlan,
    painter: &'a dyn TextPainter,
}

impl<'a> FrameComposer<'a> {
    pub fn new(plan: &'a RenderPlan, painter: &'a dyn TextPainter) -> Self {
        Self { plan, painter }
    }

    /// Compose frame `frame` of feed `feed`. The result depends only on the
    /// arguments and the plan.
    pub fn compose(&self, frame: FrameIndex, feed: FeedIndex, grid: &NoiseGrid) -> FeedResult<FrameBuffer> {
        let digits = self.plan.digits(frame, feed)?;
        let shifted = grid.rolled(roll_offset(frame, self.plan.config.roll_factor));
        let mut fb = upsample_nearest(&shifted, self.plan.config.width, self.plan.config.height);
        self.painter
            .draw_text(&mut fb, (0, 0), &digits, self.plan.config.text_color);
        Ok(fb)
    }
}
