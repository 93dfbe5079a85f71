//! Per-feed render loop.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use pixelfeed_core::counter;
use pixelfeed_core::hash::{ContentHash, FrameStreamHasher};
use pixelfeed_core::{
    FeedIndex, FeedResult, FrameBuffer, FrameIndex, FrameSink, RenderPlan, SinkFactory, SinkSpec,
};

use crate::compose::FrameComposer;
use crate::noise::{self, NoiseGrid};
use crate::text::TextPainter;

/// Summary of one finished feed render.
#[derive(Debug, Clone)]
pub struct FeedReport {
    pub feed: FeedIndex,
    pub output: PathBuf,
    pub frames_written: u64,
    pub elapsed: Duration,
    /// Digest over every written frame, in write order.
    pub content_hash: ContentHash,
}

/// Keeps a sink closed on every exit path: `finish` closes it and reports
/// errors, dropping it unfinished closes it best-effort.
struct OpenSink {
    sink: Box<dyn FrameSink>,
    closed: bool,
}

impl OpenSink {
    fn finish(mut self) -> FeedResult<()> {
        self.closed = true;
        self.sink.close()
    }
}

impl Drop for OpenSink {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.sink.close() {
                tracing::warn!("failed to close sink after error: {}", e);
            }
        }
    }
}

/// Renders feeds of one plan into sinks from `sinks`.
pub struct FeedRenderer<'a> {
    plan: &'a RenderPlan,
    painter: &'a dyn TextPainter,
    sinks: &'a dyn SinkFactory,
}

impl<'a> FeedRenderer<'a> {
    pub fn new(plan: &'a RenderPlan, painter: &'a dyn TextPainter, sinks: &'a dyn SinkFactory) -> Self {
        Self {
            plan,
            painter,
            sinks,
        }
    }

    fn noise_grid(&self) -> FeedResult<NoiseGrid> {
        let config = &self.plan.config;
        noise::generate(
            config.width,
            config.height,
            config.seed,
            config.downsample,
            config.noise_levels,
        )
    }

    /// Where `feed`'s output goes for the plan's codec.
    pub fn output_path(&self, feed: FeedIndex) -> FeedResult<PathBuf> {
        let extension = self.sinks.container_extension(&self.plan.config.codec)?;
        Ok(self.plan.output_path(feed, extension))
    }

    /// Compose a single frame without opening a sink.
    pub fn compose_frame(&self, feed: FeedIndex, frame: FrameIndex) -> FeedResult<FrameBuffer> {
        counter::check_feed(feed)?;
        let grid = self.noise_grid()?;
        FrameComposer::new(self.plan, self.painter).compose(frame, feed, &grid)
    }

    /// Render every frame of `feed` in ascending order into a fresh sink.
    pub fn render(&self, feed: FeedIndex) -> FeedResult<FeedReport> {
        let clock = Instant::now();
        let config = &self.plan.config;
        counter::check_feed(feed)?;

        let spec = SinkSpec {
            path: self.output_path(feed)?,
            codec: config.codec.clone(),
            fps: config.fps,
            width: config.width,
            height: config.height,
            overwrite: config.overwrite,
        };
        let mut sink = OpenSink {
            sink: self.sinks.open(&spec)?,
            closed: false,
        };
        tracing::info!("Video {}, writing {}", feed, spec.path.display());

        let grid = self.noise_grid()?;
        let composer = FrameComposer::new(self.plan, self.painter);
        let mut hasher = FrameStreamHasher::new();
        let frames = self.plan.frame_range();
        let (start, stop) = (frames.start, frames.end);

        for frame in frames {
            let data = composer.compose(frame, feed, &grid)?;
            sink.sink.write(frame, &data)?;
            hasher.update(&data);

            let interval = config.log_interval;
            if interval > 0 && frame % interval == interval - 1 {
                tracing::info!(
                    "Video {}, rendered frames {}-{}/{}.",
                    feed,
                    start + 1,
                    frame + 1,
                    stop
                );
            }
        }

        sink.finish()?;
        let elapsed = clock.elapsed();
        tracing::info!("Finished feed {} in {:.2} seconds.", feed, elapsed.as_secs_f64());

        Ok(FeedReport {
            feed,
            output: spec.path,
            frames_written: hasher.frames(),
            elapsed,
            content_hash: hasher.finish(),
        })
    }
}
