//! Multi-feed orchestration.

use rayon::prelude::*;

use pixelfeed_core::{FeedIndex, FeedResult, RenderPlan, SinkFactory};

use crate::feed::{FeedReport, FeedRenderer};
use crate::text::TextPainter;

/// Result of one feed inside a multi-feed run.
#[derive(Debug)]
pub struct FeedOutcome {
    pub feed: FeedIndex,
    pub result: FeedResult<FeedReport>,
}

/// Renders every feed of a plan. Feeds share only the immutable plan, so a
/// failing feed never affects the others.
pub struct Orchestrator<'a> {
    plan: &'a RenderPlan,
    painter: &'a dyn TextPainter,
    sinks: &'a dyn SinkFactory,
}

impl<'a> Orchestrator<'a> {
    pub fn new(plan: &'a RenderPlan, painter: &'a dyn TextPainter, sinks: &'a dyn SinkFactory) -> Self {
        Self {
            plan,
            painter,
            sinks,
        }
    }

    /// Render all planned feeds, in parallel when the plan asks for it.
    /// Outcomes come back in the plan's feed order.
    pub fn run(&self) -> Vec<FeedOutcome> {
        tracing::info!(
            "Rendering {} feed(s): {} frames of {}x{} @ {}fps, {} pixels per frame",
            self.plan.feeds.len(),
            self.plan.total_frames,
            self.plan.config.width,
            self.plan.config.height,
            self.plan.config.fps,
            self.plan.pixels_per_frame
        );

        let renderer = FeedRenderer::new(self.plan, self.painter, self.sinks);
        let render_one = |&feed: &FeedIndex| {
            let result = renderer.render(feed);
            if let Err(e) = &result {
                tracing::error!("Video {} failed: {}", feed, e);
            }
            FeedOutcome { feed, result }
        };

        if self.plan.config.parallel {
            self.plan.feeds.par_iter().map(render_one).collect()
        } else {
            self.plan.feeds.iter().map(render_one).collect()
        }
    }
}
