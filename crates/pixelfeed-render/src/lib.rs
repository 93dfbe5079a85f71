//! # pixelfeed-render
//!
//! Turns a [`RenderPlan`](pixelfeed_core::RenderPlan) into frames: a seeded
//! noise grid scrolled across the frame with one slice of the pixel
//! counter drawn on top, written feed by feed into video sinks.

pub mod compose;
pub mod feed;
pub mod noise;
pub mod pipeline;
pub mod text;

pub use compose::FrameComposer;
pub use feed::{FeedReport, FeedRenderer};
pub use noise::NoiseGrid;
pub use pipeline::{FeedOutcome, Orchestrator};
pub use text::{FontPainter, TextPainter};
