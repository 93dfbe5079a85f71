//! # pixelfeed-core
//!
//! Core types shared by every Pixelfeed crate: frames, colors, errors,
//! configuration, content hashing, the video-sink contract, and the
//! counter arithmetic that splits the pixel count across feeds.

pub mod color;
pub mod config;
pub mod counter;
pub mod error;
pub mod frame;
pub mod hash;
pub mod sink;

pub use color::Color;
pub use config::{RenderConfig, RenderPlan};
pub use counter::FeedIndex;
pub use error::{FeedError, FeedResult};
pub use frame::{FrameBuffer, FrameIndex};
pub use hash::ContentHash;
pub use sink::{FrameSink, SinkFactory, SinkSpec};
