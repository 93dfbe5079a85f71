//! Video sink contract.
//!
//! A sink receives composed frames in strictly ascending order and is
//! closed exactly once per feed render, on success and on failure.

use std::path::PathBuf;

use crate::error::FeedResult;
use crate::frame::{FrameBuffer, FrameIndex};

/// Everything a sink needs to open its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSpec {
    /// Output file (or directory, for image-sequence sinks).
    pub path: PathBuf,
    /// Codec identifier, e.g. `MJPG`.
    pub codec: String,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    /// Replace an existing output instead of failing.
    pub overwrite: bool,
}

/// An open video output.
pub trait FrameSink: Send {
    /// Append one frame. `index` is the frame's position in the feed.
    fn write(&mut self, index: FrameIndex, frame: &FrameBuffer) -> FeedResult<()>;

    /// Flush and release the output. Calling it again is a no-op.
    fn close(&mut self) -> FeedResult<()>;
}

/// Opens sinks for feed renders.
pub trait SinkFactory: Sync {
    /// Fails with `FeedError::SinkOpen` when the codec is unknown or the
    /// output cannot be created.
    fn open(&self, spec: &SinkSpec) -> FeedResult<Box<dyn FrameSink>>;

    /// File extension (or directory suffix) used for `codec`'s output.
    fn container_extension(&self, codec: &str) -> FeedResult<&'static str>;
}
