//! # pixelfeed-encode
//!
//! Concrete video sinks. Frames are streamed into ffmpeg as they are
//! composed, or written out as a numbered PNG sequence.

pub mod codec;
pub mod ffmpeg;
pub mod png_seq;

use std::path::Path;

use pixelfeed_core::{FeedError, FeedResult, FrameSink, SinkFactory, SinkSpec};

pub use codec::Codec;
pub use ffmpeg::FfmpegSink;
pub use png_seq::PngSequenceSink;

/// Clear a previous render so none of its frames outlive the new one.
fn remove_output(path: &Path) -> FeedResult<()> {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|e| {
        FeedError::SinkOpen(format!(
            "failed to replace existing output '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Opens the sink matching a spec's codec identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncoderFactory;

impl EncoderFactory {
    fn codec(id: &str) -> FeedResult<Codec> {
        id.parse::<Codec>()
            .map_err(|e| FeedError::SinkOpen(e.to_string()))
    }
}

impl SinkFactory for EncoderFactory {
    fn open(&self, spec: &SinkSpec) -> FeedResult<Box<dyn FrameSink>> {
        let codec = Self::codec(&spec.codec)?;

        if spec.path.exists() {
            if !spec.overwrite {
                return Err(FeedError::SinkOpen(format!(
                    "output '{}' already exists",
                    spec.path.display()
                )));
            }
            remove_output(&spec.path)?;
        }

        if let Some(parent) = spec.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FeedError::SinkOpen(format!(
                    "failed to create output directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        if codec.uses_ffmpeg() {
            Ok(Box::new(FfmpegSink::open(spec, codec)?))
        } else {
            Ok(Box::new(PngSequenceSink::open(spec)?))
        }
    }

    fn container_extension(&self, codec: &str) -> FeedResult<&'static str> {
        Ok(Self::codec(codec)?.extension())
    }
}
