use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use pixelfeed_core::{FeedError, FeedResult, FrameBuffer, FrameIndex, FrameSink, SinkSpec};

/// Writes every frame as `frame-NNNNNN.png` inside one directory.
/// Lossless and needs no external tools.
pub struct PngSequenceSink {
    dir: PathBuf,
    width: u32,
    height: u32,
    written: u64,
    closed: bool,
}

impl PngSequenceSink {
    pub fn open(spec: &SinkSpec) -> FeedResult<Self> {
        std::fs::create_dir_all(&spec.path).map_err(|e| {
            FeedError::SinkOpen(format!(
                "failed to create frame directory {}: {}",
                spec.path.display(),
                e
            ))
        })?;
        Ok(Self {
            dir: spec.path.clone(),
            width: spec.width,
            height: spec.height,
            written: 0,
            closed: false,
        })
    }

    /// File name used for frame `index`.
    pub fn frame_path(dir: &Path, index: FrameIndex) -> PathBuf {
        dir.join(format!("frame-{:06}.png", index))
    }

    fn encode(&self, path: &Path, frame: &FrameBuffer) -> Result<(), String> {
        let file = File::create(path).map_err(|e| format!("failed to create PNG file: {}", e))?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width, frame.height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| format!("failed to write PNG header: {}", e))?;
        writer
            .write_image_data(&frame.data)
            .map_err(|e| format!("failed to write PNG data: {}", e))?;
        writer
            .finish()
            .map_err(|e| format!("failed to finalize PNG: {}", e))
    }
}

impl FrameSink for PngSequenceSink {
    fn write(&mut self, index: FrameIndex, frame: &FrameBuffer) -> FeedResult<()> {
        if self.closed {
            return Err(FeedError::sink_write(index, "PNG sequence sink is already closed"));
        }
        if frame.width != self.width || frame.height != self.height {
            return Err(FeedError::sink_write(
                index,
                format!(
                    "frame has dimensions {}x{}, expected {}x{}",
                    frame.width, frame.height, self.width, self.height
                ),
            ));
        }
        let path = Self::frame_path(&self.dir, index);
        self.encode(&path, frame)
            .map_err(|e| FeedError::sink_write(index, e))?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> FeedResult<()> {
        if !self.closed {
            self.closed = true;
            tracing::debug!("wrote {} PNG frames to {}", self.written, self.dir.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(dir: PathBuf) -> SinkSpec {
        SinkSpec {
            path: dir,
            codec: "PNG".into(),
            fps: 24,
            width: 4,
            height: 4,
            overwrite: true,
        }
    }

    #[test]
    fn test_png_sequence_writes_numbered_frames() {
        let dir = std::env::temp_dir().join("pixelfeed_test_png_seq");
        let _ = std::fs::remove_dir_all(&dir);
        let mut sink = PngSequenceSink::open(&spec(dir.clone())).unwrap();
        for i in 0..3u64 {
            let mut fb = FrameBuffer::new(4, 4);
            fb.data.fill((i * 60) as u8);
            sink.write(i, &fb).unwrap();
        }
        sink.close().unwrap();

        for i in 0..3 {
            let meta = std::fs::metadata(PngSequenceSink::frame_path(&dir, i)).unwrap();
            assert!(meta.len() > 0);
        }
        assert!(sink.write(3, &FrameBuffer::new(4, 4)).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_png_sequence_rejects_wrong_size() {
        let dir = std::env::temp_dir().join("pixelfeed_test_png_size");
        let mut sink = PngSequenceSink::open(&spec(dir.clone())).unwrap();
        let result = sink.write(0, &FrameBuffer::new(8, 4));
        assert!(matches!(result, Err(FeedError::SinkWrite { frame: 0, .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
