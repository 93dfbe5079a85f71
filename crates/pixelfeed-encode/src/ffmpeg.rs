use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use pixelfeed_core::{FeedError, FeedResult, FrameBuffer, FrameIndex, FrameSink, SinkSpec};

use crate::codec::Codec;

/// Check if FFmpeg is available on the system.
pub fn is_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Streams raw RGB frames into an `ffmpeg` child process.
///
/// Frames are piped to stdin as `rgb24` rawvideo as soon as they are
/// written, so nothing is buffered beyond the pipe itself.
pub struct FfmpegSink {
    codec: Codec,
    width: u32,
    height: u32,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    /// Reads ffmpeg's stderr so the pipe never fills while frames are written.
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl FfmpegSink {
    /// Spawn ffmpeg writing `spec.path`. Fails with `SinkOpen` if ffmpeg is
    /// missing or refuses to start.
    pub fn open(spec: &SinkSpec, codec: Codec) -> FeedResult<Self> {
        if codec == Codec::H264 && (spec.width % 2 != 0 || spec.height % 2 != 0) {
            return Err(FeedError::SinkOpen(format!(
                "H264 output needs even dimensions (yuv420p), got {}x{}",
                spec.width, spec.height
            )));
        }

        if !is_available() {
            return Err(FeedError::SinkOpen(
                "ffmpeg not found in PATH. Install FFmpeg: https://ffmpeg.org/download.html".into(),
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.arg(if spec.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel", "error",
            "-f", "rawvideo",
            "-pixel_format", "rgb24",
            "-video_size", &format!("{}x{}", spec.width, spec.height),
            "-framerate", &spec.fps.to_string(),
            "-i", "-",
            "-an",
        ]);
        cmd.args(codec.ffmpeg_args());
        cmd.arg(&spec.path);

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FeedError::SinkOpen(format!("failed to start ffmpeg: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FeedError::SinkOpen("failed to open ffmpeg stdin".into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| FeedError::SinkOpen("failed to open ffmpeg stderr".into()))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        tracing::debug!(
            "ffmpeg {} sink opened at {} ({}x{} @ {}fps)",
            codec,
            spec.path.display(),
            spec.width,
            spec.height,
            spec.fps
        );

        Ok(Self {
            codec,
            width: spec.width,
            height: spec.height,
            child: Some(child),
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
        })
    }

    /// Close stdin and wait for ffmpeg, returning its stderr on failure.
    fn wait(&mut self) -> Result<(), String> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| format!("ffmpeg process error: {}", e))?;
        let stderr = match self.stderr_drain.take().map(JoinHandle::join) {
            Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_string(),
            Some(Ok(Err(e))) => format!("(stderr unreadable: {})", e),
            Some(Err(_)) => "(stderr reader panicked)".to_string(),
            None => String::new(),
        };
        if !status.success() {
            return Err(format!("ffmpeg failed with status {}: {}", status, stderr));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn write(&mut self, index: FrameIndex, frame: &FrameBuffer) -> FeedResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(FeedError::sink_write(
                index,
                format!(
                    "frame has dimensions {}x{}, expected {}x{}",
                    frame.width, frame.height, self.width, self.height
                ),
            ));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FeedError::sink_write(index, "ffmpeg sink is already closed"));
        };

        if let Err(e) = stdin.write_all(&frame.data) {
            // A broken pipe means ffmpeg died; its stderr says why.
            let detail = match self.wait() {
                Err(stderr) => stderr,
                Ok(()) => String::new(),
            };
            return Err(FeedError::sink_write(
                index,
                format!("failed to write {} frame to ffmpeg: {}. {}", self.codec, e, detail),
            ));
        }
        Ok(())
    }

    fn close(&mut self) -> FeedResult<()> {
        self.wait().map_err(FeedError::Other)
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            if let Err(e) = self.wait() {
                tracing::warn!("{}", e);
            }
        }
    }
}
