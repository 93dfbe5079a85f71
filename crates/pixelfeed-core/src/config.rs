use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::counter::{self, FeedIndex, COUNTER_LIMIT, MAX_FEEDS};
use crate::error::{FeedError, FeedResult};
use crate::frame::FrameIndex;

/// Color channels counted per rendered pixel.
pub const CHANNELS_PER_PIXEL: u64 = 3;

/// Default config file looked up next to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pixelfeed.toml";

/// Render settings as written in `pixelfeed.toml` or given on the command line.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Feeds sharing the counter; scales the pixels counted per frame.
    pub feed_count: u32,
    /// Feeds to actually render. `None` renders `0..feed_count`.
    pub feeds: Option<Vec<FeedIndex>>,
    /// Explicit frame count, wins over everything else.
    pub frames: Option<u64>,
    /// Total pixels to show across all feeds.
    pub target_pixels: Option<u64>,
    pub duration_secs: Option<u64>,
    /// First frame to render; earlier frames are skipped, not shifted.
    pub start_frame: u64,
    /// Frames the displayed counter is held for.
    pub text_update_interval: u64,
    /// Frames between progress logs; 0 disables them.
    pub log_interval: u64,
    /// Frames per one-cell step of the noise scroll.
    pub roll_factor: u64,
    /// Frame pixels per noise cell along each axis.
    pub downsample: u32,
    /// Distinct values per noise channel.
    pub noise_levels: u16,
    pub seed: u64,
    pub codec: String,
    pub output_dir: PathBuf,
    pub prefix: String,
    pub font_path: PathBuf,
    /// Font pixel size. `None` sizes glyphs to the full frame height.
    pub font_size: Option<f32>,
    /// Counter digit color. Alpha below `FF` makes the digits translucent.
    pub text_color: Color,
    /// Render feeds on the rayon pool instead of one after another.
    pub parallel: bool,
    pub overwrite: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 24,
            feed_count: MAX_FEEDS,
            feeds: None,
            frames: None,
            target_pixels: None,
            duration_secs: Some(5),
            start_frame: 0,
            text_update_interval: 3,
            log_interval: 5,
            roll_factor: 1,
            downsample: 4,
            noise_levels: 256,
            seed: 42,
            codec: "MJPG".to_string(),
            output_dir: PathBuf::from("frames"),
            prefix: "random".to_string(),
            font_path: PathBuf::from("Courier New Bold.ttf"),
            font_size: None,
            text_color: Color::BLACK,
            parallel: true,
            overwrite: true,
        }
    }
}

impl RenderConfig {
    pub fn load_from_file(path: &Path) -> FeedResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| FeedError::config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> FeedResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> FeedResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FeedError::config(format!("failed to serialize config: {}", e)))
    }

    /// Pixels counted per frame across every feed.
    pub fn pixels_per_frame(&self) -> FeedResult<u64> {
        (self.width as u64)
            .checked_mul(self.height as u64)
            .and_then(|n| n.checked_mul(self.feed_count as u64))
            .and_then(|n| n.checked_mul(CHANNELS_PER_PIXEL))
            .ok_or_else(|| FeedError::config("pixels per frame overflows u64"))
    }

    /// Resolve the frame count: explicit frames, then target pixels, then duration.
    pub fn total_frames(&self, pixels_per_frame: u64) -> FeedResult<u64> {
        let frames = if let Some(frames) = self.frames {
            frames
        } else if let Some(target) = self.target_pixels {
            target.div_ceil(pixels_per_frame)
        } else if let Some(secs) = self.duration_secs {
            secs.checked_mul(self.fps as u64)
                .ok_or_else(|| FeedError::config("duration overflows the frame count"))?
        } else {
            return Err(FeedError::config(
                "one of frames, target_pixels or duration_secs must be set",
            ));
        };
        if frames == 0 {
            return Err(FeedError::config("render would produce zero frames"));
        }
        Ok(frames)
    }

    fn validate_geometry(&self) -> FeedResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FeedError::config("width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(FeedError::config("fps must be non-zero"));
        }
        if self.downsample == 0 || self.downsample > self.width || self.downsample > self.height {
            return Err(FeedError::config(format!(
                "downsample {} must be between 1 and the smaller frame dimension",
                self.downsample
            )));
        }
        if !(2..=256).contains(&self.noise_levels) {
            return Err(FeedError::config(format!(
                "noise_levels {} must be within 2..=256",
                self.noise_levels
            )));
        }
        if self.text_update_interval == 0 {
            return Err(FeedError::config("text_update_interval must be non-zero"));
        }
        if self.roll_factor == 0 {
            return Err(FeedError::config("roll_factor must be non-zero"));
        }
        if let Some(size) = self.font_size {
            if !(size.is_finite() && size > 0.0) {
                return Err(FeedError::config("font_size must be a positive number"));
            }
        }
        Ok(())
    }

    fn resolve_feeds(&self) -> FeedResult<Vec<FeedIndex>> {
        if self.feed_count == 0 || self.feed_count > MAX_FEEDS {
            return Err(FeedError::config(format!(
                "feed_count {} must be within 1..={}",
                self.feed_count, MAX_FEEDS
            )));
        }
        let feeds = match &self.feeds {
            Some(feeds) if feeds.is_empty() => {
                return Err(FeedError::config("feeds must not be empty"));
            }
            Some(feeds) => feeds.clone(),
            None => (0..self.feed_count).collect(),
        };
        for (i, &feed) in feeds.iter().enumerate() {
            counter::check_feed(feed).map_err(|e| FeedError::config(e.to_string()))?;
            if feeds[..i].contains(&feed) {
                return Err(FeedError::config(format!("feed {} is selected twice", feed)));
            }
        }
        Ok(feeds)
    }

    /// Validate and derive the immutable parameters shared by every feed.
    pub fn resolve(self) -> FeedResult<RenderPlan> {
        self.validate_geometry()?;
        let feeds = self.resolve_feeds()?;
        let pixels_per_frame = self.pixels_per_frame()?;
        let total_frames = self.total_frames(pixels_per_frame)?;

        match pixels_per_frame.checked_mul(total_frames) {
            Some(total) if total < COUNTER_LIMIT => {}
            _ => {
                return Err(FeedError::config(format!(
                    "{} frames of {} pixels do not fit the {}-digit counter",
                    total_frames,
                    pixels_per_frame,
                    counter::TOTAL_DIGITS
                )));
            }
        }
        if self.start_frame >= total_frames {
            return Err(FeedError::config(format!(
                "start_frame {} is past the last frame {}",
                self.start_frame,
                total_frames - 1
            )));
        }

        let font_size = self.font_size.unwrap_or(self.height as f32);
        Ok(RenderPlan {
            config: self,
            feeds,
            pixels_per_frame,
            total_frames,
            font_size,
        })
    }
}

/// Validated configuration plus everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub config: RenderConfig,
    pub feeds: Vec<FeedIndex>,
    pub pixels_per_frame: u64,
    pub total_frames: u64,
    pub font_size: f32,
}

impl RenderPlan {
    /// Frames each feed renders, in write order.
    pub fn frame_range(&self) -> Range<FrameIndex> {
        self.config.start_frame..self.total_frames
    }

    pub fn is_final_frame(&self, frame: FrameIndex) -> bool {
        frame.checked_add(1) == Some(self.total_frames)
    }

    /// Noise grid size as (width, height).
    pub fn noise_shape(&self) -> (u32, u32) {
        (
            self.config.width / self.config.downsample,
            self.config.height / self.config.downsample,
        )
    }

    /// `{output_dir}/{prefix}-{feed}.{extension}`
    pub fn output_path(&self, feed: FeedIndex, extension: &str) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}-{}.{}", self.config.prefix, feed, extension))
    }

    /// Counter digits `feed` shows at `frame`.
    pub fn digits(&self, frame: FrameIndex, feed: FeedIndex) -> FeedResult<String> {
        counter::partition(
            frame,
            feed,
            self.pixels_per_frame,
            self.config.text_update_interval,
            self.is_final_frame(frame),
        )
    }

    /// The complete counter at `frame`.
    pub fn counter(&self, frame: FrameIndex) -> FeedResult<String> {
        counter::full_counter(
            frame,
            self.pixels_per_frame,
            self.config.text_update_interval,
            self.is_final_frame(frame),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> RenderConfig {
        RenderConfig {
            width: 16,
            height: 8,
            frames: Some(10),
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_default_plan() {
        let plan = RenderConfig::default().resolve().unwrap();
        assert_eq!(plan.pixels_per_frame, 1920 * 1080 * 4 * 3);
        assert_eq!(plan.total_frames, 5 * 24);
        assert_eq!(plan.feeds, vec![0, 1, 2, 3]);
        assert_eq!(plan.font_size, 1080.0);
        assert_eq!(plan.noise_shape(), (480, 270));
    }

    #[test]
    fn test_target_pixels_uses_ceiling_division() {
        let config = RenderConfig {
            frames: None,
            target_pixels: Some(16 * 8 * 4 * 3 * 7 + 1),
            ..small()
        };
        assert_eq!(config.resolve().unwrap().total_frames, 8);

        let exact = RenderConfig {
            frames: None,
            target_pixels: Some(16 * 8 * 4 * 3 * 7),
            ..small()
        };
        assert_eq!(exact.resolve().unwrap().total_frames, 7);
    }

    #[test]
    fn test_explicit_frames_win() {
        let config = RenderConfig {
            target_pixels: Some(1),
            ..small()
        };
        assert_eq!(config.resolve().unwrap().total_frames, 10);
    }

    #[test]
    fn test_missing_frame_budget_is_error() {
        let config = RenderConfig {
            frames: None,
            duration_secs: None,
            ..small()
        };
        assert!(matches!(config.resolve(), Err(FeedError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_geometry() {
        for config in [
            RenderConfig { width: 0, ..small() },
            RenderConfig { fps: 0, ..small() },
            RenderConfig { downsample: 0, ..small() },
            RenderConfig { downsample: 9, ..small() },
            RenderConfig { noise_levels: 1, ..small() },
            RenderConfig { text_update_interval: 0, ..small() },
            RenderConfig { roll_factor: 0, ..small() },
            RenderConfig { font_size: Some(-1.0), ..small() },
        ] {
            assert!(matches!(config.resolve(), Err(FeedError::Config(_))));
        }
    }

    #[test]
    fn test_rejects_feed_outside_counter() {
        let config = RenderConfig {
            feeds: Some(vec![1, 4]),
            ..small()
        };
        assert!(matches!(config.resolve(), Err(FeedError::Config(_))));

        let config = RenderConfig { feed_count: 5, ..small() };
        assert!(matches!(config.resolve(), Err(FeedError::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_feeds() {
        let config = RenderConfig {
            feeds: Some(vec![1, 3, 1]),
            ..small()
        };
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, FeedError::Config(ref msg) if msg.contains("feed 1")));

        let distinct = RenderConfig {
            feeds: Some(vec![3, 1]),
            ..small()
        };
        assert_eq!(distinct.resolve().unwrap().feeds, vec![3, 1]);
    }

    #[test]
    fn test_default_text_color_is_opaque() {
        assert_eq!(RenderConfig::default().text_color.a, 255);
    }

    #[test]
    fn test_rejects_counter_overflow() {
        let config = RenderConfig {
            width: 1920,
            height: 1080,
            frames: Some(1_000_000),
            ..RenderConfig::default()
        };
        assert!(matches!(config.resolve(), Err(FeedError::Config(_))));
    }

    #[test]
    fn test_rejects_start_past_end() {
        let config = RenderConfig { start_frame: 10, ..small() };
        assert!(config.resolve().is_err());
        let config = RenderConfig { start_frame: 9, ..small() };
        assert_eq!(config.resolve().unwrap().frame_range(), 9..10);
    }

    #[test]
    fn test_output_path_naming() {
        let plan = small().resolve().unwrap();
        assert_eq!(plan.output_path(2, "avi"), PathBuf::from("frames/random-2.avi"));
    }

    #[test]
    fn test_final_frame_digits() {
        let plan = small().resolve().unwrap();
        // 16 * 8 * 4 * 3 = 1536 pixels per frame; frame 9 is final and undebounced.
        assert_eq!(plan.counter(9).unwrap(), "000000015360");
        assert_eq!(plan.counter(8).unwrap(), "000000010752");
        assert_eq!(plan.digits(9, 3).unwrap(), "360");
    }

    #[test]
    fn test_toml_round_trip_keeps_overrides() {
        let parsed: RenderConfig = toml::from_str(
            "width = 640\nheight = 360\nfeeds = [3]\ntext_color = \"#FF000080\"\n",
        )
        .unwrap();
        assert_eq!(parsed.width, 640);
        assert_eq!(parsed.feeds, Some(vec![3]));
        assert_eq!(parsed.text_color, Color::rgba(255, 0, 0, 128));
        assert_eq!(parsed.fps, 24);
        assert!(parsed.to_toml_string().unwrap().contains("width = 640"));
    }
}
