use std::path::PathBuf;

use clap::Args;
use pixelfeed_core::{Color, FeedIndex, RenderConfig};

/// Command-line overrides for values from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Frame width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Frames per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// Number of feeds sharing the counter (1-4)
    #[arg(long)]
    pub feed_count: Option<u32>,

    /// Comma-separated feeds to render (default: all)
    #[arg(long, value_delimiter = ',')]
    pub feeds: Option<Vec<FeedIndex>>,

    /// Exact number of frames per feed
    #[arg(long)]
    pub frames: Option<u64>,

    /// Total pixels to show; the frame count is rounded up to reach it
    #[arg(long)]
    pub target_pixels: Option<u64>,

    /// Clip length in seconds, used when neither frames nor target pixels are set
    #[arg(long)]
    pub duration: Option<u64>,

    /// First frame to render
    #[arg(long)]
    pub start_frame: Option<u64>,

    /// Frames the counter text is held for
    #[arg(long)]
    pub text_update: Option<u64>,

    /// Frames between progress logs (0 disables them)
    #[arg(long)]
    pub log_interval: Option<u64>,

    /// Frames per one-cell noise scroll step
    #[arg(long)]
    pub roll_factor: Option<u64>,

    /// Frame pixels per noise cell
    #[arg(long)]
    pub downsample: Option<u32>,

    /// Distinct values per noise channel (2-256)
    #[arg(long)]
    pub noise_levels: Option<u16>,

    /// Noise seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Codec identifier: MJPG, H264, FFV1, PNG
    #[arg(long)]
    pub codec: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output file name prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Path to a TrueType/OpenType font
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Font pixel size (default: frame height)
    #[arg(long)]
    pub font_size: Option<f32>,

    /// Text color as #RRGGBB or #RRGGBBAA
    #[arg(long)]
    pub text_color: Option<Color>,

    /// Render feeds one after another instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Fail instead of replacing existing outputs
    #[arg(long)]
    pub no_overwrite: bool,
}

impl Overrides {
    /// Apply every override that was given on top of `config`.
    pub fn apply(self, config: &mut RenderConfig) {
        if let Some(v) = self.width {
            config.width = v;
        }
        if let Some(v) = self.height {
            config.height = v;
        }
        if let Some(v) = self.fps {
            config.fps = v;
        }
        if let Some(v) = self.feed_count {
            config.feed_count = v;
        }
        if let Some(v) = self.start_frame {
            config.start_frame = v;
        }
        if let Some(v) = self.text_update {
            config.text_update_interval = v;
        }
        if let Some(v) = self.log_interval {
            config.log_interval = v;
        }
        if let Some(v) = self.roll_factor {
            config.roll_factor = v;
        }
        if let Some(v) = self.downsample {
            config.downsample = v;
        }
        if let Some(v) = self.noise_levels {
            config.noise_levels = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.codec {
            config.codec = v;
        }
        if let Some(v) = self.output_dir {
            config.output_dir = v;
        }
        if let Some(v) = self.prefix {
            config.prefix = v;
        }
        if let Some(v) = self.font {
            config.font_path = v;
        }
        if let Some(v) = self.text_color {
            config.text_color = v;
        }
        if self.feeds.is_some() {
            config.feeds = self.feeds;
        }
        if self.font_size.is_some() {
            config.font_size = self.font_size;
        }
        // A frame budget given on the command line replaces the file's.
        if self.frames.is_some() || self.target_pixels.is_some() || self.duration.is_some() {
            config.frames = self.frames;
            config.target_pixels = self.target_pixels;
            config.duration_secs = self.duration;
        }
        if self.sequential {
            config.parallel = false;
        }
        if self.no_overwrite {
            config.overwrite = false;
        }
    }
}
