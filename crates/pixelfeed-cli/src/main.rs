mod args;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pixelfeed_core::config::DEFAULT_CONFIG_FILE;
use pixelfeed_core::{FeedIndex, FrameIndex, RenderConfig, RenderPlan};
use pixelfeed_encode::EncoderFactory;
use pixelfeed_render::{FeedRenderer, FontPainter, Orchestrator};

use crate::args::Overrides;

#[derive(Parser)]
#[command(
    name = "pixelfeed",
    version,
    about = "Pixelfeed: noise videos that count their own pixels",
    long_about = "Renders several parallel videos of scrolling noise. Each feed shows three digits\nof the running pixel count; reading all feeds together gives the whole number."
)]
struct Cli {
    /// Config file (default: pixelfeed.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every selected feed to a video file
    Render {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the resolved configuration and derived parameters
    Plan {
        #[command(flatten)]
        overrides: Overrides,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print each feed's digits and the full counter at a frame
    Count {
        #[command(flatten)]
        overrides: Overrides,

        /// Frame index
        #[arg(long)]
        frame: FrameIndex,
    },

    /// Compose a single frame and save it as an image
    Still {
        #[command(flatten)]
        overrides: Overrides,

        /// Feed index
        #[arg(long)]
        feed: FeedIndex,

        /// Frame index
        #[arg(long)]
        frame: FrameIndex,

        /// Output image path (format from extension, e.g. .png)
        #[arg(short = 'O', long = "out")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = cli.config;
    match cli.command {
        Commands::Render { overrides } => cmd_render(load_plan(config_path.as_deref(), overrides)?),
        Commands::Plan { overrides, json } => cmd_plan(load_plan(config_path.as_deref(), overrides)?, json),
        Commands::Count { overrides, frame } => {
            cmd_count(&load_plan(config_path.as_deref(), overrides)?, frame)
        }
        Commands::Still {
            overrides,
            feed,
            frame,
            out,
        } => cmd_still(&load_plan(config_path.as_deref(), overrides)?, feed, frame, &out),
    }
}

/// Load the config file (explicit path must exist, the default may not),
/// apply CLI overrides and resolve the plan.
fn load_plan(path: Option<&Path>, overrides: Overrides) -> Result<RenderPlan> {
    let mut config = match path {
        Some(path) => RenderConfig::load_from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => RenderConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))
            .with_context(|| format!("failed to load {}", DEFAULT_CONFIG_FILE))?,
    };
    overrides.apply(&mut config);
    config.resolve().context("invalid render configuration")
}

fn load_painter(plan: &RenderPlan) -> Result<FontPainter> {
    let path = &plan.config.font_path;
    FontPainter::load(path, plan.font_size)
        .with_context(|| format!("failed to load font: {}", path.display()))
}

fn cmd_render(plan: RenderPlan) -> Result<()> {
    let start = Instant::now();
    let painter = load_painter(&plan)?;
    let outcomes = Orchestrator::new(&plan, &painter, &EncoderFactory).run();

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => tracing::info!(
                "Video {}: {} frames -> {} (sha256 {})",
                report.feed,
                report.frames_written,
                report.output.display(),
                report.content_hash
            ),
            // Already logged by the orchestrator.
            Err(_) => failed += 1,
        }
    }

    tracing::info!(
        "Rendered {} of {} feed(s) in {:.2} seconds.",
        outcomes.len() - failed,
        outcomes.len(),
        start.elapsed().as_secs_f64()
    );
    if failed > 0 {
        anyhow::bail!("{} of {} feed(s) failed", failed, outcomes.len());
    }
    Ok(())
}

fn cmd_plan(plan: RenderPlan, json: bool) -> Result<()> {
    let last = plan.total_frames - 1;
    if json {
        let summary = serde_json::json!({
            "config": plan.config,
            "feeds": plan.feeds,
            "pixels_per_frame": plan.pixels_per_frame,
            "total_frames": plan.total_frames,
            "font_size": plan.font_size,
            "noise_grid": plan.noise_shape(),
            "final_counter": plan.counter(last)?,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", plan.config.to_toml_string()?);
    println!("# derived");
    println!("feeds            = {:?}", plan.feeds);
    println!("pixels_per_frame = {}", plan.pixels_per_frame);
    println!("total_frames     = {}", plan.total_frames);
    println!("frame_range      = {:?}", plan.frame_range());
    println!("font_size        = {}", plan.font_size);
    let (grid_w, grid_h) = plan.noise_shape();
    println!("noise_grid       = {}x{}", grid_w, grid_h);
    println!("final_counter    = {}", plan.counter(last)?);
    Ok(())
}

fn cmd_count(plan: &RenderPlan, frame: FrameIndex) -> Result<()> {
    if frame >= plan.total_frames {
        anyhow::bail!("frame {} is past the last frame {}", frame, plan.total_frames - 1);
    }
    for feed in 0..pixelfeed_core::counter::MAX_FEEDS {
        println!("feed {}: {}", feed, plan.digits(frame, feed)?);
    }
    println!("counter: {}", plan.counter(frame)?);
    Ok(())
}

fn cmd_still(plan: &RenderPlan, feed: FeedIndex, frame: FrameIndex, out: &Path) -> Result<()> {
    if frame >= plan.total_frames {
        anyhow::bail!("frame {} is past the last frame {}", frame, plan.total_frames - 1);
    }
    let painter = load_painter(plan)?;
    let fb = FeedRenderer::new(plan, &painter, &EncoderFactory).compose_frame(feed, frame)?;
    let image = image::RgbImage::from_raw(fb.width, fb.height, fb.data)
        .context("composed frame does not match its dimensions")?;
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image
        .save(out)
        .with_context(|| format!("failed to save {}", out.display()))?;
    tracing::info!("Wrote feed {} frame {} to {}", feed, frame, out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelfeed_core::Color;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pixelfeed").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_render_overrides_apply() {
        let cli = parse(&[
            "render",
            "--width",
            "640",
            "--feeds",
            "1,3",
            "--codec",
            "png",
            "--text-color",
            "#FF000080",
            "--sequential",
        ]);
        let Commands::Render { overrides } = cli.command else {
            panic!("expected render");
        };
        let mut config = RenderConfig::default();
        overrides.apply(&mut config);
        assert_eq!(config.width, 640);
        assert_eq!(config.feeds, Some(vec![1, 3]));
        assert_eq!(config.codec, "png");
        assert_eq!(config.text_color, Color::rgba(255, 0, 0, 128));
        assert!(!config.parallel);
        assert_eq!(config.height, 1080);
    }

    #[test]
    fn test_cli_frame_budget_replaces_file_budget() {
        let cli = parse(&["plan", "--target-pixels", "1000000"]);
        let Commands::Plan { overrides, .. } = cli.command else {
            panic!("expected plan");
        };
        let mut config = RenderConfig {
            frames: Some(10),
            ..RenderConfig::default()
        };
        overrides.apply(&mut config);
        assert_eq!(config.frames, None);
        assert_eq!(config.duration_secs, None);
        assert_eq!(config.target_pixels, Some(1_000_000));
    }

    #[test]
    fn test_count_requires_frame() {
        assert!(Cli::try_parse_from(["pixelfeed", "count"]).is_err());
        let cli = parse(&["count", "--frame", "7", "--config", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Count { frame: 7, .. }));
    }

    #[test]
    fn test_bad_color_is_rejected() {
        assert!(Cli::try_parse_from(["pixelfeed", "render", "--text-color", "red"]).is_err());
    }

    #[test]
    fn test_load_plan_missing_explicit_config_fails() {
        let result = load_plan(Some(Path::new("/nonexistent/pixelfeed.toml")), Overrides::default());
        assert!(result.is_err());
    }
}
