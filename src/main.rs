use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use still_motion::{
    config::Config,
    effects::{render_frame, Effect},
    jobs::{BatchProcessor, CancelFlag, JobRunner, JobStatus, RenderJob},
    sequence::FrameSequencer,
    video::load_image,
};

#[derive(Parser)]
#[command(
    name = "still-motion",
    version,
    about = "Turn still images into short motion clips",
    long_about = "Still-Motion renders a video from a single image by applying a zoom, fade, slide, pan or Ken Burns effect over the length of the clip."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one image into a clip
    Render {
        /// Source image (PNG, JPEG, BMP, GIF, TIFF)
        image: PathBuf,

        /// Output file (or frame directory for the png sink)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        timing: TimingArgs,
    },

    /// Render every image in a folder
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,

        /// Prepended to every output file name
        #[arg(short, long)]
        prefix: Option<String>,

        #[command(flatten)]
        timing: TimingArgs,
    },

    /// Render a single frame to a PNG
    Preview {
        image: PathBuf,

        /// Position within the clip, from 0.0 up to (not including) 1.0
        #[arg(short, long, default_value_t = 0.5)]
        t: f64,

        /// PNG file to write
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        timing: TimingArgs,
    },

    /// List available effects
    Effects,

    /// Write the default configuration to a file
    InitConfig {
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Flags that override the `[render]` section of the configuration
#[derive(clap::Args)]
struct TimingArgs {
    /// Effect to apply (see `still-motion effects`)
    #[arg(short, long, value_parser = parse_effect)]
    effect: Option<Effect>,

    /// Clip length in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Frames per second
    #[arg(short, long)]
    fps: Option<u32>,

    /// Frames rendered in parallel
    #[arg(long)]
    threads: Option<usize>,
}

impl TimingArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(effect) = self.effect {
            config.render.effect = effect;
        }
        if let Some(duration) = self.duration {
            config.render.duration = duration;
        }
        if let Some(fps) = self.fps {
            config.render.fps = fps;
        }
        if let Some(threads) = self.threads {
            config.render.threads = threads;
        }
    }
}

fn parse_effect(name: &str) -> std::result::Result<Effect, String> {
    name.parse().map_err(|e: still_motion::error::EffectError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    match EnvFilter::try_from_default_env() {
        Ok(filter) => tracing_subscriber::fmt().with_env_filter(filter).init(),
        Err(_) => tracing_subscriber::fmt().with_max_level(log_level).init(),
    }

    info!("Starting Still-Motion v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };

    match cli.command {
        Command::Render { image, output, timing } => render(config, &image, output, &timing).await,
        Command::Batch {
            input_dir,
            output_dir,
            prefix,
            timing,
        } => batch(config, input_dir, output_dir, prefix, &timing).await,
        Command::Preview { image, t, out, timing } => preview(config, &image, t, &out, &timing),
        Command::Effects => {
            for effect in Effect::ALL {
                println!("{:<20} {}", effect.name(), effect.description());
            }
            Ok(())
        }
        Command::InitConfig { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Config::default().save_to_file(&path)?;
            info!("Wrote default configuration to {:?}", path);
            Ok(())
        }
    }
}

async fn render(mut config: Config, image: &Path, output: Option<PathBuf>, timing: &TimingArgs) -> Result<()> {
    timing.apply(&mut config);
    config.validate()?;

    let runner = JobRunner::new(config);
    let effect = runner.pipeline().config().render.effect;
    let output = match output {
        Some(path) => path,
        None => runner.pipeline().output_path(image, None, effect, ""),
    };

    info!("🎬 {} -> {:?}", effect.label(), output);
    let job = RenderJob::from_config(image, output, runner.pipeline().config());
    let handle = runner.spawn(job)?;

    cancel_on_ctrl_c(handle.cancel_flag());

    let mut status = handle.subscribe();
    let reporter = tokio::spawn(async move {
        let mut last_step = 0;
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            if let JobStatus::Rendering { frame, total, percent } = current {
                let step = (percent / 10.0) as u32;
                if step > last_step {
                    last_step = step;
                    info!("{:>5.1}% ({}/{})", percent, frame, total);
                }
            }
        }
    });

    let result = handle.wait().await;
    let _ = reporter.await;

    match result {
        Ok(outcome) => {
            info!("✅ Done! Output saved to: {:?}", outcome.output);
            Ok(())
        }
        Err(e) if e.is_cancelled() => bail!("render cancelled"),
        Err(e) => bail!(e.user_message()),
    }
}

async fn batch(
    mut config: Config,
    input_dir: PathBuf,
    output_dir: PathBuf,
    prefix: Option<String>,
    timing: &TimingArgs,
) -> Result<()> {
    timing.apply(&mut config);
    if let Some(prefix) = prefix {
        config.batch.prefix = prefix;
    }
    config.validate()?;

    let effect = config.render.effect;
    let prefix = config.batch.prefix.clone();
    let cancel = CancelFlag::new();
    cancel_on_ctrl_c(cancel.clone());

    let processor = BatchProcessor::new(config).with_cancel(cancel);
    let report = tokio::task::spawn_blocking(move || {
        processor.process_folder(&input_dir, &output_dir, effect, &prefix)
    })
    .await??;

    for (path, reason) in &report.failed {
        warn!("❌ {:?}: {}", path, reason);
    }
    info!(
        "✅ {} of {} images rendered",
        report.rendered.len(),
        report.total()
    );
    Ok(())
}

fn preview(mut config: Config, image_path: &Path, t: f64, out: &Path, timing: &TimingArgs) -> Result<()> {
    timing.apply(&mut config);
    config.validate()?;

    let image = load_image(image_path)?;
    let sequencer = FrameSequencer::new(config.render.effect, config.render.duration, config.render.fps);
    let total = sequencer.validate(&image)?;

    let index = ((t.clamp(0.0, 1.0) * total as f64) as u64).min(total - 1);
    let clock = sequencer.clock(index);
    let frame = render_frame(&image, config.render.effect, clock, image.width(), image.height())?;
    frame.save_png(out)?;

    info!(
        "Wrote frame {}/{} of {} (t = {:.3}) to {:?}",
        index + 1,
        total,
        config.render.effect,
        clock.progress(),
        out
    );
    Ok(())
}

fn cancel_on_ctrl_c(flag: CancelFlag) {
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current frame...");
            flag.cancel();
        }
    });
}
