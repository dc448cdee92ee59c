mod frame_source;
mod pose_sink;
mod replay;
mod settings;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use facetag_core::detection::domain::identity_registry::IdentityRegistry;
use facetag_core::overlay::domain::projection_engine::ProjectionEngine;
use facetag_core::pipeline::infrastructure::threaded_frame_worker::ThreadedFrameWorker;
use facetag_core::pipeline::pipeline_logger::SummaryPipelineLogger;
use facetag_core::pipeline::track_faces_use_case::TrackFacesUseCase;
use facetag_core::shared::display_geometry::DisplayGeometry;

use frame_source::FrameSource;
use pose_sink::PoseSink;
use replay::{replay, FrameRunner};
use settings::Settings;

/// Track faces in recorded landmark frames and emit mask overlay poses.
#[derive(Parser, Debug)]
#[command(name = "facetag")]
struct Cli {
    /// Recorded frames as JSON Lines.
    input: PathBuf,

    /// Output file for poses (stdout when omitted).
    output: Option<PathBuf>,

    /// Width of the display surface in pixels.
    #[arg(long)]
    display_width: f64,

    /// Height of the display surface in pixels.
    #[arg(long)]
    display_height: f64,

    /// Width of the source video in pixels.
    #[arg(long)]
    video_width: f64,

    /// Height of the source video in pixels.
    #[arg(long)]
    video_height: f64,

    /// Settings file (defaults to the per-user settings.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of mask slots.
    #[arg(long)]
    max_slots: Option<u32>,

    /// Pose smoothing factor (0.0-1.0, 1.0 = no smoothing).
    #[arg(long)]
    smoothing: Option<f64>,

    /// Consecutive missed frames before an identity is dropped.
    #[arg(long)]
    max_frames_missing: Option<u32>,

    /// Let each identity claim at most one face per frame.
    #[arg(long)]
    exclusive_matching: bool,

    /// Process frames on a worker thread.
    #[arg(long)]
    threaded: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = apply_overrides(Settings::load(cli.config.as_deref())?, &cli);
    let (registry_config, projection_config) = settings.core_configs()?;
    log::info!(
        "Tracking with {} slots, smoothing {}, {:?} matching",
        registry_config.max_slots,
        projection_config.smoothing_factor,
        registry_config.match_policy
    );

    let use_case = TrackFacesUseCase::new(
        IdentityRegistry::new(registry_config),
        ProjectionEngine::new(projection_config),
        Box::new(SummaryPipelineLogger::default()),
    );
    let runner = if cli.threaded {
        FrameRunner::Threaded(ThreadedFrameWorker::spawn(use_case))
    } else {
        FrameRunner::Direct(use_case)
    };

    let geometry = DisplayGeometry::new(
        cli.display_width,
        cli.display_height,
        cli.video_width,
        cli.video_height,
    );
    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut sink = PoseSink::new(writer);

    let source = FrameSource::open(&cli.input)?;
    let use_case = replay(source, runner, geometry, &mut sink)?;
    use_case.finish();

    if let Some(path) = &cli.output {
        log::info!(
            "Wrote {} frames to {}",
            use_case.frames_processed(),
            path.display()
        );
    }
    Ok(())
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(max_slots) = cli.max_slots {
        settings.max_slots = max_slots;
    }
    if let Some(smoothing) = cli.smoothing {
        settings.smoothing_factor = smoothing;
    }
    if let Some(max_frames_missing) = cli.max_frames_missing {
        settings.max_frames_missing = max_frames_missing;
    }
    if cli.exclusive_matching {
        settings.exclusive_matching = true;
    }
    settings
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    let geometry = DisplayGeometry::new(
        cli.display_width,
        cli.display_height,
        cli.video_width,
        cli.video_height,
    );
    if !geometry.is_valid() {
        return Err(format!(
            "Display and video dimensions must be positive, got {}x{} display, {}x{} video",
            cli.display_width, cli.display_height, cli.video_width, cli.video_height
        )
        .into());
    }
    Ok(())
}
