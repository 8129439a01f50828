use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use orrery_core::{
    build_session, AppConfig, Recorder, RecordingSettings, Renderer, Session, TraceRenderer,
};
use tracing_subscriber::EnvFilter;

fn main() -> orrery_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, seconds } => run_live(config.as_deref(), seconds),
        Commands::Simulate { config, seconds } => run_simulation(config.as_deref(), seconds),
        Commands::Record {
            output,
            config,
            seconds,
            stride,
        } => run_record(&output, config.as_deref(), seconds, stride),
        Commands::Config { output } => write_default_config(output.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> orrery_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::load(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn run_live(config: Option<&Path>, seconds: f64) -> orrery_core::Result<()> {
    let config = load_config(config)?;
    let (mut session, _) = build_session(&config, TraceRenderer::new())?;

    let stats = session.run_for(duration(seconds)?)?;
    session.stop();
    print_summary(&session)?;
    tracing::info!(ticks = stats.ticks, frames = stats.frames, "live run finished");
    Ok(())
}

fn run_simulation(config: Option<&Path>, seconds: f64) -> orrery_core::Result<()> {
    let config = load_config(config)?;
    let (mut session, _) = build_session(&config, TraceRenderer::new())?;

    simulate(&mut session, duration(seconds)?)?;
    session.stop();
    print_summary(&session)
}

fn run_record(
    output: &Path,
    config: Option<&Path>,
    seconds: f64,
    stride: u32,
) -> orrery_core::Result<()> {
    let config = load_config(config)?;
    let mut recorder = Recorder::new(RecordingSettings {
        output_path: output.to_string_lossy().into_owned(),
        frame_stride: stride,
    });
    recorder.start()?;

    let (mut session, _) = build_session(&config, recorder)?;
    simulate(&mut session, duration(seconds)?)?;
    session.stop();

    let recorder = &mut session.context_mut().renderer;
    recorder.stop()?;
    recorder.finish()?;
    tracing::info!(?output, frames = recorder.frames().len(), "recording written");
    Ok(())
}

fn write_default_config(output: Option<&Path>) -> orrery_core::Result<()> {
    let json = AppConfig::default().to_json()?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Steps virtual time one display refresh at a time so frames interleave
/// with ticks the way they would against a real display.
fn simulate<R: Renderer>(session: &mut Session<R>, total: Duration) -> orrery_core::Result<()> {
    let step = session.render_loop().frame_interval();
    while session.elapsed() < total {
        let next = (session.elapsed() + step).min(total);
        session.advance_to(next)?;
    }
    Ok(())
}

fn print_summary<R: Renderer>(session: &Session<R>) -> orrery_core::Result<()> {
    let objects: Vec<_> = session
        .scene()
        .objects()
        .map(|(_, object)| {
            serde_json::json!({
                "name": object.name,
                "position": object.transform.position.to_array(),
                "rotation": object.transform.rotation.to_array(),
            })
        })
        .collect();
    let summary = serde_json::json!({
        "elapsed_seconds": session.elapsed().as_secs_f64(),
        "stats": session.stats(),
        "objects": objects,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn duration(seconds: f64) -> orrery_core::Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| orrery_core::OrreryError::msg(format!("invalid duration: {seconds}")))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Animated star, planet and moon", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Animate the scene in real time, logging frames at debug level.
    Run {
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// How long to run, in seconds.
        #[arg(short, long, default_value_t = 5.0)]
        seconds: f64,
    },
    /// Run the scene in virtual time as fast as possible and print where
    /// everything ended up.
    Simulate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value_t = 12.0)]
        seconds: f64,
    },
    /// Simulate the scene and write per-frame transforms to a JSON file.
    Record {
        /// Destination for the recorded frames.
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value_t = 12.0)]
        seconds: f64,
        /// Keep every n-th frame.
        #[arg(long, default_value_t = 1)]
        stride: u32,
    },
    /// Print the default configuration, or write it to a file.
    Config {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
