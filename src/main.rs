use std::path::PathBuf;

use anyhow::Context;
use argh::FromArgs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trimline::config::{load_config, EngineConfig};
use trimline::range::TrimRange;
use trimline::timestamp;
use trimline::video::export::{ExportCollaborator, ExportRequest, FfmpegExporter};
use trimline::video::SourceInfo;
use trimline::waveform::WaveformAnalyzer;

#[cfg(feature = "gui")]
mod app;
#[cfg(feature = "gui")]
mod ui;

/// Trim clips out of videos.
#[derive(FromArgs)]
struct TopLevel {
    /// config file, defaults to ~/.config/trimline/config.yaml
    #[argh(option)]
    config: Option<PathBuf>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Waveform(WaveformCommand),
    Export(ExportCommand),
    Open(OpenCommand),
}

/// Print the normalized amplitude profile of a video's audio track.
#[derive(FromArgs)]
#[argh(subcommand, name = "waveform")]
struct WaveformCommand {
    /// video file or media server name
    #[argh(positional)]
    path: String,

    /// number of buckets, overrides the config
    #[argh(option)]
    buckets: Option<usize>,
}

/// Cut a clip out of a video with ffmpeg.
#[derive(FromArgs)]
#[argh(subcommand, name = "export")]
struct ExportCommand {
    /// source video file
    #[argh(positional)]
    path: PathBuf,

    /// clip start in seconds
    #[argh(option)]
    start: f64,

    /// clip end in seconds
    #[argh(option)]
    end: f64,

    /// output file name without extension
    #[argh(option, default = "String::new()")]
    title: String,
}

/// Open the trim editor window.
#[derive(FromArgs)]
#[argh(subcommand, name = "open")]
struct OpenCommand {
    /// video to load on startup
    #[argh(positional)]
    path: Option<PathBuf>,
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trimline")
        .join("config.yaml")
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")
}

async fn print_waveform(config: EngineConfig, command: WaveformCommand) -> anyhow::Result<()> {
    let mut config = config;
    if let Some(buckets) = command.buckets {
        config.waveform_buckets = buckets;
    }

    let analyzer = WaveformAnalyzer::from_config(&config);
    let profile = analyzer.analyze(&command.path).await?;
    for value in profile.values() {
        println!("{value:.4}");
    }
    Ok(())
}

async fn export_clip(config: EngineConfig, command: ExportCommand) -> anyhow::Result<()> {
    let source = SourceInfo::from_local_path(&command.path);
    let trim = TrimRange::new(command.start, command.end);
    let request = ExportRequest::new(&source, trim, &config.export, &command.title);

    info!(
        start = %timestamp::display_text(trim.start),
        end = %timestamp::display_text(trim.end),
        "exporting clip"
    );
    let exporter = FfmpegExporter::from_settings(&config.export);
    let path = exporter.export(request).await?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(feature = "gui")]
fn open_editor(config: EngineConfig, command: OpenCommand) -> anyhow::Result<()> {
    relm4::RelmApp::new("io.github.trimline")
        .with_args(vec![])
        .run::<app::App>((config, command.path));
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn open_editor(_config: EngineConfig, _command: OpenCommand) -> anyhow::Result<()> {
    anyhow::bail!("built without the `gui` feature")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trimline=info")),
        )
        .init();

    let args: TopLevel = argh::from_env();
    let config_path = args.config.unwrap_or_else(default_config_path);
    let config = load_config(&config_path);

    match args.command {
        Command::Waveform(command) => runtime()?.block_on(print_waveform(config, command)),
        Command::Export(command) => runtime()?.block_on(export_clip(config, command)),
        Command::Open(command) => open_editor(config, command),
    }
}
