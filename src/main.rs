//! skyscore - location-driven background music
//!
//! Headless flight driver: loads music definitions from a `GameData`
//! directory, replays a scripted flight and logs every playback decision.

mod config;
mod events;
mod flight;
mod headless;

use anyhow::Result;
use clap::Parser;
use config::{AppConfig, DEFAULT_CONFIG_PATH};
use flight::ScriptedFlight;
use headless::HeadlessConfig;
use skyscore_assets::DiscoveryPolicy;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "skyscore", version, about = "Replay a scripted flight through the region music engine")]
struct Cli {
    /// Flight script (JSON list of `{ ticks, planet, biome? }` steps)
    #[arg(long)]
    flight: PathBuf,

    /// Directory containing one folder per mod (overrides the config file)
    #[arg(long)]
    game_data: Option<PathBuf>,

    /// Settings file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// How definition files from several mods combine: aggregate or first-found
    #[arg(long)]
    discovery: Option<DiscoveryPolicy>,

    /// Stop after this many ticks (defaults to the length of the flight)
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Playback loop rate
    #[arg(long)]
    tick_hz: Option<u32>,

    /// Write every sink and world-music call as JSON lines
    #[arg(long)]
    events: Option<PathBuf>,

    /// Tick as fast as possible instead of in real time
    #[arg(long)]
    unpaced: bool,

    /// Never open an audio device
    #[arg(long)]
    no_audio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with INFO level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting skyscore v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut app = AppConfig::load_from_path(&cli.config);
    if let Some(game_data) = cli.game_data {
        app.game_data = game_data;
    }
    if let Some(discovery) = cli.discovery {
        app.discovery = discovery;
    }
    if let Some(hz) = cli.tick_hz {
        app.engine.set_tick_hz(hz);
    }

    let flight = ScriptedFlight::from_path(&cli.flight)?;
    info!(
        game_data = %app.game_data.display(),
        discovery = %app.discovery,
        tick_hz = app.engine.tick_hz,
        flight_ticks = flight.total_ticks(),
        "Flight loaded"
    );

    headless::run(HeadlessConfig {
        game_data: app.game_data,
        discovery: app.discovery,
        engine: app.engine,
        flight,
        max_ticks: cli.max_ticks,
        events: cli.events,
        unpaced: cli.unpaced,
        audio_output: app.audio_output && !cli.no_audio,
    })
    .await?;
    Ok(())
}
