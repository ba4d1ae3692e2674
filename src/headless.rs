use crate::events::JsonlSink;
use crate::flight::ScriptedFlight;
use anyhow::{Context, Result};
use skyscore_assets::{load_descriptors_lenient, DiscoveryPolicy};
use skyscore_audio::journal::{recording_sinks, CallLog, RecordingWorld};
use skyscore_audio::{
    AssetLoader, AudioSink, EngineSettings, FsAssetSource, MusicSession, RegionRegistry,
};
use skyscore_core::SimTick;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

pub struct HeadlessConfig {
    pub game_data: PathBuf,
    pub discovery: DiscoveryPolicy,
    pub engine: EngineSettings,
    pub flight: ScriptedFlight,
    pub max_ticks: Option<u64>,
    pub events: Option<PathBuf>,
    /// Run ticks as fast as possible instead of at `engine.tick_hz`.
    pub unpaced: bool,
    pub audio_output: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub regions: usize,
    pub started: usize,
    pub stopped: usize,
    pub clips_attached: usize,
    pub failed_loads: usize,
}

struct Pacing {
    interval: std::time::Duration,
    unpaced: bool,
    max_ticks: Option<u64>,
}

/// Run the flight until it ends or Ctrl-C arrives.
pub async fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    run_until(cfg, interrupted()).await
}

async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "Cannot listen for Ctrl-C; the flight runs to completion");
        std::future::pending::<()>().await;
    }
}

/// Run the flight until it ends or `shutdown` resolves, tearing down either way.
pub async fn run_until(
    cfg: HeadlessConfig,
    shutdown: impl Future<Output = ()>,
) -> Result<RunSummary> {
    let loaded = load_descriptors_lenient(&cfg.game_data, cfg.discovery);
    let registry = RegionRegistry::load(loaded.descriptors);
    if registry.is_empty() {
        warn!(
            game_data = %cfg.game_data.display(),
            "No music regions configured; the world keeps its default music"
        );
    }

    let log = CallLog::new();
    let world = RecordingWorld::new(log.clone());
    let loader = AssetLoader::new(
        Arc::new(FsAssetSource::new(&cfg.game_data)),
        tokio::runtime::Handle::current(),
        cfg.engine.load_timeout(),
    );
    let events = match &cfg.events {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("failed to create event log {}", path.display()))?,
        ),
        None => None,
    };
    let pacing = Pacing {
        interval: cfg.engine.tick_interval(),
        unpaced: cfg.unpaced,
        max_ticks: cfg.max_ticks,
    };

    #[cfg(feature = "rodio_backend")]
    if cfg.audio_output {
        use skyscore_audio::journal::RecordingSink;
        use skyscore_audio::RodioOutput;

        let output = RodioOutput::open_default().context("failed to open the default audio device")?;
        let sink_log = log.clone();
        let session = MusicSession::start(
            registry,
            world,
            cfg.flight,
            loader,
            &cfg.engine,
            |region| RecordingSink::wrap(region.key().to_string(), output.sink(), sink_log.clone()),
        );
        return drive(session, &log, events, &pacing, shutdown).await;
    }
    #[cfg(not(feature = "rodio_backend"))]
    if cfg.audio_output {
        tracing::debug!("Built without rodio_backend; audio output disabled");
    }

    let session = MusicSession::start(
        registry,
        world,
        cfg.flight,
        loader,
        &cfg.engine,
        recording_sinks(&log),
    );
    drive(session, &log, events, &pacing, shutdown).await
}

async fn drive<S: AudioSink>(
    mut session: MusicSession<S, RecordingWorld, ScriptedFlight>,
    log: &CallLog,
    mut events: Option<JsonlSink>,
    pacing: &Pacing,
    shutdown: impl Future<Output = ()>,
) -> Result<RunSummary> {
    let mut summary = RunSummary {
        regions: session.state().registry().len(),
        ..Default::default()
    };
    let mut interval = tokio::time::interval(pacing.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        let done = match pacing.max_ticks {
            Some(limit) => summary.ticks >= limit,
            None => session.position().finished(),
        };
        if done {
            break;
        }

        let interrupted = tokio::select! {
            _ = interval.tick(), if !pacing.unpaced => false,
            _ = tokio::task::yield_now(), if pacing.unpaced => false,
            _ = &mut shutdown => true,
        };
        if interrupted {
            info!(ticks = summary.ticks, "Interrupted; ending flight");
            break;
        }

        let report = session.update();
        summary.ticks += 1;
        summary.started += report.started.len();
        summary.stopped += report.stopped.len();
        summary.clips_attached += report.clips_attached.len();
        flush(&mut events, report.tick, log)?;
        session.position_mut().advance();
    }

    session.teardown();
    flush(&mut events, session.controller().tick_count(), log)?;
    summary.failed_loads = session.loader().failed();
    info!(
        ticks = summary.ticks,
        regions = summary.regions,
        started = summary.started,
        stopped = summary.stopped,
        clips_attached = summary.clips_attached,
        failed_loads = summary.failed_loads,
        "Flight finished"
    );
    Ok(summary)
}

fn flush(events: &mut Option<JsonlSink>, tick: SimTick, log: &CallLog) -> Result<()> {
    match events {
        Some(sink) => {
            sink.write_calls(tick, log)?;
        }
        None => log.clear(),
    }
    Ok(())
}
