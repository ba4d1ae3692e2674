//! Host-owned playback session.

use tracing::info;

use crate::{
    AssetLoader, AudioSink, EngineSettings, EngineState, PlaybackController, PositionSource,
    Region, RegionRegistry, TickReport, WorldAudio,
};

/// One activation of the music engine, from entering the flight context to
/// leaving it.
///
/// Dropping a session tears it down if the host did not.
pub struct MusicSession<S, W, P>
where
    S: AudioSink,
    W: WorldAudio,
    P: PositionSource,
{
    state: EngineState<W>,
    controller: PlaybackController<S>,
    loader: AssetLoader,
    position: P,
    torn_down: bool,
}

impl<S, W, P> MusicSession<S, W, P>
where
    S: AudioSink,
    W: WorldAudio,
    P: PositionSource,
{
    /// Build the engine state, create sinks and start every asset fetch.
    pub fn start<F>(
        registry: RegionRegistry,
        world: W,
        position: P,
        mut loader: AssetLoader,
        settings: &EngineSettings,
        make_sink: F,
    ) -> Self
    where
        F: FnMut(&Region) -> S,
    {
        let controller = PlaybackController::new(&registry, settings.overlap_policy, make_sink);
        let mut fetches = 0;
        for region in registry.regions() {
            if loader.begin_load(region) {
                fetches += 1;
            }
        }
        info!(
            regions = registry.len(),
            fetches,
            policy = ?settings.overlap_policy,
            "Music session started"
        );

        Self {
            state: EngineState::init(registry, world),
            controller,
            loader,
            position,
            torn_down: false,
        }
    }

    /// Run one fixed-rate tick: apply finished loads, sample the position and
    /// evaluate regions.
    ///
    /// After teardown this does nothing and returns an empty report.
    pub fn update(&mut self) -> TickReport {
        if self.torn_down {
            return TickReport::default();
        }
        self.loader.drain(self.state.registry_mut());
        let location = self.position.sample();
        self.controller.tick(&mut self.state, &location)
    }

    /// Stop all region music, cancel pending loads and restore the world's
    /// music. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.loader.shutdown();
        let stopped = self.controller.teardown(&mut self.state);
        info!(
            stopped,
            ticks = %self.controller.tick_count(),
            failed_loads = self.loader.failed(),
            "Music session ended"
        );
    }

    /// Whether [`teardown`](Self::teardown) already ran.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Engine state.
    pub fn state(&self) -> &EngineState<W> {
        &self.state
    }

    /// Playback controller (sinks, tick count).
    pub fn controller(&self) -> &PlaybackController<S> {
        &self.controller
    }

    /// Asset loader.
    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    /// Position source.
    pub fn position(&self) -> &P {
        &self.position
    }

    /// Mutable position source, for hosts that push samples in.
    pub fn position_mut(&mut self) -> &mut P {
        &mut self.position
    }
}

impl<S, W, P> Drop for MusicSession<S, W, P>
where
    S: AudioSink,
    W: WorldAudio,
    P: PositionSource,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssetError, AssetSource, Clip, NullSink};
    use async_trait::async_trait;
    use skyscore_core::{BiomeId, PlanetId, RegionDescriptor};
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct NeverSource;

    #[async_trait]
    impl AssetSource for NeverSource {
        async fn fetch_and_decode(&self, _path: &Path) -> Result<Clip, AssetError> {
            std::future::pending().await
        }
    }

    struct Fixed(Option<&'static str>);

    impl PositionSource for Fixed {
        fn current_planet(&self) -> Option<PlanetId> {
            self.0.and_then(PlanetId::new)
        }
        fn coordinates(&self) -> (f64, f64) {
            (0.0, 0.0)
        }
        fn current_biome(&self, _latitude: f64, _longitude: f64) -> Option<BiomeId> {
            None
        }
    }

    #[derive(Clone, Default)]
    struct World {
        restores: Arc<AtomicU32>,
    }

    impl WorldAudio for World {
        type Playlist = bool;
        fn current_playlist(&self) -> bool {
            true
        }
        fn set_playlist(&mut self, playlist: bool) {
            if playlist {
                self.restores.fetch_add(1, Ordering::SeqCst);
            }
        }
        fn silent_playlist(&self) -> bool {
            false
        }
        fn stop_current_track(&mut self) {}
        fn play_current_track(&mut self) {}
    }

    #[tokio::test]
    async fn test_drop_restores_world_music() {
        let world = World::default();
        let restores = Arc::clone(&world.restores);
        let loader = AssetLoader::new(
            Arc::new(NeverSource),
            tokio::runtime::Handle::current(),
            Duration::from_secs(30),
        );
        let registry = RegionRegistry::load(vec![RegionDescriptor::wav("Kerbin", "k.wav")]);

        {
            let mut session = MusicSession::start(
                registry,
                world,
                Fixed(Some("Kerbin")),
                loader,
                &EngineSettings::default(),
                |_| NullSink::new(),
            );
            assert_eq!(session.loader().in_flight(), 1);
            let report = session.update();
            assert_eq!(report.started.len(), 1);
            assert!(session.controller().sinks()[0].is_requested());
        }

        assert_eq!(restores.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_teardown_is_idempotent() {
        let world = World::default();
        let restores = Arc::clone(&world.restores);
        let loader = AssetLoader::new(
            Arc::new(NeverSource),
            tokio::runtime::Handle::current(),
            Duration::from_secs(30),
        );
        let registry = RegionRegistry::load(vec![RegionDescriptor::wav("Kerbin", "k.wav")]);
        let mut session = MusicSession::start(
            registry,
            world,
            Fixed(Some("Kerbin")),
            loader,
            &EngineSettings::default(),
            |_| NullSink::new(),
        );
        session.update();
        session.teardown();
        session.teardown();
        assert!(session.is_torn_down());
        assert!(session.update().is_quiet());
        drop(session);
        assert_eq!(restores.load(Ordering::SeqCst), 1);
    }
}
