//! Property-based tests for the playback state machine
//!
//! Drives the controller with random location sequences and checks:
//! - Repeating a sample issues no further sink or world calls
//! - At most one region plays at a time, and the active count agrees
//! - Every suppression is matched by exactly one restore of the same playlist

use proptest::prelude::*;
use skyscore_audio::{
    EngineState, Location, OverlapPolicy, PlaybackController, RegionRegistry,
};
use skyscore_core::{BiomeId, PlanetId, RegionDescriptor};
use skyscore_testkit::{recording_sinks, Call, CallLog, RecordingSink, RecordingWorld};
use std::sync::Arc;

const PLANETS: [&str; 4] = ["Kerbin", "Mun", "Duna", ""];
const BIOMES: [Option<&str>; 3] = [None, Some("Desert"), Some("Plains")];

fn registry() -> RegionRegistry {
    RegionRegistry::load(vec![
        RegionDescriptor::wav("Kerbin", "k.wav").with_kind("BUILTIN/Kerbin"),
        RegionDescriptor::wav("Kerbin", "d.wav")
            .with_biome("Desert")
            .with_kind("BUILTIN/Desert"),
        RegionDescriptor::wav("Mun", "m.wav")
            .with_biome("Plains")
            .with_kind("BUILTIN/MunPlains"),
        RegionDescriptor::wav("Duna", "du.wav"),
    ])
}

fn location(planet: usize, biome: usize) -> Location {
    Location {
        planet: PlanetId::new(PLANETS[planet]),
        biome: BIOMES[biome].and_then(BiomeId::new),
    }
}

fn setup(
    policy: OverlapPolicy,
) -> (
    PlaybackController<RecordingSink>,
    EngineState<RecordingWorld>,
    CallLog,
) {
    let log = CallLog::new();
    let registry = registry();
    let controller = PlaybackController::new(&registry, policy, recording_sinks(&log));
    let state = EngineState::init(registry, RecordingWorld::new(log.clone()));
    log.clear();
    (controller, state, log)
}

fn policy() -> impl Strategy<Value = OverlapPolicy> {
    prop_oneof![
        Just(OverlapPolicy::MostSpecific),
        Just(OverlapPolicy::FirstDeclared)
    ]
}

fn samples() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..PLANETS.len(), 0usize..BIOMES.len()), 1..40)
}

proptest! {
    /// Property: a second tick at the same location is silent
    #[test]
    fn repeated_sample_is_idempotent(policy in policy(), seq in samples()) {
        let (mut controller, mut state, log) = setup(policy);
        for (planet, biome) in seq {
            let at = location(planet, biome);
            controller.tick(&mut state, &at);
            log.clear();

            let again = controller.tick(&mut state, &at);
            prop_assert!(again.is_quiet());
            prop_assert!(log.is_empty(), "calls on repeat: {:?}", log.calls());
        }
    }

    /// Property: at most one region plays, and it is the selected one
    #[test]
    fn at_most_one_region_plays(policy in policy(), seq in samples()) {
        let (mut controller, mut state, _log) = setup(policy);
        for (planet, biome) in seq {
            let at = location(planet, biome);
            let expected = controller.select(state.registry(), &at);
            controller.tick(&mut state, &at);

            let playing: Vec<_> = state.playing().map(|r| r.id()).collect();
            prop_assert!(playing.len() <= 1);
            prop_assert_eq!(state.active_count(), playing.len());
            prop_assert_eq!(playing.first().copied(), expected);
        }
    }

    /// Property: suppress and restore alternate and restore the captured playlist
    #[test]
    fn fallback_is_symmetric(policy in policy(), seq in samples()) {
        let (mut controller, mut state, log) = setup(policy);
        let stock = Arc::clone(state.fallback().world().stock());

        for (planet, biome) in seq {
            controller.tick(&mut state, &location(planet, biome));

            let suppressions = log.count(Call::is_suppress);
            let restores = log.count(Call::is_restore);
            let outstanding = usize::from(state.active_count() > 0);
            prop_assert_eq!(suppressions, restores + outstanding);
            prop_assert_eq!(state.fallback().is_suppressed(), outstanding == 1);
        }

        controller.teardown(&mut state);
        prop_assert_eq!(log.count(Call::is_suppress), log.count(Call::is_restore));
        prop_assert!(!state.fallback().is_suppressed());
        prop_assert!(Arc::ptr_eq(state.fallback().world().current(), &stock));

        let first_play = log.position(|c| matches!(c, Call::SinkPlay(_)));
        let first_suppress = log.position(Call::is_suppress);
        prop_assert!(first_play.is_none() || first_suppress < first_play);
    }
}
