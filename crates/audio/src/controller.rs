//! Per-tick region matching and playback transitions.
//!
//! Each tick is evaluated from scratch: the sampled location selects at most
//! one region, and every region is moved toward the state that selection
//! implies. Repeating a tick with the same location issues no sink calls.

use serde::{Deserialize, Serialize};
use skyscore_core::SimTick;
use tracing::debug;

use crate::{
    AudioSink, EngineState, Location, PlaybackState, Region, RegionId, RegionRegistry, WorldAudio,
};

/// Which region plays when several match the same location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// A biome region beats a whole-planet region; equal specificity goes to
    /// the earliest declaration.
    #[default]
    MostSpecific,
    /// The earliest matching declaration wins.
    FirstDeclared,
}

/// What one tick changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick that produced this report.
    pub tick: SimTick,
    /// Regions that went `Inactive -> Playing`.
    pub started: Vec<RegionId>,
    /// Regions that went `Playing -> Inactive`.
    pub stopped: Vec<RegionId>,
    /// Playing regions whose late clip was handed to the sink.
    pub clips_attached: Vec<RegionId>,
}

impl TickReport {
    /// Whether the tick issued no transitions or clip hand-offs.
    pub fn is_quiet(&self) -> bool {
        self.started.is_empty() && self.stopped.is_empty() && self.clips_attached.is_empty()
    }
}

/// Drives one sink per region.
pub struct PlaybackController<S: AudioSink> {
    sinks: Vec<S>,
    policy: OverlapPolicy,
    tick: SimTick,
}

impl<S: AudioSink> PlaybackController<S> {
    /// Create one sink per region, in registry order.
    ///
    /// Regions that already have a clip (builtin tracks) hand it over now.
    pub fn new<F>(registry: &RegionRegistry, policy: OverlapPolicy, mut make_sink: F) -> Self
    where
        F: FnMut(&Region) -> S,
    {
        let sinks = registry
            .regions()
            .iter()
            .map(|region| {
                let mut sink = make_sink(region);
                if let Some(clip) = region.clip() {
                    sink.set_clip(clip.clone());
                }
                sink
            })
            .collect();
        Self {
            sinks,
            policy,
            tick: SimTick::ZERO,
        }
    }

    /// Overlap policy in effect.
    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Number of ticks evaluated so far.
    pub fn tick_count(&self) -> SimTick {
        self.tick
    }

    /// Sink of a region.
    pub fn sink(&self, id: RegionId) -> Option<&S> {
        self.sinks.get(id.index())
    }

    /// All sinks in registry order.
    pub fn sinks(&self) -> &[S] {
        &self.sinks
    }

    /// Region that should be playing at `location`, if any.
    pub fn select(&self, registry: &RegionRegistry, location: &Location) -> Option<RegionId> {
        let planet = location.planet.as_ref();
        let biome = location.biome.as_ref();
        let mut best: Option<(u8, RegionId)> = None;

        for region in registry.regions() {
            if !region.key().matches(planet, biome) {
                continue;
            }
            match self.policy {
                OverlapPolicy::FirstDeclared => return Some(region.id()),
                OverlapPolicy::MostSpecific => {
                    let specificity = region.key().specificity();
                    if best.map_or(true, |(current, _)| specificity > current) {
                        best = Some((specificity, region.id()));
                    }
                }
            }
        }

        best.map(|(_, id)| id)
    }

    /// Evaluate one tick.
    ///
    /// Regions are visited in registry order. `suppress()` runs right before
    /// the first `play()` of a cycle. `restore()` is deferred to the end of the
    /// tick so a hand-over between two regions never restarts the world's
    /// music in between.
    pub fn tick<W: WorldAudio>(&mut self, state: &mut EngineState<W>, location: &Location) -> TickReport {
        self.tick = self.tick.advance(1);
        let winner = self.select(&state.registry, location);
        let mut report = TickReport {
            tick: self.tick,
            ..Default::default()
        };

        let EngineState {
            registry,
            active_count,
            fallback,
        } = state;

        for (region, sink) in registry.regions_mut().iter_mut().zip(self.sinks.iter_mut()) {
            let matched = winner == Some(region.id);
            match (matched, region.state) {
                (true, PlaybackState::Inactive) => {
                    if *active_count == 0 {
                        fallback.suppress();
                    }
                    *active_count += 1;
                    region.state = PlaybackState::Playing;
                    if !sink.has_clip() {
                        if let Some(clip) = &region.clip {
                            sink.set_clip(clip.clone());
                        }
                    }
                    sink.play();
                    debug!(region = %region.key, tick = %self.tick, at = %location, "Region music started");
                    report.started.push(region.id);
                }
                (false, PlaybackState::Playing) => {
                    sink.stop();
                    *active_count = active_count.saturating_sub(1);
                    region.state = PlaybackState::Inactive;
                    debug!(region = %region.key, tick = %self.tick, at = %location, "Region music stopped");
                    report.stopped.push(region.id);
                }
                (true, PlaybackState::Playing) => {
                    if !sink.has_clip() {
                        if let Some(clip) = &region.clip {
                            sink.set_clip(clip.clone());
                            debug!(region = %region.key, tick = %self.tick, "Late clip attached");
                            report.clips_attached.push(region.id);
                        }
                    }
                }
                (false, PlaybackState::Inactive) => {}
            }
        }

        if *active_count == 0 && fallback.is_suppressed() {
            fallback.restore();
        }

        report
    }

    /// Stop everything and hand the world its music back.
    ///
    /// Stops any sink whose region is `Playing` or which still reports
    /// audio, then restores the fallback unconditionally. Returns the number
    /// of sinks stopped.
    pub fn teardown<W: WorldAudio>(&mut self, state: &mut EngineState<W>) -> usize {
        let mut stopped = 0;
        for (region, sink) in state.registry.regions().iter().zip(self.sinks.iter_mut()) {
            if region.is_playing() || sink.is_playing() {
                sink.stop();
                stopped += 1;
            }
        }
        state.teardown();
        stopped
    }
}
