//! Engine state owned by the host integration layer.

use crate::{FallbackCoordinator, PlaybackState, Region, RegionId, RegionRegistry, WorldAudio};

/// Everything the playback loop mutates: regions, the active count and the
/// fallback snapshot.
///
/// There is exactly one per session and no global copy of any of it.
/// Hosts driving a [`PlaybackController`](crate::PlaybackController) by hand
/// end with its `teardown`, which also stops the sinks; dropping the state
/// alone only gives the world its playlist back.
pub struct EngineState<W: WorldAudio> {
    pub(crate) registry: RegionRegistry,
    pub(crate) active_count: usize,
    pub(crate) fallback: FallbackCoordinator<W>,
}

impl<W: WorldAudio> EngineState<W> {
    /// Fresh state: every region inactive, nothing suppressed.
    pub fn init(registry: RegionRegistry, world: W) -> Self {
        Self {
            registry,
            active_count: 0,
            fallback: FallbackCoordinator::new(world),
        }
    }

    /// Loaded regions.
    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// Mutable registry access (asset completions land through this).
    pub fn registry_mut(&mut self) -> &mut RegionRegistry {
        &mut self.registry
    }

    /// Number of regions currently `Playing`.
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Fallback coordinator.
    pub fn fallback(&self) -> &FallbackCoordinator<W> {
        &self.fallback
    }

    /// Regions currently `Playing`, in registry order.
    pub fn playing(&self) -> impl Iterator<Item = &Region> {
        self.registry.regions().iter().filter(|r| r.is_playing())
    }

    /// Id of the first playing region, if any.
    pub fn current(&self) -> Option<RegionId> {
        self.playing().next().map(Region::id)
    }

    /// Force every region inactive and restore the world's music.
    ///
    /// Runs even when the active count disagrees with region states.
    pub(crate) fn teardown(&mut self) {
        for region in self.registry.regions_mut() {
            region.state = PlaybackState::Inactive;
        }
        self.active_count = 0;
        self.fallback.force_stop();
    }
}
