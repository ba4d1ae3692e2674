//! Ordered set of region bindings.

use std::collections::HashSet;
use std::sync::Arc;

use skyscore_core::{RegionDescriptor, RegionKey, SourceKind};
use tracing::{debug, info, warn};

use crate::{Clip, PlaybackState, Region, RegionId};

/// Registry storing regions in descriptor order.
///
/// Order is significant: it is the tie-break when several regions match the
/// same location.
#[derive(Debug, Default)]
pub struct RegionRegistry {
    regions: Vec<Region>,
    rejected: usize,
}

impl RegionRegistry {
    /// Build a registry from descriptors.
    ///
    /// Invalid descriptors are logged and skipped; the rest still load.
    /// Builtin tracks get their clip immediately, file-backed regions start
    /// without one.
    pub fn load<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = RegionDescriptor>,
    {
        let mut regions = Vec::new();
        let mut rejected = 0;
        let mut seen: HashSet<RegionKey> = HashSet::new();

        for descriptor in descriptors {
            let binding = match descriptor.validate() {
                Ok(binding) => binding,
                Err(err) => {
                    rejected += 1;
                    match &descriptor.origin {
                        Some(origin) => warn!(
                            file = %origin.display(),
                            "Skipping background music entry: {err}"
                        ),
                        None => warn!("Skipping background music entry: {err}"),
                    }
                    continue;
                }
            };

            if !seen.insert(binding.key.clone()) {
                debug!(
                    region = %binding.key,
                    "Duplicate region; the earlier declaration wins when both match"
                );
            }

            let clip = match &binding.source {
                SourceKind::BuiltinTrack { name } => Some(Arc::new(Clip::builtin(name.clone()))),
                SourceKind::ExternalFile { .. } => None,
            };

            regions.push(Region {
                id: RegionId::from_index(regions.len()),
                key: binding.key,
                source: binding.source,
                state: PlaybackState::Inactive,
                clip,
            });
        }

        info!(
            loaded = regions.len(),
            rejected, "Loaded background music regions"
        );

        Self { regions, rejected }
    }

    /// All regions in registry order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub(crate) fn regions_mut(&mut self) -> &mut [Region] {
        &mut self.regions
    }

    /// Look up a region by id.
    pub fn resolve(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    /// Mutable lookup by id. Unknown ids yield `None`.
    pub fn resolve_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.get_mut(id.index())
    }

    /// Number of loaded regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether nothing loaded.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Number of descriptors skipped as invalid.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Regions whose clip still has to be fetched.
    pub fn pending_assets(&self) -> impl Iterator<Item = &Region> {
        self.regions
            .iter()
            .filter(|r| r.source.needs_loading() && r.clip.is_none())
    }
}
