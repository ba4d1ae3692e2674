//! Engine tuning knobs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::OverlapPolicy;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Ticks per second of the playback loop (1 to 1000).
    pub tick_hz: u32,
    /// Upper bound for a single asset fetch, in milliseconds.
    pub load_timeout_ms: u64,
    /// How overlapping regions are resolved.
    pub overlap_policy: OverlapPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_hz: 50,
            load_timeout_ms: 10_000,
            overlap_policy: OverlapPolicy::MostSpecific,
        }
    }
}

impl EngineSettings {
    /// Create settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick rate (clamped to 1-1000 Hz).
    pub fn set_tick_hz(&mut self, hz: u32) {
        self.tick_hz = hz.clamp(1, 1000);
    }

    /// Time between ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz.clamp(1, 1000) as f64)
    }

    /// Timeout applied to each asset fetch (at least 1 ms).
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms.max(1))
    }
}
