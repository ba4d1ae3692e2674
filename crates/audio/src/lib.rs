//! Region-matching playback engine.
//!
//! Plays a configured track while a vessel is over a planet (or one of its
//! biomes) and silences the world's own music while it does.
//!
//! # Architecture
//!
//! - [`RegionRegistry`] - Ordered region bindings built from descriptors
//! - [`AssetLoader`] - Async clip resolution, drained on the tick thread
//! - [`FallbackCoordinator`] - Suppress/restore of the world's default playlist
//! - [`PlaybackController`] - Per-tick match evaluation and play/stop transitions
//! - [`MusicSession`] - Host-owned lifetime tying the pieces together
//! - [`journal`] - Logged sink and world stand-ins for headless hosts
//!
//! # Example
//!
//! ```ignore
//! let registry = RegionRegistry::load(descriptors);
//! let loader = AssetLoader::new(Arc::new(FsAssetSource::new(game_data)), handle, timeout);
//! let mut session = MusicSession::start(registry, world, position, loader, &settings, |_| NullSink::new());
//! loop {
//!     session.update();
//! }
//! ```

mod clip;
mod controller;
mod engine;
mod fallback;
pub mod journal;
mod loader;
mod position;
mod region;
mod registry;
mod session;
mod settings;
mod sink;

pub use clip::{Clip, ClipData, ClipHandle, PcmBuffer};
pub use controller::{OverlapPolicy, PlaybackController, TickReport};
pub use engine::EngineState;
pub use fallback::{FallbackCoordinator, Suppression, WorldAudio};
pub use loader::{AssetError, AssetLoader, AssetSource, FsAssetSource};
pub use position::{Location, PositionSource};
pub use region::{PlaybackState, Region, RegionId};
pub use registry::RegionRegistry;
pub use session::MusicSession;
pub use settings::EngineSettings;
pub use sink::{AudioSink, NullSink};

#[cfg(feature = "rodio_backend")]
pub use sink::rodio_backend::{RodioOutput, RodioSink};
