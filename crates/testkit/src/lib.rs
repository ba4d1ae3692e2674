#![warn(missing_docs)]
//! Deterministic testing surfaces: scripted positions, a gated asset
//! source and the engine's call journal re-exported for assertions.

mod assets;
mod position;

pub use assets::*;
pub use position::*;
pub use skyscore_audio::journal::*;
