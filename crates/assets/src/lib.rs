#![warn(missing_docs)]
//! Music definition files: node-format parsing and mod-directory discovery.

mod definitions;
mod discovery;
mod node;

pub use definitions::{load_definitions_file, parse_definitions, MUSIC_NODE};
pub use discovery::{
    discover_definition_files, load_descriptors_lenient, load_descriptors_strict, DiscoveryPolicy,
    LoadedDefinitions, DEFINITIONS_FILE,
};
pub use node::ConfigNode;

use thiserror::Error;

/// Errors emitted while reading music definition files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Wrap IO errors when reading definition files.
    #[error("failed to read music definitions: {0}")]
    Io(#[from] std::io::Error),
    /// The node structure is broken.
    #[error("syntax error on line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
}
