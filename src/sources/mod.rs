//! Value sources, one module per layer.
//!
//! - `file`: YAML/JSON configuration file, decoded with serde
//! - `env`: environment variables and declared defaults
//! - `flags`: command-line flags

pub mod env;
pub mod file;
pub mod flags;
mod merge;

pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use file::{DefaultFile, FileFormat, expand_home};
pub use flags::{ClapFlags, FlagSet, FlagSource, FlagValue};
pub use merge::overlay;
