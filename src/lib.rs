//! Layered typed configuration.
//!
//! A configuration structure is filled from up to three sources, each
//! overriding the previous one:
//!
//! 1. a YAML or JSON file, decoded with serde,
//! 2. environment variables, with declared defaults for fields left empty,
//! 3. command-line flags.
//!
//! Fields are described with the [`settings!`] macro, or by implementing
//! [`Settings`] by hand, and resolved with a [`Resolver`].
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use tierconf::{MapEnv, Resolver, settings};
//!
//! settings! {
//!     #[derive(Debug, Default, Serialize, Deserialize)]
//!     pub struct Database {
//!         pub host: String => { env: "HOST", env_default: "localhost" },
//!         pub port: u16 => { env: "PORT", env_default: "5432" },
//!     }
//! }
//!
//! settings! {
//!     #[derive(Debug, Default, Serialize, Deserialize)]
//!     pub struct Config {
//!         pub primary: Database => nested { env_prefix: "DB_" },
//!         pub replica: Database => nested { env_prefix: "READONLY_DB_" },
//!     }
//! }
//!
//! let env = MapEnv::from_pairs([("READONLY_DB_HOST", "replica.local")]);
//! let mut cfg = Config::default();
//! Resolver::new().env(&env).resolve(&mut cfg).unwrap();
//!
//! assert_eq!(cfg.primary.host, "localhost");
//! assert_eq!(cfg.replica.host, "replica.local");
//! assert_eq!(cfg.replica.port, 5432);
//! ```

#[macro_use]
mod macros;

pub mod cli;
pub mod error;
pub mod initializer;
pub mod logging;
pub mod resolver;
pub mod settings;
pub mod sources;
pub mod value;

pub use error::{BoxError, CoerceError, ConfigError, ErrorCode, Result};
pub use resolver::{Resolver, read, read_from_env, read_from_file, read_from_flags};
pub use settings::{Field, FieldDescriptor, Settings, Tags, extract};
pub use sources::{
    ClapFlags, DefaultFile, EnvSource, FileFormat, FlagSet, FlagSource, FlagValue, MapEnv,
    ProcessEnv,
};
pub use value::{DEFAULT_SEPARATOR, FieldValue, SequenceElement, Setter};
