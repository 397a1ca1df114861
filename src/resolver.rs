//! Layered resolution of a configuration structure.
//!
//! Layers are applied in a fixed order, each one overwriting the previous:
//!
//! 1. configuration file (explicit path, else the first default file found)
//! 2. environment variables, then declared defaults for fields still zero
//! 3. command-line flags
//!
//! Required fields are checked once, after the last layer. Any error aborts
//! resolution and leaves the structure partially updated.

use crate::error::{ConfigError, Result};
use crate::settings::{FieldDescriptor, Settings, extract};
use crate::sources::{DefaultFile, EnvSource, FlagSource, ProcessEnv, env, file, flags};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolution options.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tierconf::{MapEnv, Resolver, settings};
///
/// settings! {
///     #[derive(Debug, Default, Serialize, Deserialize)]
///     struct Config {
///         port: u16 => { env: "PORT", env_default: "8080" },
///     }
/// }
///
/// let env = MapEnv::from_pairs([("PORT", "9000")]);
/// let mut cfg = Config::default();
/// Resolver::new().env(&env).resolve(&mut cfg).unwrap();
/// assert_eq!(cfg.port, 9000);
/// ```
#[derive(Clone, Copy)]
pub struct Resolver<'s> {
    file: Option<&'s Path>,
    default_file: Option<&'s DefaultFile>,
    env: &'s dyn EnvSource,
    flags: Option<&'s dyn FlagSource>,
}

impl Default for Resolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> Resolver<'s> {
    /// Resolver reading the process environment, with no file and no flags.
    pub fn new() -> Self {
        Self {
            file: None,
            default_file: None,
            env: &ProcessEnv,
            flags: None,
        }
    }

    /// Configuration file to read. An empty path means none was given.
    pub fn file(mut self, path: &'s Path) -> Self {
        self.file = Some(path).filter(|path| !path.as_os_str().is_empty());
        self
    }

    /// Where to look for a file when no explicit path was given.
    pub fn default_file(mut self, default_file: &'s DefaultFile) -> Self {
        self.default_file = Some(default_file);
        self
    }

    /// Environment to read instead of the process environment.
    pub fn env(mut self, env: &'s dyn EnvSource) -> Self {
        self.env = env;
        self
    }

    pub fn flags(mut self, flags: &'s dyn FlagSource) -> Self {
        self.flags = Some(flags);
        self
    }

    /// File the file layer would read, if any.
    pub fn config_path(&self) -> Option<PathBuf> {
        match self.file {
            Some(path) => Some(path.to_path_buf()),
            None => self.default_file.and_then(DefaultFile::find),
        }
    }

    /// Resolve `cfg` through every configured layer.
    ///
    /// The file layer decodes through serde, hence the extra bounds. Without
    /// a file use [`resolve_fields`](Self::resolve_fields).
    pub fn resolve<C>(&self, cfg: &mut C) -> Result<()>
    where
        C: Settings + Serialize + DeserializeOwned,
    {
        // Reject malformed structures before touching any source
        extract(&mut *cfg)?;

        if let Some(path) = self.config_path() {
            debug!(path = %path.display(), "applying file layer");
            file::load_into(&path, cfg)?;
        }

        self.resolve_fields(cfg)
    }

    /// Resolve `cfg` through the environment and flag layers only.
    ///
    /// Works on any [`Settings`] structure; configured files are ignored.
    pub fn resolve_fields(&self, cfg: &mut dyn Settings) -> Result<()> {
        let mut fields = extract(cfg)?;

        debug!(fields = fields.len(), "applying environment layer");
        env::apply(&mut fields, self.env)?;

        if let Some(flag_source) = self.flags {
            debug!("applying flag layer");
            flags::apply(&mut fields, flag_source)?;
        }

        check_required(&fields)
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("file", &self.file)
            .field("default_file", &self.default_file)
            .field("flags", &self.flags.is_some())
            .finish_non_exhaustive()
    }
}

/// First required field still holding its zero value.
fn check_required(fields: &[FieldDescriptor<'_>]) -> Result<()> {
    match fields.iter().find(|field| field.required && field.is_zero()) {
        Some(field) => Err(ConfigError::required(&field.path)),
        None => Ok(()),
    }
}

/// Resolve from environment variables and defaults only.
pub fn read_from_env<C: Settings>(cfg: &mut C) -> Result<()> {
    Resolver::new().resolve_fields(cfg)
}

/// Resolve from a file, then environment variables and defaults.
///
/// With `file` set to `None` the default file is searched instead.
pub fn read_from_file<C>(cfg: &mut C, file: Option<&Path>, default_file: &DefaultFile) -> Result<()>
where
    C: Settings + Serialize + DeserializeOwned,
{
    read_with(Resolver::new(), cfg, None, file, default_file)
}

/// Resolve from environment variables, defaults and flags.
pub fn read_from_flags<C: Settings>(cfg: &mut C, flags: &dyn FlagSource) -> Result<()> {
    Resolver::new().flags(flags).resolve_fields(cfg)
}

/// Resolve from every layer.
pub fn read<C>(
    cfg: &mut C,
    flags: &dyn FlagSource,
    file: Option<&Path>,
    default_file: &DefaultFile,
) -> Result<()>
where
    C: Settings + Serialize + DeserializeOwned,
{
    read_with(Resolver::new(), cfg, Some(flags), file, default_file)
}

fn read_with<'s, C>(
    mut resolver: Resolver<'s>,
    cfg: &mut C,
    flags: Option<&'s dyn FlagSource>,
    file: Option<&'s Path>,
    default_file: &'s DefaultFile,
) -> Result<()>
where
    C: Settings + Serialize + DeserializeOwned,
{
    resolver = resolver.default_file(default_file);
    if let Some(path) = file {
        resolver = resolver.file(path);
    }
    if let Some(flags) = flags {
        resolver = resolver.flags(flags);
    }
    resolver.resolve(cfg)
}
