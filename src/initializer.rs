//! One-call startup: resolve the configuration, then set up logging.

use crate::cli::{CONFIG, VERBOSITY};
use crate::logging::setup_logging;
use crate::resolver::Resolver;
use crate::settings::Settings;
use crate::sources::{ClapFlags, DefaultFile};
use anyhow::{Context, Result};
use clap::{ArgMatches, Command};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Default file searched by [`default_initializer`]: `<name>.yaml` in the
/// working directory, then in `~/.config/<name>`.
pub fn default_file(name: &str) -> DefaultFile {
    DefaultFile::new(name)
        .with_extensions(["yaml"])
        .with_paths([".".to_string(), format!("~/.config/{name}")])
}

/// Resolve `cfg` from the command line and set up logging to stdout.
///
/// `command` must carry the [`config`](crate::cli::config_arg) argument and
/// `matches` must come from it. The file comes from `--config`, else from
/// [`default_file`]. The log level is the structure's `verbosity` field as
/// serialized; a structure without one logs at `INFO`.
pub fn default_initializer<C>(
    cfg: &mut C,
    command: &Command,
    matches: &ArgMatches,
    name: &str,
) -> Result<()>
where
    C: Settings + Serialize + DeserializeOwned,
{
    let config = matches
        .try_get_one::<String>(CONFIG)
        .with_context(|| format!("command has no {CONFIG:?} argument"))?
        .cloned()
        .unwrap_or_default();

    let default_file = default_file(name);
    let flags = ClapFlags::new(command, matches);
    Resolver::new()
        .file(Path::new(&config))
        .default_file(&default_file)
        .flags(&flags)
        .resolve(cfg)
        .context("an error occurred while reading the config")?;

    let verbosity = verbosity_of(cfg)?;
    setup_logging(std::io::stdout, &verbosity)?;
    Ok(())
}

fn verbosity_of<C: Serialize>(cfg: &C) -> Result<String> {
    let value = serde_yaml::to_value(cfg).context("cannot inspect the resolved config")?;
    Ok(value
        .get(VERBOSITY)
        .and_then(|verbosity| verbosity.as_str())
        .unwrap_or_default()
        .to_string())
}
