//! Command-line flag layer.
//!
//! Flags are registered by the caller; this layer only reads them through
//! [`FlagSource`]. Two sources are provided: [`FlagSet`], an in-memory
//! registry, and [`ClapFlags`], a view over a parsed clap command line.

use crate::error::Result;
use crate::settings::FieldDescriptor;
use clap::parser::ValueSource;
use clap::{ArgMatches, Command};
use heck::ToSnakeCase;
use std::collections::HashMap;
use tracing::trace;

/// State of one registered flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagValue {
    /// Current value as text.
    pub value: String,
    /// Declared default as text, empty when there is none.
    pub default: String,
    /// Whether the value was given explicitly.
    pub changed: bool,
}

/// Read-only access to registered flags.
pub trait FlagSource {
    fn lookup(&self, name: &str) -> Option<FlagValue>;
}

/// In-memory flag registry.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    flags: HashMap<String, FlagValue>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flag with a default value.
    pub fn define(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        let default = default.into();
        self.flags.insert(
            name.into(),
            FlagValue {
                value: default.clone(),
                default,
                changed: false,
            },
        );
        self
    }

    /// Set a flag explicitly, registering it without a default if needed.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let flag = self.flags.entry(name.into()).or_default();
        flag.value = value.into();
        flag.changed = true;
        self
    }
}

impl FlagSource for FlagSet {
    fn lookup(&self, name: &str) -> Option<FlagValue> {
        self.flags.get(name).cloned()
    }
}

/// Flags of a clap command line.
///
/// A flag name matches an argument by id, by long name, or by the snake_case
/// form of the name (`no-default` finds the derive-generated id `no_default`).
/// Multiple values are joined with `,`. `matches` must come from `command`.
#[derive(Debug, Clone, Copy)]
pub struct ClapFlags<'a> {
    command: &'a Command,
    matches: &'a ArgMatches,
}

impl<'a> ClapFlags<'a> {
    pub fn new(command: &'a Command, matches: &'a ArgMatches) -> Self {
        Self { command, matches }
    }
}

impl FlagSource for ClapFlags<'_> {
    fn lookup(&self, name: &str) -> Option<FlagValue> {
        let snake = name.to_snake_case();
        let arg = self.command.get_arguments().find(|arg| {
            let id = arg.get_id().as_str();
            id == name || arg.get_long() == Some(name) || id == snake
        })?;
        let id = arg.get_id().as_str();

        let default = arg
            .get_default_values()
            .iter()
            .map(|value| value.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(",");

        let value = self
            .matches
            .try_get_raw(id)
            .ok()
            .flatten()
            .map(|values| {
                values
                    .map(|value| value.to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();

        let changed = self.matches.value_source(id) == Some(ValueSource::CommandLine);

        Some(FlagValue {
            value,
            default,
            changed,
        })
    }
}

/// Apply flag values.
///
/// An explicitly set flag always wins. An unset flag's non-empty default
/// applies when the field is zero or still holds its declared default, so a
/// flag default outranks a declared default but never an environment value.
/// Otherwise a zero field falls back to its declared default.
pub fn apply(fields: &mut [FieldDescriptor<'_>], flags: &dyn FlagSource) -> Result<()> {
    for field in fields.iter_mut() {
        let mut raw = None;

        if let Some(name) = field.flag_name.as_deref().filter(|name| !name.is_empty())
            && let Some(flag) = flags.lookup(name)
        {
            if flag.changed {
                trace!(field = %field.path, flag = %name, "value from flag");
                raw = Some(flag.value);
            } else if !flag.default.is_empty()
                && (field.is_zero() || field.default_value.as_deref() == Some(field.text().as_str()))
            {
                trace!(field = %field.path, flag = %name, "value from flag default");
                raw = Some(flag.default);
            }
        }

        if raw.is_none() && field.is_zero() {
            raw = field.default_value.clone();
        }

        if let Some(raw) = raw {
            field.set(&raw)?;
        }
    }

    Ok(())
}
