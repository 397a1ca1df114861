//! Environment variable layer.

use crate::error::Result;
use crate::settings::FieldDescriptor;
use std::collections::HashMap;
use tracing::trace;

/// Source of environment variables.
///
/// Lets resolution run against something other than the process environment.
pub trait EnvSource {
    /// Value of `name`, or `None` when it is not set.
    ///
    /// A variable set to the empty string is set.
    fn get(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

/// Environment backed by a map.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Apply environment values, falling back to declared defaults.
///
/// The first of a field's names that is set wins. Without one, a zero field
/// takes its default; anything else is left untouched.
pub fn apply(fields: &mut [FieldDescriptor<'_>], env: &dyn EnvSource) -> Result<()> {
    for field in fields.iter_mut() {
        let found = field
            .env_names
            .iter()
            .find_map(|name| env.get(name).map(|value| (name.clone(), value)));

        let raw = match found {
            Some((name, value)) => {
                trace!(field = %field.path, env = %name, "value from environment");
                value
            }
            None => match &field.default_value {
                Some(default) if field.is_zero() => default.clone(),
                _ => continue,
            },
        };

        field.set(&raw)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Field, Settings, Tags, extract};

    #[derive(Default)]
    struct Combined {
        empty: i32,
        with_default: i32,
        global: i32,
        aliases: String,
    }

    impl Settings for Combined {
        fn fields(&mut self) -> Result<Vec<Field<'_>>> {
            Ok(vec![
                Field::leaf("empty", Tags::new(), &mut self.empty),
                Field::leaf(
                    "with_default",
                    Tags::new().env("TEST0").env_default("1"),
                    &mut self.with_default,
                ),
                Field::leaf(
                    "global",
                    Tags::new().env("TEST1").env_default("1"),
                    &mut self.global,
                ),
                Field::leaf("aliases", Tags::new().env("FIRST,SECOND"), &mut self.aliases),
            ])
        }
    }

    fn apply_to(cfg: &mut Combined, env: &MapEnv) -> Result<()> {
        let mut fields = extract(cfg)?;
        apply(&mut fields, env)
    }

    #[test]
    fn test_env_value_then_default() {
        let env = MapEnv::from_pairs([("TEST1", "2"), ("TEST2", "3")]);
        let mut cfg = Combined::default();
        apply_to(&mut cfg, &env).unwrap();

        assert_eq!(cfg.empty, 0);
        assert_eq!(cfg.with_default, 1);
        assert_eq!(cfg.global, 2);
    }

    #[test]
    fn test_first_set_name_wins() {
        let env = MapEnv::from_pairs([("FIRST", "a"), ("SECOND", "b")]);
        let mut cfg = Combined::default();
        apply_to(&mut cfg, &env).unwrap();
        assert_eq!(cfg.aliases, "a");

        let env = MapEnv::from_pairs([("SECOND", "b")]);
        let mut cfg = Combined::default();
        apply_to(&mut cfg, &env).unwrap();
        assert_eq!(cfg.aliases, "b");
    }

    #[test]
    fn test_empty_value_counts_as_set() {
        let mut env = MapEnv::new();
        env.set("FIRST", "");
        env.set("SECOND", "b");

        let mut cfg = Combined {
            aliases: "from file".into(),
            ..Combined::default()
        };
        apply_to(&mut cfg, &env).unwrap();
        assert_eq!(cfg.aliases, "");
    }

    #[test]
    fn test_default_skipped_when_field_already_set() {
        let mut cfg = Combined {
            with_default: 7,
            ..Combined::default()
        };
        apply_to(&mut cfg, &MapEnv::new()).unwrap();
        assert_eq!(cfg.with_default, 7);
    }

    #[test]
    fn test_invalid_value_stops_resolution() {
        let env = MapEnv::from_pairs([("TEST0", "a"), ("TEST1", "2")]);
        let mut cfg = Combined::default();
        let err = apply_to(&mut cfg, &env).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("with_default"));
        // Fields after the failing one are not reached
        assert_eq!(cfg.global, 0);
    }
}
