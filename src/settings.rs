//! Describable configuration structures and field metadata extraction.
//!
//! A configuration structure implements [`Settings`] by listing its fields
//! together with their tags and a mutable handle into the field storage.
//! The [`settings!`](crate::settings) macro writes that impl from a struct
//! declaration; hand-written impls work the same way.
//!
//! [`extract`] flattens a structure into one [`FieldDescriptor`] per leaf
//! field, walking nested structures breadth-first and accumulating their
//! environment prefixes.

use crate::error::{ConfigError, Result};
use crate::value::{DEFAULT_SEPARATOR, FieldValue};
use std::collections::VecDeque;
use tracing::trace;

/// A configuration structure whose fields can be enumerated.
pub trait Settings {
    /// List the described fields in declaration order.
    ///
    /// Fails with [`ErrorCode::Shape`](crate::ErrorCode::Shape) when the
    /// value is not a structure after dereferencing.
    fn fields(&mut self) -> Result<Vec<Field<'_>>>;

    /// Whether every described field is zero, recursively.
    fn is_zero(&mut self) -> Result<bool> {
        for field in self.fields()? {
            let zero = match field {
                Field::Leaf { target, .. } => target.is_zero(),
                Field::Nested { target, .. } => target.is_zero()?,
            };
            if !zero {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<T: Settings + ?Sized> Settings for Box<T> {
    fn fields(&mut self) -> Result<Vec<Field<'_>>> {
        (**self).fields()
    }

    fn is_zero(&mut self) -> Result<bool> {
        (**self).is_zero()
    }
}

impl<T: Settings> Settings for Option<T> {
    fn fields(&mut self) -> Result<Vec<Field<'_>>> {
        match self {
            Some(inner) => inner.fields(),
            None => Err(ConfigError::shape(std::any::type_name::<Self>())),
        }
    }

    fn is_zero(&mut self) -> Result<bool> {
        match self {
            Some(inner) => inner.is_zero(),
            None => Ok(true),
        }
    }
}

/// Tags declared on a leaf field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tags {
    env: Vec<String>,
    default: Option<String>,
    separator: String,
    required: bool,
    flag: Option<String>,
}

impl Tags {
    pub fn new() -> Self {
        Self {
            env: Vec::new(),
            default: None,
            separator: DEFAULT_SEPARATOR.to_string(),
            required: false,
            flag: None,
        }
    }

    /// Environment variable names, comma separated, in priority order.
    pub fn env(mut self, names: impl AsRef<str>) -> Self {
        let names = names.as_ref();
        self.env = if names.is_empty() {
            Vec::new()
        } else {
            names.split(DEFAULT_SEPARATOR).map(str::to_string).collect()
        };
        self
    }

    /// Textual default applied while the field is still zero.
    pub fn env_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Separator for sequence and map values.
    pub fn env_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn env_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Name of the command-line flag feeding this field.
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.flag = Some(name.into());
        self
    }
}

impl Default for Tags {
    fn default() -> Self {
        Self::new()
    }
}

/// One field of a [`Settings`] structure.
pub enum Field<'a> {
    /// A settable value.
    Leaf {
        name: &'static str,
        tags: Tags,
        target: &'a mut dyn FieldValue,
    },
    /// A nested structure, descended into.
    Nested {
        name: &'static str,
        prefix: String,
        target: &'a mut dyn Settings,
    },
}

impl<'a> Field<'a> {
    pub fn leaf(name: &'static str, tags: Tags, target: &'a mut dyn FieldValue) -> Self {
        Field::Leaf { name, tags, target }
    }

    pub fn nested(name: &'static str, target: &'a mut dyn Settings) -> Self {
        Field::Nested {
            name,
            prefix: String::new(),
            target,
        }
    }

    /// Prefix prepended to the environment names of every field below.
    ///
    /// Has no effect on leaf fields.
    pub fn env_prefix(mut self, value: impl Into<String>) -> Self {
        if let Field::Nested { prefix, .. } = &mut self {
            *prefix = value.into();
        }
        self
    }
}

/// Resolution metadata for a single leaf field.
pub struct FieldDescriptor<'a> {
    /// Dotted field path, for diagnostics.
    pub path: String,
    pub env_names: Vec<String>,
    pub flag_name: Option<String>,
    pub default_value: Option<String>,
    pub separator: String,
    pub required: bool,
    target: &'a mut dyn FieldValue,
}

impl<'a> FieldDescriptor<'a> {
    fn new(path: String, prefix: &str, tags: Tags, target: &'a mut dyn FieldValue) -> Self {
        let env_names = tags
            .env
            .into_iter()
            .map(|name| format!("{prefix}{name}"))
            .collect();

        Self {
            path,
            env_names,
            flag_name: tags.flag,
            default_value: tags.default,
            separator: tags.separator,
            required: tags.required,
            target,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.target.is_zero()
    }

    /// Current value rendered as text.
    pub fn text(&self) -> String {
        self.target.to_text(&self.separator)
    }

    /// Coerce `raw` into the field.
    pub fn set(&mut self, raw: &str) -> Result<()> {
        self.target
            .set_text(raw, &self.separator)
            .map_err(|err| ConfigError::coercion(&self.path, err))
    }
}

impl std::fmt::Debug for FieldDescriptor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("path", &self.path)
            .field("env_names", &self.env_names)
            .field("flag_name", &self.flag_name)
            .field("default_value", &self.default_value)
            .field("separator", &self.separator)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// Flatten `root` into leaf field descriptors.
///
/// Nested structures are queued and processed after the fields of their
/// parent, so descriptors come out in breadth-first order. Two leaves that
/// end up with the same environment name are both kept and both read it.
pub fn extract<'a>(root: &'a mut dyn Settings) -> Result<Vec<FieldDescriptor<'a>>> {
    let mut queue: VecDeque<(&'a mut dyn Settings, String, String)> = VecDeque::new();
    queue.push_back((root, String::new(), String::new()));

    let mut descriptors = Vec::new();
    while let Some((node, prefix, path)) = queue.pop_front() {
        for field in node.fields()? {
            match field {
                Field::Nested {
                    name,
                    prefix: own,
                    target,
                } => {
                    queue.push_back((target, format!("{prefix}{own}"), join_path(&path, name)));
                }
                Field::Leaf { name, tags, target } => {
                    let descriptor =
                        FieldDescriptor::new(join_path(&path, name), &prefix, tags, target);
                    trace!(field = %descriptor.path, env = ?descriptor.env_names, "described field");
                    descriptors.push(descriptor);
                }
            }
        }
    }

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Inner {
        host: String,
        port: u16,
    }

    impl Settings for Inner {
        fn fields(&mut self) -> Result<Vec<Field<'_>>> {
            Ok(vec![
                Field::leaf("host", Tags::new().env("HOST"), &mut self.host),
                Field::leaf(
                    "port",
                    Tags::new().env("PORT,ALT_PORT").env_default("5432"),
                    &mut self.port,
                ),
            ])
        }
    }

    #[derive(Default)]
    struct Outer {
        name: String,
        primary: Inner,
        replica: Box<Inner>,
        tags: Vec<String>,
    }

    impl Settings for Outer {
        fn fields(&mut self) -> Result<Vec<Field<'_>>> {
            Ok(vec![
                Field::leaf("name", Tags::new().env("NAME").env_required(true), &mut self.name),
                Field::nested("primary", &mut self.primary).env_prefix("DB_"),
                Field::nested("replica", &mut self.replica).env_prefix("REPLICA_DB_"),
                Field::leaf(
                    "tags",
                    Tags::new().env("TAGS").env_separator(";").flag("tag"),
                    &mut self.tags,
                ),
            ])
        }
    }

    #[test]
    fn test_breadth_first_order_and_prefixes() {
        let mut cfg = Outer::default();
        let fields = extract(&mut cfg).unwrap();

        let paths: Vec<&str> = fields.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "name",
                "tags",
                "primary.host",
                "primary.port",
                "replica.host",
                "replica.port"
            ]
        );

        assert_eq!(fields[2].env_names, vec!["DB_HOST"]);
        assert_eq!(fields[3].env_names, vec!["DB_PORT", "DB_ALT_PORT"]);
        assert_eq!(fields[4].env_names, vec!["REPLICA_DB_HOST"]);
        assert_eq!(fields[3].default_value.as_deref(), Some("5432"));
    }

    #[test]
    fn test_tags_carried_into_descriptor() {
        let mut cfg = Outer::default();
        let fields = extract(&mut cfg).unwrap();

        assert!(fields[0].required);
        assert!(!fields[1].required);
        assert_eq!(fields[1].separator, ";");
        assert_eq!(fields[1].flag_name.as_deref(), Some("tag"));
        assert_eq!(fields[0].separator, ",");
    }

    #[test]
    fn test_descriptor_writes_through_to_structure() {
        let mut cfg = Outer::default();
        {
            let mut fields = extract(&mut cfg).unwrap();
            fields[1].set("a;b").unwrap();
            fields[3].set("0x10").unwrap();
            assert_eq!(fields[3].text(), "16");
        }
        assert_eq!(cfg.tags, vec!["a", "b"]);
        assert_eq!(cfg.primary.port, 16);
    }

    #[test]
    fn test_coercion_error_names_field() {
        let mut cfg = Outer::default();
        let mut fields = extract(&mut cfg).unwrap();
        let err = fields[3].set("not-a-port").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::Coercion);
        assert_eq!(err.field.as_deref(), Some("primary.port"));
    }

    #[test]
    fn test_absent_nested_value_is_a_shape_error() {
        let mut cfg: Option<Outer> = None;
        let err = extract(&mut cfg).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::Shape);
    }

    #[test]
    fn test_structure_zero_is_recursive() {
        let mut cfg = Outer::default();
        assert!(cfg.is_zero().unwrap());

        cfg.replica.port = 1;
        assert!(!cfg.is_zero().unwrap());

        assert!(None::<Outer>.is_zero().unwrap());
    }

    #[test]
    fn test_empty_env_tag_has_no_names() {
        let tags = Tags::new().env("");
        assert_eq!(tags, Tags::new());
    }
}
