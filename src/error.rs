//! Structured error types for configuration resolution.

use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use std::num::{ParseFloatError, ParseIntError, TryFromIntError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed error used by custom setters and as an error source.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Shape of the configuration value
    Shape,

    // File layer
    UnsupportedFormat,
    FileAccess,
    Decode,

    // Field layer
    Coercion,
    RequiredField,
}

/// Error returned by every resolution entry point.
#[derive(Debug)]
pub struct ConfigError {
    pub code: ErrorCode,
    pub message: String,
    /// Dotted path of the field involved, if any.
    pub field: Option<String>,
    /// Configuration file involved, if any.
    pub path: Option<PathBuf>,
    source: Option<BoxError>,
}

impl ConfigError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            path: None,
            source: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    // Convenience constructors

    pub fn shape(type_name: &str) -> Self {
        Self::new(
            ErrorCode::Shape,
            format!("wrong type {}: expected a configuration structure", type_name),
        )
    }

    pub fn unsupported_format(path: &Path, ext: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedFormat,
            format!("file format '{}' is not supported by the parser", ext),
        )
        .with_path(path)
    }

    pub fn file_access(path: &Path, err: std::io::Error) -> Self {
        Self::new(
            ErrorCode::FileAccess,
            format!("cannot read config file {}: {}", path.display(), err),
        )
        .with_path(path)
        .with_source(err)
    }

    pub fn decode(path: &Path, err: impl StdError + Send + Sync + 'static) -> Self {
        Self::new(
            ErrorCode::Decode,
            format!("config file parsing error: {}", err),
        )
        .with_path(path)
        .with_source(err)
    }

    pub fn coercion(field: &str, err: CoerceError) -> Self {
        Self::new(
            ErrorCode::Coercion,
            format!("cannot set field {:?}: {}", field, err),
        )
        .with_field(field)
        .with_source(err)
    }

    pub fn required(field: &str) -> Self {
        Self::new(
            ErrorCode::RequiredField,
            format!("field {:?} is required but the value is not provided", field),
        )
        .with_field(field)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn StdError + 'static))
    }
}

/// Failure to turn a textual value into a field's type.
///
/// Independent of any field; [`ConfigError::coercion`] attaches the path.
#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("invalid boolean value {value:?}")]
    Bool { value: String },

    #[error("invalid {type_name} value {value:?}: {source}")]
    Int {
        value: String,
        type_name: &'static str,
        #[source]
        source: ParseIntError,
    },

    #[error("value {value:?} is out of range for {type_name}: {source}")]
    IntRange {
        value: String,
        type_name: &'static str,
        #[source]
        source: TryFromIntError,
    },

    #[error("invalid {type_name} value {value:?}: {source}")]
    Float {
        value: String,
        type_name: &'static str,
        #[source]
        source: ParseFloatError,
    },

    #[error("value {value:?} is out of range for {type_name}")]
    FloatRange {
        value: String,
        type_name: &'static str,
    },

    #[error("invalid char value {value:?}: expected exactly one character")]
    Char { value: String },

    #[error("invalid map item: {pair:?}")]
    MapItem { pair: String },

    #[error("invalid {type_name} value {value:?}: {source}")]
    Setter {
        value: String,
        type_name: &'static str,
        #[source]
        source: BoxError,
    },
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
