//! Configuration file layer.
//!
//! The file is decoded with serde into the whole structure at once, using the
//! structure's own serde attributes. The decoded document is laid over the
//! structure's serialized state, so keys the document omits keep their value.
//!
//! Only what the structure serializes survives the file layer: a field marked
//! `#[serde(skip)]` is rebuilt from `Default` whenever a file is read.

use super::merge::overlay;
use crate::error::{ConfigError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            "json" => Ok(FileFormat::Json),
            _ if ext.is_empty() => Err(ConfigError::unsupported_format(path, "")),
            _ => Err(ConfigError::unsupported_format(path, &format!(".{ext}"))),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Yaml => write!(f, "yaml"),
            FileFormat::Json => write!(f, "json"),
        }
    }
}

/// Where to look for a configuration file when none is given explicitly.
///
/// Candidates are `<path>/<name>.<extension>`, checked path by path and, within
/// a path, extension by extension. A path starting with `~/` is resolved
/// against the home directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultFile {
    pub name: String,
    pub extensions: Vec<String>,
    pub paths: Vec<String>,
}

impl DefaultFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extensions: Vec::new(),
            paths: Vec::new(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Candidate file paths in probing order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        self.paths
            .iter()
            .flat_map(|dir| {
                self.extensions
                    .iter()
                    .map(move |ext| expand_home(&Path::new(dir).join(format!("{}.{}", self.name, ext))))
            })
            .collect()
    }

    /// First candidate that exists, if any.
    pub fn find(&self) -> Option<PathBuf> {
        self.candidates().into_iter().find(|path| path.exists())
    }
}

/// Replace a leading `~/` with the home directory.
///
/// Paths are returned unchanged when there is no home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Decode the file at `path` into `cfg`.
///
/// The file is closed before returning, on success and on failure.
pub fn load_into<C>(path: &Path, cfg: &mut C) -> Result<()>
where
    C: Serialize + DeserializeOwned,
{
    let file = File::open(path).map_err(|err| ConfigError::file_access(path, err))?;
    let format = FileFormat::from_path(path)?;
    debug!(path = %path.display(), %format, "reading config file");

    let reader = BufReader::new(file);
    let document: Value = match format {
        FileFormat::Yaml => {
            serde_yaml::from_reader(reader).map_err(|err| ConfigError::decode(path, err))?
        }
        FileFormat::Json => {
            serde_json::from_reader(reader).map_err(|err| ConfigError::decode(path, err))?
        }
    };

    let mut state = serde_yaml::to_value(&*cfg).map_err(|err| ConfigError::decode(path, err))?;
    overlay(&mut state, document);
    *cfg = serde_yaml::from_value(state).map_err(|err| ConfigError::decode(path, err))?;
    Ok(())
}
