use std::{
  io,
  path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors raised while loading, validating or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Invalid keys, values or file formats.
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Template error: {0}")]
  Template(String),

  #[error("Failed to access config file {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse JSON config from {}: {source}", path.display())]
  Serde {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to parse TOML config from {}: {source}", path.display())]
  Toml {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

impl ConfigError {
  /// Adapter for `map_err` that attaches `path` to an I/O failure.
  pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self {
    move |source| {
      Self::Io {
        path: path.to_path_buf(),
        source,
      }
    }
  }
}
