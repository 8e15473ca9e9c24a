//! # Pool Manifest
//!
//! The declarative list of pools to create when a session starts.
//!
//! ```toml
//! [[pool]]
//! id = "MissileTrail"
//! start_count = 40
//! prototype = "trail"
//! target = "effects"
//! ```
//!
//! Records are kept in file order. Validation (does the prototype exist?) is
//! the manager's job, not the parser's: a bad record is skipped at startup,
//! it does not reject the whole file.

use std::path::{Path, PathBuf};

use respawn_shared::DEFAULT_PRELOAD_AMOUNT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a manifest.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid TOML or has the wrong shape.
    #[error("invalid manifest: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One pool declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    /// Pool id. Derived from the prototype when absent or empty.
    #[serde(default)]
    pub id: Option<String>,
    /// Instances to construct up front.
    #[serde(default = "default_start_count")]
    pub start_count: usize,
    /// Prototype name in the catalog.
    #[serde(default)]
    pub prototype: Option<String>,
    /// Anchor name spawned instances attach to.
    #[serde(default)]
    pub target: Option<String>,
}

const fn default_start_count() -> usize {
    DEFAULT_PRELOAD_AMOUNT
}

/// Ordered list of pool declarations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolManifest {
    /// The `[[pool]]` tables.
    #[serde(default, rename = "pool")]
    pub pools: Vec<PoolRecord>,
}

impl PoolManifest {
    /// Parses a manifest from TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed input.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`]
    /// if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Number of declared pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Checks whether no pool is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
