//! Resolver settings: default manifest and configuration paths, with an
//! optional `bootstrap.toml` overlay at the project root.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MANIFEST: &str = "cfg/dependencies.xml";
pub const DEFAULT_CONFIG_FILE: &str = "cfg/config.yaml";
pub const OVERLAY_FILE: &str = "bootstrap.toml";

/// Where the resolver reads its manifest and which file it rewrites afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub config_file: PathBuf,
}

/// Optional `bootstrap.toml` in the project root.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    pub manifest: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

impl ResolverConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }

    /// Build a config for `root`, applying `bootstrap.toml` when it exists.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::new(root);
        let overlay_path = config.root.join(OVERLAY_FILE);
        if overlay_path.is_file() {
            let overlay = ConfigOverlay::read(&overlay_path)?;
            config.apply(overlay);
        }
        Ok(config)
    }

    pub fn apply(&mut self, overlay: ConfigOverlay) {
        if let Some(manifest) = overlay.manifest {
            self.manifest = manifest;
        }
        if let Some(config_file) = overlay.config_file {
            self.config_file = config_file;
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest)
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.resolve(&self.config_file)
    }

    /// Resolve a path taken from the manifest (e.g. a `target_dir`) against the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ConfigOverlay {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
