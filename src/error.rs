//! Error types for manifest loading, checkout and configuration rewriting.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// The manifest could not be read. Always fatal for a run.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("dependency manifest not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("could not read dependency manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dependency manifest {}: {message}", .path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("dependency #{index} in the manifest has no '{attribute}' attribute")]
    MissingAttribute { index: usize, attribute: &'static str },
}

/// A single dependency failed to resolve. Other dependencies are unaffected.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("filesystem operation failed on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("git operation failed for '{name}': {message}")]
    Vcs { name: String, message: String },

    #[error("'{program}' exited with {status}")]
    Tool { program: String, status: ExitStatus },

    #[error("could not launch '{program}': {source}")]
    ToolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CheckoutError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CheckoutError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Failures reading `bootstrap.toml` or rewriting the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write configuration file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
