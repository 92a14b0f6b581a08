//! Domain-specific errors.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures surfaced by discovery, reading, and writing during a bundle run.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("path does not exist: {}", .path.display())]
    Path { path: PathBuf },
    #[error("access denied: {}", .path.display())]
    Permission { path: PathBuf },
    #[error("output option missing")]
    MissingOutput,
    #[error("i/o failure at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BundleError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => BundleError::Path { path },
            io::ErrorKind::PermissionDenied => BundleError::Permission { path },
            _ => BundleError::Io { path, source },
        }
    }

    /// Short categorized message shown to the user.
    pub fn headline(&self) -> &'static str {
        match self {
            BundleError::Path { .. } => "Error path is invalid",
            BundleError::Permission { .. } => "Access to this path is denied",
            BundleError::MissingOutput => "Output option missing",
            BundleError::Io { .. } => "Failed to bundle files",
        }
    }
}

/// Failures raised while driving the response wizard.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("input closed while waiting for {prompt}")]
    InputClosed { prompt: &'static str },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Error returned when a string is not one of the known language tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LanguageParseError {
    #[error("unknown language token '{0}'")]
    Unknown(String),
}
