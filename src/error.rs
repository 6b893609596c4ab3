//! Error types for provisioning operations.
//!
//! This module defines [`ProvisionError`], the error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Probes never produce errors; an inconclusive probe reads as "absent"
//! - Whether an error halts a plan is decided by the failing step's
//!   policy, not by the error kind
//! - Errors that come from an external tool carry its captured output so
//!   the operator can see why it failed

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for provisioning operations.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Manifest file not found at the given location.
    #[error("Manifest not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a manifest.
    #[error("Failed to parse manifest at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Manifest parsed but its values are unusable.
    #[error("Invalid manifest: {message}")]
    ConfigValidationError { message: String },

    /// A download could not complete.
    #[error("Download of {url} failed: {message}")]
    NetworkError { url: String, message: String },

    /// A download completed but its content did not match the pinned digest.
    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    IntegrityError {
        url: String,
        expected: String,
        actual: String,
    },

    /// The runtime installer exited unsuccessfully.
    #[error("Runtime installer failed (exit code {code:?}): {message}")]
    InstallerError {
        code: Option<i32>,
        message: String,
        output: String,
    },

    /// Both self-heal tiers ran and the package manager is still unusable.
    #[error("Package manager could not be repaired: {message}")]
    PackageManagerUnrecoverable { message: String, output: String },

    /// The batched dependency install failed.
    #[error("Dependency install failed (exit code {code:?})")]
    DependencyInstallError { code: Option<i32>, output: String },

    /// The batched dependency removal failed.
    #[error("Dependency removal failed (exit code {code:?})")]
    DependencyRemoveError { code: Option<i32>, output: String },

    /// Writing or removing a provisioned file failed.
    #[error("Filesystem operation on {path} failed: {source}")]
    FilesystemError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external program could not be started at all.
    #[error("Could not run '{program}': {message}")]
    CommandFailed { program: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProvisionError {
    /// Captured output of the external tool behind this error, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        let output = match self {
            ProvisionError::InstallerError { output, .. }
            | ProvisionError::PackageManagerUnrecoverable { output, .. }
            | ProvisionError::DependencyInstallError { output, .. }
            | ProvisionError::DependencyRemoveError { output, .. } => output.as_str(),
            _ => return None,
        };
        if output.trim().is_empty() {
            None
        } else {
            Some(output)
        }
    }

    /// Wrap an IO error with the path it happened on.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProvisionError::FilesystemError {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
