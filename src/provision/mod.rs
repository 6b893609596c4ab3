//! Provisioners that change machine state.
//!
//! Each provisioner checks its probe first and returns
//! [`StepOutcome::Skipped`](crate::steps::StepOutcome::Skipped) when there is
//! nothing to do:
//! - [`runtime`] installs the language runtime
//! - [`packages`] repairs the package manager and installs dependencies
//! - [`launcher`] writes and removes desktop launchers

pub mod launcher;
pub mod packages;
pub mod runtime;

pub use launcher::{launcher_path, LauncherEntry, LauncherManager};
pub use packages::PackageInstaller;
pub use runtime::RuntimeProvisioner;

use std::path::PathBuf;

use crate::config::ResolvedManifest;
use crate::detection::Detector;
use crate::fetch::{Fetcher, Transport};
use crate::shell::CommandRunner;

/// A package the application imports.
///
/// Dependencies are flat names handed to the package manager; versions are
/// whatever the package index currently serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// Name as passed to the package manager.
    pub identifier: String,
}

impl Dependency {
    /// Create a dependency from its package name.
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

/// Everything a provisioning step needs to probe and act.
pub struct ProvisionContext<'a> {
    /// Resolved manifest for this run.
    pub manifest: &'a ResolvedManifest,
    /// Runs the runtime, its package manager, and installers.
    pub runner: &'a dyn CommandRunner,
    /// Downloads installers, bootstrap scripts, and assets.
    pub transport: &'a dyn Transport,
    /// Prepend directories to the process PATH.
    pub prepend_path: &'a dyn Fn(&[PathBuf]),
}

impl<'a> ProvisionContext<'a> {
    /// Probes over this context's runner.
    pub fn detector(&self) -> Detector<'a> {
        Detector::new(self.runner)
    }

    /// Fetcher over this context's transport.
    pub fn fetcher(&self) -> Fetcher<'a> {
        Fetcher::new(self.transport)
    }

    /// Runtime command from the manifest.
    pub fn runtime_command(&self) -> &'a str {
        &self.manifest.runtime.command
    }
}
