//! Package manager repair and dependency installation.
//!
//! The package manager is repaired in two tiers. The runtime's own
//! bootstrap module is tried first; if the package manager is still
//! unusable, the standalone bootstrap script is downloaded and run. Only
//! when both tiers leave it broken is the failure reported.

use crate::error::{ProvisionError, Result};
use crate::shell::{display_command, CommandResult};
use crate::steps::StepOutcome;

use super::{Dependency, ProvisionContext};

/// File name the bootstrap script is saved under.
const BOOTSTRAP_FILE_NAME: &str = "get-pip.py";

/// Repairs the package manager and installs or removes dependencies.
pub struct PackageInstaller<'c, 'a> {
    ctx: &'c ProvisionContext<'a>,
}

impl<'c, 'a> PackageInstaller<'c, 'a> {
    /// Create an installer over `ctx`.
    pub fn new(ctx: &'c ProvisionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Make sure the package manager answers, repairing it if needed.
    ///
    /// # Errors
    ///
    /// Returns `PackageManagerUnrecoverable`, carrying the output of both
    /// repair attempts, when neither restores it.
    pub fn ensure_healthy(&self) -> Result<StepOutcome> {
        let detector = self.ctx.detector();
        let command = self.ctx.runtime_command();

        if detector.package_manager_healthy(command) {
            return Ok(StepOutcome::skipped("pip is healthy"));
        }

        tracing::warn!("pip is not usable, repairing with ensurepip");
        let ensurepip = self.attempt(command, &["-m", "ensurepip", "--upgrade"]);
        if detector.package_manager_healthy(command) {
            return Ok(StepOutcome::done("repaired by ensurepip"));
        }

        tracing::warn!("ensurepip did not restore pip, running the bootstrap script");
        let bootstrap = match self
            .ctx
            .fetcher()
            .fetch_to_temp(&self.ctx.manifest.bootstrap_url, BOOTSTRAP_FILE_NAME)
        {
            Ok(script) => {
                let path = script.path().to_string_lossy().to_string();
                self.attempt(command, &[path.as_str()])
            }
            Err(e) => e.to_string(),
        };
        if detector.package_manager_healthy(command) {
            return Ok(StepOutcome::done("repaired by bootstrap script"));
        }

        Err(ProvisionError::PackageManagerUnrecoverable {
            message: "pip is still unusable after ensurepip and the bootstrap script".to_string(),
            output: format!(
                "ensurepip:\n{}\n\nbootstrap script:\n{}",
                ensurepip, bootstrap
            ),
        })
    }

    /// Install every dependency in one package manager invocation.
    ///
    /// Skipped when all of them are already installed. The package manager
    /// upgrades itself first; a failed self-upgrade is only a warning.
    ///
    /// # Errors
    ///
    /// Returns `DependencyInstallError` if the batched install fails.
    pub fn install(&self, deps: &[Dependency]) -> Result<StepOutcome> {
        if deps.is_empty() {
            return Ok(StepOutcome::skipped("no dependencies"));
        }

        let command = self.ctx.runtime_command();
        if self.ctx.detector().dependencies_installed(command, deps) {
            return Ok(StepOutcome::skipped(format!(
                "{} dependencies already installed",
                deps.len()
            )));
        }

        match self.run(command, &["-m", "pip", "install", "--upgrade", "pip"]) {
            Ok(result) if result.success => {}
            Ok(result) => tracing::warn!(
                "Upgrading pip failed (exit code {:?}), continuing",
                result.exit_code
            ),
            Err(e) => tracing::warn!("Upgrading pip failed: {}, continuing", e),
        }

        let mut args = vec!["-m", "pip", "install"];
        args.extend(deps.iter().map(|d| d.identifier.as_str()));
        let result = self
            .run(command, &args)
            .map_err(|e| ProvisionError::DependencyInstallError {
                code: None,
                output: e.to_string(),
            })?;

        if !result.success {
            return Err(ProvisionError::DependencyInstallError {
                code: result.exit_code,
                output: result.combined_output(),
            });
        }

        Ok(StepOutcome::done(format!("installed {}", join(deps))))
    }

    /// Remove the dependencies that are installed, in one invocation.
    ///
    /// # Errors
    ///
    /// Returns `DependencyRemoveError` if the package manager reports failure.
    pub fn uninstall(&self, deps: &[Dependency]) -> Result<StepOutcome> {
        let detector = self.ctx.detector();
        let command = self.ctx.runtime_command();

        if !detector.runtime_present(command) {
            return Ok(StepOutcome::skipped(format!("{} is not installed", command)));
        }

        let installed = detector.installed_dependencies(command, deps);
        if installed.is_empty() {
            return Ok(StepOutcome::skipped("no dependencies installed"));
        }

        let mut args = vec!["-m", "pip", "uninstall", "-y"];
        args.extend(installed.iter().map(|d| d.identifier.as_str()));
        let result = self
            .run(command, &args)
            .map_err(|e| ProvisionError::DependencyRemoveError {
                code: None,
                output: e.to_string(),
            })?;

        if !result.success {
            return Err(ProvisionError::DependencyRemoveError {
                code: result.exit_code,
                output: result.combined_output(),
            });
        }

        Ok(StepOutcome::done(format!("removed {}", join(&installed))))
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        tracing::info!("Running {}", display_command(program, &args));
        self.ctx.runner.run(program, &args)
    }

    /// Run a repair attempt and keep whatever it printed for diagnostics.
    fn attempt(&self, program: &str, args: &[&str]) -> String {
        match self.run(program, args) {
            Ok(result) if result.success => result.combined_output(),
            Ok(result) => format!(
                "exit code {:?}\n{}",
                result.exit_code,
                result.combined_output()
            )
            .trim_end()
            .to_string(),
            Err(e) => e.to_string(),
        }
    }
}

fn join(deps: &[Dependency]) -> String {
    deps.iter()
        .map(|d| d.identifier.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
