//! Language runtime installation.

use crate::error::{ProvisionError, Result};
use crate::shell::{display_command, missing_entries, parse_system_path};
use crate::steps::StepOutcome;

use super::ProvisionContext;

/// Installs the runtime with its vendor installer when it is missing.
pub struct RuntimeProvisioner<'c, 'a> {
    ctx: &'c ProvisionContext<'a>,
}

impl<'c, 'a> RuntimeProvisioner<'c, 'a> {
    /// Create a provisioner over `ctx`.
    pub fn new(ctx: &'c ProvisionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Make sure the runtime resolves on the execution path.
    ///
    /// When it does not, the installer is downloaded to a temporary
    /// directory, run silently to completion, and discarded. The process
    /// `PATH` is then refreshed from the manifest's path hints and the
    /// runtime is probed again.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` if the installer cannot be downloaded and
    /// `InstallerError` if it fails or the runtime is still missing after it
    /// reported success.
    pub fn ensure_runtime(&self) -> Result<StepOutcome> {
        let detector = self.ctx.detector();
        let command = self.ctx.runtime_command();

        if detector.runtime_present(command) {
            let version = detector
                .runtime_version(command)
                .map(|v| format!(" {}", v))
                .unwrap_or_default();
            return Ok(StepOutcome::skipped(format!("{}{} found", command, version)));
        }

        tracing::info!("{} not found, installing", command);
        let installer = &self.ctx.manifest.runtime.installer;
        let download = self
            .ctx
            .fetcher()
            .fetch_to_temp(&installer.url, &installer.file_name)?;

        let (program, args) = installer.command_line(download.path())?;
        tracing::info!("Running {}", display_command(&program, &args));
        let result = self
            .ctx
            .runner
            .run(&program, &args)
            .map_err(|e| ProvisionError::InstallerError {
                code: None,
                message: e.to_string(),
                output: String::new(),
            })?;
        drop(download);

        if !result.success {
            return Err(ProvisionError::InstallerError {
                code: result.exit_code,
                message: format!("{} exited unsuccessfully", installer.file_name),
                output: result.combined_output(),
            });
        }

        self.refresh_path();

        if !detector.runtime_present(command) {
            return Err(ProvisionError::InstallerError {
                code: result.exit_code,
                message: format!(
                    "installer finished but {} still does not resolve on PATH",
                    command
                ),
                output: result.combined_output(),
            });
        }

        let version = detector.runtime_version(command).unwrap_or_default();
        Ok(StepOutcome::done(format!("installed {} {}", command, version).trim_end().to_string()))
    }

    /// Prepend path hints the installer populated but `PATH` lacks.
    fn refresh_path(&self) {
        let missing = missing_entries(&self.ctx.manifest.runtime.path_hints, &parse_system_path());
        if missing.is_empty() {
            tracing::debug!("PATH already covers the runtime's directories");
            return;
        }
        (self.ctx.prepend_path)(&missing);
    }
}
