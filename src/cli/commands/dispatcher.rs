//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing the parsed command line

use std::path::{Path, PathBuf};

use crate::cli::args::{Action, Cli};
use crate::config::{load_resolved, InterpolationContext};
use crate::error::Result;
use crate::fetch::HttpTransport;
use crate::provision::ProvisionContext;
use crate::runner::RunOptions;
use crate::shell::{prepend_to_process_path, ProcessRunner};
use crate::steps::PlanMode;
use crate::ui::UserInterface;

use super::provision::ProvisionCommand;
use super::status::StatusCommand;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Result for a process exit code.
    pub fn from_exit_code(exit_code: i32) -> Self {
        if exit_code == 0 {
            Self::success()
        } else {
            Self::failure(exit_code)
        }
    }
}

/// Dispatches the parsed command line to its command.
pub struct CommandDispatcher {
    manifest_path: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a dispatcher; `manifest_path` overrides the built-in manifest.
    pub fn new(manifest_path: Option<PathBuf>) -> Self {
        Self { manifest_path }
    }

    /// Manifest file override, if any.
    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    /// Load the manifest, wire up the real process runner and HTTP
    /// transport, and run the command.
    ///
    /// # Errors
    ///
    /// Manifest and transport setup errors. Step failures are not errors;
    /// they show up in the exit code.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let manifest = load_resolved(
            self.manifest_path(),
            &InterpolationContext::from_environment(),
        )?;
        let runner = ProcessRunner::new();
        let transport = HttpTransport::from_settings(&manifest.settings)?;

        let ctx = ProvisionContext {
            manifest: &manifest,
            runner: &runner,
            transport: &transport,
            prepend_path: &prepend_to_process_path,
        };

        self.dispatch_with(cli, &ctx, ui)
    }

    /// Run the command against an already assembled context.
    pub fn dispatch_with(
        &self,
        cli: &Cli,
        ctx: &ProvisionContext<'_>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let options = RunOptions {
            dry_run: cli.dry_run,
        };

        match cli.action() {
            Action::Install => ProvisionCommand::new(ctx, PlanMode::Install, options).execute(ui),
            Action::Uninstall => {
                ProvisionCommand::new(ctx, PlanMode::Uninstall, options).execute(ui)
            }
            Action::Status(json) => StatusCommand::new(ctx, json).execute(ui),
        }
    }
}
