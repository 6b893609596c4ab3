//! Install and uninstall commands.
//!
//! Both build a plan from the manifest, hand it to the orchestrator, and
//! turn the run report into a summary and an exit code.

use crate::error::Result;
use crate::provision::ProvisionContext;
use crate::runner::{Orchestrator, RunOptions, RunReport};
use crate::steps::{PlanMode, ProvisioningPlan, StepStatus};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Runs an install or uninstall plan.
pub struct ProvisionCommand<'c, 'a> {
    ctx: &'c ProvisionContext<'a>,
    mode: PlanMode,
    options: RunOptions,
}

impl<'c, 'a> ProvisionCommand<'c, 'a> {
    /// Create a command for `mode`.
    pub fn new(ctx: &'c ProvisionContext<'a>, mode: PlanMode, options: RunOptions) -> Self {
        Self { ctx, mode, options }
    }

    fn header(&self) -> String {
        let app = &self.ctx.manifest.app.name;
        let title = match self.mode {
            PlanMode::Install => format!("{} setup", app),
            PlanMode::Uninstall => format!("{} removal", app),
        };
        if self.options.dry_run {
            format!("{} (dry run)", title)
        } else {
            title
        }
    }

    fn conclude(&self, report: &RunReport, ui: &mut dyn UserInterface) {
        let app = &self.ctx.manifest.app.name;

        if let Some(step) = &report.halted_by {
            ui.error(&format!(
                "Setup stopped at {}. Fix the problem above and run setup again.",
                step
            ));
        } else if report.has_failures() {
            ui.warning(&format!(
                "{} step(s) failed. Run setup again to retry them.",
                report.count(StepStatus::Failed)
            ));
        } else if self.options.dry_run {
            ui.message("Dry run complete; nothing was changed.");
        } else {
            match self.mode {
                PlanMode::Install => ui.success(&format!("{} is ready to use.", app)),
                PlanMode::Uninstall => ui.success(&format!("{} has been removed.", app)),
            }
        }
    }
}

impl Command for ProvisionCommand<'_, '_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header(&self.header());

        let plan = ProvisioningPlan::new(self.mode, self.ctx.manifest);
        tracing::debug!("Planned {} step(s) for {}", plan.len(), self.mode);

        let report = Orchestrator::new(self.options).run(&plan, self.ctx, ui);
        ui.show_run_summary(&report.summary());
        self.conclude(&report, ui);

        Ok(CommandResult::from_exit_code(report.exit_code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryTransport;
    use crate::provision::fixtures::{self, ASSET_URL};
    use crate::shell::{CommandResult as ProcessResult, ScriptedRunner};
    use crate::ui::MockUI;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const PIP_OK: &str = "pip 24.0 from /usr/lib/python3/site-packages/pip (python 3.11)";
    const SHOW_ALL: &str = "Name: deepface\n---\nName: numpy\n";

    fn installed_machine() -> ScriptedRunner {
        ScriptedRunner::new()
            .on("python3 --version", ProcessResult::success("Python 3.11.9", ""))
            .on("python3 -m pip --version", ProcessResult::success(PIP_OK, ""))
            .on("python3 -m pip show", ProcessResult::success(SHOW_ALL, ""))
    }

    fn execute(
        runner: &ScriptedRunner,
        transport: &MemoryTransport,
        mode: PlanMode,
        options: RunOptions,
    ) -> (CommandResult, MockUI) {
        let root = TempDir::new().unwrap();
        let manifest = fixtures::manifest(root.path());
        let noop = |_: &[PathBuf]| {};
        let ctx = ProvisionContext {
            manifest: &manifest,
            runner,
            transport,
            prepend_path: &noop,
        };
        let mut ui = MockUI::new();
        let result = ProvisionCommand::new(&ctx, mode, options)
            .execute(&mut ui)
            .unwrap();
        (result, ui)
    }

    #[test]
    fn install_reports_ready_and_summary() {
        let runner = installed_machine();
        let transport = MemoryTransport::new().with(ASSET_URL, b"weights");

        let (result, ui) = execute(&runner, &transport, PlanMode::Install, RunOptions::default());

        assert!(result.success);
        assert_eq!(ui.headers(), ["CropPass setup"]);
        assert_eq!(ui.summaries()[0].title, "Install summary");
        assert_eq!(ui.successes(), ["CropPass is ready to use."]);
    }

    #[test]
    fn halted_install_exits_one_with_error() {
        let runner = ScriptedRunner::new();
        let transport = MemoryTransport::new();

        let (result, ui) = execute(&runner, &transport, PlanMode::Install, RunOptions::default());

        assert_eq!(result.exit_code, 1);
        assert!(ui.errors()[0].contains("python3 runtime"));
    }

    #[test]
    fn non_fatal_failure_exits_two_with_warning() {
        let runner = installed_machine();
        let transport = MemoryTransport::new();

        let (result, ui) = execute(&runner, &transport, PlanMode::Install, RunOptions::default());

        assert_eq!(result.exit_code, 2);
        assert_eq!(ui.warnings().len(), 1);
    }

    #[test]
    fn dry_run_changes_nothing() {
        let runner = ScriptedRunner::new();
        let transport = MemoryTransport::new();

        let (result, ui) = execute(
            &runner,
            &transport,
            PlanMode::Install,
            RunOptions { dry_run: true },
        );

        assert!(result.success);
        assert_eq!(ui.headers(), ["CropPass setup (dry run)"]);
        assert_eq!(transport.request_count(), 0);
        assert_eq!(runner.count("runtime-setup"), 0);
    }
}
