//! Status command implementation.
//!
//! `croppass-setup status` runs every install step's probe and reports
//! which parts of the machine are already provisioned. Nothing is changed.

use serde::Serialize;

use crate::error::Result;
use crate::provision::ProvisionContext;
use crate::steps::{Phase, ProvisioningPlan};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Probe results for every install step.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub app: String,
    pub runtime: RuntimeStatus,
    pub steps: Vec<StepProbe>,
}

/// What the runtime probe found.
#[derive(Debug, Serialize)]
pub struct RuntimeStatus {
    pub command: String,
    pub present: bool,
    pub version: Option<String>,
}

/// Whether one step's desired state already holds.
#[derive(Debug, Serialize)]
pub struct StepProbe {
    pub name: String,
    pub phase: Phase,
    pub satisfied: bool,
}

impl StatusReport {
    /// Probe the machine.
    pub fn collect(ctx: &ProvisionContext<'_>) -> Self {
        let detector = ctx.detector();
        let command = ctx.runtime_command();
        let present = detector.runtime_present(command);

        let plan = ProvisioningPlan::install(ctx.manifest);
        let steps = plan
            .steps()
            .iter()
            .map(|step| StepProbe {
                name: step.name().to_string(),
                phase: step.phase(),
                satisfied: step.detect(ctx),
            })
            .collect();

        Self {
            app: ctx.manifest.app.name.clone(),
            runtime: RuntimeStatus {
                command: command.to_string(),
                present,
                version: present.then(|| detector.runtime_version(command)).flatten(),
            },
            steps,
        }
    }

    /// Whether every step is satisfied.
    pub fn complete(&self) -> bool {
        self.steps.iter().all(|s| s.satisfied)
    }
}

/// The status command implementation.
pub struct StatusCommand<'c, 'a> {
    ctx: &'c ProvisionContext<'a>,
    json: bool,
}

impl<'c, 'a> StatusCommand<'c, 'a> {
    /// Create a new status command.
    pub fn new(ctx: &'c ProvisionContext<'a>, json: bool) -> Self {
        Self { ctx, json }
    }
}

impl Command for StatusCommand<'_, '_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = StatusReport::collect(self.ctx);

        if self.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| anyhow::anyhow!("Failed to serialize status: {}", e))?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("{} - Status", report.app));

        let runtime = &report.runtime;
        match (runtime.present, &runtime.version) {
            (true, Some(version)) => {
                ui.message(&format!("Runtime: {} {}", runtime.command, version))
            }
            (true, None) => ui.message(&format!("Runtime: {}", runtime.command)),
            (false, _) => ui.message(&format!("Runtime: {} not found", runtime.command)),
        }
        ui.message("");

        for step in &report.steps {
            if step.satisfied {
                ui.success(&format!("{} ({})", step.name, step.phase));
            } else {
                ui.warning(&format!("{} ({}): not provisioned", step.name, step.phase));
            }
        }

        if !report.complete() {
            ui.message("");
            ui.message("Run `croppass-setup install` to provision the missing parts.");
        }

        Ok(CommandResult::success())
    }
}
