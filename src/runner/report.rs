//! Run reports.

use serde::Serialize;
use std::time::Duration;

use crate::steps::{Phase, PlanMode, StepStatus};
use crate::ui::{RunSummary, StepSummary};

/// State of the orchestrator's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    RuntimeCheck,
    PackageManagerHeal,
    DependencyInstall,
    AssetFetch,
    LauncherCreate,
    LauncherRemove,
    AssetRemove,
    PackageRemove,
    Done,
    /// A fatal step failed; nothing after it ran.
    Halted,
}

impl From<Phase> for RunState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::RuntimeCheck => RunState::RuntimeCheck,
            Phase::PackageManagerHeal => RunState::PackageManagerHeal,
            Phase::DependencyInstall => RunState::DependencyInstall,
            Phase::AssetFetch => RunState::AssetFetch,
            Phase::LauncherCreate => RunState::LauncherCreate,
            Phase::LauncherRemove => RunState::LauncherRemove,
            Phase::AssetRemove => RunState::AssetRemove,
            Phase::PackageRemove => RunState::PackageRemove,
        }
    }
}

/// What happened to one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub name: String,
    pub phase: Phase,
    pub status: StepStatus,
    /// Outcome detail or skip reason.
    pub detail: Option<String>,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    /// Error message, for failed steps.
    pub error: Option<String>,
}

/// Result of driving a plan to completion or to a halt.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: PlanMode,
    pub dry_run: bool,
    pub final_state: RunState,
    /// States entered, in order, starting at `Idle`.
    pub states: Vec<RunState>,
    pub steps: Vec<StepReport>,
    /// Step whose failure halted the run.
    pub halted_by: Option<String>,
    #[serde(with = "duration_millis")]
    pub total_duration: Duration,
}

impl RunReport {
    /// Number of steps that ended with `status`.
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Whether the run halted on a fatal failure.
    pub fn halted(&self) -> bool {
        self.final_state == RunState::Halted
    }

    /// Whether any step failed.
    pub fn has_failures(&self) -> bool {
        self.count(StepStatus::Failed) > 0
    }

    /// Process exit code for this run.
    ///
    /// `0` when everything succeeded or was already in place, `1` when a
    /// fatal step halted the run, `2` when the run finished with recorded
    /// failures.
    pub fn exit_code(&self) -> i32 {
        if self.halted() {
            1
        } else if self.has_failures() {
            2
        } else {
            0
        }
    }

    /// Summary for display.
    pub fn summary(&self) -> RunSummary {
        let title = match (self.mode, self.dry_run) {
            (PlanMode::Install, false) => "Install summary",
            (PlanMode::Uninstall, false) => "Uninstall summary",
            (PlanMode::Install, true) => "Install dry run",
            (PlanMode::Uninstall, true) => "Uninstall dry run",
        };

        RunSummary {
            title: title.to_string(),
            step_results: self
                .steps
                .iter()
                .map(|step| StepSummary {
                    name: step.name.clone(),
                    status: step.status,
                    duration: (step.status == StepStatus::Done).then_some(step.duration),
                    detail: step.error.clone().or_else(|| step.detail.clone()),
                })
                .collect(),
            total_duration: self.total_duration,
            steps_run: self.count(StepStatus::Done) + self.count(StepStatus::Failed),
            steps_skipped: self.count(StepStatus::Skipped),
            steps_failed: self.count(StepStatus::Failed),
        }
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}
