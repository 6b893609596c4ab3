//! The step abstraction driven by the orchestrator.

use serde::Serialize;

use crate::error::Result;
use crate::provision::ProvisionContext;

/// What a step did when it ran without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step changed machine state.
    Done { detail: String },
    /// The desired state already held; nothing was changed.
    Skipped { reason: String },
}

impl StepOutcome {
    /// The step changed machine state.
    pub fn done(detail: impl Into<String>) -> Self {
        Self::Done {
            detail: detail.into(),
        }
    }

    /// Nothing needed doing.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Check if the step was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Detail or skip reason.
    pub fn detail(&self) -> &str {
        match self {
            Self::Done { detail } => detail,
            Self::Skipped { reason } => reason,
        }
    }
}

/// What the orchestrator does when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the plan; later steps depend on this one.
    #[default]
    Fatal,
    /// Record the failure and move on.
    Continue,
}

/// Stage of a run; each step belongs to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    RuntimeCheck,
    PackageManagerHeal,
    DependencyInstall,
    AssetFetch,
    LauncherCreate,
    LauncherRemove,
    AssetRemove,
    PackageRemove,
}

impl Phase {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::RuntimeCheck => "Runtime check",
            Phase::PackageManagerHeal => "Package manager heal",
            Phase::DependencyInstall => "Dependency install",
            Phase::AssetFetch => "Asset fetch",
            Phase::LauncherCreate => "Launcher create",
            Phase::LauncherRemove => "Launcher remove",
            Phase::AssetRemove => "Asset remove",
            Phase::PackageRemove => "Package remove",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One unit of provisioning work.
///
/// `apply` brings the machine to the step's desired state and `reverse`
/// takes it back out. Both consult probes first and return
/// [`StepOutcome::Skipped`] when there is nothing to do, so running either
/// twice is harmless.
pub trait Step {
    /// Name shown in progress output and reports.
    fn name(&self) -> &str;

    /// Phase this step runs in during install.
    fn phase(&self) -> Phase;

    /// Phase this step runs in during uninstall; `None` if it has no undo.
    fn reverse_phase(&self) -> Option<Phase> {
        None
    }

    /// What a failure of this step means for the rest of the plan.
    fn policy(&self) -> FailurePolicy;

    /// Whether the desired installed state already holds.
    fn detect(&self, ctx: &ProvisionContext<'_>) -> bool;

    /// Whether there is nothing left for `reverse` to remove.
    fn detect_removed(&self, ctx: &ProvisionContext<'_>) -> bool {
        !self.detect(ctx)
    }

    /// Bring the machine to the desired state.
    fn apply(&self, ctx: &ProvisionContext<'_>) -> Result<StepOutcome>;

    /// Undo what `apply` provisioned.
    fn reverse(&self, _ctx: &ProvisionContext<'_>) -> Result<StepOutcome> {
        Ok(StepOutcome::skipped("nothing to undo"))
    }
}
