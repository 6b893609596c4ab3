//! Provisioning steps and plans.
//!
//! - [`Step`] - one unit of work with a probe, an apply and an undo
//! - [`ProvisioningPlan`] - the ordered steps for an install or uninstall
//! - [`StepOutcome`] / [`StepStatus`] - what happened to a step

pub mod plan;
pub mod provisioning;
pub mod status;
pub mod step;

pub use plan::{PlanMode, ProvisioningPlan};
pub use provisioning::{AssetStep, DependencyStep, LauncherStep, PackageManagerStep, RuntimeStep};
pub use status::{format_duration, StepStatus};
pub use step::{FailurePolicy, Phase, Step, StepOutcome};
