//! Provisioning plans.
//!
//! A plan is the ordered list of steps for one run, built fresh from the
//! manifest on every invocation. Nothing about a plan is persisted.

use serde::Serialize;

use crate::config::ResolvedManifest;

use super::provisioning::{AssetStep, DependencyStep, LauncherStep, PackageManagerStep, RuntimeStep};
use super::step::{FailurePolicy, Phase, Step};

/// Direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    Install,
    Uninstall,
}

impl PlanMode {
    /// Phase `step` runs in under this mode.
    pub fn phase_of(&self, step: &dyn Step) -> Phase {
        match self {
            PlanMode::Install => step.phase(),
            PlanMode::Uninstall => step.reverse_phase().unwrap_or_else(|| step.phase()),
        }
    }

    /// Failure policy of `step` under this mode.
    ///
    /// Uninstall is best-effort: no failure stops it.
    pub fn policy_of(&self, step: &dyn Step) -> FailurePolicy {
        match self {
            PlanMode::Install => step.policy(),
            PlanMode::Uninstall => FailurePolicy::Continue,
        }
    }
}

impl std::fmt::Display for PlanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanMode::Install => write!(f, "install"),
            PlanMode::Uninstall => write!(f, "uninstall"),
        }
    }
}

/// Ordered steps for one run.
pub struct ProvisioningPlan {
    mode: PlanMode,
    steps: Vec<Box<dyn Step>>,
}

impl ProvisioningPlan {
    /// Plan for `mode`.
    pub fn new(mode: PlanMode, manifest: &ResolvedManifest) -> Self {
        match mode {
            PlanMode::Install => Self::install(manifest),
            PlanMode::Uninstall => Self::uninstall(manifest),
        }
    }

    /// Runtime, package manager, dependencies, one step per asset, then one
    /// step per launcher location.
    pub fn install(manifest: &ResolvedManifest) -> Self {
        Self {
            mode: PlanMode::Install,
            steps: install_steps(manifest),
        }
    }

    /// The undoable install steps in reverse order: launchers, assets, then
    /// dependencies. The runtime and package manager are left in place.
    pub fn uninstall(manifest: &ResolvedManifest) -> Self {
        let mut steps = install_steps(manifest);
        steps.retain(|step| step.reverse_phase().is_some());
        steps.reverse();
        Self {
            mode: PlanMode::Uninstall,
            steps,
        }
    }

    /// Create a plan from explicit steps.
    pub fn from_steps(mode: PlanMode, steps: Vec<Box<dyn Step>>) -> Self {
        Self { mode, steps }
    }

    pub fn mode(&self) -> PlanMode {
        self.mode
    }

    pub fn steps(&self) -> &[Box<dyn Step>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn install_steps(manifest: &ResolvedManifest) -> Vec<Box<dyn Step>> {
    let mut steps: Vec<Box<dyn Step>> = vec![
        Box::new(RuntimeStep::new(&manifest.runtime.command)),
        Box::new(PackageManagerStep),
        Box::new(DependencyStep),
    ];
    for asset in &manifest.assets {
        steps.push(Box::new(AssetStep::new(asset.clone())));
    }
    for target in &manifest.launchers {
        steps.push(Box::new(LauncherStep::new(target.clone())));
    }
    steps
}
