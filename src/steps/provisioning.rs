//! The concrete provisioning steps.

use crate::config::LauncherTarget;
use crate::detection::{asset_present, launcher_present};
use crate::error::Result;
use crate::fetch::{remove_asset, RemoteAsset};
use crate::provision::{LauncherManager, PackageInstaller, ProvisionContext, RuntimeProvisioner};

use super::step::{FailurePolicy, Phase, Step, StepOutcome};

/// Ensures the language runtime is installed.
#[derive(Debug)]
pub struct RuntimeStep {
    name: String,
}

impl RuntimeStep {
    pub fn new(command: &str) -> Self {
        Self {
            name: format!("{} runtime", command),
        }
    }
}

impl Step for RuntimeStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> Phase {
        Phase::RuntimeCheck
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Fatal
    }

    fn detect(&self, ctx: &ProvisionContext<'_>) -> bool {
        ctx.detector().runtime_present(ctx.runtime_command())
    }

    fn apply(&self, ctx: &ProvisionContext<'_>) -> Result<StepOutcome> {
        RuntimeProvisioner::new(ctx).ensure_runtime()
    }
}

/// Ensures the package manager works, repairing it if needed.
#[derive(Debug, Default)]
pub struct PackageManagerStep;

impl Step for PackageManagerStep {
    fn name(&self) -> &str {
        "pip"
    }

    fn phase(&self) -> Phase {
        Phase::PackageManagerHeal
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Fatal
    }

    fn detect(&self, ctx: &ProvisionContext<'_>) -> bool {
        ctx.detector().package_manager_healthy(ctx.runtime_command())
    }

    fn apply(&self, ctx: &ProvisionContext<'_>) -> Result<StepOutcome> {
        PackageInstaller::new(ctx).ensure_healthy()
    }
}

/// Installs the application's dependencies; removes them on uninstall.
#[derive(Debug, Default)]
pub struct DependencyStep;

impl Step for DependencyStep {
    fn name(&self) -> &str {
        "dependencies"
    }

    fn phase(&self) -> Phase {
        Phase::DependencyInstall
    }

    fn reverse_phase(&self) -> Option<Phase> {
        Some(Phase::PackageRemove)
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Fatal
    }

    fn detect(&self, ctx: &ProvisionContext<'_>) -> bool {
        ctx.detector()
            .dependencies_installed(ctx.runtime_command(), &ctx.manifest.dependencies)
    }

    fn detect_removed(&self, ctx: &ProvisionContext<'_>) -> bool {
        ctx.detector()
            .installed_dependencies(ctx.runtime_command(), &ctx.manifest.dependencies)
            .is_empty()
    }

    fn apply(&self, ctx: &ProvisionContext<'_>) -> Result<StepOutcome> {
        PackageInstaller::new(ctx).install(&ctx.manifest.dependencies)
    }

    fn reverse(&self, ctx: &ProvisionContext<'_>) -> Result<StepOutcome> {
        PackageInstaller::new(ctx).uninstall(&ctx.manifest.dependencies)
    }
}

/// Fetches one remote asset; deletes it on uninstall.
#[derive(Debug)]
pub struct AssetStep {
    asset: RemoteAsset,
}

impl AssetStep {
    pub fn new(asset: RemoteAsset) -> Self {
        Self { asset }
    }
}

impl Step for AssetStep {
    fn name(&self) -> &str {
        &self.asset.name
    }

    fn phase(&self) -> Phase {
        Phase::AssetFetch
    }

    fn reverse_phase(&self) -> Option<Phase> {
        Some(Phase::AssetRemove)
    }

    fn policy(&self) -> FailurePolicy {
        if self.asset.required {
            FailurePolicy::Fatal
        } else {
            FailurePolicy::Continue
        }
    }

    fn detect(&self, _ctx: &ProvisionContext<'_>) -> bool {
        asset_present(&self.asset.local_path)
    }

    fn apply(&self, ctx: &ProvisionContext<'_>) -> Result<StepOutcome> {
        ctx.fetcher().fetch(&self.asset)
    }

    fn reverse(&self, _ctx: &ProvisionContext<'_>) -> Result<StepOutcome> {
        remove_asset(&self.asset)
    }
}

/// Writes the launcher at one location; removes it on uninstall.
#[derive(Debug)]
pub struct LauncherStep {
    name: String,
    target: LauncherTarget,
}

impl LauncherStep {
    pub fn new(target: LauncherTarget) -> Self {
        Self {
            name: format!("{} launcher", target.location),
            target,
        }
    }
}

impl Step for LauncherStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> Phase {
        Phase::LauncherCreate
    }

    fn reverse_phase(&self) -> Option<Phase> {
        Some(Phase::LauncherRemove)
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Continue
    }

    fn detect(&self, ctx: &ProvisionContext<'_>) -> bool {
        launcher_present(&self.target, &ctx.manifest.app.name)
    }

    fn apply(&self, ctx: &ProvisionContext<'_>) -> Result<StepOutcome> {
        let manager = LauncherManager::new(ctx);
        let entry = manager.entry(&self.target);
        manager.create_launcher(&entry)
    }

    fn reverse(&self, ctx: &ProvisionContext<'_>) -> Result<StepOutcome> {
        LauncherManager::new(ctx).remove_launcher(&self.target)
    }
}
