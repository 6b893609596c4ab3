//! Run orchestration.
//!
//! The [`Orchestrator`] walks a [`ProvisioningPlan`](crate::steps::ProvisioningPlan)
//! through the phases of an install or uninstall and produces a
//! [`RunReport`] describing every step.

pub mod orchestrator;
pub mod report;

pub use orchestrator::{Orchestrator, RunOptions};
pub use report::{RunReport, RunState, StepReport};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolvedManifest;
    use crate::fetch::MemoryTransport;
    use crate::provision::fixtures::{self, ASSET_URL, BOOTSTRAP_URL, INSTALLER_URL};
    use crate::provision::{launcher_path, ProvisionContext};
    use crate::shell::{CommandResult, ScriptedRunner};
    use crate::steps::{PlanMode, ProvisioningPlan, StepStatus};
    use crate::ui::MockUI;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const PIP_OK: &str = "pip 24.0 from /usr/lib/python3/site-packages/pip (python 3.11)";
    const SHOW_ALL: &str = "Name: deepface\nVersion: 0.0.93\n---\nName: numpy\nVersion: 1.26.4\n";

    fn ok(stdout: &str) -> CommandResult {
        CommandResult::success(stdout, "")
    }

    fn run(
        mode: PlanMode,
        manifest: &ResolvedManifest,
        runner: &ScriptedRunner,
        transport: &MemoryTransport,
    ) -> RunReport {
        let prepend = |_: &[PathBuf]| {};
        let ctx = ProvisionContext {
            manifest,
            runner,
            transport,
            prepend_path: &prepend,
        };
        let plan = ProvisioningPlan::new(mode, manifest);
        let mut ui = MockUI::new();
        Orchestrator::new(RunOptions::default()).run(&plan, &ctx, &mut ui)
    }

    /// A machine with nothing installed that becomes whole as commands run.
    fn fresh_machine() -> ScriptedRunner {
        ScriptedRunner::new()
            .on_missing("python3 --version")
            .on("python3 --version", ok("Python 3.11.9"))
            .on("runtime-setup", ok("installer finished"))
            .on(
                "python3 -m pip --version",
                CommandResult::failure(Some(1), "", "No module named pip"),
            )
            .on("python3 -m pip --version", ok(PIP_OK))
            .on("python3 -m ensurepip", ok(""))
            .on("python3 -m pip show", CommandResult::failure(Some(1), "", ""))
            .on("python3 -m pip show", ok(SHOW_ALL))
            .on("python3 -m pip install", ok("Successfully installed"))
    }

    fn transport() -> MemoryTransport {
        MemoryTransport::new()
            .with(INSTALLER_URL, b"installer bytes")
            .with(ASSET_URL, b"weights")
            .with(BOOTSTRAP_URL, b"print('bootstrap')")
    }

    #[test]
    fn fresh_machine_runs_every_step() {
        let root = TempDir::new().unwrap();
        let manifest = fixtures::manifest(root.path());
        let runner = fresh_machine();
        let transport = transport();

        let report = run(PlanMode::Install, &manifest, &runner, &transport);

        assert_eq!(report.steps.len(), 6);
        assert_eq!(report.count(StepStatus::Done), 6);
        assert_eq!(report.count(StepStatus::Skipped), 0);
        assert_eq!(report.final_state, RunState::Done);
        assert_eq!(report.exit_code(), 0);
        assert!(manifest.assets[0].local_path.is_file());
        for target in &manifest.launchers {
            assert!(launcher_path(&target.dir, &manifest.app.name).is_file());
        }
    }

    #[test]
    fn second_install_skips_everything() {
        let root = TempDir::new().unwrap();
        let manifest = fixtures::manifest(root.path());
        let runner = fresh_machine();
        let transport = transport();

        run(PlanMode::Install, &manifest, &runner, &transport);
        let downloads = transport.request_count();
        let installs = runner.count("python3 -m pip install");

        let report = run(PlanMode::Install, &manifest, &runner, &transport);

        assert_eq!(report.count(StepStatus::Skipped), 6);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(transport.request_count(), downloads);
        assert_eq!(runner.count("python3 -m pip install"), installs);
        assert_eq!(runner.count("runtime-setup"), 1);
    }

    #[test]
    fn failed_runtime_install_halts_the_plan() {
        let root = TempDir::new().unwrap();
        let manifest = fixtures::manifest(root.path());
        let runner = ScriptedRunner::new()
            .on_missing("python3 --version")
            .on(
                "runtime-setup",
                CommandResult::failure(Some(1), "", "installation aborted"),
            );
        let transport = transport();

        let report = run(PlanMode::Install, &manifest, &runner, &transport);

        assert!(report.halted());
        assert_eq!(report.steps[0].status, StepStatus::Failed);
        assert!(report.steps[1..]
            .iter()
            .all(|s| s.status == StepStatus::NotRun));
        assert_eq!(transport.requests(), vec![INSTALLER_URL]);
        assert_eq!(runner.count("python3 -m pip"), 0);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn broken_package_manager_escalates_to_bootstrap_script() {
        let root = TempDir::new().unwrap();
        let manifest = fixtures::manifest(root.path());
        let broken = CommandResult::failure(Some(1), "", "No module named pip");
        let runner = ScriptedRunner::new()
            .on("python3 --version", ok("Python 3.11.9"))
            .on("python3 -m pip --version", broken.clone())
            .on("python3 -m pip --version", broken)
            .on("python3 -m pip --version", ok(PIP_OK))
            .on(
                "python3 -m ensurepip",
                CommandResult::failure(Some(1), "", "ensurepip is disabled"),
            )
            .on("python3", ok("Successfully installed pip"))
            .on("python3 -m pip show", ok(SHOW_ALL));
        let transport = transport();

        let report = run(PlanMode::Install, &manifest, &runner, &transport);

        assert_eq!(report.steps[1].status, StepStatus::Done);
        assert_eq!(
            report.steps[1].detail.as_deref(),
            Some("repaired by bootstrap script")
        );
        assert!(transport.requests().contains(&BOOTSTRAP_URL.to_string()));
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn unrecoverable_package_manager_halts_before_dependencies() {
        let root = TempDir::new().unwrap();
        let manifest = fixtures::manifest(root.path());
        let runner = ScriptedRunner::new()
            .on("python3 --version", ok("Python 3.11.9"))
            .on(
                "python3 -m pip --version",
                CommandResult::failure(Some(1), "", "No module named pip"),
            )
            .on(
                "python3 -m ensurepip",
                CommandResult::failure(Some(1), "", "ensurepip is disabled"),
            )
            .on("python3", CommandResult::failure(Some(1), "", "bootstrap failed"));
        let transport = transport();

        let report = run(PlanMode::Install, &manifest, &runner, &transport);

        assert_eq!(report.halted_by.as_deref(), Some("pip"));
        assert!(report.steps[1]
            .error
            .as_deref()
            .unwrap()
            .contains("could not be repaired"));
        assert!(report.steps[2..]
            .iter()
            .all(|s| s.status == StepStatus::NotRun));
        assert_eq!(runner.count("python3 -m pip install"), 0);
    }

    #[test]
    fn present_asset_is_not_downloaded() {
        let root = TempDir::new().unwrap();
        let manifest = fixtures::manifest(root.path());
        let asset = &manifest.assets[0].local_path;
        fs::create_dir_all(asset.parent().unwrap()).unwrap();
        fs::write(asset, b"existing weights").unwrap();
        let runner = ScriptedRunner::new()
            .on("python3 --version", ok("Python 3.11.9"))
            .on("python3 -m pip --version", ok(PIP_OK))
            .on("python3 -m pip show", ok(SHOW_ALL));
        let transport = MemoryTransport::new();

        let report = run(PlanMode::Install, &manifest, &runner, &transport);

        assert_eq!(report.steps[3].status, StepStatus::Skipped);
        assert_eq!(transport.request_count(), 0);
        assert_eq!(fs::read(asset).unwrap(), b"existing weights");
    }

    #[test]
    fn uninstall_continues_past_failures() {
        let root = TempDir::new().unwrap();
        let manifest = fixtures::manifest(root.path());
        let runner = fresh_machine().on(
            "python3 -m pip uninstall",
            CommandResult::failure(Some(1), "", "permission denied"),
        );
        let transport = transport();
        run(PlanMode::Install, &manifest, &runner, &transport);

        let report = run(PlanMode::Uninstall, &manifest, &runner, &transport);

        let names: Vec<_> = report.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "start menu launcher",
                "desktop launcher",
                "RetinaFace weights",
                "dependencies"
            ]
        );
        assert_eq!(report.count(StepStatus::Done), 3);
        assert_eq!(report.steps[3].status, StepStatus::Failed);
        assert_eq!(report.final_state, RunState::Done);
        assert_eq!(report.exit_code(), 2);
        assert!(!manifest.assets[0].local_path.exists());
    }
}
