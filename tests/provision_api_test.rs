//! Library integration tests: full runs through the public API.

use croppass_setup::config::{load_resolved, InterpolationContext, ResolvedManifest};
use croppass_setup::fetch::{HttpTransport, MemoryTransport, Transport};
use croppass_setup::provision::{launcher_path, ProvisionContext};
use croppass_setup::runner::{Orchestrator, RunOptions, RunReport, RunState};
use croppass_setup::shell::{CommandResult, ScriptedRunner};
use croppass_setup::steps::{PlanMode, ProvisioningPlan, StepStatus};
use croppass_setup::ui::MockUI;
use croppass_setup::ProvisionError;
use httpmock::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PIP_OK: &str = "pip 24.0 from /usr/lib/python3/site-packages/pip (python 3.11)";
const SHOW_ALL: &str = "Name: deepface\n---\nName: numpy\n";

fn manifest(root: &Path, asset_url: &str, sha256: Option<&str>) -> ResolvedManifest {
    let sha = sha256.map(|s| format!("    sha256: \"{}\"\n", s)).unwrap_or_default();
    let yaml = format!(
        r#"
app:
  name: CropPass
  entry_point: ${{exe_dir}}/croppass.py
  working_directory: ${{exe_dir}}
runtime:
  command: python3
  installer:
    url: https://downloads.example.com/runtime-installer.pkg
    file_name: runtime-installer.pkg
    args: ["runtime-setup", "${{installer}}"]
package_manager:
  bootstrap_url: https://bootstrap.example.com/get-pip.py
dependencies: [deepface, numpy]
assets:
  - name: RetinaFace weights
    url: {asset_url}
    path: ${{home}}/.deepface/weights/retinaface.h5
    required: true
{sha}launchers:
  - location: desktop
    dir: ${{desktop}}
"#
    );
    let path = root.join("setup.yml");
    fs::write(&path, yaml).unwrap();

    let ctx = InterpolationContext::empty()
        .with("home", root.join("home").to_string_lossy())
        .with("exe_dir", root.join("app").to_string_lossy())
        .with("desktop", root.join("Desktop").to_string_lossy())
        .with("start_menu", root.join("menu").to_string_lossy());
    load_resolved(Some(path.as_path()), &ctx).unwrap()
}

fn ready_runtime() -> ScriptedRunner {
    ScriptedRunner::new()
        .on("python3 --version", CommandResult::success("Python 3.11.9", ""))
        .on("python3 -m pip --version", CommandResult::success(PIP_OK, ""))
        .on("python3 -m pip show", CommandResult::success(SHOW_ALL, ""))
}

fn install(
    manifest: &ResolvedManifest,
    runner: &ScriptedRunner,
    transport: &dyn Transport,
) -> (RunReport, MockUI) {
    let noop = |_: &[PathBuf]| {};
    let ctx = ProvisionContext {
        manifest,
        runner,
        transport,
        prepend_path: &noop,
    };
    let plan = ProvisioningPlan::new(PlanMode::Install, manifest);
    let mut ui = MockUI::new();
    let report = Orchestrator::new(RunOptions::default()).run(&plan, &ctx, &mut ui);
    (report, ui)
}

#[test]
fn asset_is_downloaded_over_http() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/retinaface.h5");
        then.status(200).body("model weights");
    });
    let temp = TempDir::new().unwrap();
    let manifest = manifest(temp.path(), &server.url("/retinaface.h5"), None);
    let transport = HttpTransport::from_settings(&manifest.settings).unwrap();

    let (report, _) = install(&manifest, &ready_runtime(), &transport);

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.steps[3].status, StepStatus::Done);
    assert_eq!(
        fs::read_to_string(&manifest.assets[0].local_path).unwrap(),
        "model weights"
    );
    mock.assert_calls(1);
}

#[test]
fn second_run_does_not_download_again() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/retinaface.h5");
        then.status(200).body("model weights");
    });
    let temp = TempDir::new().unwrap();
    let manifest = manifest(temp.path(), &server.url("/retinaface.h5"), None);
    let transport = HttpTransport::from_settings(&manifest.settings).unwrap();
    let runner = ready_runtime();

    install(&manifest, &runner, &transport);
    let (report, _) = install(&manifest, &runner, &transport);

    assert_eq!(report.count(StepStatus::Skipped), report.steps.len());
    mock.assert_calls(1);
}

#[test]
fn server_error_on_required_asset_halts_before_launchers() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/retinaface.h5");
        then.status(503);
    });
    let temp = TempDir::new().unwrap();
    let manifest = manifest(temp.path(), &server.url("/retinaface.h5"), None);
    let transport = HttpTransport::from_settings(&manifest.settings).unwrap();

    let (report, _) = install(&manifest, &ready_runtime(), &transport);

    assert_eq!(report.final_state, RunState::Halted);
    assert_eq!(report.halted_by.as_deref(), Some("RetinaFace weights"));
    assert_eq!(report.steps[4].status, StepStatus::NotRun);
    assert!(!manifest.assets[0].local_path.exists());
    let launcher = launcher_path(&manifest.launchers[0].dir, "CropPass");
    assert!(!launcher.exists());
}

#[test]
fn checksum_mismatch_leaves_no_file() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/retinaface.h5");
        then.status(200).body("tampered");
    });
    let temp = TempDir::new().unwrap();
    let wrong = "0".repeat(64);
    let manifest = manifest(temp.path(), &server.url("/retinaface.h5"), Some(&wrong));
    let transport = HttpTransport::from_settings(&manifest.settings).unwrap();

    let (report, _) = install(&manifest, &ready_runtime(), &transport);

    assert_eq!(report.steps[3].status, StepStatus::Failed);
    assert!(report.steps[3]
        .error
        .as_deref()
        .unwrap()
        .contains("Checksum mismatch"));
    assert!(!manifest.assets[0].local_path.exists());
}

#[test]
fn fresh_machine_installs_runtime_then_everything_else() {
    let temp = TempDir::new().unwrap();
    let asset_url = "https://assets.example.com/retinaface.h5";
    let manifest = manifest(temp.path(), asset_url, None);
    let runner = ScriptedRunner::new()
        .on_missing("python3 --version")
        .on("python3 --version", CommandResult::success("Python 3.11.9", ""))
        .on("runtime-setup", CommandResult::success("", ""))
        .on("python3 -m pip --version", CommandResult::failure(Some(1), "", "No module named pip"))
        .on("python3 -m pip --version", CommandResult::success(PIP_OK, ""))
        .on("python3 -m ensurepip", CommandResult::success("", ""))
        .on("python3 -m pip show", CommandResult::success("", ""))
        .on("python3 -m pip install", CommandResult::success("", ""));
    let transport = MemoryTransport::new()
        .with("https://downloads.example.com/runtime-installer.pkg", b"pkg")
        .with(asset_url, b"weights");

    let (report, ui) = install(&manifest, &runner, &transport);

    assert_eq!(report.count(StepStatus::Done), 5);
    assert_eq!(report.final_state, RunState::Done);
    assert_eq!(report.summary().steps_run, 5);
    assert!(ui.summaries().is_empty());
    assert!(runner
        .calls()
        .contains(&"python3 -m pip install deepface numpy".to_string()));
    assert!(launcher_path(&manifest.launchers[0].dir, "CropPass").is_file());
}

#[test]
fn error_types_are_public() {
    let err = ProvisionError::ConfigValidationError {
        message: "dependencies must not be empty".into(),
    };
    assert!(err.to_string().contains("dependencies"));
}
