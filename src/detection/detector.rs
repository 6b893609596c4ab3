//! Read-only probes of machine state.
//!
//! Every probe answers a yes/no question and never fails: a tool that
//! cannot be started, exits non-zero, or prints nothing useful reads as
//! "not present". Steps consult these probes before acting, which is what
//! makes re-running the provisioner safe.

use std::path::{Path, PathBuf};

use super::probe::{extract_version, normalize_package_name, resolve_tool_path, shown_package_names};
use crate::config::LauncherTarget;
use crate::provision::launcher::launcher_path;
use crate::provision::Dependency;
use crate::shell::{parse_system_path, CommandResult, CommandRunner};

/// Probes the runtime and its package manager through a [`CommandRunner`].
pub struct Detector<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Detector<'a> {
    /// Create a detector over the given runner.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Whether `<command> --version` runs and exits successfully.
    ///
    /// Store aliases that exist on the path but only open an installer page
    /// exit non-zero, so they read as absent.
    pub fn runtime_present(&self, command: &str) -> bool {
        self.probe(command, &["--version"]).is_some()
    }

    /// Version reported by `<command> --version`.
    pub fn runtime_version(&self, command: &str) -> Option<String> {
        let result = self.probe(command, &["--version"])?;
        extract_version(&result.combined_output())
    }

    /// Whether the runtime's package manager answers `--version` with output.
    pub fn package_manager_healthy(&self, command: &str) -> bool {
        self.probe(command, &["-m", "pip", "--version"])
            .is_some_and(|result| !result.stdout.trim().is_empty())
    }

    /// Dependencies the package manager reports as installed.
    ///
    /// `pip show` exits non-zero when any name is missing but still lists
    /// the ones it found, so the exit code is ignored here.
    pub fn installed_dependencies(&self, command: &str, deps: &[Dependency]) -> Vec<Dependency> {
        if deps.is_empty() {
            return Vec::new();
        }

        let mut args = vec!["-m".to_string(), "pip".to_string(), "show".to_string()];
        args.extend(deps.iter().map(|d| d.identifier.clone()));

        let shown = match self.runner.run(command, &args) {
            Ok(result) => shown_package_names(&result.stdout),
            Err(e) => {
                tracing::debug!("Package query inconclusive: {}", e);
                return Vec::new();
            }
        };

        deps.iter()
            .filter(|dep| shown.contains(&normalize_package_name(&dep.identifier)))
            .cloned()
            .collect()
    }

    /// Whether every dependency is already installed.
    pub fn dependencies_installed(&self, command: &str, deps: &[Dependency]) -> bool {
        self.installed_dependencies(command, deps).len() == deps.len()
    }

    /// Absolute path of the runtime on the current execution path.
    ///
    /// Falls back to the bare command name, which the launching shell
    /// resolves itself.
    pub fn runtime_path(&self, command: &str) -> PathBuf {
        resolve_tool_path(command, &parse_system_path()).unwrap_or_else(|| PathBuf::from(command))
    }

    fn probe(&self, command: &str, args: &[&str]) -> Option<CommandResult> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        match self.runner.run(command, &args) {
            Ok(result) if result.success => Some(result),
            Ok(result) => {
                tracing::debug!(
                    "Probe {} {} exited with {:?}",
                    command,
                    args.join(" "),
                    result.exit_code
                );
                None
            }
            Err(e) => {
                tracing::debug!("Probe {} {} inconclusive: {}", command, args.join(" "), e);
                None
            }
        }
    }
}

/// Whether a fetched file exists at `path`.
///
/// Existence only; a truncated file left by other tools still counts.
pub fn asset_present(path: &Path) -> bool {
    path.is_file()
}

/// Whether the launcher for `app_name` exists at `target`.
pub fn launcher_present(target: &LauncherTarget, app_name: &str) -> bool {
    launcher_path(&target.dir, app_name).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LauncherLocation;
    use crate::shell::ScriptedRunner;
    use std::fs;
    use tempfile::TempDir;

    fn deps(names: &[&str]) -> Vec<Dependency> {
        names.iter().map(|n| Dependency::new(n)).collect()
    }

    #[test]
    fn runtime_present_when_version_succeeds() {
        let runner =
            ScriptedRunner::new().on("python3 --version", CommandResult::success("Python 3.11.9", ""));
        let detector = Detector::new(&runner);

        assert!(detector.runtime_present("python3"));
        assert_eq!(detector.runtime_version("python3"), Some("3.11.9".to_string()));
    }

    #[test]
    fn runtime_absent_when_command_missing() {
        let runner = ScriptedRunner::new();
        assert!(!Detector::new(&runner).runtime_present("python3"));
    }

    #[test]
    fn runtime_absent_when_alias_stub_fails() {
        let runner = ScriptedRunner::new().on(
            "python --version",
            CommandResult::failure(Some(9009), "", "Python was not found"),
        );
        assert!(!Detector::new(&runner).runtime_present("python"));
    }

    #[test]
    fn package_manager_healthy_needs_output() {
        let healthy = ScriptedRunner::new().on(
            "python3 -m pip --version",
            CommandResult::success("pip 24.0 from /usr/lib", ""),
        );
        let silent =
            ScriptedRunner::new().on("python3 -m pip --version", CommandResult::success("  \n", ""));
        let broken = ScriptedRunner::new().on(
            "python3 -m pip --version",
            CommandResult::failure(Some(1), "", "No module named pip"),
        );

        assert!(Detector::new(&healthy).package_manager_healthy("python3"));
        assert!(!Detector::new(&silent).package_manager_healthy("python3"));
        assert!(!Detector::new(&broken).package_manager_healthy("python3"));
    }

    #[test]
    fn installed_dependencies_reads_partial_show_output() {
        let runner = ScriptedRunner::new().on(
            "python3 -m pip show",
            CommandResult::failure(
                Some(1),
                "Name: numpy\nVersion: 1.26.4\n---\nName: tf_keras\nVersion: 2.16.0\n",
                "WARNING: Package(s) not found: deepface",
            ),
        );
        let detector = Detector::new(&runner);
        let wanted = deps(&["deepface", "tf-keras", "numpy"]);

        let installed = detector.installed_dependencies("python3", &wanted);

        assert_eq!(installed, deps(&["tf-keras", "numpy"]));
        assert!(!detector.dependencies_installed("python3", &wanted));
    }

    #[test]
    fn dependencies_installed_when_every_record_present() {
        let runner = ScriptedRunner::new().on(
            "python3 -m pip show",
            CommandResult::success("Name: numpy\n---\nName: Pillow\n", ""),
        );
        let detector = Detector::new(&runner);

        assert!(detector.dependencies_installed("python3", &deps(&["numpy", "pillow"])));
    }

    #[test]
    fn installed_dependencies_without_runtime_is_empty() {
        let runner = ScriptedRunner::new();
        let installed = Detector::new(&runner).installed_dependencies("python3", &deps(&["numpy"]));
        assert!(installed.is_empty());
    }

    #[test]
    fn runtime_path_falls_back_to_bare_name() {
        let runner = ScriptedRunner::new();
        let path = Detector::new(&runner).runtime_path("croppass-no-such-runtime-12345");
        assert_eq!(path, PathBuf::from("croppass-no-such-runtime-12345"));
    }

    #[test]
    fn asset_present_requires_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("retinaface.h5");

        assert!(!asset_present(&file));
        assert!(!asset_present(temp.path()));

        fs::write(&file, b"weights").unwrap();
        assert!(asset_present(&file));
    }

    #[test]
    fn launcher_present_checks_rendered_file_name() {
        let temp = TempDir::new().unwrap();
        let target = LauncherTarget {
            location: LauncherLocation::Desktop,
            dir: temp.path().to_path_buf(),
        };

        assert!(!launcher_present(&target, "CropPass"));

        fs::write(launcher_path(temp.path(), "CropPass"), "").unwrap();
        assert!(launcher_present(&target, "CropPass"));
    }
}
