//! Platform conventions the provisioner is compiled for.

use std::path::{Path, PathBuf};

/// Check if running in a CI environment.
///
/// Used to force non-interactive output and skip the pause before exit.
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

/// File names a command may have on disk.
///
/// On Windows a bare `python` resolves to `python.exe` (or `.cmd`/`.bat`);
/// elsewhere the name is used as-is.
pub fn executable_candidates(command: &str) -> Vec<String> {
    if cfg!(windows) && Path::new(command).extension().is_none() {
        ["exe", "cmd", "bat"]
            .iter()
            .map(|ext| format!("{}.{}", command, ext))
            .collect()
    } else {
        vec![command.to_string()]
    }
}

/// Directory of the running executable, used for `${exe_dir}`.
pub fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}
