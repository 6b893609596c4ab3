//! Parsing helpers for probe output and execution-path lookups.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::shell::executable_candidates;

/// First `x.y.z` (or `x.y`) version number in tool output.
static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+(?:\.\d+)?)").expect("VERSION_REGEX must compile"));

/// Runs of separators that package indexes treat as equivalent.
static SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("SEPARATOR_REGEX must compile"));

/// Extract a version number from `--version` style output.
///
/// ```
/// use croppass_setup::detection::extract_version;
///
/// assert_eq!(extract_version("Python 3.11.9"), Some("3.11.9".to_string()));
/// assert_eq!(extract_version("no digits here"), None);
/// ```
pub fn extract_version(output: &str) -> Option<String> {
    VERSION_REGEX
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Normalize a package name so `tf-keras`, `tf_keras` and `TF.Keras` compare equal.
pub fn normalize_package_name(name: &str) -> String {
    SEPARATOR_REGEX
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

/// Package names listed in `pip show` output, normalized.
///
/// `pip show` prints one `Name:` record per package it found and skips the
/// rest, so this is the set of installed packages among those asked about.
pub fn shown_package_names(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix("Name:"))
        .map(normalize_package_name)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Find `command` in the given execution-path entries.
///
/// Commands given as a path are returned as-is when they exist.
pub fn resolve_tool_path(command: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    let as_path = Path::new(command);
    if as_path.components().count() > 1 {
        return as_path.is_file().then(|| as_path.to_path_buf());
    }

    let candidates = executable_candidates(command);
    path_entries.iter().find_map(|dir| {
        candidates
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}
