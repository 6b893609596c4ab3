//! Execution-path refresh.
//!
//! A runtime installer registers its directories on the system `PATH`,
//! but the running process keeps the `PATH` it started with. Refreshing
//! prepends the directories the installer is known to populate, so tools
//! launched later in the same run resolve without a new session.
//!
//! # Example
//!
//! ```
//! use croppass_setup::shell::missing_entries;
//! use std::path::PathBuf;
//!
//! let hints = vec![PathBuf::from("/nonexistent/python/bin")];
//! // Hints that do not exist on disk are never added.
//! assert!(missing_entries(&hints, &[]).is_empty());
//! ```

use std::path::PathBuf;

/// Parse the process PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Hint directories that exist on disk but are not yet in `current`.
///
/// Order of `hints` is preserved; duplicates are dropped.
pub fn missing_entries(hints: &[PathBuf], current: &[PathBuf]) -> Vec<PathBuf> {
    let mut missing: Vec<PathBuf> = Vec::new();
    for hint in hints {
        if !hint.is_dir() || current.contains(hint) || missing.contains(hint) {
            continue;
        }
        missing.push(hint.clone());
    }
    missing
}

/// Prepend directories to the process PATH.
///
/// Child processes spawned afterwards inherit the new value.
pub fn prepend_to_process_path(dirs: &[PathBuf]) {
    if dirs.is_empty() {
        return;
    }

    let mut entries: Vec<PathBuf> = dirs.to_vec();
    entries.extend(parse_system_path());

    match std::env::join_paths(&entries) {
        Ok(joined) => {
            std::env::set_var("PATH", &joined);
            tracing::info!("Added {} director(ies) to PATH", dirs.len());
        }
        Err(e) => tracing::warn!("Could not update PATH: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn existing_hint_not_on_path_is_missing() {
        let temp = TempDir::new().unwrap();
        let hints = vec![temp.path().to_path_buf()];

        let missing = missing_entries(&hints, &[PathBuf::from("/usr/bin")]);

        assert_eq!(missing, hints);
    }

    #[test]
    fn hint_already_on_path_is_skipped() {
        let temp = TempDir::new().unwrap();
        let hints = vec![temp.path().to_path_buf()];

        let missing = missing_entries(&hints, &hints);

        assert!(missing.is_empty());
    }

    #[test]
    fn nonexistent_hint_is_skipped() {
        let hints = vec![PathBuf::from("/nonexistent/path/here")];
        assert!(missing_entries(&hints, &[]).is_empty());
    }

    #[test]
    fn duplicate_hints_collapse() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_path_buf();

        let missing = missing_entries(&[dir.clone(), dir.clone()], &[]);

        assert_eq!(missing, vec![dir]);
    }

    #[test]
    fn parse_system_path_reads_entries() {
        // PATH is set in every test environment we run in
        if std::env::var_os("PATH").is_some() {
            assert!(!parse_system_path().is_empty());
        }
    }

    #[test]
    fn prepend_nothing_is_a_no_op() {
        let before = std::env::var_os("PATH");
        prepend_to_process_path(&[]);
        assert_eq!(std::env::var_os("PATH"), before);
    }
}
