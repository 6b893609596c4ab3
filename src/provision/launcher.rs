//! Desktop and application-menu launchers.
//!
//! Launchers follow the conventions of the platform the binary is built
//! for: freedesktop `.desktop` entries on Unix, `.lnk` shell links on
//! Windows. A launcher is identified by the application name and its
//! location alone, so removal needs nothing beyond the manifest.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{LauncherLocation, LauncherTarget};
use crate::error::{ProvisionError, Result};
use crate::steps::StepOutcome;

use super::ProvisionContext;

#[cfg(windows)]
const LAUNCHER_EXTENSION: &str = "lnk";

#[cfg(not(windows))]
const LAUNCHER_EXTENSION: &str = "desktop";

/// Path of the launcher for `app_name` inside `dir`.
pub fn launcher_path(dir: &Path, app_name: &str) -> PathBuf {
    dir.join(format!("{}.{}", app_name, LAUNCHER_EXTENSION))
}

/// A launcher that starts the application through the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherEntry {
    /// Where the launcher is placed.
    pub location: LauncherLocation,
    /// Directory backing `location`.
    pub dir: PathBuf,
    /// Name shown to the user; also the file stem.
    pub display_name: String,
    /// Program the launcher starts (the runtime).
    pub invocation_target: PathBuf,
    /// Argument handed to the program (the application entry point).
    pub invocation_argument: PathBuf,
    /// Directory the application starts in.
    pub working_directory: PathBuf,
    pub icon: Option<PathBuf>,
    pub description: Option<String>,
}

impl LauncherEntry {
    /// File this entry is written to.
    pub fn path(&self) -> PathBuf {
        launcher_path(&self.dir, &self.display_name)
    }

    /// Launcher file content.
    #[cfg(not(windows))]
    pub fn render(&self) -> Result<Vec<u8>> {
        Ok(self.desktop_entry().into_bytes())
    }

    #[cfg(not(windows))]
    fn desktop_entry(&self) -> String {
        let mut out = String::from("[Desktop Entry]\n");
        out.push_str("Type=Application\n");
        out.push_str("Version=1.0\n");
        out.push_str(&format!("Name={}\n", self.display_name));
        if let Some(description) = &self.description {
            out.push_str(&format!("Comment={}\n", description));
        }
        out.push_str(&format!(
            "Exec={} {}\n",
            quote_exec_arg(&self.invocation_target.to_string_lossy()),
            quote_exec_arg(&self.invocation_argument.to_string_lossy())
        ));
        out.push_str(&format!("Path={}\n", self.working_directory.display()));
        if let Some(icon) = &self.icon {
            out.push_str(&format!("Icon={}\n", icon.display()));
        }
        out.push_str("Terminal=false\n");
        out.push_str("Categories=Graphics;\n");
        out
    }

    /// Launcher file content.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError` if the shell link cannot be built (for
    /// example when the runtime does not exist).
    #[cfg(windows)]
    pub fn render(&self) -> Result<Vec<u8>> {
        let target = &self.invocation_target;
        let mut link = mslnk::ShellLink::new(target)
            .map_err(|e| ProvisionError::filesystem(target, std::io::Error::other(e)))?;
        link.set_arguments(Some(format!("\"{}\"", self.invocation_argument.display())));
        link.set_working_dir(Some(self.working_directory.display().to_string()));
        link.set_name(self.description.clone());
        link.set_icon_location(self.icon.as_ref().map(|icon| icon.display().to_string()));

        // mslnk only writes to a path; render through a scratch file.
        let scratch = tempfile::tempdir()?;
        let staged = scratch.path().join("launcher.lnk");
        link.create_lnk(&staged)
            .map_err(|e| ProvisionError::filesystem(&staged, std::io::Error::other(e)))?;
        fs::read(&staged).map_err(|e| ProvisionError::filesystem(&staged, e))
    }
}

/// Quote an argument for a desktop entry `Exec` key.
///
/// Applies the `Exec` quoting rules, escapes `%` so it is not read as a
/// field code, then the string-level escape that doubles backslashes.
#[cfg(not(windows))]
fn quote_exec_arg(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        match c {
            '"' | '`' | '$' => {
                quoted.push_str("\\\\");
                quoted.push(c);
            }
            '\\' => quoted.push_str("\\\\\\\\"),
            '%' => quoted.push_str("%%"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// The console-less sibling of a Windows interpreter (`pythonw.exe` next
/// to `python.exe`), so a GUI launch does not open a console window.
#[cfg(windows)]
fn windowed_interpreter(path: PathBuf) -> PathBuf {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return path;
    };
    let sibling = path.with_file_name(format!("{}w.exe", stem));
    if sibling.is_file() {
        sibling
    } else {
        path
    }
}

#[cfg(not(windows))]
fn windowed_interpreter(path: PathBuf) -> PathBuf {
    path
}

/// Writes and removes launchers for the manifest's application.
pub struct LauncherManager<'c, 'a> {
    ctx: &'c ProvisionContext<'a>,
}

impl<'c, 'a> LauncherManager<'c, 'a> {
    /// Create a manager over `ctx`.
    pub fn new(ctx: &'c ProvisionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Build the launcher for `target`.
    ///
    /// The runtime is resolved on the current execution path, so this should
    /// run after the runtime step has refreshed it.
    pub fn entry(&self, target: &LauncherTarget) -> LauncherEntry {
        let app = &self.ctx.manifest.app;
        LauncherEntry {
            location: target.location,
            dir: target.dir.clone(),
            display_name: app.name.clone(),
            invocation_target: windowed_interpreter(
                self.ctx.detector().runtime_path(self.ctx.runtime_command()),
            ),
            invocation_argument: app.entry_point.clone(),
            working_directory: app.working_directory.clone(),
            icon: app.icon.clone(),
            description: app.description.clone(),
        }
    }

    /// Write a launcher, replacing stale content.
    ///
    /// Skipped when the file already has exactly this content.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError` if the directory or file cannot be written.
    pub fn create_launcher(&self, entry: &LauncherEntry) -> Result<StepOutcome> {
        let path = entry.path();
        let content = entry.render()?;

        let existing = fs::read(&path).ok();
        if existing.as_deref() == Some(content.as_slice()) {
            return Ok(StepOutcome::skipped(format!("up to date at {}", path.display())));
        }

        fs::create_dir_all(&entry.dir).map_err(|e| ProvisionError::filesystem(&entry.dir, e))?;
        fs::write(&path, &content).map_err(|e| ProvisionError::filesystem(&path, e))?;
        make_executable(&path)?;

        let verb = if existing.is_some() { "updated" } else { "created" };
        tracing::info!("{} {} launcher at {}", verb, entry.location, path.display());
        Ok(StepOutcome::done(format!("{} {}", verb, path.display())))
    }

    /// Delete the application's launcher at `target` if it exists.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError` if the file exists but cannot be deleted.
    pub fn remove_launcher(&self, target: &LauncherTarget) -> Result<StepOutcome> {
        let path = launcher_path(&target.dir, &self.ctx.manifest.app.name);
        if !path.is_file() {
            return Ok(StepOutcome::skipped(format!("no launcher at {}", path.display())));
        }

        fs::remove_file(&path).map_err(|e| ProvisionError::filesystem(&path, e))?;
        tracing::info!("Removed {} launcher at {}", target.location, path.display());
        Ok(StepOutcome::done(format!("removed {}", path.display())))
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| ProvisionError::filesystem(path, e))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).map_err(|e| ProvisionError::filesystem(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
