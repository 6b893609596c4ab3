//! Manifest resolution.
//!
//! Turns a parsed [`Manifest`] into the concrete values the provisioning
//! steps work with: placeholders expanded, paths typed, dependencies
//! deduplicated.

use crate::config::interpolation::{resolve_string, InterpolationContext};
use crate::config::schema::{InstallerConfig, LauncherLocation, Manifest, Settings};
use crate::config::validator::validate;
use crate::error::Result;
use crate::fetch::RemoteAsset;
use crate::provision::Dependency;
use std::path::{Path, PathBuf};

/// Application details after placeholder expansion.
#[derive(Debug, Clone)]
pub struct ResolvedApp {
    /// Display name.
    pub name: String,
    /// Script handed to the runtime.
    pub entry_point: PathBuf,
    /// Working directory for launchers.
    pub working_directory: PathBuf,
    /// Launcher icon.
    pub icon: Option<PathBuf>,
    /// Launcher tooltip.
    pub description: Option<String>,
}

/// Runtime installer whose arguments still reference `${installer}`.
#[derive(Debug, Clone)]
pub struct ResolvedInstaller {
    /// Download URL.
    pub url: String,
    /// File name of the downloaded installer.
    pub file_name: String,
    args: Vec<String>,
    vars: InterpolationContext,
}

impl ResolvedInstaller {
    /// Program and arguments to run the installer at `installer`.
    pub fn command_line(&self, installer: &Path) -> Result<(String, Vec<String>)> {
        let ctx = self
            .vars
            .clone()
            .with("installer", installer.to_string_lossy());
        let mut resolved = self
            .args
            .iter()
            .map(|arg| resolve_string(arg, &ctx))
            .collect::<Result<Vec<_>>>()?;

        // Validation guarantees at least one element.
        let program = resolved.remove(0);
        Ok((program, resolved))
    }
}

/// Runtime settings after placeholder expansion.
#[derive(Debug, Clone)]
pub struct ResolvedRuntime {
    /// Command name looked up on the execution path.
    pub command: String,
    /// How to install the runtime when it is missing.
    pub installer: ResolvedInstaller,
    /// Directories the installer registers on the system path.
    pub path_hints: Vec<PathBuf>,
}

/// A launcher location and the directory it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherTarget {
    /// Which location this is.
    pub location: LauncherLocation,
    /// Directory the launcher file is written to.
    pub dir: PathBuf,
}

/// A validated manifest with every placeholder expanded.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    pub app: ResolvedApp,
    pub runtime: ResolvedRuntime,
    pub bootstrap_url: String,
    pub dependencies: Vec<Dependency>,
    pub assets: Vec<RemoteAsset>,
    pub launchers: Vec<LauncherTarget>,
    pub settings: Settings,
}

/// Validate a manifest and expand its placeholders.
///
/// # Errors
///
/// Returns `ConfigValidationError` when the manifest breaks a validation
/// rule or refers to an unknown placeholder.
pub fn resolve_manifest(
    manifest: &Manifest,
    ctx: &InterpolationContext,
) -> Result<ResolvedManifest> {
    validate(manifest)?;

    let entry_point = resolve_path(&manifest.app.entry_point, ctx)?;
    let working_directory = match &manifest.app.working_directory {
        Some(dir) => resolve_path(dir, ctx)?,
        None => entry_point
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let icon = manifest
        .app
        .icon
        .as_deref()
        .map(|icon| resolve_path(icon, ctx))
        .transpose()?;

    let installer = resolve_installer(&manifest.runtime.installer, ctx)?;
    let path_hints = manifest
        .runtime
        .path_hints
        .iter()
        .map(|hint| resolve_path(hint, ctx))
        .collect::<Result<Vec<_>>>()?;

    let mut dependencies: Vec<Dependency> = Vec::new();
    for name in &manifest.dependencies {
        let dep = Dependency::new(name.trim());
        if !dependencies.contains(&dep) {
            dependencies.push(dep);
        }
    }

    let assets = manifest
        .assets
        .iter()
        .map(|asset| {
            Ok(RemoteAsset {
                name: asset.name.clone(),
                url: resolve_string(&asset.url, ctx)?,
                local_path: resolve_path(&asset.path, ctx)?,
                sha256: asset.sha256.as_ref().map(|s| s.to_lowercase()),
                required: asset.required,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let launchers = manifest
        .launchers
        .iter()
        .map(|launcher| {
            Ok(LauncherTarget {
                location: launcher.location,
                dir: resolve_path(&launcher.dir, ctx)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResolvedManifest {
        app: ResolvedApp {
            name: manifest.app.name.clone(),
            entry_point,
            working_directory,
            icon,
            description: manifest.app.description.clone(),
        },
        runtime: ResolvedRuntime {
            command: manifest.runtime.command.clone(),
            installer,
            path_hints,
        },
        bootstrap_url: resolve_string(&manifest.package_manager.bootstrap_url, ctx)?,
        dependencies,
        assets,
        launchers,
        settings: manifest.settings.clone(),
    })
}

fn resolve_path(value: &str, ctx: &InterpolationContext) -> Result<PathBuf> {
    resolve_string(value, ctx).map(PathBuf::from)
}

fn resolve_installer(
    installer: &InstallerConfig,
    ctx: &InterpolationContext,
) -> Result<ResolvedInstaller> {
    // Resolve once up front so unknown placeholders surface before any step runs.
    let probe = ctx.clone().with("installer", "installer");
    for arg in &installer.args {
        resolve_string(arg, &probe)?;
    }

    Ok(ResolvedInstaller {
        url: resolve_string(&installer.url, ctx)?,
        file_name: installer.file_name.clone(),
        args: installer.args.clone(),
        vars: ctx.clone(),
    })
}
