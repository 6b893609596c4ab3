//! Manifest schema definitions.
//!
//! This module contains the struct definitions that map to the YAML
//! manifest format. String values may contain `${name}` placeholders that
//! are resolved by [`resolve_manifest`](crate::config::resolve_manifest).

use serde::{Deserialize, Serialize};

/// Root manifest structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// The application being made launchable.
    pub app: AppConfig,

    /// Language runtime the application runs on.
    pub runtime: RuntimeConfig,

    /// Package manager repair settings
    #[serde(default)]
    pub package_manager: PackageManagerConfig,

    /// Flat dependency names, installed in one batch.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Large external files fetched once.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetConfig>,

    /// Launcher locations, one launcher per entry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub launchers: Vec<LauncherConfig>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Application identity and entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display name, also used as the launcher file name.
    pub name: String,

    /// Script handed to the runtime.
    pub entry_point: String,

    /// Working directory for launchers (defaults to the entry point's directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,

    /// Icon shown by launchers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Short description for launcher tooltips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Runtime detection and installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Command name resolved on the execution path (e.g. `python3`).
    pub command: String,

    /// Installer used when the runtime is absent.
    pub installer: InstallerConfig,

    /// Directories the installer adds to the system path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_hints: Vec<String>,
}

/// A downloadable, unattended runtime installer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// Where to download the installer from.
    pub url: String,

    /// File name for the downloaded installer.
    pub file_name: String,

    /// Program and arguments; `${installer}` is the downloaded file.
    pub args: Vec<String>,
}

/// Package manager repair settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageManagerConfig {
    /// Bootstrap script fetched when the built-in repair is not enough.
    pub bootstrap_url: String,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            bootstrap_url: default_bootstrap_url(),
        }
    }
}

fn default_bootstrap_url() -> String {
    "https://bootstrap.pypa.io/get-pip.py".to_string()
}

/// A large file the application needs at run time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Human-readable name for progress output.
    pub name: String,

    /// Source URL.
    pub url: String,

    /// Destination on disk.
    pub path: String,

    /// Expected SHA-256 of the file, lowercase hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Halt the install when this asset cannot be fetched
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
}

/// Where a launcher is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LauncherLocation {
    /// The user's desktop.
    Desktop,
    /// The application menu (Start Menu on Windows).
    StartMenu,
}

impl LauncherLocation {
    /// Lowercase label used in step names and output.
    pub fn label(&self) -> &'static str {
        match self {
            LauncherLocation::Desktop => "desktop",
            LauncherLocation::StartMenu => "start menu",
        }
    }
}

impl std::fmt::Display for LauncherLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One launcher to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Which location this launcher represents.
    pub location: LauncherLocation,

    /// Directory the launcher file is written to.
    pub dir: String,
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds before an idle connection attempt is abandoned
    pub connect_timeout_secs: u64,

    /// Upper bound on a whole download; unbounded when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            download_timeout_secs: None,
        }
    }
}

fn is_false(v: &bool) -> bool {
    !v
}
