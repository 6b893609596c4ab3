//! Manifest loading.
//!
//! The manifest is compiled into the binary for the target platform.
//! A manifest file can be supplied instead, which is how packagers point
//! the tool at mirrors and how the integration tests keep it offline.

use crate::config::interpolation::InterpolationContext;
use crate::config::resolved::{resolve_manifest, ResolvedManifest};
use crate::config::schema::Manifest;
use crate::error::{ProvisionError, Result};
use std::fs;
use std::path::Path;

#[cfg(windows)]
const BUILTIN_MANIFEST: &str = include_str!("../../manifests/windows.yml");

#[cfg(not(windows))]
const BUILTIN_MANIFEST: &str = include_str!("../../manifests/unix.yml");

/// Name shown in errors about the compiled-in manifest.
const BUILTIN_NAME: &str = "<built-in manifest>";

/// The manifest compiled into this binary.
pub fn builtin_manifest() -> Result<Manifest> {
    parse_manifest(BUILTIN_MANIFEST, Path::new(BUILTIN_NAME))
}

/// Load a manifest file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_manifest_file(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProvisionError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ProvisionError::Io(e)
        }
    })?;

    parse_manifest(&content, path)
}

/// Parse YAML content into a Manifest.
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_manifest(content: &str, source_path: &Path) -> Result<Manifest> {
    serde_yaml::from_str(content).map_err(|e| ProvisionError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the manifest to use for this run and resolve it.
///
/// Uses `override_path` when given, otherwise the compiled-in manifest.
pub fn load_resolved(
    override_path: Option<&Path>,
    ctx: &InterpolationContext,
) -> Result<ResolvedManifest> {
    let manifest = match override_path {
        Some(path) => {
            tracing::debug!("Loading manifest from {}", path.display());
            load_manifest_file(path)?
        }
        None => builtin_manifest()?,
    };

    resolve_manifest(&manifest, ctx)
}
