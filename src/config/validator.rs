//! Manifest validation rules.
//!
//! This module validates a manifest before any step runs:
//! - The application needs a name and an entry point
//! - The runtime needs a command and an installer invocation
//! - At least one dependency must be declared
//! - Asset URLs must be http(s) and pinned digests must be SHA-256 hex
//! - A launcher location may appear only once

use crate::config::schema::Manifest;
use crate::error::{ProvisionError, Result};
use std::collections::HashSet;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a manifest and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing the manifest to be fixed in one pass.
pub fn validate_manifest(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_app(manifest));
    errors.extend(validate_runtime(manifest));
    errors.extend(validate_dependencies(manifest));
    errors.extend(validate_assets(manifest));
    errors.extend(validate_launchers(manifest));

    errors
}

/// Validate a manifest, failing with all messages joined.
pub fn validate(manifest: &Manifest) -> Result<()> {
    let errors = validate_manifest(manifest);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| format!("[{}] {}", e.rule, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(ProvisionError::ConfigValidationError { message })
}

fn validate_app(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if manifest.app.name.trim().is_empty() {
        errors.push(ValidationError::new("app-name", "app.name must not be empty"));
    }
    if manifest.app.name.contains(['/', '\\']) {
        errors.push(ValidationError::new(
            "app-name",
            "app.name is used as a file name and must not contain path separators",
        ));
    }
    if manifest.app.entry_point.trim().is_empty() {
        errors.push(ValidationError::new(
            "app-entry-point",
            "app.entry_point must not be empty",
        ));
    }

    errors
}

fn validate_runtime(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let runtime = &manifest.runtime;

    if runtime.command.trim().is_empty() {
        errors.push(ValidationError::new(
            "runtime-command",
            "runtime.command must not be empty",
        ));
    }
    if runtime.installer.args.is_empty() {
        errors.push(ValidationError::new(
            "installer-args",
            "runtime.installer.args must name the program to run",
        ));
    }
    if runtime.installer.file_name.trim().is_empty() {
        errors.push(ValidationError::new(
            "installer-file-name",
            "runtime.installer.file_name must not be empty",
        ));
    }
    if !is_plain_file_name(&runtime.installer.file_name) {
        errors.push(ValidationError::new(
            "installer-file-name",
            "runtime.installer.file_name must be a bare file name without path separators",
        ));
    }
    if !is_http_url(&runtime.installer.url) {
        errors.push(ValidationError::new(
            "installer-url",
            format!(
                "runtime.installer.url '{}' must be an http(s) URL",
                runtime.installer.url
            ),
        ));
    }
    if !is_http_url(&manifest.package_manager.bootstrap_url) {
        errors.push(ValidationError::new(
            "bootstrap-url",
            "package_manager.bootstrap_url must be an http(s) URL",
        ));
    }

    errors
}

fn validate_dependencies(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if manifest.dependencies.is_empty() {
        errors.push(ValidationError::new(
            "no-dependencies",
            "at least one dependency must be declared",
        ));
    }
    for dep in &manifest.dependencies {
        let dep = dep.trim();
        if dep.is_empty() || dep.starts_with('-') || dep.contains(char::is_whitespace) {
            errors.push(ValidationError::new(
                "dependency-name",
                format!("'{}' is not a valid dependency name", dep),
            ));
        }
    }

    errors
}

fn validate_assets(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for asset in &manifest.assets {
        if !is_http_url(&asset.url) {
            errors.push(ValidationError::new(
                "asset-url",
                format!("asset '{}' url must be an http(s) URL", asset.name),
            ));
        }
        if asset.path.trim().is_empty() {
            errors.push(ValidationError::new(
                "asset-path",
                format!("asset '{}' needs a path", asset.name),
            ));
        }
        if let Some(digest) = &asset.sha256 {
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                errors.push(ValidationError::new(
                    "asset-sha256",
                    format!("asset '{}' sha256 must be 64 hex characters", asset.name),
                ));
            }
        }
    }

    errors
}

fn validate_launchers(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for launcher in &manifest.launchers {
        if !seen.insert(launcher.location) {
            errors.push(ValidationError::new(
                "duplicate-launcher",
                format!("launcher location '{}' is listed twice", launcher.location),
            ));
        }
    }

    errors
}

/// A single path component that stays inside the directory it is joined to.
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}
