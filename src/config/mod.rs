//! Manifest loading, validation, and placeholder resolution.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - Loading the built-in or a file manifest in [`loader`]
//! - Validation in [`validator`]
//! - `${name}` placeholders in [`interpolation`]
//! - Expansion into typed values in [`resolved`]
//!
//! # Example
//!
//! ```
//! use croppass_setup::config::{parse_manifest, resolve_manifest, InterpolationContext};
//! use std::path::Path;
//!
//! let yaml = r#"
//! app:
//!   name: CropPass
//!   entry_point: ${exe_dir}/croppass.py
//! runtime:
//!   command: python3
//!   installer:
//!     url: https://example.com/python.pkg
//!     file_name: python.pkg
//!     args: ["${installer}"]
//! dependencies: [numpy]
//! "#;
//!
//! let manifest = parse_manifest(yaml, Path::new("setup.yml")).unwrap();
//! let ctx = InterpolationContext::empty().with("exe_dir", "/opt/croppass");
//! let resolved = resolve_manifest(&manifest, &ctx).unwrap();
//! assert_eq!(resolved.app.name, "CropPass");
//! ```

pub mod interpolation;
pub mod loader;
pub mod resolved;
pub mod schema;
pub mod validator;

// Schema re-exports
pub use schema::{
    AppConfig, AssetConfig, InstallerConfig, LauncherConfig, LauncherLocation, Manifest,
    PackageManagerConfig, RuntimeConfig, Settings,
};

// Loader re-exports
pub use loader::{builtin_manifest, load_manifest_file, load_resolved, parse_manifest};

// Resolution re-exports
pub use resolved::{
    resolve_manifest, LauncherTarget, ResolvedApp, ResolvedInstaller, ResolvedManifest,
    ResolvedRuntime,
};

// Validator re-exports
pub use validator::{validate, validate_manifest, ValidationError};

// Interpolation re-exports
pub use interpolation::{parse_interpolation, resolve_string, InterpolationContext, Segment};
