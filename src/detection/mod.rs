//! Machine state detection.
//!
//! Probes never mutate anything and never return errors.

pub mod detector;
pub mod probe;

pub use detector::{asset_present, launcher_present, Detector};
pub use probe::{extract_version, normalize_package_name, resolve_tool_path, shown_package_names};
