//! croppass-setup - Provision a machine to run CropPass.
//!
//! CropPass is a Python desktop application. This crate brings a machine
//! from nothing to ready: it installs the Python runtime, repairs pip if
//! needed, installs the application's packages, downloads its model
//! weights, and writes desktop and start-menu launchers. Every step probes
//! first, so running setup again only does what is still missing.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Manifest loading, validation, and placeholders
//! - [`detection`] - Read-only probes of machine state
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - Downloading installers, scripts, and assets
//! - [`provision`] - Provisioners that change machine state
//! - [`runner`] - Plan execution and run reports
//! - [`shell`] - External program execution and PATH handling
//! - [`steps`] - The step abstraction and provisioning plans
//! - [`ui`] - Spinners, summaries, and terminal output
//!
//! # Example
//!
//! ```
//! use croppass_setup::config::{load_resolved, InterpolationContext};
//! use croppass_setup::steps::{PlanMode, ProvisioningPlan};
//!
//! let ctx = InterpolationContext::empty()
//!     .with("home", "/home/ada")
//!     .with("exe_dir", "/opt/croppass")
//!     .with("desktop", "/home/ada/Desktop")
//!     .with("start_menu", "/home/ada/.local/share/applications");
//! let manifest = load_resolved(None, &ctx).unwrap();
//!
//! let plan = ProvisioningPlan::new(PlanMode::Uninstall, &manifest);
//! assert_eq!(plan.len(), 4);
//! assert_eq!(plan.steps()[0].name(), "start menu launcher");
//! ```

pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod fetch;
pub mod provision;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{ProvisionError, Result};
