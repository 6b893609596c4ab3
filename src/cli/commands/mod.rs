//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`]:
//! - [`provision`] runs the install or uninstall plan
//! - [`status`] reports probe results without changing anything

pub mod dispatcher;
pub mod provision;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use provision::ProvisionCommand;
pub use status::{StatusCommand, StatusReport};
