//! External program execution and execution-path management.

pub mod command;
pub mod platform;
pub mod refresh;
pub mod scripted;

pub use command::{display_command, CommandResult, CommandRunner, ProcessRunner};
pub use platform::{executable_candidates, exe_dir, is_ci};
pub use refresh::{missing_entries, parse_system_path, prepend_to_process_path};
pub use scripted::ScriptedRunner;
