//! Placeholder interpolation for manifest values.
//!
//! Manifest paths and installer arguments may refer to well-known
//! locations using `${variable}` syntax.
//!
//! # Syntax
//!
//! - `${variable_name}` - replaced with variable value
//! - `$${escaped}` - produces literal `${escaped}` in output
//!
//! # Built-in variables
//!
//! - `home` - the user's home directory
//! - `exe_dir` - directory containing the setup executable
//! - `desktop` - the user's desktop directory
//! - `start_menu` - the per-user application menu directory
//!
//! # Example
//!
//! ```
//! use croppass_setup::config::{resolve_string, InterpolationContext};
//!
//! let ctx = InterpolationContext::empty().with("home", "/home/ada");
//! let path = resolve_string("${home}/.deepface/weights", &ctx).unwrap();
//! assert_eq!(path, "/home/ada/.deepface/weights");
//! ```

use crate::error::{ProvisionError, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing ${var} interpolations.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut current_literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            current_literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                // $$ becomes $, and $${...} stays literal
                chars.next();
                if chars.peek() == Some(&'{') {
                    chars.next();
                    current_literal.push_str("${");
                    for c in chars.by_ref() {
                        current_literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    current_literal.push('$');
                }
            }
            Some('{') => {
                chars.next();

                if !current_literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
                }

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                segments.push(Segment::Variable(var_name.trim().to_string()));
            }
            _ => current_literal.push(c),
        }
    }

    if !current_literal.is_empty() {
        segments.push(Segment::Literal(current_literal));
    }

    segments
}

/// Values available to `${...}` placeholders.
#[derive(Debug, Clone, Default)]
pub struct InterpolationContext {
    vars: HashMap<String, String>,
}

impl InterpolationContext {
    /// Create a context with no variables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a context with the built-in location variables.
    ///
    /// Locations that cannot be determined on this machine are left out,
    /// so manifests referring to them fail validation instead of writing
    /// to an unexpected place.
    pub fn from_environment() -> Self {
        let mut ctx = Self::empty();
        let home = dirs::home_dir();

        if let Some(home) = &home {
            ctx.insert_path("home", home.clone());
        }
        if let Some(dir) = crate::shell::exe_dir() {
            ctx.insert_path("exe_dir", dir);
        }
        if let Some(desktop) = dirs::desktop_dir().or_else(|| home.map(|h| h.join("Desktop"))) {
            ctx.insert_path("desktop", desktop);
        }
        if let Some(menu) = start_menu_dir() {
            ctx.insert_path("start_menu", menu);
        }

        ctx
    }

    /// Add or replace a variable.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    fn insert_path(&mut self, name: &str, path: PathBuf) {
        self.vars
            .insert(name.to_string(), path.to_string_lossy().to_string());
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Per-user application menu directory for this platform.
fn start_menu_dir() -> Option<PathBuf> {
    let data = dirs::data_dir()?;
    if cfg!(windows) {
        Some(
            data.join("Microsoft")
                .join("Windows")
                .join("Start Menu")
                .join("Programs"),
        )
    } else {
        Some(data.join("applications"))
    }
}

/// Resolve all variables in an interpolated string.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any variable is not found in the context.
pub fn resolve_string(input: &str, context: &InterpolationContext) -> Result<String> {
    let mut result = String::new();

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value = context.resolve(&name).ok_or_else(|| {
                    ProvisionError::ConfigValidationError {
                        message: format!("Unresolved variable: ${{{}}}", name),
                    }
                })?;
                result.push_str(value);
            }
        }
    }

    Ok(result)
}
