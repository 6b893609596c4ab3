//! Non-interactive UI for CI, pipes and redirected output.

use crate::steps::format_duration;

use super::{OutputMode, RunSummary, SpinnerHandle, UserInterface};

/// UI implementation for non-interactive mode.
///
/// Plain lines only: no spinners, no colors, and no waiting for input.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_details() {
            println!("… {}", message);
        }
        Box::new(LineSpinner {
            visible: self.mode.shows_status(),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_error_block(&mut self, title: &str, output: &str) {
        eprintln!("--- {} ---", title);
        for line in output.lines() {
            eprintln!("  {}", line);
        }
        eprintln!("---");
    }

    fn show_run_summary(&mut self, summary: &RunSummary) {
        if !self.mode.shows_summary() {
            return;
        }

        println!();
        println!("{}:", summary.title);
        for step in &summary.step_results {
            let detail = step.detail.as_deref().unwrap_or("");
            println!("  {} {:<24} {}", step.status.display_char(), step.name, detail);
        }
        println!(
            "Total: {} · {} run · {} skipped · {} failed",
            format_duration(summary.total_duration),
            summary.steps_run,
            summary.steps_skipped,
            summary.steps_failed,
        );
    }

    fn pause(&mut self, _prompt: &str) {}

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner stand-in that prints a single line when the operation finishes.
struct LineSpinner {
    visible: bool,
}

impl LineSpinner {
    fn finish(&self, icon: char, msg: &str) {
        if self.visible {
            println!("{} {}", icon, msg);
        }
    }
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.finish('✓', msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish('✗', msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finish('⊘', msg);
    }
}
