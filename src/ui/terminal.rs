//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::steps::{format_duration, StepStatus};

use super::{
    NonInteractiveUI, OutputMode, ProgressSpinner, RunSummary, SetupTheme, SpinnerHandle,
    UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: SetupTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            term: Term::stdout(),
            theme: SetupTheme::detect(),
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_error(msg)).ok();
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_error_block(&mut self, title: &str, output: &str) {
        let b = &self.theme.border;
        writeln!(
            self.term,
            "    {} {}",
            b.apply_to("┌─"),
            b.apply_to(format!("{} ", title))
        )
        .ok();
        for line in output.lines() {
            writeln!(self.term, "    {} {}", b.apply_to("│"), line).ok();
        }
        writeln!(
            self.term,
            "    {}",
            b.apply_to("└────────────────────────────────────")
        )
        .ok();
    }

    fn show_run_summary(&mut self, summary: &RunSummary) {
        if !self.mode.shows_summary() {
            return;
        }

        let b = &self.theme.border;

        writeln!(self.term).ok();
        writeln!(
            self.term,
            "  {} {}",
            b.apply_to("┌─"),
            b.apply_to(format!("{} ──────────────────────────", summary.title))
        )
        .ok();

        for step in &summary.step_results {
            let icon = self.theme.format_status(step.status);
            let right_side = match (&step.duration, &step.detail) {
                (Some(duration), _) if step.status != StepStatus::Skipped => self
                    .theme
                    .duration
                    .apply_to(format_duration(*duration))
                    .to_string(),
                (_, Some(detail)) => self.theme.dim.apply_to(detail).to_string(),
                _ => String::new(),
            };

            writeln!(
                self.term,
                "  {} {} {:<24} {}",
                b.apply_to("│"),
                icon,
                step.name,
                right_side,
            )
            .ok();
        }

        writeln!(
            self.term,
            "  {}",
            b.apply_to("├────────────────────────────────────")
        )
        .ok();
        writeln!(
            self.term,
            "  {} Total: {} {} {} run {} {} skipped {} {} failed",
            b.apply_to("│"),
            self.theme
                .duration
                .apply_to(format_duration(summary.total_duration)),
            self.theme.dim.apply_to("·"),
            summary.steps_run,
            self.theme.dim.apply_to("·"),
            summary.steps_skipped,
            self.theme.dim.apply_to("·"),
            summary.steps_failed,
        )
        .ok();
        writeln!(
            self.term,
            "  {}",
            b.apply_to("└────────────────────────────────────")
        )
        .ok();
    }

    fn pause(&mut self, prompt: &str) {
        write!(self.term, "\n{} ", self.theme.dim.apply_to(prompt)).ok();
        self.term.flush().ok();
        if let Err(e) = self.term.read_line() {
            tracing::debug!("Pause ended without input: {}", e);
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Create the appropriate UI based on context.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}
