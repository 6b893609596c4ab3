//! Plan execution.
//!
//! Steps run strictly in plan order, one at a time. A failing step whose
//! policy is fatal halts the run and every later step is reported as not
//! run; any other failure is recorded and the run moves on.

use std::time::Instant;

use crate::provision::ProvisionContext;
use crate::steps::{FailurePolicy, PlanMode, ProvisioningPlan, Step, StepOutcome, StepStatus};
use crate::ui::UserInterface;

use super::report::{RunReport, RunState, StepReport};

/// Options for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Only probe; change nothing.
    pub dry_run: bool,
}

/// Drives a [`ProvisioningPlan`] through the run state machine.
#[derive(Debug, Default)]
pub struct Orchestrator {
    options: RunOptions,
}

impl Orchestrator {
    /// Create an orchestrator.
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Run every step of `plan` and report what happened.
    ///
    /// Step failures never escape as errors; they are recorded in the
    /// report, which also decides the process exit code.
    pub fn run(
        &self,
        plan: &ProvisioningPlan,
        ctx: &ProvisionContext<'_>,
        ui: &mut dyn UserInterface,
    ) -> RunReport {
        let started = Instant::now();
        let mode = plan.mode();
        let total = plan.len();

        let mut states = vec![RunState::Idle];
        let mut steps = Vec::with_capacity(total);
        let mut halted_by: Option<String> = None;

        tracing::info!(
            "Starting {} with {} step(s){}",
            mode,
            total,
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        for (index, step) in plan.steps().iter().enumerate() {
            let step: &dyn Step = step.as_ref();
            let phase = mode.phase_of(step);

            if halted_by.is_some() {
                steps.push(StepReport {
                    name: step.name().to_string(),
                    phase,
                    status: StepStatus::NotRun,
                    detail: None,
                    duration: Default::default(),
                    error: None,
                });
                continue;
            }

            let state = RunState::from(phase);
            let previous = states.last().copied().unwrap_or(RunState::Idle);
            if previous != state {
                tracing::info!("{:?} -> {:?}", previous, state);
                states.push(state);
            }

            let label = format!("[{}/{}] {}: {}", index + 1, total, phase, step.name());
            let mut spinner = ui.start_spinner(&label);
            let step_started = Instant::now();

            let report = if self.options.dry_run {
                let satisfied = match mode {
                    PlanMode::Install => step.detect(ctx),
                    PlanMode::Uninstall => step.detect_removed(ctx),
                };
                let (status, detail) = if satisfied {
                    spinner.finish_skipped(&format!("{} (already satisfied)", step.name()));
                    (StepStatus::Skipped, "already satisfied")
                } else {
                    spinner.finish_skipped(&format!("{} (would run)", step.name()));
                    (StepStatus::NotRun, "would run")
                };
                StepReport {
                    name: step.name().to_string(),
                    phase,
                    status,
                    detail: Some(detail.to_string()),
                    duration: step_started.elapsed(),
                    error: None,
                }
            } else {
                let result = match mode {
                    PlanMode::Install => step.apply(ctx),
                    PlanMode::Uninstall => step.reverse(ctx),
                };
                let duration = step_started.elapsed();

                match result {
                    Ok(outcome) => {
                        let line = format!("{} ({})", step.name(), outcome.detail());
                        let status = match &outcome {
                            StepOutcome::Done { .. } => {
                                spinner.finish_success(&line);
                                StepStatus::Done
                            }
                            StepOutcome::Skipped { .. } => {
                                spinner.finish_skipped(&line);
                                StepStatus::Skipped
                            }
                        };
                        tracing::debug!("{} {} in {:?}", step.name(), status, duration);
                        StepReport {
                            name: step.name().to_string(),
                            phase,
                            status,
                            detail: Some(outcome.detail().to_string()),
                            duration,
                            error: None,
                        }
                    }
                    Err(e) => {
                        spinner.finish_error(&format!("{}: {}", step.name(), e));
                        if let Some(output) = e.diagnostic() {
                            ui.show_error_block(step.name(), output);
                        }

                        if mode.policy_of(step) == FailurePolicy::Fatal {
                            tracing::error!("{} failed, stopping: {}", step.name(), e);
                            halted_by = Some(step.name().to_string());
                        } else {
                            tracing::warn!("{} failed, continuing: {}", step.name(), e);
                        }

                        StepReport {
                            name: step.name().to_string(),
                            phase,
                            status: StepStatus::Failed,
                            detail: None,
                            duration,
                            error: Some(e.to_string()),
                        }
                    }
                }
            };

            steps.push(report);
        }

        let final_state = if halted_by.is_some() {
            RunState::Halted
        } else {
            RunState::Done
        };
        states.push(final_state);
        tracing::info!("{} finished: {:?}", mode, final_state);

        RunReport {
            mode,
            dry_run: self.options.dry_run,
            final_state,
            states,
            steps,
            halted_by,
            total_duration: started.elapsed(),
        }
    }
}
