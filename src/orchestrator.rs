//! Per-target pipeline
//!
//! Each target runs `Start -> Probing(1..N) -> Aggregating -> Matching ->
//! Reporting -> Done`. A probe failure moves the target to `Failed` and the
//! run continues with the next target. Targets share nothing but the
//! read-only signature table.

use crate::aggregate::{measure_target, TargetMeasurement};
use crate::error::GuessError;
use crate::probe::Prober;
use crate::signature::{match_signatures, Guess, SignatureTable};
use log::{debug, info, warn};
use std::fmt;

/// Pipeline stage of a single target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Start,
    Probing { trial: usize },
    Aggregating,
    Matching,
    Reporting,
    Done,
    Failed,
}

impl TargetState {
    /// Whether the pipeline may move from `self` to `next`.
    pub fn can_advance_to(&self, next: TargetState) -> bool {
        use TargetState::*;
        match (*self, next) {
            (Start, Probing { trial: 1 }) => true,
            (Probing { trial }, Probing { trial: following }) => following == trial + 1,
            (Probing { .. }, Aggregating) | (Probing { .. }, Failed) => true,
            (Aggregating, Matching) | (Matching, Reporting) | (Reporting, Done) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TargetState::Done | TargetState::Failed)
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetState::Start => write!(f, "start"),
            TargetState::Probing { trial } => write!(f, "probing (trial {})", trial),
            TargetState::Aggregating => write!(f, "aggregating"),
            TargetState::Matching => write!(f, "matching"),
            TargetState::Reporting => write!(f, "reporting"),
            TargetState::Done => write!(f, "done"),
            TargetState::Failed => write!(f, "failed"),
        }
    }
}

/// How a target's evaluation ended
#[derive(Debug)]
pub enum TargetOutcome {
    Classified {
        measurement: TargetMeasurement,
        guesses: Vec<Guess>,
    },
    Failed(GuessError),
}

/// Result of evaluating one target
#[derive(Debug)]
pub struct TargetReport {
    pub target: String,
    pub state: TargetState,
    pub outcome: TargetOutcome,
}

impl TargetReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TargetOutcome::Classified { .. })
    }

    /// Ranked guesses, empty for failed targets
    pub fn guesses(&self) -> &[Guess] {
        match &self.outcome {
            TargetOutcome::Classified { guesses, .. } => guesses,
            TargetOutcome::Failed(_) => &[],
        }
    }

    pub fn measurement(&self) -> Option<&TargetMeasurement> {
        match &self.outcome {
            TargetOutcome::Classified { measurement, .. } => Some(measurement),
            TargetOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&GuessError> {
        match &self.outcome {
            TargetOutcome::Failed(error) => Some(error),
            TargetOutcome::Classified { .. } => None,
        }
    }
}

/// Counts of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Runs the probe/aggregate/match pipeline for each target in turn
pub struct Orchestrator<'a, P: Prober> {
    prober: P,
    table: &'a SignatureTable,
    trials: usize,
    tolerance: u64,
}

fn advance(target: &str, state: &mut TargetState, next: TargetState) {
    debug_assert!(
        state.can_advance_to(next),
        "invalid transition {} -> {}",
        state,
        next
    );
    debug!("{}: {} -> {}", target, state, next);
    *state = next;
}

impl<'a, P: Prober> Orchestrator<'a, P> {
    pub fn new(prober: P, table: &'a SignatureTable, trials: usize, tolerance: u64) -> Self {
        Self {
            prober,
            table,
            trials,
            tolerance,
        }
    }

    /// Evaluate a single target from scratch
    pub async fn evaluate(&self, target: &str) -> TargetReport {
        let mut state = TargetState::Start;

        let result = measure_target(&self.prober, target, self.trials, |trial| {
            advance(target, &mut state, TargetState::Probing { trial });
        })
        .await;

        let measurement = match result {
            Ok(measurement) => measurement,
            Err(error) => {
                // A zero trial count never leaves Start
                if matches!(state, TargetState::Probing { .. }) {
                    advance(target, &mut state, TargetState::Failed);
                } else {
                    state = TargetState::Failed;
                }
                warn!("{}: {}", target, error);
                return TargetReport {
                    target: target.to_string(),
                    state,
                    outcome: TargetOutcome::Failed(error),
                };
            }
        };

        advance(target, &mut state, TargetState::Aggregating);
        let aggregate = measurement.aggregate;

        advance(target, &mut state, TargetState::Matching);
        let guesses = match_signatures(self.table, aggregate.mean, self.tolerance);

        advance(target, &mut state, TargetState::Reporting);
        info!(
            "{}: mean ttl {} (std dev {:.3}) over {} tries, {} guesses",
            target,
            aggregate.mean,
            aggregate.std_dev,
            aggregate.samples,
            guesses.len()
        );

        advance(target, &mut state, TargetState::Done);
        TargetReport {
            target: target.to_string(),
            state,
            outcome: TargetOutcome::Classified {
                measurement,
                guesses,
            },
        }
    }

    /// Evaluate targets in input order, handing each report to `on_report`
    /// as soon as it is ready.
    pub async fn run_each<F>(&self, targets: &[String], mut on_report: F) -> RunSummary
    where
        F: FnMut(TargetReport),
    {
        let mut summary = RunSummary::default();
        for target in targets {
            let report = self.evaluate(target).await;
            if report.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            on_report(report);
        }
        info!(
            "Finished {} targets: {} classified, {} failed",
            summary.total(),
            summary.succeeded,
            summary.failed
        );
        summary
    }

    /// Evaluate all targets and collect their reports
    pub async fn run(&self, targets: &[String]) -> Vec<TargetReport> {
        let mut reports = Vec::with_capacity(targets.len());
        self.run_each(targets, |report| reports.push(report)).await;
        reports
    }
}
