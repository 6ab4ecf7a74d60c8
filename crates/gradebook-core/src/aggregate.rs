//! Roster-wide final grade computation and summary statistics.

use serde::{Deserialize, Serialize};

use crate::evaluator::{CompiledFormula, GradeOutcome, PendingReason};
use crate::expr::ParseLimits;
use crate::model::{RosterEntry, StudentFinal};

/// Compute the final grade of every student in `roster`.
///
/// The formula is parsed once and reused for every student. One result is
/// produced per roster entry, in roster order; a formula that fails to parse
/// makes every student pending.
pub fn compute_roster_finals(formula: &str, roster: &[RosterEntry]) -> Vec<StudentFinal> {
    compute_roster_finals_with_limits(formula, roster, ParseLimits::default())
}

/// Like [`compute_roster_finals`], with explicit parse limits.
pub fn compute_roster_finals_with_limits(
    formula: &str,
    roster: &[RosterEntry],
    limits: ParseLimits,
) -> Vec<StudentFinal> {
    if formula.trim().is_empty() {
        return all_pending(roster);
    }

    match CompiledFormula::compile_with_limits(formula, limits) {
        Ok(compiled) => compute_roster_finals_with(&compiled, roster),
        Err(e) => {
            tracing::warn!(
                "formula '{}' failed to compile, {} student(s) left pending: {}",
                formula,
                roster.len(),
                e
            );
            all_pending(roster)
        }
    }
}

/// Compute final grades using an already compiled formula.
pub fn compute_roster_finals_with(
    compiled: &CompiledFormula,
    roster: &[RosterEntry],
) -> Vec<StudentFinal> {
    roster
        .iter()
        .map(|entry| {
            let outcome = compiled.evaluate(&entry.values());
            if let GradeOutcome::Pending(reason) = &outcome {
                log_pending(&entry.student_id, reason);
            }
            StudentFinal {
                student_id: entry.student_id.clone(),
                final_grade: outcome.grade(),
            }
        })
        .collect()
}

fn all_pending(roster: &[RosterEntry]) -> Vec<StudentFinal> {
    roster
        .iter()
        .map(|entry| StudentFinal {
            student_id: entry.student_id.clone(),
            final_grade: None,
        })
        .collect()
}

fn log_pending(student_id: &str, reason: &PendingReason) {
    match reason {
        PendingReason::Failed(e) => tracing::debug!("student {student_id}: final grade pending, {e}"),
        other => tracing::trace!("student {student_id}: {other}"),
    }
}

/// Counts and spread of the final grades of a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSummary {
    pub students: usize,
    pub graded: usize,
    pub pending: usize,
    /// Mean of graded finals, rounded to two decimals.
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RosterSummary {
    pub fn from_finals(finals: &[StudentFinal]) -> Self {
        let graded: Vec<f64> = finals.iter().filter_map(|f| f.final_grade).collect();

        let mean = if graded.is_empty() {
            None
        } else {
            let avg = graded.iter().sum::<f64>() / graded.len() as f64;
            Some(crate::evaluator::round_half_up(avg, 2))
        };

        Self {
            students: finals.len(),
            graded: graded.len(),
            pending: finals.len() - graded.len(),
            mean,
            min: graded.iter().copied().reduce(f64::min),
            max: graded.iter().copied().reduce(f64::max),
        }
    }
}
