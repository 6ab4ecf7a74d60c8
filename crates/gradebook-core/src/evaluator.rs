//! Final grade evaluation.
//!
//! Applies the grading rules on top of [`crate::expr`]: component grades are
//! clamped into `[0, 10]` before binding, a single missing grade makes the
//! final grade pending, and the result is capped at 10 and rounded to two
//! decimals. Evaluation never fails; every problem becomes a pending grade.

use std::collections::HashMap;
use std::fmt;

use crate::error::FormulaError;
use crate::expr::{self, Expr, ParseLimits};
use crate::model::{clamp_grade, ComponentValue, MAX_GRADE};

/// Why a final grade could not be computed.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingReason {
    /// The course has no formula configured.
    NoFormula,
    /// A component grade is missing or not a finite number.
    MissingComponent(String),
    /// The formula could not be parsed or evaluated.
    Failed(FormulaError),
}

impl fmt::Display for PendingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingReason::NoFormula => write!(f, "no formula configured"),
            PendingReason::MissingComponent(sigla) => write!(f, "missing grade for {sigla}"),
            PendingReason::Failed(err) => write!(f, "formula error: {err}"),
        }
    }
}

/// Result of evaluating a formula for one student, with diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum GradeOutcome {
    Graded(f64),
    Pending(PendingReason),
}

impl GradeOutcome {
    /// The plain grade contract: a number, or `None` for pending.
    pub fn grade(&self) -> Option<f64> {
        match self {
            GradeOutcome::Graded(g) => Some(*g),
            GradeOutcome::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, GradeOutcome::Pending(_))
    }
}

/// A formula parsed once and reusable across any number of students.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormula {
    source: String,
    expr: Expr,
}

impl CompiledFormula {
    /// Parse `formula` with the default limits.
    pub fn compile(formula: &str) -> Result<Self, FormulaError> {
        Self::compile_with_limits(formula, ParseLimits::default())
    }

    /// Parse `formula` with explicit length and nesting limits.
    pub fn compile_with_limits(formula: &str, limits: ParseLimits) -> Result<Self, FormulaError> {
        let expr = expr::parse_with_limits(formula, limits)?;
        Ok(Self {
            source: formula.to_string(),
            expr,
        })
    }

    /// The formula text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Uppercased identifiers referenced by the formula.
    pub fn variables(&self) -> Vec<String> {
        self.expr.variables()
    }

    /// Evaluate for one student, keeping the reason when the grade is pending.
    pub fn evaluate(&self, values: &[ComponentValue]) -> GradeOutcome {
        let bindings = match bind(values) {
            Ok(b) => b,
            Err(reason) => return GradeOutcome::Pending(reason),
        };

        match self.expr.eval(&bindings) {
            Ok(raw) => match finalize(raw) {
                Some(grade) => GradeOutcome::Graded(grade),
                None => GradeOutcome::Pending(PendingReason::Failed(FormulaError::NonFinite)),
            },
            Err(e) => GradeOutcome::Pending(PendingReason::Failed(e)),
        }
    }

    /// Evaluate for one student; `None` means pending.
    pub fn final_grade(&self, values: &[ComponentValue]) -> Option<f64> {
        self.evaluate(values).grade()
    }
}

/// Clamp every value and key it by the uppercased sigla. Fails on the first
/// missing or non-finite value.
fn bind(values: &[ComponentValue]) -> Result<HashMap<String, f64>, PendingReason> {
    let mut bindings = HashMap::with_capacity(values.len());
    for component in values {
        match component.value {
            Some(v) if v.is_finite() => {
                bindings.insert(component.sigla.to_uppercase(), clamp_grade(v));
            }
            _ => return Err(PendingReason::MissingComponent(component.sigla.clone())),
        }
    }
    Ok(bindings)
}

/// Cap the result at the maximum grade (no lower bound) and round to cents.
/// `None` when the raw value, or its scaled form while rounding, is not finite.
fn finalize(raw: f64) -> Option<f64> {
    if !raw.is_finite() {
        return None;
    }
    Some(round_half_up(raw.min(MAX_GRADE), 2)).filter(|g| g.is_finite())
}

/// Round to `decimals` places, with ties going toward positive infinity.
pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// Evaluate `formula` for one student, with a diagnostic when pending.
///
/// Missing grades are checked before the formula is parsed, so an incomplete
/// student is reported as missing a component even if the formula is broken.
pub fn evaluate_detailed(formula: &str, values: &[ComponentValue]) -> GradeOutcome {
    if formula.trim().is_empty() {
        return GradeOutcome::Pending(PendingReason::NoFormula);
    }
    if let Err(reason) = bind(values) {
        return GradeOutcome::Pending(reason);
    }
    match CompiledFormula::compile(formula) {
        Ok(compiled) => compiled.evaluate(values),
        Err(e) => GradeOutcome::Pending(PendingReason::Failed(e)),
    }
}

/// Evaluate `formula` for one student; `None` means pending.
pub fn evaluate_final_grade(formula: &str, values: &[ComponentValue]) -> Option<f64> {
    let outcome = evaluate_detailed(formula, values);
    if let GradeOutcome::Pending(PendingReason::Failed(err)) = &outcome {
        tracing::debug!("final grade pending: {err}");
    }
    outcome.grade()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vals(pairs: &[(&str, Option<f64>)]) -> Vec<ComponentValue> {
        pairs
            .iter()
            .map(|(s, v)| ComponentValue::new(*s, *v))
            .collect()
    }

    #[test]
    fn simple_average() {
        let v = vals(&[("P1", Some(10.0)), ("P2", Some(8.0))]);
        assert_eq!(evaluate_final_grade("(P1 + P2) / 2", &v), Some(9.0));
    }

    #[test]
    fn missing_component_is_pending() {
        let v = vals(&[("P1", None), ("P2", Some(8.0))]);
        assert_eq!(evaluate_final_grade("(P1 + P2) / 2", &v), None);
        assert_eq!(
            evaluate_detailed("(P1 + P2) / 2", &v),
            GradeOutcome::Pending(PendingReason::MissingComponent("P1".into()))
        );
    }

    #[test]
    fn missing_component_wins_over_broken_formula() {
        let v = vals(&[("P1", Some(5.0)), ("P2", None)]);
        assert_eq!(
            evaluate_detailed("(P1 + ", &v),
            GradeOutcome::Pending(PendingReason::MissingComponent("P2".into()))
        );
    }

    #[test]
    fn missing_component_not_in_formula_still_blocks() {
        let v = vals(&[("P1", Some(5.0)), ("EXTRA", None)]);
        assert_eq!(evaluate_final_grade("P1", &v), None);
    }

    #[test]
    fn non_finite_value_is_pending() {
        let v = vals(&[("P1", Some(f64::NAN)), ("P2", Some(8.0))]);
        assert_eq!(evaluate_final_grade("(P1 + P2) / 2", &v), None);
        let v = vals(&[("P1", Some(f64::INFINITY))]);
        assert_eq!(evaluate_final_grade("P1", &v), None);
    }

    #[test]
    fn inputs_are_clamped() {
        let v = vals(&[("P1", Some(-5.0)), ("P2", Some(20.0))]);
        assert_eq!(evaluate_final_grade("(P1 + P2) / 2", &v), Some(5.0));
    }

    #[test]
    fn result_capped_at_ten() {
        let v = vals(&[("P1", Some(8.0))]);
        assert_eq!(evaluate_final_grade("P1 * 2", &v), Some(10.0));
    }

    #[test]
    fn negative_result_is_kept() {
        let v = vals(&[("P1", Some(2.0))]);
        assert_eq!(evaluate_final_grade("P1 - 5", &v), Some(-3.0));
    }

    #[test]
    fn huge_negative_result_is_pending() {
        let v = vals(&[("P1", Some(5.0))]);
        let formula = format!("P1 - 1{}", "0".repeat(307));
        assert_eq!(evaluate_final_grade(&formula, &v), None);
        assert_eq!(
            evaluate_detailed(&formula, &v),
            GradeOutcome::Pending(PendingReason::Failed(FormulaError::NonFinite))
        );

        // Still representable after scaling by 100.
        assert_eq!(evaluate_final_grade("P1 - 1000000", &v), Some(-999995.0));
    }

    #[test]
    fn all_tens_give_ten() {
        let v = vals(&[("P1", Some(10.0)), ("P2", Some(10.0)), ("P3", Some(10.0))]);
        assert_eq!(evaluate_final_grade("(P1 + P2 + P3) / 3", &v), Some(10.0));
        assert_eq!(
            evaluate_final_grade("(P1 * 0.2) + (P2 * 0.3) + (P3 * 0.5)", &v),
            Some(10.0)
        );
    }

    #[test]
    fn rounds_to_two_decimals() {
        let v = vals(&[("P1", Some(7.0)), ("P2", Some(8.0)), ("P3", Some(8.0))]);
        assert_eq!(evaluate_final_grade("(P1 + P2 + P3) / 3", &v), Some(7.67));
    }

    #[test]
    fn round_half_up_ties() {
        assert_eq!(round_half_up(2.125, 2), 2.13);
        assert_eq!(round_half_up(-2.125, 2), -2.12);
        assert_eq!(round_half_up(9.0, 2), 9.0);
    }

    #[test]
    fn empty_formula_is_pending() {
        let v = vals(&[("P1", Some(8.0))]);
        assert_eq!(evaluate_final_grade("", &v), None);
        assert_eq!(
            evaluate_detailed("   ", &v),
            GradeOutcome::Pending(PendingReason::NoFormula)
        );
    }

    #[test]
    fn syntax_error_is_pending() {
        let v = vals(&[("P1", Some(8.0))]);
        assert_eq!(evaluate_final_grade("(P1 +", &v), None);
        assert!(matches!(
            evaluate_detailed("P1 ** 2", &v),
            GradeOutcome::Pending(PendingReason::Failed(_))
        ));
    }

    #[test]
    fn unbound_identifier_is_pending() {
        let v = vals(&[("P1", Some(8.0))]);
        assert_eq!(
            evaluate_detailed("(P1 + P2) / 2", &v),
            GradeOutcome::Pending(PendingReason::Failed(FormulaError::UnboundVariable(
                "P2".into()
            )))
        );
    }

    #[test]
    fn division_by_zero_is_pending() {
        let v = vals(&[("P1", Some(0.0))]);
        assert_eq!(
            evaluate_detailed("10 / P1", &v),
            GradeOutcome::Pending(PendingReason::Failed(FormulaError::NonFinite))
        );
    }

    #[test]
    fn siglas_bind_case_insensitively() {
        let v = vals(&[("p1", Some(6.0)), ("p2", Some(8.0))]);
        assert_eq!(evaluate_final_grade("(P1 + P2) / 2", &v), Some(7.0));
        assert_eq!(evaluate_final_grade("(p1 + p2) / 2", &v), Some(7.0));
    }

    #[test]
    fn zero_is_a_real_grade() {
        let v = vals(&[("P1", Some(0.0)), ("P2", Some(6.0))]);
        assert_eq!(evaluate_final_grade("(P1 + P2) / 2", &v), Some(3.0));
    }

    #[test]
    fn compiled_formula_is_reusable() {
        let compiled = CompiledFormula::compile("(P1 * 0.4) + (P2 * 0.6)").unwrap();
        assert_eq!(compiled.variables(), vec!["P1".to_string(), "P2".to_string()]);
        assert_eq!(
            compiled.final_grade(&vals(&[("P1", Some(5.0)), ("P2", Some(10.0))])),
            Some(8.0)
        );
        assert_eq!(
            compiled.final_grade(&vals(&[("P1", Some(10.0)), ("P2", Some(5.0))])),
            Some(7.0)
        );
        assert_eq!(compiled.final_grade(&vals(&[("P1", Some(10.0)), ("P2", None)])), None);
        assert_eq!(compiled.source(), "(P1 * 0.4) + (P2 * 0.6)");
    }

    #[test]
    fn pending_reason_display() {
        assert_eq!(
            PendingReason::MissingComponent("P2".into()).to_string(),
            "missing grade for P2"
        );
        assert_eq!(
            PendingReason::Failed(FormulaError::UnboundVariable("X".into())).to_string(),
            "formula error: undefined symbol X"
        );
    }
}
