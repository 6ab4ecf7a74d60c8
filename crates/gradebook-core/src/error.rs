//! Error types for formula construction and evaluation.
//!
//! Configuration-time failures (`BuildError`) are surfaced to the caller.
//! Evaluation-time failures (`FormulaError`) are downgraded to a pending
//! grade by the evaluator and the roster aggregator; they only reach callers
//! that explicitly ask for a diagnostic.

use thiserror::Error;

/// Errors raised while turning a grading scheme into a formula string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// The averaging mode is neither simple nor weighted.
    #[error("invalid average type: '{0}' (expected 'simple' or 'weighted')")]
    InvalidAverageType(String),

    /// Weighted mode needs exactly one finite weight per component, and a
    /// finite total.
    #[error("weighted average requires one finite weight per component with a finite sum (expected {expected}, got {got})")]
    InvalidWeights { expected: usize, got: usize },

    /// The weights add up to zero or less.
    #[error("the sum of the weights must be greater than zero (got {0})")]
    ZeroWeightSum(f64),
}

/// Errors raised while parsing or evaluating a formula.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// A character that cannot start any token.
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    /// A token that does not fit the grammar at this point.
    #[error("unexpected '{found}' at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    /// The formula ended in the middle of an expression.
    #[error("unexpected end of formula")]
    UnexpectedEnd,

    /// A number literal that does not parse as a decimal.
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    /// The formula references a component that has no bound value.
    #[error("undefined symbol {0}")]
    UnboundVariable(String),

    /// The result is NaN or infinite (e.g. a division by zero).
    #[error("formula did not evaluate to a finite number")]
    NonFinite,

    /// The formula text exceeds the configured length limit.
    #[error("formula is too long ({len} characters, limit {max})")]
    TooLong { len: usize, max: usize },

    /// Parentheses or unary operators nest deeper than the configured limit.
    #[error("formula nesting exceeds depth limit of {0}")]
    TooDeep(usize),
}

impl FormulaError {
    /// Returns `true` if the error comes from the formula text itself, i.e.
    /// it will fail for every student regardless of their grades.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            FormulaError::UnexpectedChar { .. }
                | FormulaError::UnexpectedToken { .. }
                | FormulaError::UnexpectedEnd
                | FormulaError::InvalidNumber(_)
                | FormulaError::TooLong { .. }
                | FormulaError::TooDeep(_)
        )
    }
}
