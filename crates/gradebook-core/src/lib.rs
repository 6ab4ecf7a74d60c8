//! gradebook-core: grade formula engine.
//!
//! Builds formula strings from an averaging scheme, checks formulas against
//! the registered components, and evaluates them per student into a final
//! grade that is either a number in `(-inf, 10]` rounded to two decimals or
//! pending.

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod course;
pub mod coverage;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod model;

pub use aggregate::{compute_roster_finals, RosterSummary};
pub use builder::generate_formula;
pub use coverage::{validate_coverage, CoverageReport};
pub use error::{BuildError, FormulaError};
pub use evaluator::{evaluate_final_grade, CompiledFormula, GradeOutcome, PendingReason};
pub use model::{AverageMode, ComponentValue, RosterEntry, StudentFinal};
