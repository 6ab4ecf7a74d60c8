//! Core data model types for gradebook.
//!
//! These are the types shared by the formula builder, the evaluator and the
//! roster aggregator.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Lowest grade a component or final grade can take after clamping.
pub const MIN_GRADE: f64 = 0.0;

/// Highest grade a component or final grade can take after clamping.
pub const MAX_GRADE: f64 = 10.0;

/// A grading component registered for a course (e.g. "P1", an exam).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Short identifier used as a variable in the formula.
    pub sigla: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl Component {
    /// Returns `true` if the sigla matches `[A-Za-z0-9_]+`.
    pub fn has_valid_sigla(&self) -> bool {
        is_valid_sigla(&self.sigla)
    }
}

/// Returns `true` if `s` is a non-empty run of ASCII letters, digits or `_`.
pub fn is_valid_sigla(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// How component grades are combined into the final grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AverageMode {
    Simple,
    Weighted,
}

impl fmt::Display for AverageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageMode::Simple => write!(f, "simple"),
            AverageMode::Weighted => write!(f, "weighted"),
        }
    }
}

impl FromStr for AverageMode {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" | "simples" => Ok(AverageMode::Simple),
            "weighted" | "ponderada" => Ok(AverageMode::Weighted),
            other => Err(BuildError::InvalidAverageType(other.to_string())),
        }
    }
}

/// One component grade handed to the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentValue {
    pub sigla: String,
    /// `None` means "not graded yet", which is distinct from a graded 0.
    pub value: Option<f64>,
}

impl ComponentValue {
    pub fn new(sigla: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            sigla: sigla.into(),
            value,
        }
    }
}

/// A student and their component grades, keyed by sigla.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub student_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub component_values: BTreeMap<String, Option<f64>>,
}

impl RosterEntry {
    /// The component grades in the shape the evaluator expects.
    pub fn values(&self) -> Vec<ComponentValue> {
        self.component_values
            .iter()
            .map(|(sigla, value)| ComponentValue::new(sigla.clone(), *value))
            .collect()
    }
}

/// The computed final grade for one student; `None` means pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentFinal {
    pub student_id: String,
    pub final_grade: Option<f64>,
}

/// Clamps a component grade into `[MIN_GRADE, MAX_GRADE]`.
pub fn clamp_grade(value: f64) -> f64 {
    value.clamp(MIN_GRADE, MAX_GRADE)
}
