//! Formula coverage checks.
//!
//! Cross-checks a formula's text against the siglas registered for a course.
//! The result is advisory: it is meant to be shown as warnings next to the
//! formula and never prevents a formula from being saved.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Mismatches between a formula and the registered components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Registered siglas that never appear in the formula.
    pub unused_siglas: BTreeSet<String>,
    /// Identifiers in the formula that are not registered siglas.
    pub unknown_tokens: BTreeSet<String>,
}

impl CoverageReport {
    pub fn is_clean(&self) -> bool {
        self.unused_siglas.is_empty() && self.unknown_tokens.is_empty()
    }

    /// Human-readable warnings, one per finding.
    pub fn messages(&self) -> Vec<String> {
        let unused = self
            .unused_siglas
            .iter()
            .map(|s| format!("component '{s}' is registered but not used in the formula"));
        let unknown = self
            .unknown_tokens
            .iter()
            .map(|t| format!("'{t}' is used in the formula but is not a registered component"));
        unused.chain(unknown).collect()
    }
}

/// Compare the identifiers in `formula` with `registered_siglas`.
///
/// Matching is case-insensitive. Tokens made only of digits (including the
/// two halves of a decimal literal such as `0.3`) are treated as numbers.
pub fn validate_coverage<S: AsRef<str>>(formula: &str, registered_siglas: &[S]) -> CoverageReport {
    let tokens = extract_tokens(formula);

    let registered: BTreeSet<String> = registered_siglas
        .iter()
        .map(|s| s.as_ref().to_uppercase())
        .collect();

    let unused_siglas = registered_siglas
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| !tokens.contains(&s.to_uppercase()))
        .map(str::to_string)
        .collect();

    let unknown_tokens = tokens
        .iter()
        .filter(|t| !is_numeric_token(t) && !registered.contains(*t))
        .cloned()
        .collect();

    CoverageReport {
        unused_siglas,
        unknown_tokens,
    }
}

/// Maximal `[A-Za-z0-9_]+` runs of the uppercased formula.
fn extract_tokens(formula: &str) -> BTreeSet<String> {
    formula
        .to_uppercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_numeric_token(token: &str) -> bool {
    token.bytes().all(|b| b.is_ascii_digit())
}
