//! Formula builder.
//!
//! Turns a course's component siglas and averaging scheme into the canonical
//! formula text that gets stored for the course.

use crate::error::BuildError;
use crate::model::AverageMode;

/// Build the formula string for `siglas` under `mode`.
///
/// An empty `siglas` list means no formula is configured and yields `""`.
/// Weighted mode normalizes `weights` by their sum and rounds each
/// normalized weight to 3 decimal places.
pub fn generate_formula(
    siglas: &[String],
    mode: AverageMode,
    weights: Option<&[f64]>,
) -> Result<String, BuildError> {
    if siglas.is_empty() {
        return Ok(String::new());
    }

    match mode {
        AverageMode::Simple => Ok(format!("({}) / {}", siglas.join(" + "), siglas.len())),
        AverageMode::Weighted => {
            let weights = weights.unwrap_or_default();
            if weights.len() != siglas.len() || weights.iter().any(|w| !w.is_finite()) {
                return Err(BuildError::InvalidWeights {
                    expected: siglas.len(),
                    got: weights.len(),
                });
            }

            let total: f64 = weights.iter().sum();
            if !total.is_finite() {
                return Err(BuildError::InvalidWeights {
                    expected: siglas.len(),
                    got: weights.len(),
                });
            }
            if total <= 0.0 {
                return Err(BuildError::ZeroWeightSum(total));
            }

            let terms: Vec<String> = siglas
                .iter()
                .zip(weights)
                .map(|(sigla, weight)| format!("({} * {})", sigla, round_weight(weight / total)))
                .collect();
            Ok(terms.join(" + "))
        }
    }
}

/// Like [`generate_formula`], but takes the averaging mode as text.
pub fn generate_formula_str(
    siglas: &[String],
    mode: &str,
    weights: Option<&[f64]>,
) -> Result<String, BuildError> {
    if siglas.is_empty() {
        return Ok(String::new());
    }
    generate_formula(siglas, mode.parse()?, weights)
}

fn round_weight(w: f64) -> f64 {
    let rounded = (w * 1000.0).round() / 1000.0;
    // Avoid printing "-0" for tiny negative weights.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
