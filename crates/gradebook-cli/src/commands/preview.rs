//! The `gradebook preview` command.

use anyhow::{Context, Result};

use gradebook_core::coverage::validate_coverage;
use gradebook_core::evaluator::{evaluate_detailed, GradeOutcome};
use gradebook_core::model::ComponentValue;
use gradebook_report::format_preview;

pub fn execute(formula: String, grades: Vec<String>) -> Result<()> {
    let values = grades
        .iter()
        .map(|g| parse_grade(g))
        .collect::<Result<Vec<_>>>()?;

    let siglas: Vec<&str> = values.iter().map(|v| v.sigla.as_str()).collect();
    for message in validate_coverage(&formula, &siglas).messages() {
        eprintln!("WARNING: {message}");
    }

    let outcome = evaluate_detailed(&formula, &values);
    println!("{}", format_preview(outcome.grade()));
    if let GradeOutcome::Pending(reason) = outcome {
        eprintln!("Pending: {reason}");
    }

    Ok(())
}

/// Parse `SIGLA=VALUE`; an empty value means the component is ungraded.
fn parse_grade(arg: &str) -> Result<ComponentValue> {
    let (sigla, value) = arg
        .split_once('=')
        .with_context(|| format!("expected SIGLA=VALUE, got '{arg}'"))?;
    let sigla = sigla.trim();
    anyhow::ensure!(!sigla.is_empty(), "missing sigla in '{arg}'");

    let value = value.trim();
    let value = if value.is_empty() {
        None
    } else {
        Some(
            value
                .replace(',', ".")
                .parse::<f64>()
                .with_context(|| format!("'{value}' is not a grade"))?,
        )
    };
    Ok(ComponentValue::new(sigla, value))
}
