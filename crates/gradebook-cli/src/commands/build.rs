//! The `gradebook build` command.

use anyhow::{Context, Result};

pub fn execute(components: String, mode: String, weights: Option<String>) -> Result<()> {
    let siglas = split_list(&components);
    let weights = weights
        .as_deref()
        .map(parse_weights)
        .transpose()
        .context("invalid --weights")?;

    let formula =
        gradebook_core::builder::generate_formula_str(&siglas, &mode, weights.as_deref())?;

    if formula.is_empty() {
        eprintln!("No components given, formula is empty.");
    } else {
        println!("{formula}");
    }

    Ok(())
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn parse_weights(s: &str) -> Result<Vec<f64>> {
    split_list(s)
        .iter()
        .map(|w| {
            w.parse::<f64>()
                .with_context(|| format!("'{w}' is not a number"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims() {
        assert_eq!(split_list(" P1, P2 ,,T1"), vec!["P1", "P2", "T1"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn weights_must_be_numbers() {
        assert_eq!(parse_weights("30, 70").unwrap(), vec![30.0, 70.0]);
        assert!(parse_weights("30,abc").is_err());
    }
}
