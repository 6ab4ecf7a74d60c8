//! gradebook-report: roster export.
//!
//! Renders a course's final grades for hand-off: CSV with a locale-aware
//! decimal separator and JSON documents. Unlike the core engine, export is
//! strict by default and refuses rosters with ungraded components.

pub mod delimited;
pub mod export;
pub mod format;

use gradebook_core::config::{DecimalSeparator, GradebookConfig};
use gradebook_core::expr::ParseLimits;
use thiserror::Error;

/// Errors that can occur while exporting a roster.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Export requires every (student, component) pair to be graded.
    #[error("export refused: {} grade(s) missing", missing.len())]
    IncompleteGrades { missing: Vec<(String, String)> },

    /// Writing CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing to the destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the JSON document failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Export settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub decimal_separator: DecimalSeparator,
    pub delimiter: u8,
    /// Refuse to export while any component grade is missing.
    pub require_complete: bool,
    pub limits: ParseLimits,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&GradebookConfig::default())
    }
}

impl ExportOptions {
    /// Export settings from a loaded config.
    ///
    /// Configs read through `parse_config_str` only carry ASCII delimiters; a
    /// non-ASCII one set in code falls back to the separator's default.
    pub fn from_config(config: &GradebookConfig) -> Self {
        let delimiter = u8::try_from(config.effective_delimiter())
            .ok()
            .filter(u8::is_ascii)
            .unwrap_or_else(|| {
                let fallback = GradebookConfig {
                    csv_delimiter: None,
                    ..config.clone()
                };
                tracing::warn!(
                    "csv_delimiter {:?} is not ASCII, using '{}'",
                    config.csv_delimiter,
                    fallback.effective_delimiter()
                );
                fallback.effective_delimiter() as u8
            });
        Self {
            decimal_separator: config.decimal_separator,
            delimiter,
            require_complete: config.require_complete,
            limits: config.parse_limits(),
        }
    }
}

pub use export::{check_complete, RosterExport};
pub use format::{format_grade, format_preview};
