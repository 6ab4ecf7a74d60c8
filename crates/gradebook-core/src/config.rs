//! Gradebook configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::expr::{ParseLimits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};

/// Decimal separator used when rendering grades for export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalSeparator {
    #[default]
    Dot,
    Comma,
}

impl DecimalSeparator {
    pub fn as_char(self) -> char {
        match self {
            DecimalSeparator::Dot => '.',
            DecimalSeparator::Comma => ',',
        }
    }
}

impl fmt::Display for DecimalSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalSeparator::Dot => write!(f, "dot"),
            DecimalSeparator::Comma => write!(f, "comma"),
        }
    }
}

impl FromStr for DecimalSeparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dot" | "." => Ok(DecimalSeparator::Dot),
            "comma" | "," => Ok(DecimalSeparator::Comma),
            other => Err(format!("unknown decimal separator: {other}")),
        }
    }
}

/// Top-level gradebook configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradebookConfig {
    /// Longest formula accepted, in characters.
    #[serde(default = "default_max_formula_length")]
    pub max_formula_length: usize,
    /// Deepest parenthesis / unary nesting accepted.
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
    /// Decimal separator for exported grades.
    #[serde(default)]
    pub decimal_separator: DecimalSeparator,
    /// CSV field delimiter; defaults to `;` with a comma separator, else `,`.
    #[serde(default)]
    pub csv_delimiter: Option<char>,
    /// Refuse to export while any component grade is missing.
    #[serde(default = "default_require_complete")]
    pub require_complete: bool,
}

fn default_max_formula_length() -> usize {
    DEFAULT_MAX_LENGTH
}
fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_require_complete() -> bool {
    true
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            max_formula_length: default_max_formula_length(),
            max_nesting_depth: default_max_nesting_depth(),
            decimal_separator: DecimalSeparator::default(),
            csv_delimiter: None,
            require_complete: default_require_complete(),
        }
    }
}

impl GradebookConfig {
    pub fn parse_limits(&self) -> ParseLimits {
        ParseLimits {
            max_length: self.max_formula_length,
            max_depth: self.max_nesting_depth,
        }
    }

    /// The CSV delimiter, picking one that does not clash with the separator.
    pub fn effective_delimiter(&self) -> char {
        self.csv_delimiter.unwrap_or(match self.decimal_separator {
            DecimalSeparator::Comma => ';',
            DecimalSeparator::Dot => ',',
        })
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gradebook.toml` in the current directory
/// 2. `~/.config/gradebook/config.toml`
///
/// Environment variable overrides: `GRADEBOOK_DECIMAL_SEPARATOR`,
/// `GRADEBOOK_REQUIRE_COMPLETE`.
pub fn load_config() -> Result<GradebookConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GradebookConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradebook.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradebookConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML string into a config.
pub fn parse_config_str(content: &str) -> Result<GradebookConfig> {
    let config: GradebookConfig = toml::from_str(content)?;
    anyhow::ensure!(
        config.max_formula_length >= 1,
        "max_formula_length must be at least 1"
    );
    anyhow::ensure!(
        config.max_nesting_depth >= 1,
        "max_nesting_depth must be at least 1"
    );
    if let Some(delimiter) = config.csv_delimiter {
        anyhow::ensure!(
            delimiter.is_ascii(),
            "csv_delimiter must be a single ASCII character (got '{delimiter}')"
        );
    }
    Ok(config)
}

fn apply_env_overrides(config: &mut GradebookConfig) -> Result<()> {
    if let Ok(sep) = std::env::var("GRADEBOOK_DECIMAL_SEPARATOR") {
        config.decimal_separator = sep
            .parse()
            .map_err(|e: String| anyhow::anyhow!("GRADEBOOK_DECIMAL_SEPARATOR: {e}"))?;
    }
    if let Ok(flag) = std::env::var("GRADEBOOK_REQUIRE_COMPLETE") {
        config.require_complete = parse_flag(&flag)
            .with_context(|| format!("GRADEBOOK_REQUIRE_COMPLETE: invalid value '{flag}'"))?;
    }
    Ok(())
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradebook"))
}
