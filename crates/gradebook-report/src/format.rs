//! Grade formatting for display and export.

use gradebook_core::config::DecimalSeparator;

/// Text used for a pending final grade in exports.
pub const PENDING_EXPORT: &str = "N/A";

/// Text used for a pending final grade in the interactive roster view.
pub const PENDING_PREVIEW: &str = "-";

/// Two decimals with the given separator, or `N/A` when pending.
pub fn format_grade(grade: Option<f64>, separator: DecimalSeparator) -> String {
    match grade {
        Some(g) => format_number(g, separator),
        None => PENDING_EXPORT.to_string(),
    }
}

/// Two decimals with a dot, or `-` when pending.
pub fn format_preview(grade: Option<f64>) -> String {
    match grade {
        Some(g) if g.is_finite() => format!("{g:.2}"),
        _ => PENDING_PREVIEW.to_string(),
    }
}

/// A component grade for export; ungraded components are left empty.
pub fn format_component(value: Option<f64>, separator: DecimalSeparator) -> String {
    value
        .map(|v| format_number(v, separator))
        .unwrap_or_default()
}

fn format_number(value: f64, separator: DecimalSeparator) -> String {
    let text = format!("{value:.2}");
    match separator {
        DecimalSeparator::Dot => text,
        DecimalSeparator::Comma => text.replace('.', ","),
    }
}
