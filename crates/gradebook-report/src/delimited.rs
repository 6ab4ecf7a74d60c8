//! Delimited (CSV) roster output.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::export::RosterExport;
use crate::format::{format_component, format_grade};
use crate::{ExportError, ExportOptions};

/// Write the roster as CSV: `student_id,name,<siglas...>,final`.
pub fn write_csv<W: io::Write>(
    export: &RosterExport,
    options: &ExportOptions,
    writer: W,
) -> Result<(), ExportError> {
    let mut out = ::csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    let mut header = vec!["student_id".to_string(), "name".to_string()];
    header.extend(export.course.components.iter().cloned());
    header.push("final".to_string());
    out.write_record(&header)?;

    for row in &export.rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.student_id.clone());
        record.push(row.name.clone().unwrap_or_default());
        record.extend(
            row.components
                .iter()
                .map(|v| format_component(*v, options.decimal_separator)),
        );
        record.push(format_grade(row.final_grade, options.decimal_separator));
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

/// Render the roster as a CSV string.
pub fn generate_csv(export: &RosterExport, options: &ExportOptions) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(export, options, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a CSV roster to a file.
pub fn write_csv_file(export: &RosterExport, options: &ExportOptions, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(export, options, io::BufWriter::new(file))?;
    Ok(())
}
