//! The `gradebook roster` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradebook_core::config::{load_config_from, DecimalSeparator};
use gradebook_report::delimited::{generate_csv, write_csv_file};
use gradebook_report::{format_preview, ExportOptions, RosterExport};

pub fn execute(
    course_path: PathBuf,
    format: String,
    output: Option<PathBuf>,
    decimal: Option<String>,
    allow_incomplete: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(decimal) = decimal {
        config.decimal_separator = decimal
            .parse::<DecimalSeparator>()
            .map_err(|e| anyhow::anyhow!("--decimal: {e}"))?;
    }
    if allow_incomplete {
        config.require_complete = false;
    }

    let course = gradebook_core::course::parse_course(&course_path)?;
    if course.formula.is_empty() {
        eprintln!("WARNING: course {} has no formula; all grades are pending", course.id);
    }

    let mut options = ExportOptions::from_config(&config);

    match format.as_str() {
        "table" => {
            // The table is a preview, so it always shows incomplete rosters.
            options.require_complete = false;
            let export = RosterExport::build(&course, &options)?;
            println!("{}", render_table(&export));
            print_summary(&export);
        }
        "csv" => {
            let export = RosterExport::build(&course, &options)?;
            match output {
                Some(path) => {
                    write_csv_file(&export, &options, &path)?;
                    eprintln!("Roster saved to: {}", path.display());
                }
                None => print!("{}", generate_csv(&export, &options)?),
            }
        }
        "json" => {
            let export = RosterExport::build(&course, &options)?;
            match output {
                Some(path) => {
                    export.save_json(&path)?;
                    eprintln!("Roster saved to: {}", path.display());
                }
                None => println!("{}", export.to_json()?),
            }
        }
        other => anyhow::bail!("unknown format: {other} (expected table, csv or json)"),
    }

    Ok(())
}

fn render_table(export: &RosterExport) -> Table {
    let mut table = Table::new();

    let mut header = vec![Cell::new("Student"), Cell::new("Name")];
    header.extend(export.course.components.iter().map(Cell::new));
    header.push(Cell::new("Final"));
    table.set_header(header);

    for row in &export.rows {
        let mut cells = vec![
            Cell::new(&row.student_id),
            Cell::new(row.name.as_deref().unwrap_or("")),
        ];
        cells.extend(row.components.iter().map(|v| {
            Cell::new(v.map(|g| format!("{g:.2}")).unwrap_or_default())
        }));
        cells.push(Cell::new(format_preview(row.final_grade)));
        table.add_row(cells);
    }

    table
}

fn print_summary(export: &RosterExport) {
    let s = &export.summary;
    eprintln!(
        "{} student(s): {} graded, {} pending (mean {}, min {}, max {})",
        s.students,
        s.graded,
        s.pending,
        format_preview(s.mean),
        format_preview(s.min),
        format_preview(s.max)
    );
}
