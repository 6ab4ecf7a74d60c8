//! Roster export document with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gradebook_core::aggregate::{compute_roster_finals_with_limits, RosterSummary};
use gradebook_core::course::Course;

use crate::{ExportError, ExportOptions};

/// A complete roster export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterExport {
    /// When the export was generated.
    pub generated_at: DateTime<Utc>,
    /// Summary of the course.
    pub course: CourseSummary,
    /// One row per student, in enrollment order.
    pub rows: Vec<RosterRow>,
    /// Aggregate statistics over the final grades.
    pub summary: RosterSummary,
}

/// Summary of a course (without the student list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: String,
    pub name: String,
    pub formula: String,
    /// Component siglas, in column order.
    pub components: Vec<String>,
}

/// One student's component grades and final grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterRow {
    pub student_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Values aligned with `CourseSummary::components`.
    pub components: Vec<Option<f64>>,
    pub final_grade: Option<f64>,
}

/// Every `(student_id, sigla)` pair without a recorded grade.
pub fn missing_grades(course: &Course) -> Vec<(String, String)> {
    course
        .roster()
        .into_iter()
        .flat_map(|entry| {
            entry
                .component_values
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(move |(sigla, _)| (entry.student_id.clone(), sigla))
        })
        .collect()
}

/// Fails with [`ExportError::IncompleteGrades`] if any grade is missing.
pub fn check_complete(course: &Course) -> Result<(), ExportError> {
    let missing = missing_grades(course);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ExportError::IncompleteGrades { missing })
    }
}

impl RosterExport {
    /// Compute final grades for `course` and assemble the export.
    pub fn build(course: &Course, options: &ExportOptions) -> Result<Self, ExportError> {
        if options.require_complete {
            check_complete(course)?;
        }

        let roster = course.roster();
        let finals = compute_roster_finals_with_limits(&course.formula, &roster, options.limits);
        let summary = RosterSummary::from_finals(&finals);
        let siglas = course.siglas();

        let rows = roster
            .into_iter()
            .zip(finals)
            .map(|(entry, result)| RosterRow {
                components: siglas
                    .iter()
                    .map(|s| entry.component_values.get(s).copied().flatten())
                    .collect(),
                student_id: entry.student_id,
                name: entry.name,
                final_grade: result.final_grade,
            })
            .collect();

        tracing::info!(
            "exported {} student(s) of {} ({} pending)",
            summary.students,
            course.id,
            summary.pending
        );

        Ok(Self {
            generated_at: Utc::now(),
            course: CourseSummary {
                id: course.id.clone(),
                name: course.name.clone(),
                formula: course.formula.clone(),
                components: siglas,
            },
            rows,
            summary,
        })
    }

    /// Render the export as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the export as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json().context("failed to serialize export")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write export to {}", path.display()))?;
        Ok(())
    }

    /// Load an export from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read export from {}", path.display()))?;
        let export: RosterExport =
            serde_json::from_str(&content).context("failed to parse export JSON")?;
        Ok(export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradebook_core::course::parse_course_str;
    use std::path::PathBuf;

    const COURSE: &str = r#"
[course]
id = "calc-1"
name = "Calculus I"
formula = "(P1 + P2) / 2"

[[components]]
sigla = "P1"

[[components]]
sigla = "P2"

[[students]]
id = "a"
name = "Ana"
grades = { P1 = 10.0, P2 = 8.0 }

[[students]]
id = "b"
grades = { P1 = 5.0 }
"#;

    fn course() -> Course {
        parse_course_str(COURSE, &PathBuf::from("calc.toml")).unwrap()
    }

    fn lenient() -> ExportOptions {
        ExportOptions {
            require_complete: false,
            ..ExportOptions::default()
        }
    }

    #[test]
    fn lists_missing_grades() {
        assert_eq!(
            missing_grades(&course()),
            vec![("b".to_string(), "P2".to_string())]
        );
    }

    #[test]
    fn strict_export_refuses_incomplete_roster() {
        let err = RosterExport::build(&course(), &ExportOptions::default()).unwrap_err();
        match err {
            ExportError::IncompleteGrades { missing } => assert_eq!(missing.len(), 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lenient_export_marks_pending() {
        let export = RosterExport::build(&course(), &lenient()).unwrap();
        assert_eq!(export.course.components, vec!["P1", "P2"]);
        assert_eq!(export.rows.len(), 2);
        assert_eq!(export.rows[0].final_grade, Some(9.0));
        assert_eq!(export.rows[0].components, vec![Some(10.0), Some(8.0)]);
        assert_eq!(export.rows[1].final_grade, None);
        assert_eq!(export.rows[1].components, vec![Some(5.0), None]);
        assert_eq!(export.summary.pending, 1);
    }

    #[test]
    fn json_text_carries_pending_as_null() {
        let export = RosterExport::build(&course(), &lenient()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert_eq!(value["course"]["id"], "calc-1");
        assert_eq!(value["rows"][0]["final_grade"], 9.0);
        assert!(value["rows"][1]["final_grade"].is_null());
    }

    #[test]
    fn json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/export.json");
        let export = RosterExport::build(&course(), &lenient()).unwrap();
        export.save_json(&path).unwrap();
        let loaded = RosterExport::load_json(&path).unwrap();
        assert_eq!(loaded, export);
    }
}
