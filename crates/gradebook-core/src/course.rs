//! TOML course file parser.
//!
//! Loads a class section (components, formula or averaging scheme, students
//! and their grades) from TOML files and directories, and validates it.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::generate_formula;
use crate::coverage::validate_coverage;
use crate::expr;
use crate::model::{AverageMode, Component, RosterEntry, MAX_GRADE, MIN_GRADE};

/// A parsed course: its components, formula and enrolled students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    /// The formula used to compute final grades; empty when unconfigured.
    pub formula: String,
    /// The averaging scheme the formula was built from, if any.
    #[serde(default)]
    pub average: Option<AverageScheme>,
    /// Set when both an explicit formula and a scheme were given.
    #[serde(default)]
    pub formula_overrides_scheme: bool,
    pub components: Vec<Component>,
    pub students: Vec<Student>,
}

/// How the formula is generated from the component list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageScheme {
    pub mode: AverageMode,
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

/// A student with the grades recorded so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Recorded grades keyed by sigla; components without a key are ungraded.
    #[serde(default)]
    pub grades: BTreeMap<String, f64>,
}

impl Course {
    /// Registered siglas in declaration order.
    pub fn siglas(&self) -> Vec<String> {
        self.components.iter().map(|c| c.sigla.clone()).collect()
    }

    /// One roster entry per student with every registered component present;
    /// ungraded components map to `None`.
    pub fn roster(&self) -> Vec<RosterEntry> {
        self.students
            .iter()
            .map(|student| {
                let component_values = self
                    .components
                    .iter()
                    .map(|c| (c.sigla.clone(), lookup_grade(&student.grades, &c.sigla)))
                    .collect();
                RosterEntry {
                    student_id: student.id.clone(),
                    name: student.name.clone(),
                    component_values,
                }
            })
            .collect()
    }
}

fn lookup_grade(grades: &BTreeMap<String, f64>, sigla: &str) -> Option<f64> {
    grades.get(sigla).copied().or_else(|| {
        grades
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(sigla))
            .map(|(_, v)| *v)
    })
}

/// Intermediate TOML structure for parsing course files.
#[derive(Debug, Deserialize)]
struct TomlCourseFile {
    course: TomlCourseHeader,
    #[serde(default)]
    average: Option<TomlAverage>,
    #[serde(default)]
    components: Vec<Component>,
    #[serde(default)]
    students: Vec<Student>,
}

#[derive(Debug, Deserialize)]
struct TomlCourseHeader {
    id: String,
    name: String,
    #[serde(default)]
    formula: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlAverage {
    mode: String,
    #[serde(default)]
    weights: Option<Vec<f64>>,
}

/// Parse a single TOML file into a `Course`.
pub fn parse_course(path: &Path) -> Result<Course> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read course file: {}", path.display()))?;

    parse_course_str(&content, path)
}

/// Parse a TOML string into a `Course` (useful for testing).
pub fn parse_course_str(content: &str, source_path: &Path) -> Result<Course> {
    let parsed: TomlCourseFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let average = parsed
        .average
        .map(|a| -> Result<AverageScheme> {
            Ok(AverageScheme {
                mode: a.mode.parse()?,
                weights: a.weights,
            })
        })
        .transpose()
        .with_context(|| format!("invalid [average] in {}", source_path.display()))?;

    let explicit = parsed
        .course
        .formula
        .filter(|f| !f.trim().is_empty());
    let formula_overrides_scheme = explicit.is_some() && average.is_some();

    let formula = match (explicit, &average) {
        (Some(formula), _) => formula,
        (None, Some(scheme)) => {
            let siglas: Vec<String> = parsed.components.iter().map(|c| c.sigla.clone()).collect();
            generate_formula(&siglas, scheme.mode, scheme.weights.as_deref()).with_context(
                || format!("cannot build formula for {}", source_path.display()),
            )?
        }
        (None, None) => String::new(),
    };

    Ok(Course {
        id: parsed.course.id,
        name: parsed.course.name,
        formula,
        average,
        formula_overrides_scheme,
        components: parsed.components,
        students: parsed.students,
    })
}

/// Recursively load all `.toml` course files from a directory.
pub fn load_course_directory(dir: &Path) -> Result<Vec<Course>> {
    let mut courses = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            courses.extend(load_course_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_course(&path) {
                Ok(course) => courses.push(course),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(courses)
}

/// A warning from course validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseWarning {
    /// The student ID (if applicable).
    pub student_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl CourseWarning {
    fn course(message: impl Into<String>) -> Self {
        Self {
            student_id: None,
            message: message.into(),
        }
    }

    fn student(id: &str, message: impl Into<String>) -> Self {
        Self {
            student_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a course for common issues. Never fails; all findings are warnings.
pub fn validate_course(course: &Course) -> Vec<CourseWarning> {
    let mut warnings = Vec::new();

    // Sigla shape and uniqueness
    let mut seen_siglas = HashSet::new();
    for component in &course.components {
        if !component.has_valid_sigla() {
            warnings.push(CourseWarning::course(format!(
                "invalid sigla '{}': use only letters, digits and '_'",
                component.sigla
            )));
        } else if component.sigla.starts_with(|c: char| c.is_ascii_digit()) {
            warnings.push(CourseWarning::course(format!(
                "sigla '{}' starts with a digit and cannot be referenced in a formula",
                component.sigla
            )));
        }
        if !seen_siglas.insert(component.sigla.to_uppercase()) {
            warnings.push(CourseWarning::course(format!(
                "duplicate sigla: {}",
                component.sigla
            )));
        }
    }

    // Formula presence and coverage
    if course.formula.trim().is_empty() {
        if !course.components.is_empty() {
            warnings.push(CourseWarning::course(
                "no formula configured; every final grade will be pending",
            ));
        }
    } else {
        if let Err(e) = expr::parse(&course.formula) {
            warnings.push(CourseWarning::course(format!(
                "formula does not parse ({e}); every final grade will be pending"
            )));
        }
        let coverage = validate_coverage(&course.formula, &course.siglas());
        warnings.extend(coverage.messages().into_iter().map(CourseWarning::course));
    }

    if course.formula_overrides_scheme {
        warnings.push(CourseWarning::course(
            "both formula and [average] are set; the explicit formula is used",
        ));
    }

    // Students
    let mut seen_ids = HashSet::new();
    for student in &course.students {
        if !seen_ids.insert(&student.id) {
            warnings.push(CourseWarning::student(
                &student.id,
                format!("duplicate student ID: {}", student.id),
            ));
        }

        for (sigla, value) in &student.grades {
            if !seen_siglas.contains(&sigla.to_uppercase()) {
                warnings.push(CourseWarning::student(
                    &student.id,
                    format!("grade for unregistered component '{sigla}'"),
                ));
            }
            if !value.is_finite() {
                warnings.push(CourseWarning::student(
                    &student.id,
                    format!("{sigla} is not a finite number; the final grade will be pending"),
                ));
            } else if !(MIN_GRADE..=MAX_GRADE).contains(value) {
                warnings.push(CourseWarning::student(
                    &student.id,
                    format!("{sigla} = {value} is outside [0, 10] and will be clamped"),
                ));
            }
        }
    }

    warnings
}
