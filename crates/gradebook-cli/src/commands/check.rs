//! The `gradebook check` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(course_path: PathBuf) -> Result<()> {
    let courses = if course_path.is_dir() {
        gradebook_core::course::load_course_directory(&course_path)?
    } else {
        vec![gradebook_core::course::parse_course(&course_path)?]
    };

    let mut total_warnings = 0;

    for course in &courses {
        println!(
            "Course: {} ({} components, {} students)",
            course.name,
            course.components.len(),
            course.students.len()
        );
        if !course.formula.is_empty() {
            println!("  Formula: {}", course.formula);
        }

        let warnings = gradebook_core::course::validate_course(course);
        for w in &warnings {
            let prefix = w
                .student_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All courses valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
