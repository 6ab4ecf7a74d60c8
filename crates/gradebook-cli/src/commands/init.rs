//! The `gradebook init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create gradebook.toml
    if std::path::Path::new("gradebook.toml").exists() {
        println!("gradebook.toml already exists, skipping.");
    } else {
        std::fs::write("gradebook.toml", SAMPLE_CONFIG)?;
        println!("Created gradebook.toml");
    }

    // Create example course
    std::fs::create_dir_all("courses")?;
    let example_path = std::path::Path::new("courses/example.toml");
    if example_path.exists() {
        println!("courses/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_COURSE)?;
        println!("Created courses/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit courses/example.toml with your components and students");
    println!("  2. Run: gradebook check --course courses/example.toml");
    println!("  3. Run: gradebook roster --course courses/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradebook configuration

# Longest formula accepted, in characters
max_formula_length = 4096
# Deepest parenthesis nesting accepted
max_nesting_depth = 64

# Decimal separator for exported grades: "dot" or "comma"
decimal_separator = "dot"
# CSV delimiter; defaults to ";" when decimal_separator is "comma"
# csv_delimiter = ","

# Refuse to export while any component grade is missing
require_complete = true
"#;

const EXAMPLE_COURSE: &str = r#"[course]
id = "calc-1"
name = "Calculus I"

[average]
mode = "weighted"
weights = [40, 30, 30]

[[components]]
sigla = "P1"
name = "Midterm exam"

[[components]]
sigla = "P2"
name = "Final exam"

[[components]]
sigla = "T1"
name = "Project"
description = "Group project, graded 0 to 10"

[[students]]
id = "2024001"
name = "Ana Souza"
grades = { P1 = 8.5, P2 = 7.0, T1 = 9.0 }

[[students]]
id = "2024002"
name = "Bruno Lima"
grades = { P1 = 6.0, P2 = 5.0, T1 = 7.0 }

[[students]]
id = "2024003"
name = "Carla Dias"
grades = { P1 = 10.0, P2 = 9.5, T1 = 10.0 }

[[students]]
id = "2024004"
name = "Diego Alves"
grades = { P1 = 4.0, T1 = 6.0 }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn sample_config_parses() {
        let config = gradebook_core::config::parse_config_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config, gradebook_core::config::GradebookConfig::default());
    }

    #[test]
    fn example_course_is_clean() {
        let course = gradebook_core::course::parse_course_str(
            EXAMPLE_COURSE,
            &PathBuf::from("courses/example.toml"),
        )
        .unwrap();
        assert_eq!(course.formula, "(P1 * 0.4) + (P2 * 0.3) + (T1 * 0.3)");
        assert!(gradebook_core::course::validate_course(&course).is_empty());
    }
}
