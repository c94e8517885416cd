// promptspec/src/report.rs

use serde::Serialize;
use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::validate::{Validation, validate_value};

/// Outcome of validating one file. `errors` holds file-level problems
/// (unreadable, unparsable) or rendered schema issues, never both.
#[derive(Clone, Debug, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Read, parse, and schema-check a single file. Every failure mode is
/// captured on the result; nothing here aborts a batch.
pub fn validate_file(path: &Path) -> FileResult {
    let mut result = FileResult {
        file: path.to_path_buf(),
        valid: false,
        errors: Vec::new(),
    };

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => {
            result.errors.push(format!("Could not read file: {}", path.display()));
            return result;
        }
    };

    let parsed: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            result.errors.push(format!("Invalid JSON: {e}"));
            return result;
        }
    };

    match validate_value(&parsed) {
        Validation::Valid(_) => result.valid = true,
        Validation::Invalid(issues) => {
            result.errors.extend(issues.iter().map(|i| i.render()));
        }
    }
    result
}

#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<FileResult>,
}

impl Report {
    /// Validate `files` strictly in the given order.
    pub fn run(files: &[PathBuf]) -> Self {
        let results = files
            .iter()
            .map(|file| {
                debug!(file = %file.display(), "validating");
                validate_file(file)
            })
            .collect();
        Self { results }
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| !r.valid)
    }

    /// Render the whole report in the PASS/FAIL console shape. Paths are
    /// shown relative to `base` when possible.
    pub fn render(&self, base: &Path) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Validating {} prompt file(s)...", self.results.len());
        let _ = writeln!(out);
        for result in &self.results {
            let rel = result.file.strip_prefix(base).unwrap_or(&result.file);
            if result.valid {
                let _ = writeln!(out, "  PASS  {}", rel.display());
            } else {
                let _ = writeln!(out, "  FAIL  {}", rel.display());
                for err in &result.errors {
                    let _ = writeln!(out, "        {err}");
                }
            }
        }
        let _ = writeln!(out);
        if self.has_failures() {
            let _ = writeln!(out, "Validation failed. Fix the errors above and try again.");
        } else {
            let _ = writeln!(out, "All {} prompt(s) are valid.", self.results.len());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_file_level_error() {
        let result = validate_file(Path::new("no/such/prompt.json"));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Could not read file: "));
    }

    #[test]
    fn syntax_error_reports_parser_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"id\": ").unwrap();
        let result = validate_file(&path);
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("Invalid JSON: "));
    }

    #[test]
    fn schema_issues_are_path_qualified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"id": "Bad_Id"}"#).unwrap();
        let result = validate_file(&path);
        assert!(!result.valid);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e == "id: Prompt id must be lowercase kebab-case")
        );
        assert!(result.errors.iter().any(|e| e == "messages: Required"));
    }
}
