// Batch validation over a real directory tree: discovery, aggregation,
// and report rendering.

use promptspec::{Report, collect_prompt_files};
use std::{fs, path::Path};
use tempfile::TempDir;

const VALID: &str = r#"{
  "id": "hello-world",
  "name": "Hello World",
  "version": "1.0.0",
  "description": "A minimal prompt that greets the user.",
  "messages": [{"role": "user", "content": "Say hello."}]
}"#;

const INVALID: &str = r#"{
  "id": "Bad_Id",
  "name": "Broken",
  "version": "1.0.0",
  "description": "Has a bad id and no messages."
}"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn aggregates_one_failure_among_three() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.json", VALID);
    write(dir.path(), "b.json", INVALID);
    write(dir.path(), "nested/c.json", VALID);

    let files = collect_prompt_files(dir.path());
    assert_eq!(files.len(), 3);

    let report = Report::run(&files);
    assert!(report.has_failures());
    let failed: Vec<_> = report.results.iter().filter(|r| !r.valid).collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].file.ends_with("b.json"));
    assert!(
        failed[0]
            .errors
            .iter()
            .any(|e| e == "id: Prompt id must be lowercase kebab-case")
    );
    assert!(failed[0].errors.iter().any(|e| e == "messages: Required"));

    let rendered = report.render(dir.path());
    assert!(rendered.starts_with("Validating 3 prompt file(s)...\n\n"));
    assert_eq!(rendered.matches("  PASS  ").count(), 2);
    assert_eq!(rendered.matches("  FAIL  ").count(), 1);
    assert!(rendered.contains("  FAIL  b.json\n"));
    assert!(rendered.contains("        id: Prompt id must be lowercase kebab-case\n"));
    assert!(rendered.ends_with("Validation failed. Fix the errors above and try again.\n"));
}

#[test]
fn all_valid_reports_success() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.json", VALID);
    write(dir.path(), "b.json", VALID);

    let report = Report::run(&collect_prompt_files(dir.path()));
    assert!(!report.has_failures());
    let rendered = report.render(dir.path());
    assert!(rendered.contains("  PASS  a.json\n"));
    assert!(rendered.ends_with("All 2 prompt(s) are valid.\n"));
}

#[test]
fn unreadable_and_unparsable_files_do_not_abort_the_batch() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "good.json", VALID);
    write(dir.path(), "syntax.json", "{\"id\": ");

    let mut files = collect_prompt_files(dir.path());
    files.push(dir.path().join("missing.json"));

    let report = Report::run(&files);
    assert_eq!(report.results.len(), 3);
    assert!(report.has_failures());
    assert!(report.results.iter().any(|r| r.valid));
    let syntax = report
        .results
        .iter()
        .find(|r| r.file.ends_with("syntax.json"))
        .unwrap();
    assert!(syntax.errors[0].starts_with("Invalid JSON: "));
    let missing = report
        .results
        .iter()
        .find(|r| r.file.ends_with("missing.json"))
        .unwrap();
    assert!(missing.errors[0].starts_with("Could not read file: "));
}

#[test]
fn missing_root_yields_nothing_to_validate() {
    let dir = TempDir::new().unwrap();
    let files = collect_prompt_files(&dir.path().join("prompts"));
    assert!(files.is_empty());
}

#[test]
fn repeated_runs_are_identical() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "z.json", VALID);
    write(dir.path(), "a.json", INVALID);
    write(dir.path(), "sub/m.json", VALID);

    let first_files = collect_prompt_files(dir.path());
    let second_files = collect_prompt_files(dir.path());
    assert_eq!(first_files, second_files);

    let first = Report::run(&first_files).render(dir.path());
    let second = Report::run(&second_files).render(dir.path());
    assert_eq!(first, second);
}

#[test]
fn shipped_sample_prompts_are_valid() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("prompts");
    let files = collect_prompt_files(&root);
    assert!(!files.is_empty());
    let report = Report::run(&files);
    assert!(!report.has_failures(), "{}", report.render(&root));
}
