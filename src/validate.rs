// promptspec/src/validate.rs
//
// Accumulating shape validator for prompt specification documents. Takes the
// untrusted parsed value, walks every known field, and collects all
// violations in one pass; the typed PromptSpec is produced only when the
// issue list comes back empty. Unknown fields are ignored at every level.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::spec::PromptSpec;

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());
static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)$").unwrap());
static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap());

const ROLES: &[&str] = &["system", "user", "assistant"];
const INPUT_TYPES: &[&str] = &["string", "number", "boolean", "array", "object"];
const ASSERTION_TYPES: &[&str] = &[
    "contains",
    "not_contains",
    "matches_regex",
    "json_path",
    "equals",
];
const OUTPUT_TYPES: &[&str] = &["text", "json", "markdown", "code", "csv"];

/// One `{path, message}` violation. `path` is dot-joined and includes array
/// indices (`messages.0.content`); the whole-document path is the empty
/// string and renders as `(root)`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl Issue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn render(&self) -> String {
        let path = if self.path.is_empty() {
            "(root)"
        } else {
            &self.path
        };
        format!("{}: {}", path, self.message)
    }
}

/// Validation verdict: the coerced/defaulted spec, or every violation found.
/// Expected failures are values, never errors.
#[derive(Debug)]
pub enum Validation {
    Valid(Box<PromptSpec>),
    Invalid(Vec<Issue>),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }
}

/// Validate an arbitrary parsed value against the prompt specification shape.
///
/// Issues come back in field declaration order, then array index order, so
/// repeated runs over the same input are byte-identical.
pub fn validate_value(v: &Value) -> Validation {
    let mut issues = Vec::new();
    check_spec(v, &mut issues);
    if !issues.is_empty() {
        return Validation::Invalid(issues);
    }
    // The shape check passed, so narrowing only applies serde defaults.
    match serde_json::from_value::<PromptSpec>(v.clone()) {
        Ok(spec) => Validation::Valid(Box::new(spec)),
        Err(e) => Validation::Invalid(vec![Issue::new("", e.to_string())]),
    }
}

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// --- field accessors -------------------------------------------------------
//
// Each returns the narrowed value when usable and records an issue otherwise.
// A missing required field reports "Required"; a field of the wrong type
// reports what was found. Absent optional fields are silently skipped.

fn require_str<'a>(
    obj: &'a Map<String, Value>,
    prefix: &str,
    field: &str,
    issues: &mut Vec<Issue>,
) -> Option<&'a str> {
    match obj.get(field) {
        None => {
            issues.push(Issue::new(join(prefix, field), "Required"));
            None
        }
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            issues.push(Issue::new(
                join(prefix, field),
                format!("Expected string, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn optional_str<'a>(
    obj: &'a Map<String, Value>,
    prefix: &str,
    field: &str,
    issues: &mut Vec<Issue>,
) -> Option<&'a str> {
    match obj.get(field) {
        None => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            issues.push(Issue::new(
                join(prefix, field),
                format!("Expected string, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn optional_num(
    obj: &Map<String, Value>,
    prefix: &str,
    field: &str,
    issues: &mut Vec<Issue>,
) -> Option<f64> {
    match obj.get(field) {
        None => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(other) => {
            issues.push(Issue::new(
                join(prefix, field),
                format!("Expected number, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn optional_bool(obj: &Map<String, Value>, prefix: &str, field: &str, issues: &mut Vec<Issue>) {
    match obj.get(field) {
        None | Some(Value::Bool(_)) => {}
        Some(other) => issues.push(Issue::new(
            join(prefix, field),
            format!("Expected boolean, received {}", type_name(other)),
        )),
    }
}

fn optional_array<'a>(
    obj: &'a Map<String, Value>,
    prefix: &str,
    field: &str,
    issues: &mut Vec<Issue>,
) -> Option<&'a Vec<Value>> {
    match obj.get(field) {
        None => None,
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            issues.push(Issue::new(
                join(prefix, field),
                format!("Expected array, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn optional_object<'a>(
    obj: &'a Map<String, Value>,
    prefix: &str,
    field: &str,
    issues: &mut Vec<Issue>,
) -> Option<&'a Map<String, Value>> {
    match obj.get(field) {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            issues.push(Issue::new(
                join(prefix, field),
                format!("Expected object, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn as_object<'a>(v: &'a Value, path: &str, issues: &mut Vec<Issue>) -> Option<&'a Map<String, Value>> {
    match v {
        Value::Object(map) => Some(map),
        other => {
            issues.push(Issue::new(
                path,
                format!("Expected object, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn check_literal(value: &str, allowed: &[&str], path: &str, issues: &mut Vec<Issue>) {
    if !allowed.contains(&value) {
        issues.push(Issue::new(
            path,
            format!("Expected one of: {}, received '{}'", allowed.join(", "), value),
        ));
    }
}

/// JS `Number.isInteger` semantics: an integral float like `2048.0` passes.
fn check_positive_int(n: f64, path: &str, issues: &mut Vec<Issue>) {
    if n.fract() != 0.0 {
        issues.push(Issue::new(path, "Expected integer, received float"));
    }
    if n < 1.0 {
        issues.push(Issue::new(path, "Must be greater than or equal to 1"));
    }
}

fn check_range(n: f64, lo: f64, hi: f64, path: &str, issues: &mut Vec<Issue>) {
    if !(lo..=hi).contains(&n) {
        issues.push(Issue::new(
            path,
            format!("Must be between {lo} and {hi}"),
        ));
    }
}

// --- entity checkers -------------------------------------------------------

fn check_spec(v: &Value, issues: &mut Vec<Issue>) {
    let Some(obj) = as_object(v, "", issues) else {
        return;
    };

    if let Some(id) = require_str(obj, "", "id", issues)
        && !ID_RE.is_match(id)
    {
        issues.push(Issue::new("id", "Prompt id must be lowercase kebab-case"));
    }

    if let Some(name) = require_str(obj, "", "name", issues) {
        if name.is_empty() {
            issues.push(Issue::new("name", "Name must not be empty"));
        } else if name.chars().count() > 200 {
            issues.push(Issue::new("name", "Name must be at most 200 characters"));
        }
    }

    if let Some(version) = require_str(obj, "", "version", issues)
        && !SEMVER_RE.is_match(version)
    {
        issues.push(Issue::new("version", "Version must follow semver (e.g. 1.0.0)"));
    }

    if let Some(description) = require_str(obj, "", "description", issues)
        && description.is_empty()
    {
        issues.push(Issue::new("description", "Description must not be empty"));
    }

    optional_str(obj, "", "author", issues);

    if let Some(tags) = optional_array(obj, "", "tags", issues) {
        for (i, tag) in tags.iter().enumerate() {
            let path = format!("tags.{i}");
            match tag {
                Value::String(s) if s.is_empty() => {
                    issues.push(Issue::new(path, "Tag must not be empty"));
                }
                Value::String(_) => {}
                other => issues.push(Issue::new(
                    path,
                    format!("Expected string, received {}", type_name(other)),
                )),
            }
        }
    }

    if let Some(inputs) = optional_array(obj, "", "inputs", issues) {
        for (i, input) in inputs.iter().enumerate() {
            check_input(input, &format!("inputs.{i}"), issues);
        }
    }

    match obj.get("messages") {
        None => issues.push(Issue::new("messages", "Required")),
        Some(Value::Array(items)) => {
            if items.is_empty() {
                issues.push(Issue::new("messages", "At least one message is required"));
            }
            for (i, message) in items.iter().enumerate() {
                check_message(message, &format!("messages.{i}"), issues);
            }
        }
        Some(other) => issues.push(Issue::new(
            "messages",
            format!("Expected array, received {}", type_name(other)),
        )),
    }

    if let Some(examples) = optional_array(obj, "", "examples", issues) {
        for (i, example) in examples.iter().enumerate() {
            check_example(example, &format!("examples.{i}"), issues);
        }
    }

    if let Some(format) = obj.get("output_format") {
        check_output_format(format, "output_format", issues);
    }
    if let Some(safety) = obj.get("safety") {
        check_safety(safety, "safety", issues);
    }
    if let Some(eval) = obj.get("eval") {
        check_eval(eval, "eval", issues);
    }
    if let Some(model) = obj.get("model") {
        check_model(model, "model", issues);
    }

    optional_object(obj, "", "metadata", issues);
}

fn check_input(v: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(obj) = as_object(v, path, issues) else {
        return;
    };

    if let Some(name) = require_str(obj, path, "name", issues)
        && !IDENT_RE.is_match(name)
    {
        issues.push(Issue::new(
            join(path, "name"),
            "Input name must be a valid identifier (letters, digits, underscores; cannot start with a digit)",
        ));
    }

    if let Some(kind) = require_str(obj, path, "type", issues) {
        check_literal(kind, INPUT_TYPES, &join(path, "type"), issues);
    }

    optional_str(obj, path, "description", issues);
    optional_bool(obj, path, "required", issues);
    // `default` accepts any value, nothing to check.
    optional_array(obj, path, "enum", issues);
}

fn check_message(v: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(obj) = as_object(v, path, issues) else {
        return;
    };

    if let Some(role) = require_str(obj, path, "role", issues) {
        check_literal(role, ROLES, &join(path, "role"), issues);
    }

    // Length only, no trimming: an all-whitespace content string is accepted.
    if let Some(content) = require_str(obj, path, "content", issues)
        && content.is_empty()
    {
        issues.push(Issue::new(
            join(path, "content"),
            "Message content must not be empty",
        ));
    }
}

fn check_assertion(v: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(obj) = as_object(v, path, issues) else {
        return;
    };

    if let Some(kind) = require_str(obj, path, "type", issues) {
        check_literal(kind, ASSERTION_TYPES, &join(path, "type"), issues);
    }
    require_str(obj, path, "value", issues);
    optional_str(obj, path, "message", issues);
}

fn check_example(v: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(obj) = as_object(v, path, issues) else {
        return;
    };

    optional_str(obj, path, "name", issues);

    match obj.get("inputs") {
        None => issues.push(Issue::new(join(path, "inputs"), "Required")),
        Some(Value::Object(_)) => {}
        Some(other) => issues.push(Issue::new(
            join(path, "inputs"),
            format!("Expected object, received {}", type_name(other)),
        )),
    }

    require_str(obj, path, "expected_output", issues);

    if let Some(assertions) = optional_array(obj, path, "assertions", issues) {
        for (i, assertion) in assertions.iter().enumerate() {
            check_assertion(assertion, &format!("{}.{i}", join(path, "assertions")), issues);
        }
    }
}

fn check_output_format(v: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(obj) = as_object(v, path, issues) else {
        return;
    };

    if let Some(kind) = require_str(obj, path, "type", issues) {
        check_literal(kind, OUTPUT_TYPES, &join(path, "type"), issues);
    }
    optional_object(obj, path, "schema", issues);
    optional_str(obj, path, "description", issues);
}

fn check_safety(v: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(obj) = as_object(v, path, issues) else {
        return;
    };

    for field in ["constraints", "blocked_topics"] {
        if let Some(items) = optional_array(obj, path, field, issues) {
            for (i, item) in items.iter().enumerate() {
                if !item.is_string() {
                    issues.push(Issue::new(
                        format!("{}.{i}", join(path, field)),
                        format!("Expected string, received {}", type_name(item)),
                    ));
                }
            }
        }
    }

    if let Some(n) = optional_num(obj, path, "max_tokens", issues) {
        check_positive_int(n, &join(path, "max_tokens"), issues);
    }
    optional_bool(obj, path, "pii_redaction", issues);
}

fn check_scorer(v: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(obj) = as_object(v, path, issues) else {
        return;
    };

    require_str(obj, path, "name", issues);
    if let Some(n) = optional_num(obj, path, "weight", issues) {
        check_range(n, 0.0, 1.0, &join(path, "weight"), issues);
    }
    optional_object(obj, path, "config", issues);
}

fn check_eval(v: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(obj) = as_object(v, path, issues) else {
        return;
    };

    if let Some(scorers) = optional_array(obj, path, "scorers", issues) {
        for (i, scorer) in scorers.iter().enumerate() {
            check_scorer(scorer, &format!("{}.{i}", join(path, "scorers")), issues);
        }
    }
    if let Some(n) = optional_num(obj, path, "threshold", issues) {
        check_range(n, 0.0, 1.0, &join(path, "threshold"), issues);
    }
}

fn check_model(v: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(obj) = as_object(v, path, issues) else {
        return;
    };

    optional_str(obj, path, "provider", issues);
    optional_str(obj, path, "name", issues);
    if let Some(n) = optional_num(obj, path, "temperature", issues) {
        check_range(n, 0.0, 2.0, &join(path, "temperature"), issues);
    }
    if let Some(n) = optional_num(obj, path, "max_tokens", issues) {
        check_positive_int(n, &join(path, "max_tokens"), issues);
    }
}
