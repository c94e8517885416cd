// promptspec/src/spec.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fs, path::Path};

use crate::validate::{Issue, Validation, validate_value};

/// One versioned, named prompt template: identity, message sequence, declared
/// inputs, and the optional output/safety/eval/model configuration blocks.
///
/// A `PromptSpec` is only ever constructed from a value that already passed
/// [`validate_value`], so every field here satisfies the schema constraints
/// and the documented defaults have been applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptSpec {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<PromptInput>>,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Example>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety: Option<Safety>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval: Option<Eval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

/// A declared template parameter. `name` follows the identifier grammar
/// (leading underscore allowed), which is looser than some host languages.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssertionKind {
    Contains,
    NotContains,
    MatchesRegex,
    JsonPath,
    Equals,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Assertion {
    #[serde(rename = "type")]
    pub kind: AssertionKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Example {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub inputs: BTreeMap<String, Value>,
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertions: Option<Vec<Assertion>>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Text,
    Json,
    Markdown,
    Code,
    Csv,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputFormat {
    #[serde(rename = "type")]
    pub kind: OutputKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Safety {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_topics: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de_checked_int", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(default)]
    pub pii_redaction: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScorerConfig {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<BTreeMap<String, Value>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Eval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scorers: Option<Vec<ScorerConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "de_checked_int", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

/// `max_tokens` counts that arrive as integral floats (`2048.0`) are accepted
/// by the validator, so the typed model must accept them too. Integrality and
/// the lower bound were already checked; here we only narrow the number.
fn de_checked_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let n = Option::<f64>::deserialize(d)?;
    Ok(n.map(|n| n as u64))
}

#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} failed validation with {} issue(s)", .issues.len())]
    Invalid { path: String, issues: Vec<Issue> },
}

impl PromptSpec {
    /// Read, parse, and validate one prompt document.
    pub fn load(path: &Path) -> Result<PromptSpec, SpecError> {
        let raw = fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| SpecError::Json {
            path: path.display().to_string(),
            source,
        })?;
        match validate_value(&value) {
            Validation::Valid(spec) => Ok(*spec),
            Validation::Invalid(issues) => Err(SpecError::Invalid {
                path: path.display().to_string(),
                issues,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "id": "hello-world",
            "name": "Hello World",
            "version": "1.0.0",
            "description": "A minimal prompt that greets the user.",
            "messages": [{"role": "user", "content": "Say hello."}]
        })
    }

    #[test]
    fn narrowing_applies_defaults() {
        let mut v = minimal();
        v["inputs"] = json!([{"name": "code", "type": "string"}]);
        v["safety"] = json!({"max_tokens": 2048});
        v["eval"] = json!({"scorers": [{"name": "regex"}]});
        let Validation::Valid(spec) = validate_value(&v) else {
            panic!("expected valid spec");
        };
        assert!(spec.inputs.as_ref().unwrap()[0].required);
        let safety = spec.safety.as_ref().unwrap();
        assert!(!safety.pii_redaction);
        assert_eq!(safety.max_tokens, Some(2048));
        let scorer = &spec.eval.as_ref().unwrap().scorers.as_ref().unwrap()[0];
        assert_eq!(scorer.weight, 1.0);
    }

    #[test]
    fn integral_float_max_tokens_narrows() {
        let mut v = minimal();
        v["model"] = json!({"temperature": 0.5, "max_tokens": 4096.0});
        let Validation::Valid(spec) = validate_value(&v) else {
            panic!("expected valid spec");
        };
        assert_eq!(spec.model.as_ref().unwrap().max_tokens, Some(4096));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = PromptSpec::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, SpecError::Io { .. }));
    }

    #[test]
    fn load_reports_bad_json_and_bad_schema() {
        let dir = tempfile::tempdir().unwrap();
        let bad_syntax = dir.path().join("syntax.json");
        fs::write(&bad_syntax, "{not json").unwrap();
        assert!(matches!(
            PromptSpec::load(&bad_syntax).unwrap_err(),
            SpecError::Json { .. }
        ));

        let bad_schema = dir.path().join("schema.json");
        fs::write(&bad_schema, r#"{"id": "X"}"#).unwrap();
        let err = PromptSpec::load(&bad_schema).unwrap_err();
        let SpecError::Invalid { issues, .. } = err else {
            panic!("expected validation failure");
        };
        assert!(issues.iter().any(|i| i.path == "id"));
    }

    #[test]
    fn load_roundtrip_on_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greet.json");
        fs::write(&path, serde_json::to_string_pretty(&minimal()).unwrap()).unwrap();
        let spec = PromptSpec::load(&path).unwrap();
        assert_eq!(spec.id, "hello-world");
        assert_eq!(spec.messages.len(), 1);
        assert_eq!(spec.messages[0].role, Role::User);
    }
}
