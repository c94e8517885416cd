pub mod discover;
pub mod report;
pub mod spec;
pub mod validate;

pub use discover::collect_prompt_files;
pub use report::{FileResult, Report, validate_file};
pub use spec::{
    Assertion, AssertionKind, Eval, Example, InputType, Message, ModelConfig, OutputFormat,
    OutputKind, PromptInput, PromptSpec, Role, Safety, ScorerConfig, SpecError,
};
pub use validate::{Issue, Validation, validate_value};
