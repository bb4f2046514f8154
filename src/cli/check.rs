//! Compile IQL queries against a metadata model

use super::CliError;
use crate::{
    compiler::{CompileOptions, compile_with},
    metadata::Model,
    parser::DEFAULT_MAX_DEPTH,
};

/// How a compiled query is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Canonical display text
    #[default]
    Canonical,
    /// Canonical text with quoted constants, suitable for re-parsing
    Iql,
    /// JSON summary
    Json,
}

/// Options for the check command
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// The IQL query to compile
    pub query: String,
    /// Package the model's classes live in
    pub namespace: String,
    /// Metadata model in JSON form
    pub model_json: String,
    pub format: OutputFormat,
    pub max_depth: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            query: String::new(),
            namespace: String::new(),
            model_json: String::new(),
            format: OutputFormat::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Compiled successfully, rendered as text
    Text(String),
    /// Compiled successfully, rendered as a JSON summary
    Json(serde_json::Value),
}

/// Execute an iql check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    if options.query.trim().is_empty() {
        return Err(CliError::NoInput);
    }

    let model = Model::from_json(&options.model_json)?;
    // An empty namespace falls back to the package the model declares.
    let namespace = if options.namespace.is_empty() {
        model.package()
    } else {
        options.namespace.as_str()
    };

    let compile_options = CompileOptions {
        max_depth: options.max_depth,
    };
    let query = compile_with(&options.query, namespace, &model, &compile_options)?;

    Ok(match options.format {
        OutputFormat::Canonical => CheckResult::Text(query.to_canonical_text()),
        OutputFormat::Iql => CheckResult::Text(query.to_iql()),
        OutputFormat::Json => CheckResult::Json(query.to_json()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "package": "org.example",
        "classes": {
            "Company": {"attributes": {"name": "text", "vatNumber": "integer"}}
        }
    }"#;

    fn options(query: &str) -> CheckOptions {
        CheckOptions {
            query: query.to_string(),
            model_json: MODEL.to_string(),
            ..CheckOptions::default()
        }
    }

    #[test]
    fn test_namespace_defaults_to_model_package() {
        let result = execute_check(&options("select c.name from Company as c")).unwrap();
        assert!(matches!(
            result,
            CheckResult::Text(text) if text == "SELECT c.name FROM org.example.Company AS c"
        ));
    }

    #[test]
    fn test_empty_query() {
        assert!(matches!(
            execute_check(&options("  ")),
            Err(CliError::NoInput)
        ));
    }

    #[test]
    fn test_compile_error_is_wrapped() {
        assert!(matches!(
            execute_check(&options("select c.nope from Company as c")),
            Err(CliError::Compile(_))
        ));
    }
}
