//! Entry points tying the stages together.

use tracing::debug;

use crate::{
    error::CompileError,
    lexer::Lexer,
    metadata::MetadataModel,
    model::QueryObjectModel,
    parser::{DEFAULT_MAX_DEPTH, Parser},
    resolver::Resolver,
};

/// Limits applied while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Deepest allowed nesting of parentheses, NOT prefixes and subqueries
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Compile IQL text against `metadata` with default options.
///
/// # Examples
///
/// ```
/// use iql_lang::{compile, metadata::Model, ValueType};
///
/// let model = Model::builder("org.example")
///     .attribute("Company", "name", ValueType::Text)
///     .build();
/// let query = compile("select c.name from Company as c", "org.example", &model).unwrap();
/// assert_eq!(query.select()[0].alias(), "name");
/// assert_eq!(query.select()[0].value_type(), ValueType::Text);
/// ```
pub fn compile<M: MetadataModel + ?Sized>(
    text: &str,
    namespace: &str,
    metadata: &M,
) -> Result<QueryObjectModel, CompileError> {
    compile_with(text, namespace, metadata, &CompileOptions::default())
}

pub fn compile_with<M: MetadataModel + ?Sized>(
    text: &str,
    namespace: &str,
    metadata: &M,
    options: &CompileOptions,
) -> Result<QueryObjectModel, CompileError> {
    let result = Parser::new(Lexer::new(text)).and_then(|parser| {
        debug!(namespace, tokens = parser.token_count(), "compiling query");
        let mut parser = parser.with_max_depth(options.max_depth);
        let query = parser.parse_query()?;
        Resolver::new(metadata, namespace, options.max_depth).resolve(&query)
    });

    match &result {
        Ok(query) => debug!(columns = query.select().len(), "compiled query"),
        Err(e) => debug!(error = %e, "compile failed"),
    }
    result
}
