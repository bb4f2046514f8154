//! The closed set of failures a compile can end with.
//!
//! Every stage of the pipeline returns `Result<_, CompileError>`; the first
//! error aborts the remaining stages and is handed back to the caller as is.

use std::fmt;

use thiserror::Error;

use crate::lexer::Position;

/// Errors that can occur while compiling an IQL query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The text does not follow the token or grammar rules.
    #[error("line {line}:{column}: expected {expected}, found {found}")]
    Syntax {
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },

    /// A FROM item names a class the metadata model does not know.
    #[error("unknown class {class} in namespace {namespace}")]
    UnknownClass { class: String, namespace: String },

    /// A path segment names a field its class does not have.
    #[error("field {field} not found in class {class}")]
    UnknownField { field: String, class: String },

    /// A path continues past a terminal (a field or a subquery).
    #[error("path expression {path} {end}")]
    PathTooLong { path: String, end: PathEnd },

    /// The leftmost segment of a path matches no visible alias.
    #[error("no such object {name}{}", subquery_suffix(.subquery))]
    UnknownAlias {
        name: String,
        subquery: Option<String>,
    },

    /// A path reaches into a subquery further than its SELECT list allows.
    #[error("{reason}, for path expression {path}")]
    SubqueryVisibility {
        path: String,
        reason: VisibilityViolation,
    },

    /// A class name is used as a value without a FROM alias of that name.
    #[error("class {class} is used without a FROM alias of that name")]
    AmbiguousOrMissingAlias { class: String },

    /// A class reference appears where a value is required.
    #[error("{context} cannot contain classes as arguments")]
    ClassInExpression { context: &'static str },

    /// Operand types do not fit the operator or function.
    #[error("invalid argument types for {operation}: {found}")]
    TypeMismatch { operation: String, found: String },

    /// A function or subquery has the wrong number of arguments or columns.
    #[error("{function} takes {expected} argument(s), found {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    /// An aggregate was applied to something other than a field or an expression.
    #[error("arguments to aggregate function {function} may be fields or expressions only")]
    InvalidAggregateArgument { function: String },

    /// Nesting went deeper than the configured bound.
    #[error("query nesting exceeds the limit of {limit}")]
    RecursionLimit { limit: usize },

    /// Two items of one FROM or SELECT list share an alias.
    #[error("alias {alias} is defined more than once")]
    DuplicateAlias { alias: String },

    /// A GROUP BY ordinal does not point into the SELECT list.
    #[error("GROUP BY position {ordinal} is not in the SELECT list of {columns} item(s)")]
    InvalidOrdinal { ordinal: i64, columns: usize },
}

fn subquery_suffix(subquery: &Option<String>) -> String {
    match subquery {
        Some(name) => format!(" found in subquery {}", name),
        None => String::new(),
    }
}

impl CompileError {
    pub(crate) fn syntax(
        position: Position,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        CompileError::Syntax {
            line: position.line,
            column: position.column,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn type_mismatch(operation: impl Into<String>, found: impl Into<String>) -> Self {
        CompileError::TypeMismatch {
            operation: operation.into(),
            found: found.into(),
        }
    }
}

/// The terminal a too-long path ran past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEnd {
    /// `Company.name.something`
    Field,
    /// `c` where `c` is a FROM subquery
    Subquery,
}

impl fmt::Display for PathEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathEnd::Field => write!(f, "extends beyond a field"),
            PathEnd::Subquery => write!(f, "cannot end at a subquery"),
        }
    }
}

/// Why a reference into a subquery was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityViolation {
    /// A class selected by the subquery was used as a bare value.
    ClassInsideSubquery,
    /// The name exists in the subquery's FROM list but is not selected.
    NotSelected { name: String, subquery: String },
    /// The name is itself a subquery nested inside the subquery.
    NestedSubquery { name: String, subquery: String },
}

impl fmt::Display for VisibilityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisibilityViolation::ClassInsideSubquery => write!(
                f,
                "cannot reference classes inside subqueries, only their fields and selected values"
            ),
            VisibilityViolation::NotSelected { name, subquery } => write!(
                f,
                "{} is not in the SELECT list of subquery {}",
                name, subquery
            ),
            VisibilityViolation::NestedSubquery { name, subquery } => write!(
                f,
                "cannot reference subquery {} inside subquery {}",
                name, subquery
            ),
        }
    }
}
