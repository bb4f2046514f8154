pub mod ast;
pub mod cli;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod resolver;
mod typecheck;
pub mod value;

pub use ast::{Constraint, Expr, Query, Token};
pub use compiler::{CompileOptions, compile, compile_with};
pub use error::{CompileError, PathEnd, VisibilityViolation};
pub use lexer::{Lexer, Position};
pub use metadata::{FieldType, MetadataModel, Model};
pub use model::{
    FromItem, FromSource, GroupItem, PathExpression, PathTarget, QueryConstraint,
    QueryExpression, QueryObjectModel, SelectItem,
};
pub use output::{to_canonical_text, to_iql, to_json};
pub use parser::{Parser, parse};
pub use value::{Value, ValueType};
