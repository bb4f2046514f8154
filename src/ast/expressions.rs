use chrono::NaiveDateTime;

use crate::ast::{ArithOp, Function, Query};

/// Untyped expression as written in the query.
///
/// Nothing here has been checked against the model yet; the resolver turns
/// it into a [`crate::model::QueryExpression`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Integer literal as written, sign included
    ///
    /// # Example
    /// ```text
    /// 42
    /// -7
    /// ```
    Integer(String),

    /// Decimal literal as written
    ///
    /// # Example
    /// ```text
    /// 1.2
    /// ```
    Decimal(String),

    /// String literal, quotes removed
    String(String),

    /// Date-time literal
    DateTime(NaiveDateTime),

    /// Boolean literal
    Boolean(bool),

    /// Dotted path, rooted at an alias
    ///
    /// # Examples
    /// ```text
    /// Company
    /// c_.name
    /// subquery.c_.name
    /// ```
    Path(Vec<String>),

    /// Single arithmetic operation; chains need explicit parentheses
    ///
    /// # Example
    /// ```text
    /// (Company.vatNumber + 3) * 2
    /// ```
    BinaryOp {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Function call. `COUNT(*)` is a `Count` call with no arguments.
    ///
    /// # Examples
    /// ```text
    /// count(*)
    /// substr('flibble', 3, 2)
    /// ```
    Function { function: Function, args: Vec<Expr> },

    /// Parenthesised query used as a value
    Subquery(Box<Query>),
}
