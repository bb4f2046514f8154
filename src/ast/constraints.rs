use crate::ast::{CompareOp, Expr, Query};

/// Untyped WHERE condition as written in the query.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// # Example
    /// ```text
    /// c_.vatNumber > e_.age
    /// ```
    Comparison {
        op: CompareOp,
        left: Expr,
        right: Expr,
    },

    /// Bag constraint on a relationship field
    ///
    /// # Examples
    /// ```text
    /// c_.CEO contains e_
    /// c_.departments does not contain d_
    /// ```
    Contains {
        path: Vec<String>,
        target: String,
        negated: bool,
    },

    /// # Example
    /// ```text
    /// c_.name like 'fish%'
    /// ```
    Like { expr: Expr, pattern: Expr },

    /// # Examples
    /// ```text
    /// e_.salary is null
    /// e_.salary is not null
    /// ```
    NullCheck { expr: Expr, negated: bool },

    /// # Example
    /// ```text
    /// c_.name in (select Company.name as name from Company)
    /// ```
    InSubquery { expr: Expr, query: Box<Query> },

    And(Vec<Constraint>),
    Or(Vec<Constraint>),
    Not(Box<Constraint>),
}
