use crate::ast::{Constraint, Expr};

/// A query as parsed, before any name has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub select: Vec<SelectItem>,
    pub from: Vec<FromItem>,
    pub where_clause: Option<Constraint>,
    /// Integer literals here are SELECT-list ordinals
    pub group_by: Vec<Expr>,
    pub order_by: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FromItem {
    /// `Company`, `Company AS c_` or `org.flymine.model.testmodel.Company AS c_`
    Class {
        name: Vec<String>,
        alias: Option<String>,
    },
    /// `(SELECT ...) AS s`
    Subquery { query: Box<Query>, alias: String },
}
