//! The compiled, typed query.
//!
//! A [`QueryObjectModel`] is built once per successful compile and never
//! changes afterwards. Subqueries are owned by the item that introduces them.

use crate::{
    ast::{ArithOp, CompareOp, Function},
    output,
    value::{Value, ValueType},
};

/// What a path expression resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTarget {
    /// An object of the class, via a FROM alias or a reference field
    Class(String),
    /// A value field of `class`
    Attribute { class: String, ty: ValueType },
    /// A bag of `element` objects held by a collection field
    Collection { element: String },
    /// A value column selected by a FROM subquery
    SubqueryColumn(ValueType),
    /// A SELECT alias of an enclosing query
    OuterColumn(ValueType),
}

/// A dotted path bound to exactly one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    segments: Vec<String>,
    target: PathTarget,
}

impl PathExpression {
    pub(crate) fn new(segments: Vec<String>, target: PathTarget) -> Self {
        PathExpression { segments, target }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn target(&self) -> &PathTarget {
        &self.target
    }

    /// The path as written, segments joined with dots.
    pub fn text(&self) -> String {
        self.segments.join(".")
    }

    /// `None` for collections, which are not values.
    pub fn value_type(&self) -> Option<ValueType> {
        match &self.target {
            PathTarget::Class(_) => Some(ValueType::ClassReference),
            PathTarget::Attribute { ty, .. } => Some(*ty),
            PathTarget::Collection { .. } => None,
            PathTarget::SubqueryColumn(ty) | PathTarget::OuterColumn(ty) => Some(*ty),
        }
    }
}

/// A typed value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpression {
    Constant(Value),
    FieldRef(PathExpression),
    BinaryOp {
        op: ArithOp,
        left: Box<QueryExpression>,
        right: Box<QueryExpression>,
        ty: ValueType,
    },
    FunctionCall {
        function: Function,
        args: Vec<QueryExpression>,
        ty: ValueType,
    },
    /// Single-column subquery used as a value
    Subquery(Box<QueryObjectModel>),
}

impl QueryExpression {
    pub fn value_type(&self) -> ValueType {
        match self {
            QueryExpression::Constant(value) => value.value_type(),
            // Collections never make it into a value position.
            QueryExpression::FieldRef(path) => {
                path.value_type().unwrap_or(ValueType::ClassReference)
            }
            QueryExpression::BinaryOp { ty, .. } | QueryExpression::FunctionCall { ty, .. } => *ty,
            QueryExpression::Subquery(query) => query
                .select()
                .first()
                .map(|item| item.value_type())
                .unwrap_or(ValueType::ClassReference),
        }
    }
}

/// A typed WHERE condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryConstraint {
    Comparison {
        op: CompareOp,
        left: QueryExpression,
        right: QueryExpression,
    },
    /// `path CONTAINS target` / `path DOES NOT CONTAIN target`
    Contains {
        path: PathExpression,
        target: String,
        negated: bool,
    },
    Like {
        expr: QueryExpression,
        pattern: QueryExpression,
    },
    NullCheck {
        expr: QueryExpression,
        negated: bool,
    },
    InSubquery {
        expr: QueryExpression,
        subquery: Box<QueryObjectModel>,
    },
    And(Vec<QueryConstraint>),
    Or(Vec<QueryConstraint>),
    Not(Box<QueryConstraint>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    alias: String,
    implicit_alias: bool,
    expr: QueryExpression,
}

impl SelectItem {
    pub(crate) fn new(alias: String, implicit_alias: bool, expr: QueryExpression) -> Self {
        SelectItem {
            alias,
            implicit_alias,
            expr,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// True when the alias was derived rather than written with `AS`.
    pub fn is_implicit_alias(&self) -> bool {
        self.implicit_alias
    }

    pub fn expression(&self) -> &QueryExpression {
        &self.expr
    }

    pub fn value_type(&self) -> ValueType {
        self.expr.value_type()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromSource {
    /// Simple class name; the printer qualifies it with the namespace
    Class(String),
    Subquery(Box<QueryObjectModel>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromItem {
    alias: String,
    source: FromSource,
}

impl FromItem {
    pub(crate) fn new(alias: String, source: FromSource) -> Self {
        FromItem { alias, source }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn source(&self) -> &FromSource {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupItem {
    /// 1-based SELECT-list position
    Ordinal(usize),
    Expression(QueryExpression),
}

/// A compiled IQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryObjectModel {
    namespace: String,
    select: Vec<SelectItem>,
    from: Vec<FromItem>,
    where_clause: Option<QueryConstraint>,
    group_by: Vec<GroupItem>,
    order_by: Vec<QueryExpression>,
}

impl QueryObjectModel {
    pub(crate) fn new(
        namespace: String,
        select: Vec<SelectItem>,
        from: Vec<FromItem>,
        where_clause: Option<QueryConstraint>,
        group_by: Vec<GroupItem>,
        order_by: Vec<QueryExpression>,
    ) -> Self {
        QueryObjectModel {
            namespace,
            select,
            from,
            where_clause,
            group_by,
            order_by,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn select(&self) -> &[SelectItem] {
        &self.select
    }

    pub fn from(&self) -> &[FromItem] {
        &self.from
    }

    pub fn where_clause(&self) -> Option<&QueryConstraint> {
        self.where_clause.as_ref()
    }

    pub fn group_by(&self) -> &[GroupItem] {
        &self.group_by
    }

    pub fn order_by(&self) -> &[QueryExpression] {
        &self.order_by
    }

    /// Fully-qualified name of a class in this query's namespace.
    pub fn qualified_name(&self, class: &str) -> String {
        if self.namespace.is_empty() {
            class.to_string()
        } else {
            format!("{}.{}", self.namespace, class)
        }
    }

    /// The deterministic display form.
    ///
    /// # Examples
    ///
    /// ```
    /// use iql_lang::{compile, metadata::Model};
    ///
    /// let model = Model::builder("org.example").class("Company", None).build();
    /// let query = compile("select 'hi' as f from Company", "org.example", &model).unwrap();
    /// assert_eq!(
    ///     query.to_canonical_text(),
    ///     "SELECT hi AS f FROM org.example.Company AS Company"
    /// );
    /// ```
    pub fn to_canonical_text(&self) -> String {
        output::to_canonical_text(self)
    }

    /// The canonical form with text and date constants quoted, so it parses back.
    pub fn to_iql(&self) -> String {
        output::to_iql(self)
    }

    /// A JSON summary of the compiled query.
    pub fn to_json(&self) -> serde_json::Value {
        output::to_json(self)
    }
}

impl std::fmt::Display for QueryObjectModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical_text())
    }
}
