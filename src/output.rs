//! Text and JSON rendering of compiled queries.
//!
//! Printing is a pure function of the [`QueryObjectModel`]: it never fails and
//! never depends on how the source text was formatted.
//!
//! # Features
//!
//! - **Canonical text** via [`to_canonical_text()`] - upper-case keywords,
//!   qualified class names in FROM, unquoted text constants, long-form dates
//! - **Re-parseable text** via [`to_iql()`] - the same layout with text and date
//!   constants quoted the way the lexer reads them
//! - **JSON summary** via [`to_json()`] - SELECT columns with their inferred types

use serde_json::json;

use crate::{
    ast::Function,
    lexer::DATE_INPUT_FORMAT,
    model::{FromItem, FromSource, GroupItem, QueryConstraint, QueryExpression, QueryObjectModel},
    value::Value,
};

/// Long-form calendar rendering of date-time constants.
const DATE_DISPLAY_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

pub struct QueryPrinter {
    quote_literals: bool,
}

impl QueryPrinter {
    pub fn new(quote_literals: bool) -> Self {
        QueryPrinter { quote_literals }
    }

    pub fn print(&self, query: &QueryObjectModel) -> String {
        let mut result = String::from("SELECT ");

        let items: Vec<String> = query
            .select()
            .iter()
            .map(|item| {
                let expr = self.print_expression(item.expression());
                if item.is_implicit_alias() {
                    expr
                } else {
                    format!("{} AS {}", expr, item.alias())
                }
            })
            .collect();
        result.push_str(&items.join(", "));

        result.push_str(" FROM ");
        let from: Vec<String> = query
            .from()
            .iter()
            .map(|item| self.print_from_item(query, item))
            .collect();
        result.push_str(&from.join(", "));

        if let Some(constraint) = query.where_clause() {
            result.push_str(" WHERE ");
            result.push_str(&self.print_constraint(constraint));
        }

        if !query.group_by().is_empty() {
            let items: Vec<String> = query
                .group_by()
                .iter()
                .map(|item| match item {
                    GroupItem::Ordinal(n) => n.to_string(),
                    GroupItem::Expression(expr) => self.print_expression(expr),
                })
                .collect();
            result.push_str(" GROUP BY ");
            result.push_str(&items.join(", "));
        }

        if !query.order_by().is_empty() {
            let items: Vec<String> = query
                .order_by()
                .iter()
                .map(|expr| self.print_expression(expr))
                .collect();
            result.push_str(" ORDER BY ");
            result.push_str(&items.join(", "));
        }

        result
    }

    fn print_from_item(&self, query: &QueryObjectModel, item: &FromItem) -> String {
        match item.source() {
            FromSource::Class(class) => {
                format!("{} AS {}", query.qualified_name(class), item.alias())
            }
            FromSource::Subquery(subquery) => {
                format!("({}) AS {}", self.print(subquery), item.alias())
            }
        }
    }

    pub fn print_expression(&self, expr: &QueryExpression) -> String {
        match expr {
            QueryExpression::Constant(value) => self.print_value(value),
            QueryExpression::FieldRef(path) => path.text(),
            QueryExpression::BinaryOp {
                op, left, right, ..
            } => format!(
                "{} {} {}",
                self.print_operand(left),
                op.symbol(),
                self.print_operand(right)
            ),
            QueryExpression::FunctionCall {
                function: Function::Count,
                ..
            } => "COUNT(*)".to_string(),
            QueryExpression::FunctionCall { function, args, .. } => {
                let args: Vec<String> = args.iter().map(|a| self.print_expression(a)).collect();
                format!("{}({})", function.name(), args.join(", "))
            }
            QueryExpression::Subquery(query) => format!("({})", self.print(query)),
        }
    }

    /// Nested arithmetic keeps its parentheses.
    fn print_operand(&self, expr: &QueryExpression) -> String {
        match expr {
            QueryExpression::BinaryOp { .. } => format!("({})", self.print_expression(expr)),
            _ => self.print_expression(expr),
        }
    }

    fn print_value(&self, value: &Value) -> String {
        match value {
            Value::Integer(n) => n.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Text(s) if self.quote_literals => format!("'{}'", self.escape_string(s)),
            Value::Text(s) => s.clone(),
            Value::DateTime(d) if self.quote_literals => {
                format!("'{}'", d.format(DATE_INPUT_FORMAT))
            }
            Value::DateTime(d) => d.format(DATE_DISPLAY_FORMAT).to_string(),
        }
    }

    pub fn print_constraint(&self, constraint: &QueryConstraint) -> String {
        match constraint {
            QueryConstraint::Comparison { op, left, right } => format!(
                "{} {} {}",
                self.print_expression(left),
                op.symbol(),
                self.print_expression(right)
            ),
            QueryConstraint::Contains {
                path,
                target,
                negated,
            } => format!(
                "{} {} {}",
                path.text(),
                if *negated {
                    "DOES NOT CONTAIN"
                } else {
                    "CONTAINS"
                },
                target
            ),
            QueryConstraint::Like { expr, pattern } => format!(
                "{} LIKE {}",
                self.print_expression(expr),
                self.print_expression(pattern)
            ),
            QueryConstraint::NullCheck { expr, negated } => format!(
                "{} IS {}NULL",
                self.print_expression(expr),
                if *negated { "NOT " } else { "" }
            ),
            QueryConstraint::InSubquery { expr, subquery } => format!(
                "{} IN ({})",
                self.print_expression(expr),
                self.print(subquery)
            ),
            QueryConstraint::And(children) => self.print_group(children, " AND "),
            QueryConstraint::Or(children) => self.print_group(children, " OR "),
            QueryConstraint::Not(inner) => format!("NOT {}", self.print_constraint(inner)),
        }
    }

    fn print_group(&self, children: &[QueryConstraint], separator: &str) -> String {
        let items: Vec<String> = children.iter().map(|c| self.print_constraint(c)).collect();
        format!("({})", items.join(separator))
    }

    fn escape_string(&self, s: &str) -> String {
        s.chars()
            .flat_map(|c| match c {
                '\'' => vec!['\\', '\''],
                '\\' => vec!['\\', '\\'],
                '\n' => vec!['\\', 'n'],
                '\r' => vec!['\\', 'r'],
                '\t' => vec!['\\', 't'],
                c => vec![c],
            })
            .collect()
    }
}

// Convenience functions

/// Renders the deterministic display form of a compiled query.
///
/// # Examples
///
/// ```
/// use iql_lang::{compile, metadata::Model, output::to_canonical_text, ValueType};
///
/// let model = Model::builder("org.example")
///     .attribute("Company", "vatNumber", ValueType::Integer)
///     .build();
/// let query = compile(
///     "select c.vatNumber + 1 as v from Company as c",
///     "org.example",
///     &model,
/// )
/// .unwrap();
/// assert_eq!(
///     to_canonical_text(&query),
///     "SELECT c.vatNumber + 1 AS v FROM org.example.Company AS c"
/// );
/// ```
pub fn to_canonical_text(query: &QueryObjectModel) -> String {
    QueryPrinter::new(false).print(query)
}

/// Renders a compiled query as IQL that compiles back to an equal model.
///
/// Identical to [`to_canonical_text()`] except that text and date-time
/// constants are quoted in input syntax.
pub fn to_iql(query: &QueryObjectModel) -> String {
    QueryPrinter::new(true).print(query)
}

/// Quoted text of a single constraint; the normalizer sorts on this.
///
/// Quoting keeps text constants apart from paths of the same spelling and
/// keeps the milliseconds of date-time constants.
pub fn constraint_text(constraint: &QueryConstraint) -> String {
    QueryPrinter::new(true).print_constraint(constraint)
}

/// Summarises a compiled query as JSON for callers that execute or export it.
///
/// # Examples
///
/// ```
/// use iql_lang::{compile, metadata::Model, output::to_json};
///
/// let model = Model::builder("org.example").class("Company", None).build();
/// let query = compile("select Company from Company", "org.example", &model).unwrap();
/// let summary = to_json(&query);
/// assert_eq!(summary["select"][0]["type"], "class");
/// assert_eq!(summary["from"][0]["class"], "org.example.Company");
/// ```
pub fn to_json(query: &QueryObjectModel) -> serde_json::Value {
    let printer = QueryPrinter::new(false);

    let select: Vec<serde_json::Value> = query
        .select()
        .iter()
        .map(|item| {
            json!({
                "alias": item.alias(),
                "expression": printer.print_expression(item.expression()),
                "type": item.value_type().name(),
            })
        })
        .collect();

    let from: Vec<serde_json::Value> = query
        .from()
        .iter()
        .map(|item| match item.source() {
            FromSource::Class(class) => json!({
                "alias": item.alias(),
                "class": query.qualified_name(class),
            }),
            FromSource::Subquery(subquery) => json!({
                "alias": item.alias(),
                "subquery": to_json(subquery),
            }),
        })
        .collect();

    let group_by: Vec<String> = query
        .group_by()
        .iter()
        .map(|item| match item {
            GroupItem::Ordinal(n) => n.to_string(),
            GroupItem::Expression(expr) => printer.print_expression(expr),
        })
        .collect();

    let order_by: Vec<String> = query
        .order_by()
        .iter()
        .map(|expr| printer.print_expression(expr))
        .collect();

    json!({
        "select": select,
        "from": from,
        "where": query.where_clause().map(|c| printer.print_constraint(c)),
        "group_by": group_by,
        "order_by": order_by,
        "canonical": printer.print(query),
    })
}
