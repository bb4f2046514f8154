//! Canonical ordering of WHERE trees.
//!
//! Siblings of every AND/OR are sorted by (kind rank, quoted text), so two
//! queries that differ only in the order their conditions were written in
//! compile to equal models and print identically.

use crate::{model::QueryConstraint, output};

/// Position of a constraint kind in the canonical order.
fn rank(constraint: &QueryConstraint) -> u8 {
    match constraint {
        QueryConstraint::Contains { .. } => 0,
        QueryConstraint::And(_) => 1,
        QueryConstraint::Or(_) => 2,
        QueryConstraint::Not(_) => 3,
        QueryConstraint::NullCheck { .. } => 4,
        QueryConstraint::Like { .. } => 5,
        QueryConstraint::Comparison { .. } => 6,
        QueryConstraint::InSubquery { .. } => 7,
    }
}

/// Rewrite a constraint tree into its canonical shape.
///
/// Nested groups of the same kind are flattened, single-member groups collapse
/// into their member, and a double negation cancels out.
pub fn normalize(constraint: QueryConstraint) -> QueryConstraint {
    match constraint {
        QueryConstraint::And(children) => normalize_group(children, true),
        QueryConstraint::Or(children) => normalize_group(children, false),
        QueryConstraint::Not(inner) => match normalize(*inner) {
            QueryConstraint::Not(twice) => *twice,
            other => QueryConstraint::Not(Box::new(other)),
        },
        other => other,
    }
}

fn normalize_group(children: Vec<QueryConstraint>, conjunction: bool) -> QueryConstraint {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match normalize(child) {
            QueryConstraint::And(members) if conjunction => flat.extend(members),
            QueryConstraint::Or(members) if !conjunction => flat.extend(members),
            other => flat.push(other),
        }
    }

    if flat.len() == 1 {
        if let Some(only) = flat.pop() {
            return only;
        }
    }

    let mut keyed: Vec<((u8, String), QueryConstraint)> = flat
        .into_iter()
        .map(|c| ((rank(&c), output::constraint_text(&c)), c))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    let sorted = keyed.into_iter().map(|(_, c)| c).collect();

    if conjunction {
        QueryConstraint::And(sorted)
    } else {
        QueryConstraint::Or(sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::CompareOp,
        model::{PathExpression, PathTarget, QueryExpression},
        value::{Value, ValueType},
    };

    fn compare(field: &str, n: i64) -> QueryConstraint {
        QueryConstraint::Comparison {
            op: CompareOp::LessThan,
            left: QueryExpression::FieldRef(PathExpression::new(
                vec!["c".to_string(), field.to_string()],
                PathTarget::Attribute {
                    class: "Company".to_string(),
                    ty: ValueType::Integer,
                },
            )),
            right: QueryExpression::Constant(Value::Integer(n)),
        }
    }

    fn null_check(field: &str) -> QueryConstraint {
        QueryConstraint::NullCheck {
            expr: QueryExpression::FieldRef(PathExpression::new(
                vec!["c".to_string(), field.to_string()],
                PathTarget::Attribute {
                    class: "Company".to_string(),
                    ty: ValueType::Text,
                },
            )),
            negated: false,
        }
    }

    #[test]
    fn test_siblings_sorted_by_kind_then_text() {
        let normalized = normalize(QueryConstraint::And(vec![
            compare("b", 1),
            null_check("z"),
            compare("a", 1),
        ]));
        assert_eq!(
            normalized,
            QueryConstraint::And(vec![null_check("z"), compare("a", 1), compare("b", 1)])
        );
    }

    #[test]
    fn test_nested_groups_flatten() {
        let normalized = normalize(QueryConstraint::And(vec![
            compare("a", 1),
            QueryConstraint::And(vec![compare("c", 1), compare("b", 1)]),
        ]));
        assert_eq!(
            normalized,
            QueryConstraint::And(vec![compare("a", 1), compare("b", 1), compare("c", 1)])
        );
    }

    #[test]
    fn test_double_negation_cancels() {
        let normalized = normalize(QueryConstraint::Not(Box::new(QueryConstraint::Not(
            Box::new(compare("a", 1)),
        ))));
        assert_eq!(normalized, compare("a", 1));
    }

    #[test]
    fn test_single_member_group_collapses() {
        let normalized = normalize(QueryConstraint::Or(vec![QueryConstraint::And(vec![
            compare("a", 1),
        ])]));
        assert_eq!(normalized, compare("a", 1));
    }

    fn text_path(field: &str) -> QueryExpression {
        QueryExpression::FieldRef(PathExpression::new(
            vec!["c".to_string(), field.to_string()],
            PathTarget::Attribute {
                class: "Company".to_string(),
                ty: ValueType::Text,
            },
        ))
    }

    #[test]
    fn test_constant_and_path_of_same_spelling_keep_a_fixed_order() {
        let constant = QueryConstraint::Comparison {
            op: CompareOp::Equal,
            left: text_path("name"),
            right: QueryExpression::Constant(Value::Text("c.title".to_string())),
        };
        let path = QueryConstraint::Comparison {
            op: CompareOp::Equal,
            left: text_path("name"),
            right: text_path("title"),
        };
        let display = output::QueryPrinter::new(false);
        assert_eq!(
            display.print_constraint(&constant),
            display.print_constraint(&path)
        );

        let written = normalize(QueryConstraint::Or(vec![constant.clone(), path.clone()]));
        let swapped = normalize(QueryConstraint::Or(vec![path.clone(), constant.clone()]));
        assert_eq!(written, swapped);
        assert_eq!(written, QueryConstraint::Or(vec![constant, path]));
    }
}
