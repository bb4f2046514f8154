//! Name resolution and typing.
//!
//! Walks the parse tree depth-first, binding every path to a FROM alias, a
//! field, or a column of a visible subquery, and types each expression as it
//! is built. Scopes live in an arena: each records its FROM aliases, the
//! SELECT aliases it exposes to nested queries, and the index of its parent.
//!
//! # Resolution order for the first segment of a path
//!
//! 1. a FROM alias of the current query
//! 2. a SELECT alias of an enclosing query (nearest first)
//! 3. otherwise the path is unknown

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::trace;

use crate::{
    ast::{self, Constraint, Expr},
    error::{CompileError, PathEnd, VisibilityViolation},
    metadata::{FieldType, MetadataModel},
    model::{
        FromItem, FromSource, GroupItem, PathExpression, PathTarget, QueryConstraint,
        QueryExpression, QueryObjectModel, SelectItem,
    },
    normalize::normalize,
    typecheck,
    value::{Value, ValueType},
};

/// A SELECT column as seen from outside its query.
#[derive(Debug, Clone)]
enum Column {
    /// A whole object; its fields may be reached through the alias
    Class(String),
    Value(ValueType),
}

impl Column {
    fn of(item: &SelectItem) -> Column {
        match item.expression() {
            QueryExpression::FieldRef(path) => match path.target() {
                PathTarget::Class(class) => Column::Class(class.clone()),
                _ => Column::Value(item.value_type()),
            },
            _ => Column::Value(item.value_type()),
        }
    }
}

/// What a FROM alias stands for.
#[derive(Debug, Clone)]
enum Binding {
    Class(String),
    Subquery {
        columns: Vec<(String, Column)>,
        /// FROM aliases of the subquery and whether each is itself a subquery
        from: Vec<(String, bool)>,
    },
}

#[derive(Debug, Default)]
struct Scope {
    parent: Option<usize>,
    from: Vec<(String, Binding)>,
    select: Vec<(String, Column)>,
}

pub struct Resolver<'a, M: MetadataModel + ?Sized> {
    metadata: &'a M,
    namespace: &'a str,
    scopes: Vec<Scope>,
    max_depth: usize,
}

impl<'a, M: MetadataModel + ?Sized> Resolver<'a, M> {
    pub fn new(metadata: &'a M, namespace: &'a str, max_depth: usize) -> Self {
        Resolver {
            metadata,
            namespace,
            scopes: Vec::new(),
            max_depth,
        }
    }

    /// Resolve and type a whole query.
    pub fn resolve(&mut self, query: &ast::Query) -> Result<QueryObjectModel, CompileError> {
        self.resolve_query(query, None, 0)
    }

    fn qualified(&self, class: &str) -> String {
        if self.namespace.is_empty() {
            class.to_string()
        } else {
            format!("{}.{}", self.namespace, class)
        }
    }

    fn resolve_query(
        &mut self,
        query: &ast::Query,
        parent: Option<usize>,
        depth: usize,
    ) -> Result<QueryObjectModel, CompileError> {
        if depth > self.max_depth {
            return Err(CompileError::RecursionLimit {
                limit: self.max_depth,
            });
        }

        let scope = self.scopes.len();
        self.scopes.push(Scope {
            parent,
            ..Scope::default()
        });

        let mut from = Vec::with_capacity(query.from.len());
        for item in &query.from {
            let (alias, binding, source) = match item {
                ast::FromItem::Class { name, alias } => {
                    let class = self.resolve_class_name(name)?;
                    let alias = alias.clone().unwrap_or_else(|| class.clone());
                    trace!(alias = %alias, class = %class, "bound FROM class");
                    (alias, Binding::Class(class.clone()), FromSource::Class(class))
                }
                ast::FromItem::Subquery { query, alias } => {
                    trace!(alias = %alias, depth = depth + 1, "entering FROM subquery");
                    let subquery = self.resolve_query(query, Some(scope), depth + 1)?;
                    let binding = Binding::Subquery {
                        columns: subquery
                            .select()
                            .iter()
                            .map(|item| (item.alias().to_string(), Column::of(item)))
                            .collect(),
                        from: subquery
                            .from()
                            .iter()
                            .map(|item| {
                                let nested = matches!(item.source(), FromSource::Subquery(_));
                                (item.alias().to_string(), nested)
                            })
                            .collect(),
                    };
                    (alias.clone(), binding, FromSource::Subquery(Box::new(subquery)))
                }
            };

            if self.scopes[scope].from.iter().any(|(a, _)| *a == alias) {
                return Err(CompileError::DuplicateAlias { alias });
            }
            self.scopes[scope].from.push((alias.clone(), binding));
            from.push(FromItem::new(alias, source));
        }

        let mut select: Vec<SelectItem> = Vec::with_capacity(query.select.len());
        for (index, item) in query.select.iter().enumerate() {
            let expr = self.resolve_expression(&item.expr, scope, depth)?;
            let (alias, implicit) = match &item.alias {
                Some(alias) => (alias.clone(), false),
                None => (implicit_alias(&item.expr, index), true),
            };
            if select.iter().any(|existing| existing.alias() == alias) {
                return Err(CompileError::DuplicateAlias { alias });
            }
            select.push(SelectItem::new(alias, implicit, expr));
        }
        self.scopes[scope].select = select
            .iter()
            .map(|item| (item.alias().to_string(), Column::of(item)))
            .collect();

        let where_clause = match &query.where_clause {
            Some(constraint) => Some(normalize(self.resolve_constraint(constraint, scope, depth)?)),
            None => None,
        };

        let mut group_by = Vec::with_capacity(query.group_by.len());
        for expr in &query.group_by {
            let item = match expr {
                Expr::Integer(text) => {
                    let ordinal = integer_literal(text)?;
                    match usize::try_from(ordinal) {
                        Ok(position) if position >= 1 && position <= select.len() => {
                            GroupItem::Ordinal(position)
                        }
                        _ => {
                            return Err(CompileError::InvalidOrdinal {
                                ordinal,
                                columns: select.len(),
                            });
                        }
                    }
                }
                _ => GroupItem::Expression(self.resolve_expression(expr, scope, depth)?),
            };
            group_by.push(item);
        }

        let mut order_by = Vec::with_capacity(query.order_by.len());
        for expr in &query.order_by {
            order_by.push(self.resolve_expression(expr, scope, depth)?);
        }

        Ok(QueryObjectModel::new(
            self.namespace.to_string(),
            select,
            from,
            where_clause,
            group_by,
            order_by,
        ))
    }

    /// FROM class names may be simple or qualified with the compile namespace.
    fn resolve_class_name(&self, name: &[String]) -> Result<String, CompileError> {
        let Some((simple, qualifier)) = name.split_last() else {
            return Err(CompileError::UnknownClass {
                class: String::new(),
                namespace: self.namespace.to_string(),
            });
        };
        if !qualifier.is_empty() && qualifier.join(".") != self.namespace {
            return Err(CompileError::UnknownClass {
                class: name.join("."),
                namespace: self.namespace.to_string(),
            });
        }
        if !self.metadata.has_class(simple) {
            return Err(CompileError::UnknownClass {
                class: simple.clone(),
                namespace: self.namespace.to_string(),
            });
        }
        Ok(simple.clone())
    }

    fn resolve_expression(
        &mut self,
        expr: &Expr,
        scope: usize,
        depth: usize,
    ) -> Result<QueryExpression, CompileError> {
        match expr {
            Expr::Integer(text) => Ok(QueryExpression::Constant(Value::Integer(integer_literal(
                text,
            )?))),
            Expr::Decimal(text) => Decimal::from_str(text)
                .map(|d| QueryExpression::Constant(Value::Decimal(d)))
                .map_err(|_| CompileError::type_mismatch("decimal literal", text.clone())),
            Expr::String(s) => Ok(QueryExpression::Constant(Value::Text(s.clone()))),
            Expr::DateTime(d) => Ok(QueryExpression::Constant(Value::DateTime(*d))),
            Expr::Boolean(b) => Ok(QueryExpression::Constant(Value::Boolean(*b))),
            Expr::Path(segments) => {
                let path = self.resolve_path(segments, scope)?;
                typecheck::check_value_path(&path)?;
                Ok(QueryExpression::FieldRef(path))
            }
            Expr::BinaryOp { op, left, right } => {
                let left = self.resolve_expression(left, scope, depth)?;
                let right = self.resolve_expression(right, scope, depth)?;
                let ty = typecheck::check_arithmetic(*op, &left, &right)?;
                Ok(QueryExpression::BinaryOp {
                    op: *op,
                    left: Box::new(left),
                    right: Box::new(right),
                    ty,
                })
            }
            Expr::Function { function, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.resolve_expression(arg, scope, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                let ty = typecheck::check_function(*function, &args)?;
                Ok(QueryExpression::FunctionCall {
                    function: *function,
                    args,
                    ty,
                })
            }
            Expr::Subquery(query) => {
                trace!(depth = depth + 1, "entering scalar subquery");
                let subquery = self.resolve_query(query, Some(scope), depth + 1)?;
                typecheck::check_single_column(&subquery, "scalar subquery")?;
                Ok(QueryExpression::Subquery(Box::new(subquery)))
            }
        }
    }

    fn resolve_constraint(
        &mut self,
        constraint: &Constraint,
        scope: usize,
        depth: usize,
    ) -> Result<QueryConstraint, CompileError> {
        match constraint {
            Constraint::Comparison { op, left, right } => {
                let left = self.resolve_expression(left, scope, depth)?;
                let right = self.resolve_expression(right, scope, depth)?;
                typecheck::check_comparison(*op, &left, &right)?;
                Ok(QueryConstraint::Comparison {
                    op: *op,
                    left,
                    right,
                })
            }
            Constraint::Contains {
                path,
                target,
                negated,
            } => self.resolve_contains(path, target, *negated, scope),
            Constraint::Like { expr, pattern } => {
                let expr = self.resolve_expression(expr, scope, depth)?;
                let pattern = self.resolve_expression(pattern, scope, depth)?;
                typecheck::check_like(&expr, &pattern)?;
                Ok(QueryConstraint::Like { expr, pattern })
            }
            Constraint::NullCheck { expr, negated } => Ok(QueryConstraint::NullCheck {
                expr: self.resolve_expression(expr, scope, depth)?,
                negated: *negated,
            }),
            Constraint::InSubquery { expr, query } => {
                let expr = self.resolve_expression(expr, scope, depth)?;
                trace!(depth = depth + 1, "entering IN subquery");
                let subquery = self.resolve_query(query, Some(scope), depth + 1)?;
                typecheck::check_in(&expr, &subquery)?;
                Ok(QueryConstraint::InSubquery {
                    expr,
                    subquery: Box::new(subquery),
                })
            }
            Constraint::And(children) => Ok(QueryConstraint::And(
                self.resolve_constraints(children, scope, depth)?,
            )),
            Constraint::Or(children) => Ok(QueryConstraint::Or(
                self.resolve_constraints(children, scope, depth)?,
            )),
            Constraint::Not(inner) => Ok(QueryConstraint::Not(Box::new(
                self.resolve_constraint(inner, scope, depth)?,
            ))),
        }
    }

    fn resolve_constraints(
        &mut self,
        children: &[Constraint],
        scope: usize,
        depth: usize,
    ) -> Result<Vec<QueryConstraint>, CompileError> {
        children
            .iter()
            .map(|child| self.resolve_constraint(child, scope, depth))
            .collect()
    }

    fn resolve_contains(
        &self,
        segments: &[String],
        target: &str,
        negated: bool,
        scope: usize,
    ) -> Result<QueryConstraint, CompileError> {
        let path = self.resolve_path(segments, scope)?;

        // A class reached in more than one segment came through a reference field.
        let element = match path.target() {
            PathTarget::Collection { element } => element.clone(),
            PathTarget::Class(class) if path.segments().len() > 1 => class.clone(),
            _ => {
                return Err(CompileError::type_mismatch(
                    "CONTAINS",
                    format!("{} is not a relationship field", path.text()),
                ));
            }
        };

        let class = match self.scopes[scope].from.iter().find(|(a, _)| a == target) {
            Some((_, Binding::Class(class))) => class.clone(),
            Some((_, Binding::Subquery { .. })) => {
                return Err(CompileError::type_mismatch(
                    "CONTAINS",
                    format!("{} is a subquery, not a class alias", target),
                ));
            }
            None => {
                return Err(CompileError::UnknownAlias {
                    name: target.to_string(),
                    subquery: None,
                });
            }
        };

        if !self.metadata.is_assignable(&class, &element)
            && !self.metadata.is_assignable(&element, &class)
        {
            return Err(CompileError::type_mismatch(
                "CONTAINS",
                format!("{} holds {}, found {}", path.text(), element, class),
            ));
        }

        Ok(QueryConstraint::Contains {
            path,
            target: target.to_string(),
            negated,
        })
    }

    fn resolve_path(&self, segments: &[String], scope: usize) -> Result<PathExpression, CompileError> {
        let Some(first) = segments.first() else {
            return Err(CompileError::UnknownAlias {
                name: String::new(),
                subquery: None,
            });
        };

        if let Some((_, binding)) = self.scopes[scope].from.iter().find(|(a, _)| a == first) {
            return match binding {
                Binding::Class(class) => self.walk_class(class, segments, 1),
                Binding::Subquery { columns, from } => {
                    self.walk_subquery(first, columns, from, segments)
                }
            };
        }

        let mut cursor = self.scopes[scope].parent;
        while let Some(index) = cursor {
            if let Some((_, column)) = self.scopes[index].select.iter().find(|(a, _)| a == first) {
                return match column {
                    Column::Class(class) => self.walk_class(class, segments, 1),
                    Column::Value(_) if segments.len() > 1 => Err(CompileError::PathTooLong {
                        path: segments.join("."),
                        end: PathEnd::Field,
                    }),
                    Column::Value(ty) => Ok(PathExpression::new(
                        segments.to_vec(),
                        PathTarget::OuterColumn(*ty),
                    )),
                };
            }
            cursor = self.scopes[index].parent;
        }

        if self.metadata.has_class(first) {
            Err(CompileError::AmbiguousOrMissingAlias {
                class: first.clone(),
            })
        } else {
            Err(CompileError::UnknownAlias {
                name: first.clone(),
                subquery: None,
            })
        }
    }

    /// Follow `segments[start..]` through the fields of `class`.
    fn walk_class(
        &self,
        class: &str,
        segments: &[String],
        start: usize,
    ) -> Result<PathExpression, CompileError> {
        let mut target = PathTarget::Class(class.to_string());

        for segment in &segments[start..] {
            let PathTarget::Class(current) = &target else {
                return Err(CompileError::PathTooLong {
                    path: segments.join("."),
                    end: PathEnd::Field,
                });
            };
            target = match self.metadata.field_type(current, segment) {
                Some(FieldType::Attribute(ty)) => PathTarget::Attribute {
                    class: current.clone(),
                    ty,
                },
                Some(FieldType::Reference(referenced)) => PathTarget::Class(referenced),
                Some(FieldType::Collection(element)) => PathTarget::Collection { element },
                None => {
                    return Err(CompileError::UnknownField {
                        field: segment.clone(),
                        class: self.qualified(current),
                    });
                }
            };
        }

        Ok(PathExpression::new(segments.to_vec(), target))
    }

    /// Only SELECT aliases of a subquery are visible from outside it.
    fn walk_subquery(
        &self,
        alias: &str,
        columns: &[(String, Column)],
        from: &[(String, bool)],
        segments: &[String],
    ) -> Result<PathExpression, CompileError> {
        let Some(name) = segments.get(1) else {
            return Err(CompileError::PathTooLong {
                path: segments.join("."),
                end: PathEnd::Subquery,
            });
        };

        match columns.iter().find(|(a, _)| a == name) {
            Some((_, Column::Class(_))) if segments.len() == 2 => {
                Err(CompileError::SubqueryVisibility {
                    path: segments.join("."),
                    reason: VisibilityViolation::ClassInsideSubquery,
                })
            }
            Some((_, Column::Class(class))) => self.walk_class(class, segments, 2),
            Some((_, Column::Value(_))) if segments.len() > 2 => Err(CompileError::PathTooLong {
                path: segments.join("."),
                end: PathEnd::Field,
            }),
            Some((_, Column::Value(ty))) => Ok(PathExpression::new(
                segments.to_vec(),
                PathTarget::SubqueryColumn(*ty),
            )),
            None => match from.iter().find(|(a, _)| a == name) {
                Some((_, true)) => Err(CompileError::SubqueryVisibility {
                    path: segments.join("."),
                    reason: VisibilityViolation::NestedSubquery {
                        name: name.clone(),
                        subquery: alias.to_string(),
                    },
                }),
                Some((_, false)) => Err(CompileError::SubqueryVisibility {
                    path: segments.join("."),
                    reason: VisibilityViolation::NotSelected {
                        name: name.clone(),
                        subquery: alias.to_string(),
                    },
                }),
                None => Err(CompileError::UnknownAlias {
                    name: name.clone(),
                    subquery: Some(alias.to_string()),
                }),
            },
        }
    }
}

fn integer_literal(text: &str) -> Result<i64, CompileError> {
    text.parse::<i64>()
        .map_err(|_| CompileError::type_mismatch("integer literal", text.to_string()))
}

/// Paths are named after their last segment, anything else after its position.
fn implicit_alias(expr: &Expr, index: usize) -> String {
    match expr {
        Expr::Path(segments) => segments.last().cloned().unwrap_or_default(),
        _ => format!("a{}_", index + 1),
    }
}
