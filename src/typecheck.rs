//! Type rules for operators, functions and subquery columns.
//!
//! The resolver calls into here bottom-up as it builds each expression, so
//! every operand handed in already carries its type.

use crate::{
    ast::{ArithOp, CompareOp, Function},
    error::CompileError,
    model::{PathExpression, PathTarget, QueryExpression, QueryObjectModel},
    value::ValueType,
};

fn describe(left: ValueType, right: ValueType) -> String {
    format!("{} and {}", left, right)
}

/// `+ - * /` take two numbers; the result is decimal if either side is.
pub(crate) fn check_arithmetic(
    op: ArithOp,
    left: &QueryExpression,
    right: &QueryExpression,
) -> Result<ValueType, CompileError> {
    let (l, r) = (left.value_type(), right.value_type());
    if l == ValueType::ClassReference || r == ValueType::ClassReference {
        return Err(CompileError::ClassInExpression {
            context: "expressions",
        });
    }
    if !(l.is_numeric() && r.is_numeric()) {
        return Err(CompileError::type_mismatch(op.symbol(), describe(l, r)));
    }
    Ok(l.promote(r))
}

pub(crate) fn check_comparison(
    op: CompareOp,
    left: &QueryExpression,
    right: &QueryExpression,
) -> Result<(), CompileError> {
    let (l, r) = (left.value_type(), right.value_type());
    if l == ValueType::ClassReference || r == ValueType::ClassReference {
        return Err(CompileError::ClassInExpression {
            context: "comparisons",
        });
    }
    if !l.comparable_with(r) || (l == ValueType::Boolean && !op.is_equality()) {
        return Err(CompileError::type_mismatch(op.symbol(), describe(l, r)));
    }
    Ok(())
}

pub(crate) fn check_like(
    expr: &QueryExpression,
    pattern: &QueryExpression,
) -> Result<(), CompileError> {
    let (l, r) = (expr.value_type(), pattern.value_type());
    if l == ValueType::ClassReference || r == ValueType::ClassReference {
        return Err(CompileError::ClassInExpression {
            context: "comparisons",
        });
    }
    if l != ValueType::Text || r != ValueType::Text {
        return Err(CompileError::type_mismatch("LIKE", describe(l, r)));
    }
    Ok(())
}

/// Validate a call against the function table and return its result type.
pub(crate) fn check_function(
    function: Function,
    args: &[QueryExpression],
) -> Result<ValueType, CompileError> {
    match function {
        Function::Count => {
            expect_arity(function, args, 0)?;
            Ok(ValueType::Integer)
        }
        Function::Sum | Function::Avg | Function::Min | Function::Max => {
            expect_arity(function, args, 1)?;
            let arg = &args[0];
            let ty = arg.value_type();
            if ty == ValueType::ClassReference {
                return Err(CompileError::ClassInExpression {
                    context: "functions",
                });
            }
            if !matches!(
                arg,
                QueryExpression::FieldRef(_) | QueryExpression::BinaryOp { .. }
            ) {
                return Err(CompileError::InvalidAggregateArgument {
                    function: function.name().to_string(),
                });
            }
            if !ty.is_numeric() {
                return Err(CompileError::type_mismatch(function.name(), ty.to_string()));
            }
            Ok(match function {
                Function::Avg => ValueType::Decimal,
                _ => ty,
            })
        }
        Function::Substr => {
            expect_arity(function, args, 3)?;
            let types: Vec<ValueType> = args.iter().map(QueryExpression::value_type).collect();
            if types.contains(&ValueType::ClassReference) {
                return Err(CompileError::ClassInExpression {
                    context: "functions",
                });
            }
            if types != [ValueType::Text, ValueType::Integer, ValueType::Integer] {
                let found = types
                    .iter()
                    .map(ValueType::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(CompileError::type_mismatch(function.name(), found));
            }
            Ok(ValueType::Text)
        }
    }
}

fn expect_arity(
    function: Function,
    args: &[QueryExpression],
    expected: usize,
) -> Result<(), CompileError> {
    if args.len() != expected {
        return Err(CompileError::Arity {
            function: function.name().to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

/// A subquery standing for a single value must select exactly one column.
pub(crate) fn check_single_column(
    query: &QueryObjectModel,
    context: &str,
) -> Result<ValueType, CompileError> {
    if query.select().len() != 1 {
        return Err(CompileError::Arity {
            function: context.to_string(),
            expected: 1,
            found: query.select().len(),
        });
    }
    Ok(query.select()[0].value_type())
}

pub(crate) fn check_in(
    expr: &QueryExpression,
    subquery: &QueryObjectModel,
) -> Result<(), CompileError> {
    let column = check_single_column(subquery, "IN subquery")?;
    let ty = expr.value_type();
    if ty == ValueType::ClassReference || column == ValueType::ClassReference {
        return Err(CompileError::ClassInExpression {
            context: "comparisons",
        });
    }
    if !ty.comparable_with(column) {
        return Err(CompileError::type_mismatch("IN", describe(ty, column)));
    }
    Ok(())
}

/// Collections are only usable on the left of CONTAINS.
pub(crate) fn check_value_path(path: &PathExpression) -> Result<(), CompileError> {
    if let PathTarget::Collection { element } = path.target() {
        return Err(CompileError::type_mismatch(
            "value",
            format!("collection of {} at {}", element, path.text()),
        ));
    }
    Ok(())
}
