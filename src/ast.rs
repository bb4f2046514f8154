//! # IQL - Parse Tree
//!
//! This module defines the untyped tree the parser produces for an IQL query.
//! IQL is an SQL-like language over an object model: FROM items are classes
//! (or subqueries), and dotted paths walk from an alias through fields.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Value expressions (literals, paths, arithmetic, functions)
//! - **[constraints]** - WHERE conditions (comparisons, bag constraints, boolean groups)
//! - **[operators]** - Arithmetic and comparison operators, the function table
//! - **[query]** - Complete query structure: SELECT, FROM, WHERE, GROUP BY, ORDER BY
//!
//! ## Quick Start
//!
//! ```text
//! select c_, c_.name as n from Company as c_ where c_.vatNumber > 5
//! ```
//!
//! ## Core Concepts
//!
//! ### Paths
//!
//! Every path starts at an alias. FROM classes without `AS` are aliased by
//! their own name, so `select Company.name from Company` is valid.
//!
//! ### Expressions
//!
//! An expression holds at most one arithmetic operator per level:
//!
//! ```text
//! 1 + 2          // ok
//! (1 + 2) + 3    // ok
//! 1 + 2 + 3      // syntax error
//! ```
//!
//! ### Subqueries
//!
//! A parenthesised query may appear as a FROM item (with a mandatory alias),
//! as the right side of `IN`, or as a single-column value.
//!
//! ```text
//! select s.n as n from (select Company.name as n from Company) as s
//! ```
pub mod tokens;
pub mod expressions;
pub mod constraints;
pub mod operators;
pub mod query;

pub use tokens::{Spanned, Token};
pub use expressions::Expr;
pub use constraints::Constraint;
pub use operators::{ArithOp, CompareOp, Function};
pub use query::{FromItem, Query, SelectItem};
