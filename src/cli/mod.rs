//! CLI support for iql-lang
//!
//! Provides programmatic access to the `iql` command so other tools can
//! compile queries the same way the binary does.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, OutputFormat, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

use crate::{error::CompileError, metadata::ModelError};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("Invalid model: {0}")]
    Model(#[from] ModelError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("No query provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,
    #[error("Unknown category: '{0}'\nRun 'iql docs' to see available categories.")]
    UnknownCategory(String),
}
