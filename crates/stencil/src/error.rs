//! Error types for Stencil operations.
//!
//! This module provides the main error type [`StencilError`] which wraps
//! the error conditions that can abort processing of one input file.
//! Per-shape resolution problems are not errors at this level; see
//! [`ResolveError`](crate::resolve::ResolveError).

use std::io;

use thiserror::Error;

use stencil_parser::ParseError;

/// The main error type for Stencil operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant may carry a markup error together with the source of
/// the offending part, which can be used for rich error reporting.
#[derive(Debug, Error)]
pub enum StencilError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
