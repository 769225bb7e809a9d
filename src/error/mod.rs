//! Error handling and diagnostics for the Asl checker
//!
//! Two kinds of failure exist. Semantic errors found in the checked program are
//! collected in [`crate::semantic::Diagnostics`] and never stop the analysis.
//! Internal errors ([`AslError`]) mean the tree or the symbol table handed to
//! the checker broke a contract; they abort the pass through `?`.

use std::fmt;

use thiserror::Error;

use crate::ast::NodeId;
use crate::semantic::ScopeId;

pub mod diagnostic;

pub use diagnostic::Diagnostic;

/// Result type alias for checker operations
pub type AslResult<T> = Result<T, AslError>;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Optional filename
    pub filename: Option<String>,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize, filename: Option<String>) -> Self {
        Self {
            line,
            column,
            filename,
        }
    }

    /// Create a source location without a filename
    pub fn at(line: usize, column: usize) -> Self {
        Self::new(line, column, None)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref filename) = self.filename {
            write!(f, "{}:{}:{}", filename, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Which field of a node annotation an internal error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationField {
    Scope,
    Type,
    IsLValue,
}

impl fmt::Display for AnnotationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scope => write!(f, "scope"),
            Self::Type => write!(f, "type"),
            Self::IsLValue => write!(f, "lvalue"),
        }
    }
}

/// Internal error: the input or the pass itself violated a contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AslError {
    #[error("node {node} has no {field} annotation")]
    MissingAnnotation { node: NodeId, field: AnnotationField },

    #[error("{field} annotation of node {node} written twice")]
    AnnotationRewritten { node: NodeId, field: AnnotationField },

    #[error("scope {0} was never created by this symbol table")]
    UnknownScope(ScopeId),

    #[error("declaration of '{name}' with no active scope")]
    NoActiveScope { name: String },

    #[error("return statement at {location} is outside of any function")]
    ReturnOutsideFunction { location: SourceLocation },
}

impl AslError {
    /// Get the error kind as a string
    pub fn kind(&self) -> &str {
        match self {
            Self::MissingAnnotation { .. } => "MissingAnnotation",
            Self::AnnotationRewritten { .. } => "AnnotationRewritten",
            Self::UnknownScope(_) => "UnknownScope",
            Self::NoActiveScope { .. } => "NoActiveScope",
            Self::ReturnOutsideFunction { .. } => "ReturnOutsideFunction",
        }
    }
}
