//! Semantic analysis module
//!
//! This module holds the scoped symbol table, the per-node annotations, the
//! semantic error collection and the declaration pass that fills them before
//! type checking.

pub mod analyzer;
pub mod annotations;
pub mod errors;
pub mod symbols;

pub use analyzer::SemanticAnalyzer;
pub use annotations::{Annotation, Annotations};
pub use errors::{Diagnostics, ErrorKind, SemanticError};
pub use symbols::{Binding, ScopeGuard, ScopeId, ScopedTraversal, SymbolClass, SymbolTable};
