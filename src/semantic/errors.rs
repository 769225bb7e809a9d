//! Semantic error records
//!
//! The checker never stops at the first problem. Each one is appended to a
//! [`Diagnostics`] collection in traversal order, and the driver refuses to
//! generate code while the collection is non-empty.

use thiserror::Error;

use crate::error::{Diagnostic, SourceLocation};
use crate::types::Type;

/// What went wrong, with the context needed to explain it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Identifier '{name}' is undeclared.")]
    UndeclaredIdentifier { name: String },

    #[error("Identifier '{name}' already declared.")]
    DeclaredIdentifier { name: String },

    #[error("Identifier '{name}' is not callable.")]
    NotCallable { name: String },

    #[error("Identifier '{name}' is a procedure and does not return a value.")]
    NotAFunctionValue { name: String },

    #[error("Call to '{name}' expects {expected} parameter(s), found {found}.")]
    WrongParameterCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Parameter #{position} with incompatible type in call to '{callee}'.")]
    IncompatibleParameterType { callee: String, position: usize },

    #[error("Assignment with incompatible types: cannot store {found} into {expected}.")]
    IncompatibleAssignment { expected: Type, found: Type },

    #[error("Left expression of assignment is not referenceable.")]
    NonAddressableAssignmentTarget,

    #[error("Expression in 'read' is not referenceable.")]
    NonAddressableReadTarget,

    #[error("Instruction '{instruction}' requires a boolean condition.")]
    BooleanConditionRequired { instruction: &'static str },

    #[error("Basic type required in '{instruction}'.")]
    PrimitiveRequiredForIO { instruction: &'static str },

    #[error("Array access to a non array operand.")]
    NonArrayIndexed,

    #[error("Array access with non integer index.")]
    NonIntegerArrayIndex,

    #[error("Operator '{operator}' with incompatible types.")]
    IncompatibleOperator { operator: &'static str },

    #[error("Return with incompatible type: expected {expected}, found {found}.")]
    IncompatibleReturn { expected: Type, found: Type },

    #[error("There is no '{name}' function properly declared.")]
    MissingOrMalformedEntryPoint { name: String },
}

impl ErrorKind {
    /// Stable name of the error category
    pub fn name(&self) -> &'static str {
        match self {
            Self::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            Self::DeclaredIdentifier { .. } => "DeclaredIdentifier",
            Self::NotCallable { .. } => "NotCallable",
            Self::NotAFunctionValue { .. } => "NotAFunctionValue",
            Self::WrongParameterCount { .. } => "WrongParameterCount",
            Self::IncompatibleParameterType { .. } => "IncompatibleParameterType",
            Self::IncompatibleAssignment { .. } => "IncompatibleAssignment",
            Self::NonAddressableAssignmentTarget => "NonAddressableAssignmentTarget",
            Self::NonAddressableReadTarget => "NonAddressableReadTarget",
            Self::BooleanConditionRequired { .. } => "BooleanConditionRequired",
            Self::PrimitiveRequiredForIO { .. } => "PrimitiveRequiredForIO",
            Self::NonArrayIndexed => "NonArrayIndexed",
            Self::NonIntegerArrayIndex => "NonIntegerArrayIndex",
            Self::IncompatibleOperator { .. } => "IncompatibleOperator",
            Self::IncompatibleReturn { .. } => "IncompatibleReturn",
            Self::MissingOrMalformedEntryPoint { .. } => "MissingOrMalformedEntryPoint",
        }
    }
}

/// One recorded semantic error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub kind: ErrorKind,
    pub location: SourceLocation,
}

impl SemanticError {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.kind)
    }
}

/// Append-only, ordered collection of semantic errors
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<SemanticError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: ErrorKind, location: SourceLocation) {
        tracing::debug!(kind = kind.name(), %location, "semantic error");
        self.entries.push(SemanticError { kind, location });
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Records in the order they were found; may be iterated any number of times
    pub fn entries(&self) -> std::slice::Iter<'_, SemanticError> {
        self.entries.iter()
    }

    /// Number of records whose category is `name`
    pub fn count_of(&self, name: &str) -> usize {
        self.entries.iter().filter(|e| e.name() == name).count()
    }

    /// Render every record, with source context when `source` is given
    pub fn render(&self, source: Option<&str>) -> String {
        self.entries
            .iter()
            .map(|error| match source {
                Some(source) => Diagnostic::with_source(error, source).format(),
                None => Diagnostic::new(error).format(),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a SemanticError;
    type IntoIter = std::slice::Iter<'a, SemanticError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_keep_insertion_order_and_duplicates() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_errors());

        diagnostics.record(ErrorKind::NonArrayIndexed, SourceLocation::at(2, 1));
        diagnostics.record(
            ErrorKind::UndeclaredIdentifier { name: "x".into() },
            SourceLocation::at(1, 4),
        );
        diagnostics.record(ErrorKind::NonArrayIndexed, SourceLocation::at(2, 1));

        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.count(), 3);
        let names: Vec<_> = diagnostics.entries().map(SemanticError::name).collect();
        assert_eq!(
            names,
            vec!["NonArrayIndexed", "UndeclaredIdentifier", "NonArrayIndexed"]
        );
        // restartable
        assert_eq!(diagnostics.entries().count(), 3);
        assert_eq!(diagnostics.count_of("NonArrayIndexed"), 2);
    }

    #[test]
    fn test_messages_carry_context() {
        let error = SemanticError {
            kind: ErrorKind::IncompatibleParameterType {
                callee: "g".into(),
                position: 2,
            },
            location: SourceLocation::at(5, 9),
        };
        assert_eq!(
            error.to_string(),
            "5:9: Parameter #2 with incompatible type in call to 'g'."
        );

        let kind = ErrorKind::IncompatibleAssignment {
            expected: Type::Boolean,
            found: Type::Integer,
        };
        assert_eq!(
            kind.to_string(),
            "Assignment with incompatible types: cannot store int into bool."
        );
    }

    #[test]
    fn test_render_without_source() {
        colored::control::set_override(false);
        let mut diagnostics = Diagnostics::new();
        diagnostics.record(
            ErrorKind::BooleanConditionRequired { instruction: "while" },
            SourceLocation::at(3, 2),
        );
        let rendered = diagnostics.render(None);
        assert!(rendered.contains("BooleanConditionRequired"));
        assert!(rendered.contains("Instruction 'while' requires a boolean condition."));
        assert!(rendered.contains("3:2"));
    }
}
