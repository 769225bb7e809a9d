//! # Asl semantic checker
//!
//! The stage of the Asl compiler that sits between parsing and code
//! generation. Given a syntax tree it
//! - registers every function, parameter and local variable in scoped symbol tables
//! - computes the type and addressability of every expression
//! - collects every semantic error instead of stopping at the first one
//!
//! ## Architecture
//!
//! - `ast`: Syntax tree handed over by the parser, with stable node ids
//! - `types`: Type representation, compatibility rules and the type checker
//! - `semantic`: Symbol table, annotations, semantic errors and declaration pass
//! - `config`: Checker options
//! - `error`: Internal errors and diagnostic rendering

pub mod ast;
pub mod config;
pub mod error;
pub mod semantic;
pub mod types;

// Re-export commonly used types
pub use ast::{AstBuilder, NodeId, Program};
pub use config::CheckerConfig;
pub use error::{AslError, AslResult, SourceLocation};
pub use semantic::{
    Annotations, Diagnostics, ErrorKind, SemanticAnalyzer, SemanticError, SymbolTable,
};
pub use types::{Type, TypeChecker};

/// Version of the checker
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the semantic stage produced for one program
#[derive(Debug)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub annotations: Annotations,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    /// True when no semantic error was found and code generation may proceed
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Run the semantic stage on a parsed program
///
/// This performs declaration registration followed by type checking. Semantic
/// errors end up in [`Analysis::diagnostics`]; an `Err` is only returned when the
/// tree or the tables are inconsistent.
pub fn check(program: &Program) -> AslResult<Analysis> {
    check_with_config(program, &CheckerConfig::default())
}

/// Same as [`check`] with explicit options
pub fn check_with_config(program: &Program, config: &CheckerConfig) -> AslResult<Analysis> {
    let mut symbols = SymbolTable::new();
    let mut annotations = Annotations::new();
    let mut diagnostics = Diagnostics::new();

    // Phase 1: Declarations
    SemanticAnalyzer::new(&mut symbols, &mut annotations, &mut diagnostics).analyze(program)?;

    // Phase 2: Type Checking
    TypeChecker::with_config(&mut symbols, &mut annotations, &mut diagnostics, config.clone())
        .check(program)?;

    Ok(Analysis {
        symbols,
        annotations,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BasicType, TypeSpec};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_check_clean_program() {
        let b = AstBuilder::new();
        let main = b.function(
            "main",
            vec![],
            None,
            vec![b.var_decl(&["x"], TypeSpec::Basic(BasicType::Int))],
            vec![b.read(b.left("x")), b.write(b.var("x"))],
        );
        let analysis = check(&b.program(vec![main])).unwrap();
        assert!(analysis.is_ok());
        assert_eq!(analysis.symbols.depth(), 0);
    }

    #[test]
    fn test_check_collects_every_error() {
        let b = AstBuilder::with_filename("bad.asl");
        let f = b.function("f", vec![], None, vec![], vec![b.at(2, 5).write(b.var("y"))]);
        let f_again = b.at(4, 1).function("f", vec![], None, vec![], vec![]);
        let analysis = check(&b.program(vec![f, f_again])).unwrap();

        assert!(!analysis.is_ok());
        let names: Vec<_> = analysis.diagnostics.entries().map(SemanticError::name).collect();
        assert_eq!(
            names,
            vec!["DeclaredIdentifier", "UndeclaredIdentifier", "MissingOrMalformedEntryPoint"]
        );
        let first = analysis.diagnostics.entries().next().unwrap();
        assert_eq!(first.location.to_string(), "bad.asl:4:1");
    }

    #[test]
    fn test_check_with_custom_entry_point() {
        let b = AstBuilder::new();
        let program = b.program(vec![b.function("start", vec![], None, vec![], vec![])]);
        let config = CheckerConfig::default().with_entry_point("start");
        assert!(check_with_config(&program, &config).unwrap().is_ok());
        assert!(!check(&program).unwrap().is_ok());
    }
}
