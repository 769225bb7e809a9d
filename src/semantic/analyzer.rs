//! Declaration registration
//!
//! Runs before type checking. It creates one scope for the program and one
//! per function, records those scopes on the tree, and declares every
//! function, parameter and local variable. Duplicate names within a scope are
//! reported as [`ErrorKind::DeclaredIdentifier`]; the first declaration wins.

use tracing::{debug, instrument};

use crate::ast::{Function, Ident, Program};
use crate::error::AslResult;
use crate::semantic::symbols::{ScopeGuard, ScopedTraversal, SymbolClass, SymbolTable};
use crate::semantic::{Annotations, Diagnostics, ErrorKind};
use crate::types::Type;

/// Name given to the outermost scope
pub const GLOBAL_SCOPE: &str = "$global$";

pub struct SemanticAnalyzer<'a> {
    symbols: &'a mut SymbolTable,
    annotations: &'a mut Annotations,
    diagnostics: &'a mut Diagnostics,
}

impl ScopedTraversal for SemanticAnalyzer<'_> {
    fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut *self.symbols
    }
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(
        symbols: &'a mut SymbolTable,
        annotations: &'a mut Annotations,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            symbols,
            annotations,
            diagnostics,
        }
    }

    /// Register every declaration of `program`
    #[instrument(skip_all)]
    pub fn analyze(&mut self, program: &Program) -> AslResult<()> {
        let global = self.symbols.new_scope(GLOBAL_SCOPE);
        self.annotations.put_scope(program.id, global)?;

        let mut scope = ScopeGuard::enter(self, global)?;
        for function in &program.functions {
            scope.register_function(function)?;
        }
        Ok(())
    }

    fn register_function(&mut self, function: &Function) -> AslResult<()> {
        debug!(function = %function.name.name, "registering declarations");
        self.declare(&function.name, signature(function), SymbolClass::Function)?;

        let scope = self.symbols.new_scope(function.name.name.clone());
        self.annotations.put_scope(function.id, scope)?;

        let mut body = ScopeGuard::enter(self, scope)?;
        for param in &function.params {
            body.declare(&param.name, Type::from(&param.ty), SymbolClass::Parameter)?;
        }
        for decl in &function.declarations {
            let ty = Type::from(&decl.ty);
            for name in &decl.names {
                body.declare(name, ty.clone(), SymbolClass::LocalVariable)?;
            }
        }
        Ok(())
    }

    fn declare(&mut self, ident: &Ident, ty: Type, class: SymbolClass) -> AslResult<()> {
        if self.symbols.is_declared_in_current_scope(&ident.name) {
            self.diagnostics.record(
                ErrorKind::DeclaredIdentifier {
                    name: ident.name.clone(),
                },
                ident.location.clone(),
            );
            return Ok(());
        }
        self.symbols.declare(&ident.name, ty, class)
    }
}

/// Type of a function as seen by its callers
pub fn signature(function: &Function) -> Type {
    let params = function.params.iter().map(|p| Type::from(&p.ty)).collect();
    let return_type = function
        .return_type
        .as_ref()
        .map(Type::from)
        .unwrap_or(Type::Void);
    Type::function(params, return_type)
}
