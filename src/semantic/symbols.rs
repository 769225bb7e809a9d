//! Symbol table
//!
//! Scopes are created once by the declaration pass and stored in an arena
//! indexed by [`ScopeId`]. Traversals activate them by pushing ids on a stack;
//! lookups walk that stack from the innermost scope outwards.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::error::{AslError, AslResult};
use crate::types::Type;

/// Opaque identifier of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a name was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolClass {
    Function,
    Parameter,
    LocalVariable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub ty: Type,
    pub class: SymbolClass,
}

impl Binding {
    pub fn is_function(&self) -> bool {
        self.class == SymbolClass::Function
    }
}

#[derive(Debug, Clone)]
struct Scope {
    name: String,
    bindings: HashMap<String, Binding>,
}

/// Registry of every scope plus the chain that is currently active
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    stack: Vec<ScopeId>,
    current_function: Option<Type>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scope; it becomes visible only once pushed
    pub fn new_scope(&mut self, name: impl Into<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name: name.into(),
            bindings: HashMap::new(),
        });
        id
    }

    pub fn scope_name(&self, id: ScopeId) -> Option<&str> {
        self.scopes.get(id.0).map(|scope| scope.name.as_str())
    }

    pub fn push_scope(&mut self, id: ScopeId) -> AslResult<()> {
        let scope = self.scopes.get(id.0).ok_or(AslError::UnknownScope(id))?;
        debug!(scope = %scope.name, depth = self.stack.len() + 1, "enter scope");
        self.stack.push(id);
        Ok(())
    }

    pub fn pop_scope(&mut self) -> Option<ScopeId> {
        let id = self.stack.pop()?;
        debug!(scope = ?self.scope_name(id), depth = self.stack.len(), "leave scope");
        Some(id)
    }

    /// Number of active scopes
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current_scope(&self) -> Option<ScopeId> {
        self.stack.last().copied()
    }

    /// Declare `name` in the innermost active scope.
    ///
    /// A name already present in that scope keeps its first binding; callers
    /// check [`Self::is_declared_in_current_scope`] to report the duplicate.
    pub fn declare(&mut self, name: &str, ty: Type, class: SymbolClass) -> AslResult<()> {
        let id = self.current_scope().ok_or_else(|| AslError::NoActiveScope {
            name: name.to_string(),
        })?;
        self.scopes[id.0]
            .bindings
            .entry(name.to_string())
            .or_insert(Binding { ty, class });
        Ok(())
    }

    pub fn is_declared_in_current_scope(&self, name: &str) -> bool {
        self.current_scope()
            .is_some_and(|id| self.scopes[id.0].bindings.contains_key(name))
    }

    /// Innermost binding of `name` along the active chain
    pub fn find_in_stack(&self, name: &str) -> Option<&Binding> {
        self.stack
            .iter()
            .rev()
            .find_map(|id| self.scopes[id.0].bindings.get(name))
    }

    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.find_in_stack(name).map(|binding| &binding.ty)
    }

    pub fn is_function_binding(&self, name: &str) -> bool {
        self.find_in_stack(name).is_some_and(Binding::is_function)
    }

    pub fn set_current_function_type(&mut self, ty: Type) {
        self.current_function = Some(ty);
    }

    pub fn current_function_type(&self) -> Option<&Type> {
        self.current_function.as_ref()
    }

    pub fn clear_current_function_type(&mut self) {
        self.current_function = None;
    }

    /// The outermost active scope binds `name` as `() -> void`
    pub fn has_proper_main_entry_point(&self, name: &str) -> bool {
        let Some(global) = self.stack.first() else {
            return false;
        };
        match self.scopes[global.0].bindings.get(name) {
            Some(binding) if binding.is_function() => {
                binding.ty.is_void_function() && binding.ty.function_param_count() == Some(0)
            }
            _ => false,
        }
    }
}

/// A traversal that owns (or borrows) the symbol table it walks with
pub trait ScopedTraversal {
    fn symbols_mut(&mut self) -> &mut SymbolTable;
}

impl ScopedTraversal for SymbolTable {
    fn symbols_mut(&mut self) -> &mut SymbolTable {
        self
    }
}

/// Keeps one scope pushed for as long as it lives.
///
/// The guard dereferences to the traversal, so the body of the scope is
/// visited through it; dropping it pops the scope, also while unwinding or
/// returning early through `?`.
pub struct ScopeGuard<'t, T: ScopedTraversal + ?Sized> {
    traversal: &'t mut T,
}

impl<'t, T: ScopedTraversal + ?Sized> ScopeGuard<'t, T> {
    pub fn enter(traversal: &'t mut T, scope: ScopeId) -> AslResult<Self> {
        traversal.symbols_mut().push_scope(scope)?;
        Ok(Self { traversal })
    }
}

impl<T: ScopedTraversal + ?Sized> Deref for ScopeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.traversal
    }
}

impl<T: ScopedTraversal + ?Sized> DerefMut for ScopeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.traversal
    }
}

impl<T: ScopedTraversal + ?Sized> Drop for ScopeGuard<'_, T> {
    fn drop(&mut self) {
        self.traversal.symbols_mut().pop_scope();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_global() -> (SymbolTable, ScopeId) {
        let mut symbols = SymbolTable::new();
        let global = symbols.new_scope("$global$");
        symbols.push_scope(global).unwrap();
        (symbols, global)
    }

    #[test]
    fn test_shadowing_resolves_innermost_then_outer() {
        let (mut symbols, _) = table_with_global();
        symbols.declare("x", Type::Integer, SymbolClass::LocalVariable).unwrap();

        let inner = symbols.new_scope("f");
        symbols.push_scope(inner).unwrap();
        symbols.declare("x", Type::Boolean, SymbolClass::Parameter).unwrap();
        assert_eq!(symbols.get_type("x"), Some(&Type::Boolean));

        symbols.pop_scope();
        assert_eq!(symbols.get_type("x"), Some(&Type::Integer));
    }

    #[test]
    fn test_unresolved_name() {
        let (symbols, _) = table_with_global();
        assert!(symbols.find_in_stack("missing").is_none());
        assert!(!symbols.is_function_binding("missing"));
    }

    #[test]
    fn test_first_declaration_wins() {
        let (mut symbols, _) = table_with_global();
        symbols.declare("a", Type::Integer, SymbolClass::LocalVariable).unwrap();
        assert!(symbols.is_declared_in_current_scope("a"));
        symbols.declare("a", Type::Float, SymbolClass::LocalVariable).unwrap();
        assert_eq!(symbols.get_type("a"), Some(&Type::Integer));
    }

    #[test]
    fn test_declare_without_scope_fails() {
        let mut symbols = SymbolTable::new();
        let err = symbols
            .declare("a", Type::Integer, SymbolClass::LocalVariable)
            .unwrap_err();
        assert_eq!(err.kind(), "NoActiveScope");
    }

    #[test]
    fn test_push_unknown_scope_fails() {
        let mut symbols = SymbolTable::new();
        let mut other = SymbolTable::new();
        let foreign = other.new_scope("elsewhere");
        assert_eq!(
            symbols.push_scope(foreign),
            Err(AslError::UnknownScope(foreign))
        );
        assert_eq!(symbols.depth(), 0);
    }

    #[test]
    fn test_function_bindings_are_flagged() {
        let (mut symbols, _) = table_with_global();
        symbols
            .declare("f", Type::function(vec![], Type::Integer), SymbolClass::Function)
            .unwrap();
        symbols.declare("v", Type::Integer, SymbolClass::Parameter).unwrap();
        assert!(symbols.is_function_binding("f"));
        assert!(!symbols.is_function_binding("v"));
    }

    #[test]
    fn test_entry_point_signature() {
        let (mut symbols, _) = table_with_global();
        assert!(!symbols.has_proper_main_entry_point("main"));

        symbols
            .declare("main", Type::function(vec![], Type::Void), SymbolClass::Function)
            .unwrap();
        assert!(symbols.has_proper_main_entry_point("main"));
        assert!(!symbols.has_proper_main_entry_point("start"));
    }

    #[test]
    fn test_entry_point_rejects_parameters_and_results() {
        let (mut symbols, _) = table_with_global();
        symbols
            .declare(
                "main",
                Type::function(vec![Type::Integer], Type::Void),
                SymbolClass::Function,
            )
            .unwrap();
        symbols
            .declare("start", Type::function(vec![], Type::Integer), SymbolClass::Function)
            .unwrap();
        symbols
            .declare("run", Type::function(vec![], Type::Void), SymbolClass::LocalVariable)
            .unwrap();

        assert!(!symbols.has_proper_main_entry_point("main"));
        assert!(!symbols.has_proper_main_entry_point("start"));
        assert!(!symbols.has_proper_main_entry_point("run"));
    }

    #[test]
    fn test_entry_point_only_counts_outermost_scope() {
        let (mut symbols, _) = table_with_global();
        let inner = symbols.new_scope("f");
        symbols.push_scope(inner).unwrap();
        symbols
            .declare("main", Type::function(vec![], Type::Void), SymbolClass::Function)
            .unwrap();
        assert!(!symbols.has_proper_main_entry_point("main"));
    }

    #[test]
    fn test_current_function_slot() {
        let mut symbols = SymbolTable::new();
        assert!(symbols.current_function_type().is_none());
        let f = Type::function(vec![], Type::Float);
        symbols.set_current_function_type(f.clone());
        assert_eq!(symbols.current_function_type(), Some(&f));
        symbols.clear_current_function_type();
        assert!(symbols.current_function_type().is_none());
    }

    #[test]
    fn test_guard_pops_on_drop() {
        let (mut symbols, _) = table_with_global();
        let inner = symbols.new_scope("f");
        {
            let mut guard = ScopeGuard::enter(&mut symbols, inner).unwrap();
            guard.declare("local", Type::Character, SymbolClass::LocalVariable).unwrap();
            assert_eq!(guard.depth(), 2);
            assert_eq!(guard.get_type("local"), Some(&Type::Character));
        }
        assert_eq!(symbols.depth(), 1);
        assert!(symbols.find_in_stack("local").is_none());
    }

    #[test]
    fn test_guard_pops_on_early_return() {
        fn fails_inside(symbols: &mut SymbolTable, scope: ScopeId) -> AslResult<()> {
            let mut guard = ScopeGuard::enter(symbols, scope)?;
            let bogus = ScopeId(99);
            guard.push_scope(bogus)?;
            Ok(())
        }

        let (mut symbols, _) = table_with_global();
        let inner = symbols.new_scope("f");
        assert!(fails_inside(&mut symbols, inner).is_err());
        assert_eq!(symbols.depth(), 1);
    }

    #[test]
    fn test_guard_pops_while_unwinding() {
        let (mut symbols, _) = table_with_global();
        let inner = symbols.new_scope("f");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ScopeGuard::enter(&mut symbols, inner).unwrap();
            panic!("traversal bug");
        }));
        assert!(result.is_err());
        assert_eq!(symbols.depth(), 1);
    }
}
