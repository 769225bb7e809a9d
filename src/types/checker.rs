//! Type checker implementation
//!
//! Walks a program whose declarations are already registered, computes the
//! type and addressability of every expression, validates each statement and
//! records what is wrong in [`Diagnostics`].
//!
//! Any operand already typed [`Type::Error`] has been reported once, so no rule
//! reports it again. Arithmetic nodes that cannot produce a meaningful value
//! are typed `Error` themselves.

use tracing::{debug, info, instrument};

use crate::ast::{
    ArithmeticOp, Expr, Function, Ident, LeftExpr, Literal, NodeId, Program, RelationalOp, Stmt,
    UnaryOp,
};
use crate::config::CheckerConfig;
use crate::error::{AslError, AslResult, SourceLocation};
use crate::semantic::analyzer::signature;
use crate::semantic::symbols::{ScopeGuard, ScopedTraversal, SymbolTable};
use crate::semantic::{Annotations, Diagnostics, ErrorKind};
use crate::types::type_def::{is_comparable, is_copyable};
use crate::types::Type;

/// Type checker
pub struct TypeChecker<'a> {
    symbols: &'a mut SymbolTable,
    annotations: &'a mut Annotations,
    diagnostics: &'a mut Diagnostics,
    config: CheckerConfig,
}

impl ScopedTraversal for TypeChecker<'_> {
    fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut *self.symbols
    }
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        symbols: &'a mut SymbolTable,
        annotations: &'a mut Annotations,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self::with_config(symbols, annotations, diagnostics, CheckerConfig::default())
    }

    pub fn with_config(
        symbols: &'a mut SymbolTable,
        annotations: &'a mut Annotations,
        diagnostics: &'a mut Diagnostics,
        config: CheckerConfig,
    ) -> Self {
        Self {
            symbols,
            annotations,
            diagnostics,
            config,
        }
    }

    /// Type check an entire program, returning how many errors were recorded
    #[instrument(skip_all)]
    pub fn check(&mut self, program: &Program) -> AslResult<usize> {
        let before = self.diagnostics.count();
        let global = self.annotations.expect_scope(program.id)?;

        let mut scope = ScopeGuard::enter(self, global)?;
        for function in &program.functions {
            scope.check_function(function)?;
        }
        if !scope.symbols.has_proper_main_entry_point(&scope.config.entry_point) {
            let name = scope.config.entry_point.clone();
            scope.report(
                ErrorKind::MissingOrMalformedEntryPoint { name },
                &program.location,
            );
        }
        drop(scope);

        let found = self.diagnostics.count() - before;
        info!(functions = program.functions.len(), errors = found, "type check finished");
        Ok(found)
    }

    fn check_function(&mut self, function: &Function) -> AslResult<()> {
        debug!(function = %function.name.name, "checking function");
        self.symbols.set_current_function_type(signature(function));

        let scope = self.annotations.expect_scope(function.id)?;
        let result = ScopeGuard::enter(self, scope)
            .and_then(|mut body| body.check_statements(&function.body));

        self.symbols.clear_current_function_type();
        result
    }

    fn check_statements(&mut self, stmts: &[Stmt]) -> AslResult<()> {
        for stmt in stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    /// Check a statement
    fn check_stmt(&mut self, stmt: &Stmt) -> AslResult<()> {
        match stmt {
            Stmt::Assign { target, value, location } => {
                let target_type = self.check_left_expr(target)?;
                let value_type = self.check_expr(value)?;

                if !target_type.is_error()
                    && !value_type.is_error()
                    && !is_copyable(&target_type, &value_type)
                {
                    self.report(
                        ErrorKind::IncompatibleAssignment {
                            expected: target_type.clone(),
                            found: value_type,
                        },
                        location,
                    );
                }
                if !target_type.is_error() && !self.annotations.expect_is_lvalue(target.id)? {
                    self.report(ErrorKind::NonAddressableAssignmentTarget, &target.location);
                }
                Ok(())
            }

            Stmt::If { condition, then_branch, else_branch, location } => {
                self.check_condition(condition, "if", location)?;
                self.check_statements(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_statements(else_branch)?;
                }
                Ok(())
            }

            Stmt::While { condition, body, location } => {
                self.check_condition(condition, "while", location)?;
                self.check_statements(body)
            }

            Stmt::ProcCall { callee, arguments, .. } => {
                let callee_type = self.check_ident(callee)?;
                // arguments are evaluated even when the call itself is wrong
                let argument_types = arguments
                    .iter()
                    .map(|arg| self.check_expr(arg))
                    .collect::<AslResult<Vec<_>>>()?;

                match &callee_type {
                    Type::Error => {}
                    Type::Function { params, .. } => {
                        if self.check_arity(callee, params.len(), arguments.len()) {
                            for (position, ((param, arg), arg_type)) in
                                params.iter().zip(arguments).zip(&argument_types).enumerate()
                            {
                                let location = arg.location();
                                self.check_argument(callee, position, param, arg_type, location);
                            }
                        }
                    }
                    _ => self.report(
                        ErrorKind::NotCallable {
                            name: callee.name.clone(),
                        },
                        &callee.location,
                    ),
                }
                Ok(())
            }

            Stmt::Read { target, location } => {
                let target_type = self.check_left_expr(target)?;
                if !target_type.is_error()
                    && !target_type.is_primitive()
                    && !target_type.is_function()
                {
                    self.report(
                        ErrorKind::PrimitiveRequiredForIO { instruction: "read" },
                        location,
                    );
                }
                if !target_type.is_error() && !self.annotations.expect_is_lvalue(target.id)? {
                    self.report(ErrorKind::NonAddressableReadTarget, location);
                }
                Ok(())
            }

            Stmt::Write { value, location } => {
                let value_type = self.check_expr(value)?;
                if !value_type.is_error() && !value_type.is_primitive() {
                    self.report(
                        ErrorKind::PrimitiveRequiredForIO { instruction: "write" },
                        location,
                    );
                }
                Ok(())
            }

            Stmt::WriteString { .. } => Ok(()),

            Stmt::Return { value, location } => self.check_return(value.as_ref(), location),
        }
    }

    fn check_condition(
        &mut self,
        condition: &Expr,
        instruction: &'static str,
        location: &SourceLocation,
    ) -> AslResult<()> {
        let ty = self.check_expr(condition)?;
        if !ty.is_error() && !ty.is_boolean() {
            self.report(ErrorKind::BooleanConditionRequired { instruction }, location);
        }
        Ok(())
    }

    fn check_return(&mut self, value: Option<&Expr>, location: &SourceLocation) -> AslResult<()> {
        let declared = self
            .symbols
            .current_function_type()
            .and_then(Type::function_return_type)
            .cloned()
            .ok_or_else(|| AslError::ReturnOutsideFunction {
                location: location.clone(),
            })?;

        match value {
            Some(expr) => {
                let found = self.check_expr(expr)?;
                let incompatible = if declared.is_void() {
                    true
                } else {
                    !found.is_error() && !is_copyable(&declared, &found)
                };
                if incompatible {
                    self.report(
                        ErrorKind::IncompatibleReturn {
                            expected: declared,
                            found,
                        },
                        location,
                    );
                }
            }
            None if !declared.is_void() => {
                self.report(
                    ErrorKind::IncompatibleReturn {
                        expected: declared,
                        found: Type::Void,
                    },
                    location,
                );
            }
            None => {}
        }
        Ok(())
    }

    /// Assignment or `read` target.
    ///
    /// A non-array base degrades to `Error`; a bad index leaves the base type
    /// in place.
    fn check_left_expr(&mut self, target: &LeftExpr) -> AslResult<Type> {
        let mut ty = self.check_ident(&target.ident)?;
        let is_lvalue = self.annotations.expect_is_lvalue(target.ident.id)?;

        if let Some(index) = &target.index {
            let index_type = self.check_expr(index)?;
            let mut array_ok = !ty.is_error();

            if !ty.is_error() && !ty.is_array() {
                self.report(ErrorKind::NonArrayIndexed, &target.location);
                ty = Type::Error;
                array_ok = false;
            }
            if !index_type.is_error() && !index_type.is_integer() {
                self.report(ErrorKind::NonIntegerArrayIndex, index.location());
                array_ok = false;
            }
            if array_ok {
                ty = element_of(ty);
            }
        }

        self.annotate(target.id, ty.clone(), is_lvalue)?;
        Ok(ty)
    }

    /// Check an expression, annotate it and return its type
    fn check_expr(&mut self, expr: &Expr) -> AslResult<Type> {
        let (ty, is_lvalue) = match expr {
            Expr::Value { value, .. } => {
                let ty = match value {
                    Literal::Integer(_) => Type::Integer,
                    Literal::Float(_) => Type::Float,
                    Literal::Boolean(_) => Type::Boolean,
                    Literal::Character(_) => Type::Character,
                };
                (ty, false)
            }

            Expr::Ident { ident, .. } => {
                let ty = self.check_ident(ident)?;
                (ty, self.annotations.expect_is_lvalue(ident.id)?)
            }

            Expr::Parenthesized { inner, .. } => (self.check_expr(inner)?, false),

            Expr::ArrayIndex { array, index, location, .. } => {
                let mut ty = self.check_ident(array)?;
                let is_lvalue = self.annotations.expect_is_lvalue(array.id)?;
                let index_type = self.check_expr(index)?;
                let mut array_ok = !ty.is_error();

                if !ty.is_error() && !ty.is_array() {
                    self.report(ErrorKind::NonArrayIndexed, location);
                    ty = Type::Error;
                    array_ok = false;
                }
                if !index_type.is_error() && !index_type.is_integer() {
                    self.report(ErrorKind::NonIntegerArrayIndex, index.location());
                    ty = Type::Error;
                    array_ok = false;
                }
                if array_ok {
                    ty = element_of(ty);
                }
                (ty, is_lvalue)
            }

            Expr::Call { callee, arguments, .. } => (self.check_call(callee, arguments)?, false),

            Expr::Unary { operator, operand, location, .. } => {
                let operand_type = self.check_expr(operand)?;
                let ty = match operator {
                    UnaryOp::Not => {
                        if !operand_type.is_error() && !operand_type.is_boolean() {
                            self.report(
                                ErrorKind::IncompatibleOperator { operator: operator.as_str() },
                                location,
                            );
                        }
                        Type::Boolean
                    }
                    UnaryOp::Plus | UnaryOp::Minus => {
                        if operand_type.is_error() {
                            Type::Error
                        } else if operand_type.is_numeric() {
                            operand_type
                        } else {
                            self.report(
                                ErrorKind::IncompatibleOperator { operator: operator.as_str() },
                                location,
                            );
                            Type::Error
                        }
                    }
                };
                (ty, false)
            }

            Expr::Arithmetic { left, operator, right, location, .. } => {
                let left_type = self.check_expr(left)?;
                let right_type = self.check_expr(right)?;
                (self.arithmetic_result(*operator, &left_type, &right_type, location), false)
            }

            Expr::Relational { left, operator, right, location, .. } => {
                let left_type = self.check_expr(left)?;
                let right_type = self.check_expr(right)?;
                self.check_comparison(*operator, &left_type, &right_type, location);
                (Type::Boolean, false)
            }

            Expr::Logical { left, operator, right, location, .. } => {
                let left_type = self.check_expr(left)?;
                let right_type = self.check_expr(right)?;
                let wrong = |t: &Type| !t.is_error() && !t.is_boolean();
                if wrong(&left_type) || wrong(&right_type) {
                    self.report(
                        ErrorKind::IncompatibleOperator {
                            operator: operator.as_str(),
                        },
                        location,
                    );
                }
                (Type::Boolean, false)
            }
        };

        self.annotate(expr.id(), ty.clone(), is_lvalue)?;
        Ok(ty)
    }

    fn arithmetic_result(
        &mut self,
        operator: ArithmeticOp,
        left: &Type,
        right: &Type,
        location: &SourceLocation,
    ) -> Type {
        let accepts = |t: &Type| match operator {
            ArithmeticOp::Modulo => t.is_integer(),
            _ => t.is_numeric(),
        };
        let wrong = |t: &Type| !t.is_error() && !accepts(t);

        if wrong(left) || wrong(right) {
            self.report(
                ErrorKind::IncompatibleOperator {
                    operator: operator.as_str(),
                },
                location,
            );
            return Type::Error;
        }
        if left.is_error() || right.is_error() {
            return Type::Error;
        }
        if left.is_float() || right.is_float() {
            Type::Float
        } else {
            Type::Integer
        }
    }

    fn check_comparison(
        &mut self,
        operator: RelationalOp,
        left: &Type,
        right: &Type,
        location: &SourceLocation,
    ) {
        if !left.is_error() && !right.is_error() && !is_comparable(left, right, operator) {
            self.report(
                ErrorKind::IncompatibleOperator {
                    operator: operator.as_str(),
                },
                location,
            );
        }
    }

    /// Call in a value context.
    ///
    /// Unlike the statement form, arguments are only visited once the callee
    /// is known to be a function taking that many parameters.
    fn check_call(&mut self, callee: &Ident, arguments: &[Expr]) -> AslResult<Type> {
        let callee_type = self.check_ident(callee)?;

        let (params, return_type) = match callee_type {
            Type::Error => return Ok(Type::Error),
            Type::Function { params, return_type } => (params, *return_type),
            _ => {
                self.report(
                    ErrorKind::NotCallable {
                        name: callee.name.clone(),
                    },
                    &callee.location,
                );
                return Ok(Type::Error);
            }
        };

        let mut ty = return_type;
        if ty.is_void() {
            self.report(
                ErrorKind::NotAFunctionValue {
                    name: callee.name.clone(),
                },
                &callee.location,
            );
            ty = Type::Error;
        }

        if self.check_arity(callee, params.len(), arguments.len()) {
            for (position, (param, arg)) in params.iter().zip(arguments).enumerate() {
                let arg_type = self.check_expr(arg)?;
                self.check_argument(callee, position, param, &arg_type, arg.location());
            }
        }
        Ok(ty)
    }

    /// Reports a count mismatch; true when the counts agree
    fn check_arity(&mut self, callee: &Ident, expected: usize, found: usize) -> bool {
        if expected == found {
            return true;
        }
        self.report(
            ErrorKind::WrongParameterCount {
                name: callee.name.clone(),
                expected,
                found,
            },
            &callee.location,
        );
        false
    }

    fn check_argument(
        &mut self,
        callee: &Ident,
        position: usize,
        param: &Type,
        arg: &Type,
        location: &SourceLocation,
    ) {
        if !arg.is_error() && !is_copyable(param, arg) {
            self.report(
                ErrorKind::IncompatibleParameterType {
                    callee: callee.name.clone(),
                    position: position + 1,
                },
                location,
            );
        }
    }

    /// Resolve an identifier occurrence
    fn check_ident(&mut self, ident: &Ident) -> AslResult<Type> {
        let (ty, is_lvalue) = match self.symbols.find_in_stack(&ident.name) {
            Some(binding) => (binding.ty.clone(), !binding.is_function()),
            None => {
                self.report(
                    ErrorKind::UndeclaredIdentifier {
                        name: ident.name.clone(),
                    },
                    &ident.location,
                );
                // optimistic, so assigning to it is not reported a second time
                (Type::Error, true)
            }
        };
        self.annotate(ident.id, ty.clone(), is_lvalue)?;
        Ok(ty)
    }

    fn annotate(&mut self, node: NodeId, ty: Type, is_lvalue: bool) -> AslResult<()> {
        self.annotations.put_type(node, ty)?;
        self.annotations.put_is_lvalue(node, is_lvalue)
    }

    fn report(&mut self, kind: ErrorKind, location: &SourceLocation) {
        self.diagnostics.record(kind, location.clone());
    }
}

fn element_of(array: Type) -> Type {
    match array {
        Type::Array { element, .. } => *element,
        other => other,
    }
}
