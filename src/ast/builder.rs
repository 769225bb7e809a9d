//! Programmatic tree construction
//!
//! The parser front end (and the tests) build trees through [`AstBuilder`],
//! which hands out a fresh [`NodeId`] for every node that can be annotated and
//! stamps each node with the current source position.
//!
//! All methods take `&self` so nested construction reads naturally:
//!
//! ```
//! use asl_check::ast::{AstBuilder, ArithmeticOp};
//!
//! let b = AstBuilder::new();
//! let sum = b.arith(b.int(1), ArithmeticOp::Add, b.float(2.5));
//! assert_ne!(sum.id(), b.int(0).id());
//! ```

use std::cell::{Cell, RefCell};

use super::*;

/// Builds tree nodes with unique ids
#[derive(Debug)]
pub struct AstBuilder {
    next_id: Cell<u32>,
    location: RefCell<SourceLocation>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            location: RefCell::new(SourceLocation::at(1, 1)),
        }
    }

    /// Builder whose locations carry a filename
    pub fn with_filename(filename: impl Into<String>) -> Self {
        let builder = Self::new();
        builder.location.borrow_mut().filename = Some(filename.into());
        builder
    }

    /// Move the position stamped on subsequently built nodes
    pub fn at(&self, line: usize, column: usize) -> &Self {
        let mut location = self.location.borrow_mut();
        location.line = line;
        location.column = column;
        drop(location);
        self
    }

    /// Number of ids handed out so far
    pub fn node_count(&self) -> u32 {
        self.next_id.get()
    }

    fn fresh_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId(id)
    }

    fn location(&self) -> SourceLocation {
        self.location.borrow().clone()
    }

    // ---- declarations ----

    pub fn program(&self, functions: Vec<Function>) -> Program {
        Program {
            id: self.fresh_id(),
            functions,
            location: self.location(),
        }
    }

    pub fn function(
        &self,
        name: &str,
        params: Vec<Parameter>,
        return_type: Option<TypeSpec>,
        declarations: Vec<VariableDecl>,
        body: Vec<Stmt>,
    ) -> Function {
        Function {
            id: self.fresh_id(),
            name: self.ident(name),
            params,
            return_type,
            declarations,
            body,
            location: self.location(),
        }
    }

    pub fn param(&self, name: &str, ty: TypeSpec) -> Parameter {
        Parameter {
            name: self.ident(name),
            ty,
        }
    }

    pub fn var_decl(&self, names: &[&str], ty: TypeSpec) -> VariableDecl {
        VariableDecl {
            names: names.iter().map(|name| self.ident(name)).collect(),
            ty,
            location: self.location(),
        }
    }

    pub fn ident(&self, name: &str) -> Ident {
        Ident {
            id: self.fresh_id(),
            name: name.to_string(),
            location: self.location(),
        }
    }

    // ---- assignment targets ----

    pub fn left(&self, name: &str) -> LeftExpr {
        LeftExpr {
            id: self.fresh_id(),
            ident: self.ident(name),
            index: None,
            location: self.location(),
        }
    }

    pub fn left_indexed(&self, name: &str, index: Expr) -> LeftExpr {
        LeftExpr {
            id: self.fresh_id(),
            ident: self.ident(name),
            index: Some(Box::new(index)),
            location: self.location(),
        }
    }

    // ---- statements ----

    pub fn assign(&self, target: LeftExpr, value: Expr) -> Stmt {
        Stmt::Assign {
            target,
            value,
            location: self.location(),
        }
    }

    pub fn if_then(&self, condition: Expr, then_branch: Vec<Stmt>) -> Stmt {
        Stmt::If {
            condition,
            then_branch,
            else_branch: None,
            location: self.location(),
        }
    }

    pub fn if_else(&self, condition: Expr, then_branch: Vec<Stmt>, else_branch: Vec<Stmt>) -> Stmt {
        Stmt::If {
            condition,
            then_branch,
            else_branch: Some(else_branch),
            location: self.location(),
        }
    }

    pub fn while_do(&self, condition: Expr, body: Vec<Stmt>) -> Stmt {
        Stmt::While {
            condition,
            body,
            location: self.location(),
        }
    }

    pub fn proc_call(&self, callee: &str, arguments: Vec<Expr>) -> Stmt {
        Stmt::ProcCall {
            callee: self.ident(callee),
            arguments,
            location: self.location(),
        }
    }

    pub fn read(&self, target: LeftExpr) -> Stmt {
        Stmt::Read {
            target,
            location: self.location(),
        }
    }

    pub fn write(&self, value: Expr) -> Stmt {
        Stmt::Write {
            value,
            location: self.location(),
        }
    }

    pub fn write_string(&self, text: &str) -> Stmt {
        Stmt::WriteString {
            text: text.to_string(),
            location: self.location(),
        }
    }

    pub fn ret(&self, value: Option<Expr>) -> Stmt {
        Stmt::Return {
            value,
            location: self.location(),
        }
    }

    // ---- expressions ----

    pub fn int(&self, value: i64) -> Expr {
        self.literal(Literal::Integer(value))
    }

    pub fn float(&self, value: f64) -> Expr {
        self.literal(Literal::Float(value))
    }

    pub fn boolean(&self, value: bool) -> Expr {
        self.literal(Literal::Boolean(value))
    }

    pub fn character(&self, value: char) -> Expr {
        self.literal(Literal::Character(value))
    }

    pub fn literal(&self, value: Literal) -> Expr {
        Expr::Value {
            id: self.fresh_id(),
            value,
            location: self.location(),
        }
    }

    /// Identifier in a value context
    pub fn var(&self, name: &str) -> Expr {
        Expr::Ident {
            id: self.fresh_id(),
            ident: self.ident(name),
            location: self.location(),
        }
    }

    pub fn index(&self, array: &str, index: Expr) -> Expr {
        Expr::ArrayIndex {
            id: self.fresh_id(),
            array: self.ident(array),
            index: Box::new(index),
            location: self.location(),
        }
    }

    pub fn call(&self, callee: &str, arguments: Vec<Expr>) -> Expr {
        Expr::Call {
            id: self.fresh_id(),
            callee: self.ident(callee),
            arguments,
            location: self.location(),
        }
    }

    pub fn paren(&self, inner: Expr) -> Expr {
        Expr::Parenthesized {
            id: self.fresh_id(),
            inner: Box::new(inner),
            location: self.location(),
        }
    }

    pub fn unary(&self, operator: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            id: self.fresh_id(),
            operator,
            operand: Box::new(operand),
            location: self.location(),
        }
    }

    pub fn arith(&self, left: Expr, operator: ArithmeticOp, right: Expr) -> Expr {
        Expr::Arithmetic {
            id: self.fresh_id(),
            left: Box::new(left),
            operator,
            right: Box::new(right),
            location: self.location(),
        }
    }

    pub fn rel(&self, left: Expr, operator: RelationalOp, right: Expr) -> Expr {
        Expr::Relational {
            id: self.fresh_id(),
            left: Box::new(left),
            operator,
            right: Box::new(right),
            location: self.location(),
        }
    }

    pub fn logical(&self, left: Expr, operator: LogicalOp, right: Expr) -> Expr {
        Expr::Logical {
            id: self.fresh_id(),
            left: Box::new(left),
            operator,
            right: Box::new(right),
            location: self.location(),
        }
    }
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let b = AstBuilder::new();
        let expr = b.arith(b.var("a"), ArithmeticOp::Add, b.call("f", vec![b.int(1)]));

        let mut ids = HashSet::new();
        fn collect(expr: &Expr, ids: &mut HashSet<NodeId>) {
            assert!(ids.insert(expr.id()));
            match expr {
                Expr::Arithmetic { left, right, .. } => {
                    collect(left, ids);
                    collect(right, ids);
                }
                Expr::Call { callee, arguments, .. } => {
                    assert!(ids.insert(callee.id));
                    for arg in arguments {
                        collect(arg, ids);
                    }
                }
                Expr::Ident { ident, .. } => {
                    assert!(ids.insert(ident.id));
                }
                _ => {}
            }
        }
        collect(&expr, &mut ids);
        assert_eq!(ids.len() as u32, b.node_count());
    }

    #[test]
    fn test_locations_follow_cursor() {
        let b = AstBuilder::with_filename("prog.asl");
        let first = b.at(2, 5).int(1);
        let second = b.at(7, 3).boolean(true);

        assert_eq!(first.location().to_string(), "prog.asl:2:5");
        assert_eq!(second.location().to_string(), "prog.asl:7:3");
    }

    #[test]
    fn test_default_starts_at_first_line() {
        let b = AstBuilder::default();
        let value = b.int(0);
        assert_eq!(value.location().to_string(), "1:1");
        assert_eq!(b.node_count(), 1);
    }
}
