//! Abstract Syntax Tree definitions
//!
//! This module defines the syntax tree the parser hands to the semantic stage.
//! Every node the checker annotates carries a [`NodeId`] that is unique within
//! one tree; annotations are kept outside the tree, keyed by that id.

use std::fmt;

use crate::error::SourceLocation;

pub mod builder;

pub use builder::AstBuilder;

/// Stable identity of a tree node, assigned when the tree is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Root node: a list of function definitions
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: NodeId,
    pub functions: Vec<Function>,
    pub location: SourceLocation,
}

/// Function definition: `func name(params) : type  var ...  body  endfunc`
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub id: NodeId,
    pub name: Ident,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeSpec>,
    pub declarations: Vec<VariableDecl>,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Ident,
    pub ty: TypeSpec,
}

/// Local variable declaration: `var a, b : int`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub names: Vec<Ident>,
    pub ty: TypeSpec,
    pub location: SourceLocation,
}

/// Type annotation as written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    Basic(BasicType),
    /// `array [size] of element`
    Array { size: u32, element: BasicType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicType {
    Int,
    Float,
    Bool,
    Char,
}

/// Identifier occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
    pub location: SourceLocation,
}

/// Assignment or `read` target, optionally subscripted: `a` or `a[i]`
#[derive(Debug, Clone, PartialEq)]
pub struct LeftExpr {
    pub id: NodeId,
    pub ident: Ident,
    pub index: Option<Box<Expr>>,
    pub location: SourceLocation,
}

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `target := value;`
    Assign {
        target: LeftExpr,
        value: Expr,
        location: SourceLocation,
    },

    /// `if cond then ... [else ...] endif`
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        location: SourceLocation,
    },

    /// `while cond do ... endwhile`
    While {
        condition: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },

    /// Call used as a statement: `f(a, b);`
    ProcCall {
        callee: Ident,
        arguments: Vec<Expr>,
        location: SourceLocation,
    },

    /// `read target;`
    Read {
        target: LeftExpr,
        location: SourceLocation,
    },

    /// `write expr;`
    Write {
        value: Expr,
        location: SourceLocation,
    },

    /// `write "text";`
    WriteString {
        text: String,
        location: SourceLocation,
    },

    /// `return [expr];`
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },
}

impl Stmt {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Stmt::Assign { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::ProcCall { location, .. }
            | Stmt::Read { location, .. }
            | Stmt::Write { location, .. }
            | Stmt::WriteString { location, .. }
            | Stmt::Return { location, .. } => location,
        }
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `( inner )`
    Parenthesized {
        id: NodeId,
        inner: Box<Expr>,
        location: SourceLocation,
    },

    /// `array[index]` in a value context
    ArrayIndex {
        id: NodeId,
        array: Ident,
        index: Box<Expr>,
        location: SourceLocation,
    },

    /// `f(a, b)` in a value context
    Call {
        id: NodeId,
        callee: Ident,
        arguments: Vec<Expr>,
        location: SourceLocation,
    },

    Unary {
        id: NodeId,
        operator: UnaryOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },

    Arithmetic {
        id: NodeId,
        left: Box<Expr>,
        operator: ArithmeticOp,
        right: Box<Expr>,
        location: SourceLocation,
    },

    Relational {
        id: NodeId,
        left: Box<Expr>,
        operator: RelationalOp,
        right: Box<Expr>,
        location: SourceLocation,
    },

    Logical {
        id: NodeId,
        left: Box<Expr>,
        operator: LogicalOp,
        right: Box<Expr>,
        location: SourceLocation,
    },

    /// Literal value
    Value {
        id: NodeId,
        value: Literal,
        location: SourceLocation,
    },

    /// Identifier used as a value
    Ident {
        id: NodeId,
        ident: Ident,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Parenthesized { id, .. }
            | Expr::ArrayIndex { id, .. }
            | Expr::Call { id, .. }
            | Expr::Unary { id, .. }
            | Expr::Arithmetic { id, .. }
            | Expr::Relational { id, .. }
            | Expr::Logical { id, .. }
            | Expr::Value { id, .. }
            | Expr::Ident { id, .. } => *id,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Expr::Parenthesized { location, .. }
            | Expr::ArrayIndex { location, .. }
            | Expr::Call { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Arithmetic { location, .. }
            | Expr::Relational { location, .. }
            | Expr::Logical { location, .. }
            | Expr::Value { location, .. }
            | Expr::Ident { location, .. } => location,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Plus,
    Minus,
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

/// Relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Plus => "+",
            Self::Minus => "-",
        }
    }
}

impl ArithmeticOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }
}

impl RelationalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        }
    }

    /// `==` and `!=`
    pub fn is_equality(&self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Character(char),
}
