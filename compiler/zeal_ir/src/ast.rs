//! Typed statement and expression trees.
//!
//! Upstream analysis hands the backend these trees with every variable
//! already declared in the scope's symbol table. Expressions carry no
//! locations of their own; they report the location of their statement.

use crate::{GlobalConstant, SourceLocation};

/// Literal constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Double(f64),
    Bool(bool),
    String(String),
    /// Character literal as written, quotes included (`'a'`, `'\n'`).
    Char(String),
    Null,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::Eq
                | BinaryOp::NotEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// C spelling of the operator.
    pub fn as_c(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Name of a property or array key: known at compile time or held in a
/// variable.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum PropertyKey {
    Name(String),
    Dynamic(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Variable(String),
    Constant(GlobalConstant),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `object->property`
    Property {
        object: String,
        property: PropertyKey,
        read_only: bool,
        /// No warning when the property is missing, as in `a->b ?? c`.
        quiet: bool,
    },
    /// `self::property` on the class being compiled.
    StaticProperty { property: String },
    MethodCall {
        object: String,
        method: String,
        args: Vec<Expr>,
    },
    FunctionCall { name: String, args: Vec<Expr> },
    ArrayIsset { array: String, key: Box<Expr> },
    PropertyIsset { object: String, property: PropertyKey },
    /// Array literal; entries without a key are appended.
    Array(Vec<(Option<Expr>, Expr)>),
}

impl Expr {
    pub fn int(n: i64) -> Self {
        Expr::Literal(Literal::Int(n))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Where a `let` stores its value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum LetTarget {
    Variable(String),
    Property { object: String, property: PropertyKey },
    StaticProperty { property: String },
    /// `let array[] = value`
    ArrayAppend(String),
}

/// `for [key,] value in [reverse] range(start, end)`
#[derive(Clone, Debug, PartialEq)]
pub struct ForRangeStmt {
    pub key: Option<String>,
    pub value: String,
    pub start: Expr,
    pub end: Expr,
    pub reverse: bool,
    pub body: Vec<Stmt>,
}

/// `for [key,] [value] in [reverse] collection`
#[derive(Clone, Debug, PartialEq)]
pub struct ForEachStmt {
    pub key: Option<String>,
    pub value: Option<String>,
    pub collection: String,
    pub reverse: bool,
    /// Keep a private copy of string keys beyond the iteration.
    pub duplicate_key: bool,
    /// Copy the collection before iterating it.
    pub duplicate_collection: bool,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Let { target: LetTarget, value: Expr },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    While { condition: Expr, body: Vec<Stmt> },
    DoWhile { body: Vec<Stmt>, condition: Expr },
    Loop { body: Vec<Stmt> },
    ForRange(ForRangeStmt),
    ForEach(ForEachStmt),
    Break,
    Continue,
    Return(Option<Expr>),
    Expr(Expr),
    UnsetIndex { array: String, index: Expr },
}

/// A statement and the place it was written.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: SourceLocation,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: SourceLocation) -> Self {
        Stmt { kind, location }
    }
}
