//! Zeal IR - Typed Intermediate Representation
//!
//! This crate contains the data the code generator consumes:
//! - Source locations for runtime diagnostics
//! - Semantic types and storage classes
//! - Variables, compiled expressions and global constants
//! - Class, method and function metadata
//! - A small typed statement/expression tree
//!
//! Parsing and type analysis live upstream; everything here is produced
//! once and read by the backend.
//!
//! # Design Philosophy
//!
//! - **Closed enumerations**: every semantic type is a variant of
//!   [`SemanticType`], so representation lookups are exhaustive matches.
//! - **Immutable results**: a [`CompiledExpression`] never changes after it
//!   is built; its type tag always agrees with its code.

pub mod ast;
mod definition;
mod expression;
mod location;
mod types;
mod variable;

pub use ast::{
    BinaryOp, Expr, ForEachStmt, ForRangeStmt, LetTarget, Literal, PropertyKey, Stmt, StmtKind, UnaryOp,
};
pub use definition::{ClassDefinition, ClassMethod, FunctionDefinition, Parameter, RoutineRef};
pub use expression::{CompiledExpression, GlobalConstant, GlobalValue, Value};
pub use location::SourceLocation;
pub use types::{SemanticType, StorageClass};
pub use variable::Variable;
