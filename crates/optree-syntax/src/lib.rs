//! Bound syntax: the input to operation-tree construction.
//!
//! Parsing and symbol resolution happen elsewhere. What arrives here is an
//! arena of statements and expressions in which every call site and member
//! access already carries the resolver's decision.

pub mod body;
pub mod builder;

pub use body::{
    Argument, BinaryOp, Declarator, Enumeration, Expr, ExprId, ExprKind, ForEachVariable, Local,
    LocalId, Pattern, Stmt, StmtId, StmtKind, SyntaxBody,
};
pub use builder::SyntaxBuilder;
