//! Semantic operation trees over bound method bodies.
//!
//! [`lower_body`] turns a [`optree_syntax::SyntaxBody`] into an
//! [`OperationTree`]: invocations with their arguments normalized against the
//! resolved signature, structured loops, conditional access, and `Invalid`
//! nodes wherever binding failed. [`dump`] prints the canonical text form.

mod binder;
mod diagnostics;
mod invalid;
mod kind;
mod lowering;
mod operation;
mod printer;
mod tree;

pub use crate::binder::{bind_arguments, ArgumentSlot, BindError, BindOptions, CallArg};
pub use crate::diagnostics::{ArgumentOrder, LowerConfig, LowerDiagnosticKind};
pub use crate::kind::OperationKind;
pub use crate::lowering::{lower_body, lower_body_with, LowerResult};
pub use crate::operation::{ArgumentKind, OpId, Operation, OperationData};
pub use crate::printer::{dump, dump_op, dump_op_with, dump_with, DumpOptions};
pub use crate::tree::{OperationTree, SyntaxNode};
