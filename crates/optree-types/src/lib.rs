//! Shared types used across optree crates.
//!
//! Besides spans and diagnostics this crate holds the records produced by the
//! symbol resolver: types, constants, resolved signatures and conversions. The
//! resolver itself lives outside this workspace; operation-tree construction
//! only ever consumes its results.

use serde::{Deserialize, Serialize};
use std::fmt;

mod conversion;
mod resolution;
mod signature;
mod ty;

pub use conversion::{ArgConversions, Conversion, ConversionKind};
pub use resolution::{
    CallResolution, FailureReason, FieldSymbol, MemberResolution, ParamsForm, ResolutionFailure,
};
pub use signature::{Accessors, ParamDefault, Parameter, RefKind, Signature, SignatureKind};
pub use ty::{ConstValue, PrimitiveType, Type};

/// A byte-span into a source string.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
        }
    }
}
