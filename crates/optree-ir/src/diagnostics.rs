use optree_types::{Diagnostic, Span};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowerDiagnosticKind {
    UnresolvedMember,
    UnresolvedName,
    MissingSyntax,
    ArgumentBinding,
    AccessorMismatch,
    InvalidDefaultValue,
    InvalidReceiver,
    InvalidConversion,
}

impl LowerDiagnosticKind {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            LowerDiagnosticKind::UnresolvedMember => "OPS_UNRESOLVED_MEMBER",
            LowerDiagnosticKind::UnresolvedName => "OPS_UNRESOLVED_NAME",
            LowerDiagnosticKind::MissingSyntax => "OPS_MISSING_SYNTAX",
            LowerDiagnosticKind::ArgumentBinding => "OPS_ARGUMENT_BINDING",
            LowerDiagnosticKind::AccessorMismatch => "OPS_ACCESSOR",
            LowerDiagnosticKind::InvalidDefaultValue => "OPS_DEFAULT_VALUE",
            LowerDiagnosticKind::InvalidReceiver => "OPS_INVALID_RECEIVER",
            LowerDiagnosticKind::InvalidConversion => "OPS_CONVERSION",
        }
    }
}

/// Order of the Argument nodes under a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentOrder {
    /// Explicit arguments in call-site order, then synthesized arguments
    /// (defaults, empty params arrays) in parameter order.
    #[default]
    Evaluation,
    /// Parameter declaration order.
    Parameter,
}

impl ArgumentOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ArgumentOrder::Evaluation => "evaluation",
            ArgumentOrder::Parameter => "parameter",
        }
    }
}

impl std::str::FromStr for ArgumentOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "evaluation" => Ok(ArgumentOrder::Evaluation),
            "parameter" => Ok(ArgumentOrder::Parameter),
            other => Err(format!(
                "unknown argument order `{other}` (expected `evaluation` or `parameter`)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowerConfig {
    pub argument_order: ArgumentOrder,
}

pub(crate) fn diagnostic(
    kind: LowerDiagnosticKind,
    span: Option<Span>,
    message: String,
) -> Diagnostic {
    Diagnostic::error(kind.code(), message, span)
}
