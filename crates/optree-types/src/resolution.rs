use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ArgConversions, Signature, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    UnknownMember,
    Inaccessible,
    Ambiguous,
    NoApplicableCandidate,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureReason::UnknownMember => "member not found",
            FailureReason::Inaccessible => "member is inaccessible",
            FailureReason::Ambiguous => "call is ambiguous",
            FailureReason::NoApplicableCandidate => "no applicable candidate",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionFailure {
    pub reason: FailureReason,
    /// Best candidate found, used for a best-effort result type.
    #[serde(default)]
    pub candidate: Option<Signature>,
}

/// How the resolver applied a trailing `params` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamsForm {
    /// One argument passed as the array itself.
    Normal,
    /// The remaining arguments become elements of a new array.
    Expanded,
}

/// The resolver's answer for one call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallResolution {
    Resolved {
        signature: Signature,
        /// One entry per call-site argument, in call-site order. Missing
        /// entries are treated as identity conversions.
        #[serde(default)]
        conversions: Vec<ArgConversions>,
        /// Absent when the signature has no params parameter, or when the
        /// host leaves the form to be inferred from argument types.
        #[serde(default)]
        params_form: Option<ParamsForm>,
    },
    Unresolved(ResolutionFailure),
}

impl CallResolution {
    pub fn resolved(signature: Signature) -> Self {
        CallResolution::Resolved {
            signature,
            conversions: Vec::new(),
            params_form: None,
        }
    }

    pub fn unresolved(reason: FailureReason) -> Self {
        CallResolution::Unresolved(ResolutionFailure {
            reason,
            candidate: None,
        })
    }

    pub fn unresolved_with_candidate(reason: FailureReason, candidate: Signature) -> Self {
        CallResolution::Unresolved(ResolutionFailure {
            reason,
            candidate: Some(candidate),
        })
    }

    #[must_use]
    pub fn with_conversions(mut self, new_conversions: Vec<ArgConversions>) -> Self {
        if let CallResolution::Resolved { conversions, .. } = &mut self {
            *conversions = new_conversions;
        }
        self
    }

    #[must_use]
    pub fn with_params_form(mut self, form: ParamsForm) -> Self {
        if let CallResolution::Resolved { params_form, .. } = &mut self {
            *params_form = Some(form);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSymbol {
    pub name: String,
    pub container: Type,
    pub ty: Type,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_readonly: bool,
}

impl FieldSymbol {
    pub fn new(container: Type, name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            container,
            ty,
            is_static: false,
            is_readonly: false,
        }
    }
}

/// The resolver's answer for a member access (`a.b`, `a?.b`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberResolution {
    Field(FieldSymbol),
    Property(Signature),
    Unresolved(ResolutionFailure),
}
