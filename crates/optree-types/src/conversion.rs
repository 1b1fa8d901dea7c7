use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionKind {
    #[default]
    Identity,
    ImplicitNumeric,
    ImplicitNullable,
    ImplicitReference,
    Boxing,
    NullLiteral,
    ImplicitDynamic,
    UserDefined,
    ExplicitNumeric,
    ExplicitReference,
    Unboxing,
    /// No conversion exists between the two types.
    NoConversion,
}

impl ConversionKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ConversionKind::Identity => "Identity",
            ConversionKind::ImplicitNumeric => "ImplicitNumeric",
            ConversionKind::ImplicitNullable => "ImplicitNullable",
            ConversionKind::ImplicitReference => "ImplicitReference",
            ConversionKind::Boxing => "Boxing",
            ConversionKind::NullLiteral => "NullLiteral",
            ConversionKind::ImplicitDynamic => "ImplicitDynamic",
            ConversionKind::UserDefined => "UserDefined",
            ConversionKind::ExplicitNumeric => "ExplicitNumeric",
            ConversionKind::ExplicitReference => "ExplicitReference",
            ConversionKind::Unboxing => "Unboxing",
            ConversionKind::NoConversion => "NoConversion",
        }
    }
}

/// A conversion classified by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conversion {
    pub kind: ConversionKind,
    /// Operator method for user-defined conversions.
    #[serde(default)]
    pub operator: Option<String>,
}

impl Conversion {
    pub fn new(kind: ConversionKind) -> Self {
        Self {
            kind,
            operator: None,
        }
    }

    pub fn identity() -> Self {
        Self::new(ConversionKind::Identity)
    }

    pub fn none() -> Self {
        Self::new(ConversionKind::NoConversion)
    }

    pub fn user_defined(operator: impl Into<String>) -> Self {
        Self {
            kind: ConversionKind::UserDefined,
            operator: Some(operator.into()),
        }
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.kind != ConversionKind::NoConversion
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.kind == ConversionKind::Identity
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;
        if let Some(operator) = &self.operator {
            write!(f, "({operator})")?;
        }
        Ok(())
    }
}

/// Conversions applied to one call-site argument: into the parameter, and
/// back out of it for `ref`/`out` parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgConversions {
    #[serde(default)]
    pub input: Conversion,
    #[serde(default)]
    pub output: Conversion,
}

impl ArgConversions {
    pub fn input(input: Conversion) -> Self {
        Self {
            input,
            output: Conversion::identity(),
        }
    }
}
