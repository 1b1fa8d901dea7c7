use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ConstValue, Type};

/// How an argument is passed to a parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
}

impl RefKind {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            RefKind::None => "",
            RefKind::Ref => "ref ",
            RefKind::Out => "out ",
            RefKind::In => "in ",
        }
    }

    /// Whether an argument written with `self` as modifier may bind to a
    /// parameter declared with `param`.
    #[must_use]
    pub fn is_compatible_with(self, param: RefKind) -> bool {
        self == param || (self == RefKind::None && param == RefKind::In)
    }
}

/// Declared default value of an optional parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamDefault {
    /// A literal or constant, already converted to the parameter type.
    Constant(ConstValue),
    /// `default(T)` / `default`.
    DefaultOf,
    /// `new T()` for a value type.
    New,
    /// The declared default could not be converted to the parameter type, or
    /// depended on a type missing from the environment.
    Unconvertible(Option<ConstValue>),
}

impl fmt::Display for ParamDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamDefault::Constant(value) | ParamDefault::Unconvertible(Some(value)) => {
                write!(f, "{value}")
            }
            ParamDefault::DefaultOf => f.write_str("default"),
            ParamDefault::New => f.write_str("new()"),
            ParamDefault::Unconvertible(None) => f.write_str("?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ordinal: usize,
    pub ty: Type,
    #[serde(default)]
    pub ref_kind: RefKind,
    #[serde(default)]
    pub default: Option<ParamDefault>,
    #[serde(default)]
    pub is_params: bool,
}

impl Parameter {
    pub fn new(ordinal: usize, name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ordinal,
            ty,
            ref_kind: RefKind::None,
            default: None,
            is_params: false,
        }
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_params {
            f.write_str("params ")?;
        }
        write!(f, "{}{} {}", self.ref_kind.prefix(), self.ty, self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    Method,
    Constructor,
    Indexer,
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Accessors {
    pub get: bool,
    pub set: bool,
}

impl Default for Accessors {
    fn default() -> Self {
        Self {
            get: true,
            set: true,
        }
    }
}

/// The member chosen by overload resolution for a call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub kind: SignatureKind,
    pub container: Type,
    pub name: String,
    pub return_type: Type,
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_extension: bool,
    #[serde(default)]
    pub is_vararg: bool,
    #[serde(default)]
    pub accessors: Accessors,
}

impl Signature {
    fn new(kind: SignatureKind, container: Type, name: String, return_type: Type) -> Self {
        Self {
            kind,
            container,
            name,
            return_type,
            params: Vec::new(),
            is_static: false,
            is_extension: false,
            is_vararg: false,
            accessors: Accessors::default(),
        }
    }

    pub fn method(container: Type, name: impl Into<String>, return_type: Type) -> Self {
        Self::new(SignatureKind::Method, container, name.into(), return_type)
    }

    pub fn constructor(container: Type) -> Self {
        let return_type = container.clone();
        Self::new(SignatureKind::Constructor, container, ".ctor".into(), return_type)
    }

    pub fn indexer(container: Type, return_type: Type) -> Self {
        Self::new(SignatureKind::Indexer, container, "this[]".into(), return_type)
    }

    pub fn property(container: Type, name: impl Into<String>, ty: Type) -> Self {
        Self::new(SignatureKind::Property, container, name.into(), ty)
    }

    #[must_use]
    pub fn with_param(mut self, mut param: Parameter) -> Self {
        param.ordinal = self.params.len();
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn param(self, name: impl Into<String>, ty: Type) -> Self {
        self.with_param(Parameter::new(0, name, ty))
    }

    #[must_use]
    pub fn optional(self, name: impl Into<String>, ty: Type, default: ParamDefault) -> Self {
        let mut param = Parameter::new(0, name, ty);
        param.default = Some(default);
        self.with_param(param)
    }

    #[must_use]
    pub fn params_array(self, name: impl Into<String>, ty: Type) -> Self {
        let mut param = Parameter::new(0, name, ty);
        param.is_params = true;
        self.with_param(param)
    }

    /// Sets the ref kind of the most recently added parameter.
    #[must_use]
    pub fn with_ref_kind(mut self, ref_kind: RefKind) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.ref_kind = ref_kind;
        }
        self
    }

    #[must_use]
    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Marks the signature as an extension method: static, with the receiver
    /// bound to the first parameter.
    #[must_use]
    pub fn extension(mut self) -> Self {
        self.is_static = true;
        self.is_extension = true;
        self
    }

    #[must_use]
    pub fn vararg(mut self) -> Self {
        self.is_vararg = true;
        self
    }

    #[must_use]
    pub fn with_accessors(mut self, get: bool, set: bool) -> Self {
        self.accessors = Accessors { get, set };
        self
    }

    /// The trailing params-array parameter, if any.
    #[must_use]
    pub fn params_parameter(&self) -> Option<&Parameter> {
        self.params.last().filter(|param| param.is_params)
    }

    #[must_use]
    pub fn parameter_named(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|param| param.name == name)
    }

    /// Type of the value produced by using this member; `None` for `void`.
    #[must_use]
    pub fn result_type(&self) -> Option<Type> {
        if self.return_type.is_void() {
            None
        } else {
            Some(self.return_type.clone())
        }
    }

    fn fmt_params(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, param) in self.params.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            if idx == 0 && self.is_extension {
                f.write_str("this ")?;
            }
            write!(f, "{param}")?;
        }
        if self.is_vararg {
            if !self.params.is_empty() {
                f.write_str(", ")?;
            }
            f.write_str("__arglist")?;
        }
        Ok(())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SignatureKind::Method => {
                write!(f, "{} {}.{}(", self.return_type, self.container, self.name)?;
                self.fmt_params(f)?;
                f.write_str(")")
            }
            SignatureKind::Constructor => {
                write!(f, "{}..ctor(", self.container)?;
                self.fmt_params(f)?;
                f.write_str(")")
            }
            SignatureKind::Indexer => {
                write!(f, "{} {}.this[", self.return_type, self.container)?;
                self.fmt_params(f)?;
                f.write_str("]")
            }
            SignatureKind::Property => {
                write!(f, "{} {}.{}", self.return_type, self.container, self.name)
            }
        }
    }
}
