use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Bool,
    Char,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
}

impl PrimitiveType {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::SByte => "sbyte",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::UShort => "ushort",
            PrimitiveType::Int => "int",
            PrimitiveType::UInt => "uint",
            PrimitiveType::Long => "long",
            PrimitiveType::ULong => "ulong",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Decimal => "decimal",
        }
    }

    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Bool | PrimitiveType::Char)
    }
}

/// A semantic type as reported by the resolver.
///
/// `Error` is the sentinel used when resolution failed or a predefined type
/// was missing from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Primitive(PrimitiveType),
    String,
    Object,
    Dynamic,
    Void,
    Named { name: String, is_value_type: bool },
    Array(Box<Type>),
    Nullable(Box<Type>),
    Tuple(Vec<Type>),
    TypeParam(String),
    Error,
}

impl Type {
    pub fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn long() -> Self {
        Type::Primitive(PrimitiveType::Long)
    }

    pub fn double() -> Self {
        Type::Primitive(PrimitiveType::Double)
    }

    pub fn bool() -> Self {
        Type::Primitive(PrimitiveType::Bool)
    }

    pub fn char() -> Self {
        Type::Primitive(PrimitiveType::Char)
    }

    pub fn string() -> Self {
        Type::String
    }

    pub fn class(name: impl Into<String>) -> Self {
        Type::Named {
            name: name.into(),
            is_value_type: false,
        }
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Type::Named {
            name: name.into(),
            is_value_type: true,
        }
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn nullable(underlying: Type) -> Self {
        Type::Nullable(Box::new(underlying))
    }

    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self {
            Type::Primitive(_) | Type::Nullable(_) | Type::Tuple(_) => true,
            Type::Named { is_value_type, .. } => *is_value_type,
            Type::String
            | Type::Object
            | Type::Dynamic
            | Type::Void
            | Type::Array(_)
            | Type::TypeParam(_)
            | Type::Error => false,
        }
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// The type with one level of `Nullable` removed.
    #[must_use]
    pub fn underlying(&self) -> &Type {
        match self {
            Type::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Wraps non-nullable value types in `Nullable`; everything else is unchanged.
    #[must_use]
    pub fn lifted(self) -> Type {
        match self {
            Type::Nullable(_) => self,
            ty if ty.is_value_type() => Type::Nullable(Box::new(ty)),
            ty => ty,
        }
    }

    #[must_use]
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains_error(&self) -> bool {
        match self {
            Type::Error => true,
            Type::Array(inner) | Type::Nullable(inner) => inner.contains_error(),
            Type::Tuple(elements) => elements.iter().any(Type::contains_error),
            _ => false,
        }
    }

    /// Whether a value of type `self` can be passed directly (normal form) to a
    /// params parameter of array type `target`.
    #[must_use]
    pub fn is_array_assignable_to(&self, target: &Type) -> bool {
        let (Some(source), Some(target_element)) = (self.element_type(), target.element_type())
        else {
            return false;
        };
        source == target_element
            || (!source.is_value_type() && matches!(target_element, Type::Object | Type::Dynamic))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(prim) => f.write_str(prim.keyword()),
            Type::String => f.write_str("string"),
            Type::Object => f.write_str("object"),
            Type::Dynamic => f.write_str("dynamic"),
            Type::Void => f.write_str("void"),
            Type::Named { name, .. } => f.write_str(name),
            Type::Array(element) => write!(f, "{element}[]"),
            Type::Nullable(inner) => write!(f, "{inner}?"),
            Type::Tuple(elements) => {
                f.write_str("(")?;
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str(")")
            }
            Type::TypeParam(name) => f.write_str(name),
            Type::Error => f.write_str("?"),
        }
    }
}

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
}

impl ConstValue {
    /// The natural type of the constant, `None` for `null`.
    #[must_use]
    pub fn natural_type(&self) -> Option<Type> {
        match self {
            ConstValue::Null => None,
            ConstValue::Bool(_) => Some(Type::bool()),
            ConstValue::Int(_) => Some(Type::int()),
            ConstValue::Float(_) => Some(Type::double()),
            ConstValue::Char(_) => Some(Type::char()),
            ConstValue::String(_) => Some(Type::string()),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Null => f.write_str("null"),
            ConstValue::Bool(value) => write!(f, "{value}"),
            ConstValue::Int(value) => write!(f, "{value}"),
            ConstValue::Float(value) => write!(f, "{value}"),
            ConstValue::Char(value) => write!(f, "'{value}'"),
            ConstValue::String(value) => write!(f, "\"{value}\""),
        }
    }
}
