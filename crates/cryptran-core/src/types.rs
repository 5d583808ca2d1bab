//! Static type descriptors.
//!
//! Every expression and declaration in the lowered tree carries a [`Type`].
//! Equality is structural, so two independently built `uint8[]` compare
//! equal and hash to the same bucket.

use std::fmt;

/// Scalar types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    /// Integer of 8, 16, 32 or 64 bits.
    Int {
        width: u8,
        signed: bool,
    },
    /// Float of 32 or 64 bits.
    Float {
        width: u8,
    },
    String,
    Void,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(Primitive),
    Sequence(Box<Type>),
    Optional(Box<Type>),
    /// Class, record or enum, resolved against the framework catalogue or
    /// the classes of the current program.
    Named(String),
    Map(Box<Type>, Box<Type>),
    Function {
        params: Vec<Type>,
        ret: Box<Type>,
    },
    /// Not yet resolved. Never survives lowering.
    Unknown,
}

impl Type {
    pub fn bool() -> Self {
        Self::Primitive(Primitive::Bool)
    }

    pub fn int(width: u8, signed: bool) -> Self {
        Self::Primitive(Primitive::Int { width, signed })
    }

    pub fn u8() -> Self {
        Self::int(8, false)
    }

    pub fn u16() -> Self {
        Self::int(16, false)
    }

    pub fn u32() -> Self {
        Self::int(32, false)
    }

    pub fn u64() -> Self {
        Self::int(64, false)
    }

    pub fn i32() -> Self {
        Self::int(32, true)
    }

    pub fn float(width: u8) -> Self {
        Self::Primitive(Primitive::Float { width })
    }

    pub fn f64() -> Self {
        Self::float(64)
    }

    pub fn string() -> Self {
        Self::Primitive(Primitive::String)
    }

    pub fn void() -> Self {
        Self::Primitive(Primitive::Void)
    }

    pub fn seq(element: Type) -> Self {
        Self::Sequence(Box::new(element))
    }

    pub fn bytes() -> Self {
        Self::seq(Self::u8())
    }

    pub fn words() -> Self {
        Self::seq(Self::u32())
    }

    /// Wraps in `Optional` unless already optional.
    pub fn optional(inner: Type) -> Self {
        match inner {
            Self::Optional(_) => inner,
            other => Self::Optional(Box::new(other)),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn map(key: Type, value: Type) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    pub fn func(params: Vec<Type>, ret: Type) -> Self {
        Self::Function {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::Bool))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::String))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::Void))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::Int { .. }))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::Float { .. }))
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::Int { signed: true, .. }))
    }

    /// Bit width of an integer or float type.
    pub fn width(&self) -> Option<u8> {
        match self {
            Self::Primitive(Primitive::Int { width, .. } | Primitive::Float { width }) => {
                Some(*width)
            }
            _ => None,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(..))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function { .. })
    }

    /// Element type of a sequence.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Self::Sequence(inner) => Some(inner),
            _ => None,
        }
    }

    /// Value type of a map.
    pub fn map_value(&self) -> Option<&Type> {
        match self {
            Self::Map(_, value) => Some(value),
            _ => None,
        }
    }

    /// Strips one level of `Optional`.
    pub fn unwrap_optional(&self) -> &Type {
        match self {
            Self::Optional(inner) => inner,
            other => other,
        }
    }

    pub fn named_str(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }

    /// True if `Unknown` appears anywhere inside.
    pub fn contains_unknown(&self) -> bool {
        match self {
            Self::Unknown => true,
            Self::Primitive(_) | Self::Named(_) => false,
            Self::Sequence(inner) | Self::Optional(inner) => inner.contains_unknown(),
            Self::Map(key, value) => key.contains_unknown() || value.contains_unknown(),
            Self::Function { params, ret } => {
                params.iter().any(Type::contains_unknown) || ret.contains_unknown()
            }
        }
    }

    /// Replaces every `Unknown` hole with `fill`.
    pub fn fill_unknown(&self, fill: &Type) -> Type {
        match self {
            Self::Unknown => fill.clone(),
            Self::Primitive(_) | Self::Named(_) => self.clone(),
            Self::Sequence(inner) => Self::seq(inner.fill_unknown(fill)),
            Self::Optional(inner) => Self::optional(inner.fill_unknown(fill)),
            Self::Map(key, value) => Self::map(key.fill_unknown(fill), value.fill_unknown(fill)),
            Self::Function { params, ret } => Self::func(
                params.iter().map(|p| p.fill_unknown(fill)).collect(),
                ret.fill_unknown(fill),
            ),
        }
    }

    /// Smallest unsigned integer type that holds `value`.
    pub fn smallest_unsigned(value: u64) -> Type {
        if value <= u8::MAX as u64 {
            Self::u8()
        } else if value <= u16::MAX as u64 {
            Self::u16()
        } else if value <= u32::MAX as u64 {
            Self::u32()
        } else {
            Self::u64()
        }
    }

    /// Needs parentheses when used as the operand of `[]` or `?`.
    fn needs_group(&self) -> bool {
        matches!(self, Self::Function { .. })
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Bool => write!(f, "bool"),
            Primitive::Int { width, signed } => {
                let prefix = if *signed { "int" } else { "uint" };
                write!(f, "{prefix}{width}")
            }
            Primitive::Float { width } => write!(f, "float{width}"),
            Primitive::String => write!(f, "string"),
            Primitive::Void => write!(f, "void"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{p}"),
            Type::Sequence(inner) if inner.needs_group() => write!(f, "({inner})[]"),
            Type::Sequence(inner) => write!(f, "{inner}[]"),
            Type::Optional(inner) if inner.needs_group() => write!(f, "({inner})?"),
            Type::Optional(inner) => write!(f, "{inner}?"),
            Type::Named(name) => write!(f, "{name}"),
            Type::Map(key, value) => write!(f, "map<{key}, {value}>"),
            Type::Function { params, ret } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") => {ret}")
            }
            Type::Unknown => write!(f, "unknown"),
        }
    }
}
