use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{error::Error, fmt};

/// The declared type of a parameter or return value.
///
/// Arguments are checked against these before they go on the wire, and
/// responses are checked against them before they reach the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Type {
    Nil,
    Bool,
    Int,
    Float,
    String,
    Array(Box<Type>),
    Optional(Box<Type>),
    /// A named record, encoded as a JSON object.
    Object(std::string::String),
    /// Anything JSON can carry.
    Any,
    /// The method completes later; the inner type is what it resolves to.
    Async(Box<Type>),
}

impl Type {
    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    pub fn optional(inner: Type) -> Self {
        Type::Optional(Box::new(inner))
    }

    pub fn object(name: impl Into<std::string::String>) -> Self {
        Type::Object(name.into())
    }

    pub fn async_of(inner: Type) -> Self {
        Type::Async(Box::new(inner))
    }

    fn name(&self) -> &'static str {
        use Type::*;
        match self {
            Nil => "Nil",
            Bool => "Bool",
            Int => "Int",
            Float => "Float",
            String => "String",
            Array(_) => "Array",
            Optional(_) => "Optional",
            Object(_) => "Object",
            Any => "Any",
            Async(_) => "Async",
        }
    }

    /// Whether `val` is a well-formed wire value of this type.
    pub fn admits(&self, val: &Value) -> bool {
        match (self, val) {
            (Type::Any, _) => true,
            (Type::Nil, Value::Null) => true,
            (Type::Bool, Value::Bool(_)) => true,
            (Type::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Type::Float, Value::Number(_)) => true,
            (Type::String, Value::String(_)) => true,
            (Type::Array(elem), Value::Array(items)) => items.iter().all(|v| elem.admits(v)),
            (Type::Optional(_), Value::Null) => true,
            (Type::Optional(inner), v) => inner.admits(v),
            (Type::Object(_), Value::Object(_)) => true,
            (Type::Async(inner), v) => inner.admits(v),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())?;
        match self {
            Type::Array(inner) | Type::Optional(inner) | Type::Async(inner) => {
                write!(f, "<{inner}>")?;
            }
            Type::Object(name) => write!(f, "({name})")?,
            _ => {}
        }
        Ok(())
    }
}

/// Rust types that know their declared wire type.
pub trait Typed {
    fn rpc_type() -> Type;
}

macro_rules! impl_typed {
    ($rpc_type:expr => $($rust_type:ty),+) => {
        $(
            impl Typed for $rust_type {
                fn rpc_type() -> Type {
                    $rpc_type
                }
            }
        )+
    };
}

impl_typed!(Type::Nil => ());
impl_typed!(Type::Bool => bool);
impl_typed!(Type::Int => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_typed!(Type::Float => f32, f64);
impl_typed!(Type::String => String, str, char);
impl_typed!(Type::Any => Value);

impl<T: Typed> Typed for Vec<T> {
    fn rpc_type() -> Type {
        Type::array(T::rpc_type())
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn rpc_type() -> Type {
        Type::array(T::rpc_type())
    }
}

impl<T: Typed> Typed for Option<T> {
    fn rpc_type() -> Type {
        Type::optional(T::rpc_type())
    }
}

impl<T: Typed + ?Sized> Typed for Box<T> {
    fn rpc_type() -> Type {
        T::rpc_type()
    }
}

impl<T: Typed + ?Sized> Typed for &T {
    fn rpc_type() -> Type {
        T::rpc_type()
    }
}

/// A positional argument list, serialized in declaration order.
pub trait Arguments {
    fn into_values(self) -> Result<Vec<Value>, serde_json::Error>;
}

impl Arguments for Vec<Value> {
    fn into_values(self) -> Result<Vec<Value>, serde_json::Error> {
        Ok(self)
    }
}

impl Arguments for () {
    fn into_values(self) -> Result<Vec<Value>, serde_json::Error> {
        Ok(Vec::new())
    }
}

macro_rules! impl_arguments {
    ($($name:ident),+) => {
        impl<$($name: Serialize),+> Arguments for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_values(self) -> Result<Vec<Value>, serde_json::Error> {
                let ($($name,)+) = self;
                Ok(vec![$(serde_json::to_value($name)?),+])
            }
        }
    };
}

impl_arguments!(A);
impl_arguments!(A, B);
impl_arguments!(A, B, C);
impl_arguments!(A, B, C, D);
impl_arguments!(A, B, C, D, E);
impl_arguments!(A, B, C, D, E, F);
impl_arguments!(A, B, C, D, E, F, G);
impl_arguments!(A, B, C, D, E, F, G, H);

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMismatch {
    value: Value,
    expected_type: Type,
}

impl TypeMismatch {
    pub fn new(value: Value, expected_type: Type) -> Self {
        Self {
            value,
            expected_type,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn expected_type(&self) -> &Type {
        &self.expected_type
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Type error: {} :/: {}", self.value, self.expected_type)
    }
}

impl Error for TypeMismatch {}
