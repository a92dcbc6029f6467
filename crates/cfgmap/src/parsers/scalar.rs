use super::Parser;
use crate::context::Context;
use crate::error::Result;
use crate::types::{TypeDescriptor, TypeInfo, Typed};
use crate::value::Value;
use std::any::Any;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::rc::Rc;

/// Why a scalar was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    /// wrong kind of value
    Shape,
    /// right kind, but it does not fit
    OutOfRange,
}

/// A type stored as a single scalar value
pub trait Scalar: Typed {
    /// Name used in error messages
    const EXPECTED: &'static str;

    fn from_value(raw: &Value) -> Result<Self, Mismatch>;

    fn to_value(&self) -> Value;
}

/// Parser for any [Scalar]
pub struct ScalarParser<T>(PhantomData<fn() -> T>);

impl<T: Scalar> ScalarParser<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    pub fn shared() -> Rc<dyn Parser> {
        Rc::new(Self::new())
    }
}

impl<T: Scalar> Default for ScalarParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Parser for ScalarParser<T> {
    fn target(&self) -> TypeDescriptor {
        TypeDescriptor::of::<T>()
    }

    fn load(&self, cx: &Context<'_>, _requested: &TypeInfo, raw: &Value) -> Result<Box<dyn Any>> {
        match T::from_value(raw) {
            Ok(value) => Ok(Box::new(value)),
            Err(Mismatch::Shape) => Err(cx.unexpected_type(T::EXPECTED, raw)),
            Err(Mismatch::OutOfRange) => Err(cx.out_of_range(T::EXPECTED, raw)),
        }
    }

    fn dump(&self, cx: &Context<'_>, _requested: &TypeInfo, value: &dyn Any) -> Result<Value> {
        value
            .downcast_ref::<T>()
            .map(T::to_value)
            .ok_or_else(|| cx.type_mismatch(&self.target(), None))
    }
}

/// Identity parser, keeps generic values as they are
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueParser;

impl ValueParser {
    pub fn shared() -> Rc<dyn Parser> {
        Rc::new(Self)
    }
}

impl Parser for ValueParser {
    fn target(&self) -> TypeDescriptor {
        TypeDescriptor::of::<Value>()
    }

    fn load(&self, _cx: &Context<'_>, _requested: &TypeInfo, raw: &Value) -> Result<Box<dyn Any>> {
        Ok(Box::new(raw.clone()))
    }

    fn dump(&self, cx: &Context<'_>, _requested: &TypeInfo, value: &dyn Any) -> Result<Value> {
        value
            .downcast_ref::<Value>()
            .cloned()
            .ok_or_else(|| cx.type_mismatch(&self.target(), None))
    }
}

macro_rules! integer {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Scalar for $ty {
                const EXPECTED: &'static str = stringify!($ty);

                fn from_value(raw: &Value) -> Result<Self, Mismatch> {
                    match raw {
                        Value::Integer(int) => {
                            <$ty>::try_from(*int).map_err(|_| Mismatch::OutOfRange)
                        }
                        _ => Err(Mismatch::Shape),
                    }
                }

                fn to_value(&self) -> Value {
                    Value::Integer(*self as i128)
                }
            }
        )+
    };
}

integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Scalar for f64 {
    const EXPECTED: &'static str = "f64";

    fn from_value(raw: &Value) -> Result<Self, Mismatch> {
        match raw {
            Value::Decimal(decimal) => Ok(*decimal),
            Value::Integer(int) => Ok(*int as f64),
            _ => Err(Mismatch::Shape),
        }
    }

    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }
}

impl Scalar for f32 {
    const EXPECTED: &'static str = "f32";

    fn from_value(raw: &Value) -> Result<Self, Mismatch> {
        f64::from_value(raw).map(|decimal| decimal as f32)
    }

    fn to_value(&self) -> Value {
        Value::Decimal(f64::from(*self))
    }
}

impl Scalar for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(raw: &Value) -> Result<Self, Mismatch> {
        match raw {
            Value::Boolean(b) => Ok(*b),
            _ => Err(Mismatch::Shape),
        }
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl Scalar for String {
    const EXPECTED: &'static str = "string";

    /// Numbers and booleans are accepted in their textual form
    fn from_value(raw: &Value) -> Result<Self, Mismatch> {
        match raw {
            Value::String(s) => Ok(s.clone()),
            Value::Integer(_) | Value::Decimal(_) | Value::Boolean(_) => Ok(raw.to_string()),
            _ => Err(Mismatch::Shape),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Scalar for char {
    const EXPECTED: &'static str = "single character";

    fn from_value(raw: &Value) -> Result<Self, Mismatch> {
        let Value::String(s) = raw else {
            return Err(Mismatch::Shape);
        };

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Mismatch::OutOfRange),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl Scalar for PathBuf {
    const EXPECTED: &'static str = "path";

    fn from_value(raw: &Value) -> Result<Self, Mismatch> {
        match raw {
            Value::String(s) => Ok(PathBuf::from(s)),
            _ => Err(Mismatch::Shape),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string_lossy().into_owned())
    }
}
