use super::Parser;
use crate::context::Context;
use crate::error::Result;
use crate::types::{EnumShape, Enumeration, TypeDescriptor, TypeInfo};
use crate::value::Value;
use std::any::Any;

/// Parser for [Enumeration]s, stored as their symbolic name
///
/// Names are matched exactly first. If nothing matches, the first name that equals the input
/// ignoring ascii case wins.
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct EnumParser {
    target: TypeDescriptor,
    shape: EnumShape,
}

impl EnumParser {
    pub fn of<E: Enumeration>() -> Self {
        Self::new(TypeDescriptor::of::<E>(), EnumShape::of::<E>())
    }
}

impl Parser for EnumParser {
    fn target(&self) -> TypeDescriptor {
        self.target
    }

    fn load(&self, cx: &Context<'_>, _requested: &TypeInfo, raw: &Value) -> Result<Box<dyn Any>> {
        let Value::String(symbol) = raw else {
            return Err(cx.unexpected_type("string", raw));
        };

        let names = self.shape.names();
        let index = names
            .iter()
            .position(|name| name == symbol)
            .or_else(|| names.iter().position(|name| name.eq_ignore_ascii_case(symbol)));

        index
            .and_then(|index| self.shape.variant(index))
            .ok_or_else(|| cx.unknown_variant(&names, raw))
    }

    fn dump(&self, cx: &Context<'_>, _requested: &TypeInfo, value: &dyn Any) -> Result<Value> {
        self.shape
            .name_of(value)
            .map(Value::from)
            .ok_or_else(|| cx.type_mismatch(&self.target, None))
    }
}
