use super::Parser;
use crate::context::Context;
use crate::error::Result;
use crate::types::{AnyCollection, AnySet, SequenceShape, Shape, TypeDescriptor, TypeInfo};
use crate::value::Value;
use std::any::Any;
use std::rc::Rc;

/// Serves every type declaring [AnyCollection] as supertype
///
/// Elements are converted one by one with the parser resolved for the element type.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectionParser;

impl CollectionParser {
    pub fn shared() -> Rc<dyn Parser> {
        Rc::new(Self)
    }

    /// Convert each element of the raw sequence into `element`
    pub(crate) fn load_elements(
        &self,
        cx: &Context<'_>,
        element: &TypeInfo,
        raw: &Value,
    ) -> Result<Vec<Box<dyn Any>>> {
        let Value::Sequence(items) = raw else {
            return Err(cx.unexpected_type("sequence", raw));
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| cx.index(index).load_info(element, item))
            .collect()
    }

    pub(crate) fn dump_elements(
        &self,
        cx: &Context<'_>,
        shape: &SequenceShape,
        requested: &TypeInfo,
        value: &dyn Any,
    ) -> Result<Value> {
        let element = shape.element();
        let elements = shape
            .elements(value)
            .ok_or_else(|| cx.type_mismatch(&requested.descriptor(), None))?;

        elements
            .into_iter()
            .enumerate()
            .map(|(index, item)| cx.index(index).dump_info(&element, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence)
    }
}

fn sequence_shape(
    cx: &Context<'_>,
    requested: &TypeInfo,
    raw: Option<&Value>,
) -> Result<SequenceShape> {
    match requested.shape() {
        Shape::Sequence(shape) | Shape::Array(shape) => Ok(shape),
        _ => Err(cx.no_parser(requested, raw)),
    }
}

impl Parser for CollectionParser {
    fn target(&self) -> TypeDescriptor {
        TypeDescriptor::of::<AnyCollection>()
    }

    fn load(&self, cx: &Context<'_>, requested: &TypeInfo, raw: &Value) -> Result<Box<dyn Any>> {
        let shape = sequence_shape(cx, requested, Some(raw))?;
        let elements = self.load_elements(cx, &shape.element(), raw)?;

        shape
            .assemble(elements)
            .ok_or_else(|| cx.type_mismatch(&requested.descriptor(), Some(raw)))
    }

    fn dump(&self, cx: &Context<'_>, requested: &TypeInfo, value: &dyn Any) -> Result<Value> {
        let shape = sequence_shape(cx, requested, None)?;
        self.dump_elements(cx, &shape, requested, value)
    }
}

/// Serves every type declaring [AnySet] as supertype
///
/// Sets are stored as sequences. Loading goes through the collection parser and lets the set
/// type drop duplicates, dumping emits the set's iteration order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetParser {
    collection: CollectionParser,
}

impl SetParser {
    pub fn shared() -> Rc<dyn Parser> {
        Rc::new(Self::default())
    }
}

impl Parser for SetParser {
    fn target(&self) -> TypeDescriptor {
        TypeDescriptor::of::<AnySet>()
    }

    fn load(&self, cx: &Context<'_>, requested: &TypeInfo, raw: &Value) -> Result<Box<dyn Any>> {
        let shape = sequence_shape(cx, requested, Some(raw))?;
        let elements = self.collection.load_elements(cx, &shape.element(), raw)?;
        let loaded = elements.len();

        let set = shape
            .assemble(elements)
            .ok_or_else(|| cx.type_mismatch(&requested.descriptor(), Some(raw)))?;
        tracing::trace!(path = cx.path(), loaded, "elements collected into set");

        Ok(set)
    }

    fn dump(&self, cx: &Context<'_>, requested: &TypeInfo, value: &dyn Any) -> Result<Value> {
        self.collection.dump(cx, requested, value)
    }
}
