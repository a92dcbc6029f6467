use super::{CollectionParser, Parser};
use crate::context::Context;
use crate::error::Result;
use crate::types::{Sequence, Shape, TypeDescriptor, TypeInfo, Typed};
use crate::value::Value;
use std::any::Any;

/// Parser for fixed size containers (`[T; N]`, `Box<[T]>`)
///
/// Resolution creates these on the fly without an element hint. An empty sequence carries no
/// evidence of its element type, so such a parser refuses to build an array from it. Supply the
/// hint explicitly ([ArrayParser::with_element]) to accept empty sequences.
#[derive(Debug, Clone)]
pub struct ArrayParser {
    target: TypeDescriptor,
    element_hint: Option<TypeInfo>,
}

impl ArrayParser {
    pub fn new(target: TypeDescriptor) -> Self {
        Self {
            target,
            element_hint: None,
        }
    }

    pub fn of<A: Sequence>() -> Self {
        Self::new(TypeDescriptor::of::<A>())
    }

    /// Declare the element type up front
    pub fn with_element<E: Typed>(mut self) -> Self {
        self.element_hint = Some(E::type_info());
        self
    }
}

impl Parser for ArrayParser {
    fn target(&self) -> TypeDescriptor {
        self.target
    }

    fn load(&self, cx: &Context<'_>, requested: &TypeInfo, raw: &Value) -> Result<Box<dyn Any>> {
        let Shape::Array(shape) = requested.shape() else {
            return Err(cx.no_parser(requested, Some(raw)));
        };

        let Value::Sequence(items) = raw else {
            return Err(cx.unexpected_type("sequence", raw));
        };

        let element = match &self.element_hint {
            Some(hint) if hint.descriptor() == shape.element().descriptor() => hint.clone(),
            Some(hint) => return Err(cx.type_mismatch(&hint.descriptor(), Some(raw))),
            None if items.is_empty() => return Err(cx.empty_evidence(raw)),
            None => shape.element(),
        };

        if let Some(len) = shape.fixed_len() {
            if len != items.len() {
                return Err(cx.array_length(len, items.len(), raw));
            }
        }

        let elements = CollectionParser.load_elements(cx, &element, raw)?;
        shape
            .assemble(elements)
            .ok_or_else(|| cx.type_mismatch(&requested.descriptor(), Some(raw)))
    }

    fn dump(&self, cx: &Context<'_>, requested: &TypeInfo, value: &dyn Any) -> Result<Value> {
        let Shape::Array(shape) = requested.shape() else {
            return Err(cx.no_parser(requested, None));
        };

        CollectionParser.dump_elements(cx, &shape, requested, value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::ParserRegistry;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn loads_fixed_arrays() {
        let registry = Rc::new(ParserRegistry::with_defaults());
        let cx = Context::new(&registry, "origin");

        let origin: [i32; 3] = cx.load(&Value::from(vec![1i64, 2, 3])).unwrap();
        assert_eq!(origin, [1, 2, 3]);

        let err = cx
            .load::<[i32; 3]>(&Value::from(vec![1i64, 2]))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedType));
    }

    #[test]
    fn empty_sequence_without_hint_fails() {
        let registry = Rc::new(ParserRegistry::with_defaults());
        let cx = Context::new(&registry, "origin");

        let err = cx.load::<Box<[i32]>>(&Value::Sequence(vec![])).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::EmptyCollectionEvidence));

        let err = cx.load::<[i32; 0]>(&Value::Sequence(vec![])).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::EmptyCollectionEvidence));
    }

    #[test]
    fn empty_sequence_with_hint_loads() {
        let registry = Rc::new(ParserRegistry::with_defaults());
        let cx = Context::new(&registry, "origin");
        let parser = ArrayParser::of::<Box<[i32]>>().with_element::<i32>();

        let loaded = parser
            .load(&cx, &<Box<[i32]>>::type_info(), &Value::Sequence(vec![]))
            .unwrap();
        assert_eq!(
            loaded.downcast_ref::<Box<[i32]>>().map(|a| a.len()),
            Some(0)
        );
    }

    #[test]
    fn hint_must_match_element_type() {
        let registry = Rc::new(ParserRegistry::with_defaults());
        let cx = Context::new(&registry, "origin");
        let parser = ArrayParser::of::<Box<[i32]>>().with_element::<String>();

        let result = parser.load(&cx, &<Box<[i32]>>::type_info(), &Value::from(vec![1i64]));
        assert!(result.is_err());
    }
}
