use super::Parser;
use crate::context::Context;
use crate::error::Result;
use crate::types::{AnyMap, Shape, TypeDescriptor, TypeInfo};
use crate::value::Value;
use indexmap::IndexMap;
use std::any::Any;
use std::rc::Rc;

/// Serves every string keyed map declaring [AnyMap] as supertype
#[derive(Debug, Default, Clone, Copy)]
pub struct MapParser;

impl MapParser {
    pub fn shared() -> Rc<dyn Parser> {
        Rc::new(Self)
    }
}

impl Parser for MapParser {
    fn target(&self) -> TypeDescriptor {
        TypeDescriptor::of::<AnyMap>()
    }

    fn load(&self, cx: &Context<'_>, requested: &TypeInfo, raw: &Value) -> Result<Box<dyn Any>> {
        let Shape::Map(shape) = requested.shape() else {
            return Err(cx.no_parser(requested, Some(raw)));
        };
        let Value::Mapping(entries) = raw else {
            return Err(cx.unexpected_type("mapping", raw));
        };

        let value = shape.value();
        let entries = entries
            .iter()
            .map(|(key, raw)| {
                cx.child(key)
                    .load_info(&value, raw)
                    .map(|loaded| (key.clone(), loaded))
            })
            .collect::<Result<Vec<_>>>()?;

        shape
            .assemble(entries)
            .ok_or_else(|| cx.type_mismatch(&requested.descriptor(), Some(raw)))
    }

    fn dump(&self, cx: &Context<'_>, requested: &TypeInfo, value: &dyn Any) -> Result<Value> {
        let Shape::Map(shape) = requested.shape() else {
            return Err(cx.no_parser(requested, None));
        };

        let value_info = shape.value();
        let entries = shape
            .entries(value)
            .ok_or_else(|| cx.type_mismatch(&requested.descriptor(), None))?;

        entries
            .into_iter()
            .map(|(key, value)| {
                cx.child(key)
                    .dump_info(&value_info, value)
                    .map(|raw| (key.to_string(), raw))
            })
            .collect::<Result<IndexMap<_, _>>>()
            .map(Value::Mapping)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::ParserRegistry;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn loads_entries_in_document_order() {
        let registry = Rc::new(ParserRegistry::with_defaults());
        let cx = Context::new(&registry, "limits");
        let raw = Value::from_yaml_str("b: 2\na: 1\n").unwrap();

        let limits: IndexMap<String, u32> = cx.load(&raw).unwrap();
        assert_eq!(limits.keys().collect::<Vec<_>>(), vec!["b", "a"]);

        let limits: BTreeMap<String, u32> = cx.load(&raw).unwrap();
        assert_eq!(
            cx.dump(&limits).unwrap(),
            Value::from_yaml_str("a: 1\nb: 2\n").unwrap()
        );
    }

    #[test]
    fn entry_errors_carry_their_key() {
        let registry = Rc::new(ParserRegistry::with_defaults());
        let cx = Context::new(&registry, "limits");
        let raw = Value::from_yaml_str("cpu: many\n").unwrap();

        let err = cx.load::<IndexMap<String, u32>>(&raw).unwrap_err();
        let crate::error::Error::Conversion(err) = err else {
            panic!("expected conversion error");
        };
        assert_eq!(err.kind(), ErrorKind::UnexpectedType);
        assert_eq!(err.full_path(), "limits.cpu");
    }
}
