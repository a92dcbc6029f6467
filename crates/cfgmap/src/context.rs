//! conversion context
//!
//! A [Context] is handed to every parser. It knows the registry to resolve nested parsers from and
//! the dotted path of the value being converted, so every error can be attributed to it.
use crate::error::{ConversionError, Error, ErrorKind, Result};
use crate::messages::Message;
use crate::registry::ParserRegistry;
use crate::tree::ConfigTree;
use crate::types::{Shape, TypeDescriptor, TypeInfo, Typed};
use crate::util::join_path;
use crate::value::Value;
use std::any::Any;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct Context<'a> {
    registry: &'a Rc<ParserRegistry>,
    path: String,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a Rc<ParserRegistry>, path: impl Into<String>) -> Self {
        Self {
            registry,
            path: path.into(),
        }
    }

    pub fn registry(&self) -> &'a Rc<ParserRegistry> {
        self.registry
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Context of a mapping entry
    pub fn child(&self, key: &str) -> Context<'a> {
        Context::new(self.registry, join_path(&self.path, key))
    }

    /// Context of a sequence element
    pub fn index(&self, index: usize) -> Context<'a> {
        Context::new(self.registry, format!("{}[{index}]", self.path))
    }

    /// Convert `raw` into a `T`
    pub fn load<T: Typed>(&self, raw: &Value) -> Result<T> {
        let info = T::type_info();
        self.load_info(&info, raw)?
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| self.type_mismatch(&info.descriptor(), Some(raw)))
    }

    /// Convert `raw` into the type described by `info`
    ///
    /// The returned box always holds a value of exactly that type.
    #[tracing::instrument(level = "trace", skip_all, fields(path = %self.path, ty = info.name()))]
    pub fn load_info(&self, info: &TypeInfo, raw: &Value) -> Result<Box<dyn Any>> {
        if let Shape::Tree = info.shape() {
            let tree =
                ConfigTree::from_value_at(self.path.clone(), raw.clone(), self.registry.clone())?;
            return Ok(Box::new(tree));
        }

        let parser = self
            .registry
            .resolve_info(info)
            .ok_or_else(|| self.no_parser(info, Some(raw)))?;

        let loaded = parser.load(self, info, raw)?;
        if (*loaded).type_id() != info.descriptor().id() {
            return Err(self.wrong_output(&parser.target(), info, Some(raw)));
        }

        Ok(loaded)
    }

    /// Convert `value` back into a generic value
    pub fn dump<T: Typed>(&self, value: &T) -> Result<Value> {
        self.dump_info(&T::type_info(), value)
    }

    #[tracing::instrument(level = "trace", skip_all, fields(path = %self.path, ty = info.name()))]
    pub fn dump_info(&self, info: &TypeInfo, value: &dyn Any) -> Result<Value> {
        if let Shape::Tree = info.shape() {
            return value
                .downcast_ref::<ConfigTree>()
                .map(ConfigTree::to_value)
                .ok_or_else(|| self.type_mismatch(&info.descriptor(), None));
        }

        let parser = self
            .registry
            .resolve_info(info)
            .ok_or_else(|| self.no_parser(info, None))?;

        parser.dump(self, info, value)
    }

    pub fn error(&self, kind: ErrorKind, raw: Option<&Value>, message: impl Into<String>) -> Error {
        ConversionError::new(kind, &self.path, raw.cloned(), message).into()
    }

    /// `raw` does not have the shape `expected`
    pub fn unexpected_type(&self, expected: &str, raw: &Value) -> Error {
        self.error(
            ErrorKind::UnexpectedType,
            Some(raw),
            Message::UnexpectedType.format(&[("expected", expected), ("received", raw.kind())]),
        )
    }

    pub fn unknown_variant(&self, variants: &[&str], raw: &Value) -> Error {
        self.error(
            ErrorKind::UnexpectedType,
            Some(raw),
            Message::UnknownVariant.format(&[
                ("expected", &variants.join(", ")),
                ("received", &raw.to_string()),
            ]),
        )
    }

    pub fn array_length(&self, expected: usize, received: usize, raw: &Value) -> Error {
        self.error(
            ErrorKind::UnexpectedType,
            Some(raw),
            Message::ArrayLength.format(&[
                ("expected", &expected.to_string()),
                ("received", &received.to_string()),
            ]),
        )
    }

    pub fn out_of_range(&self, ty: &str, raw: &Value) -> Error {
        self.error(
            ErrorKind::TypeConversion,
            Some(raw),
            Message::OutOfRange.format(&[("type", ty)]),
        )
    }

    pub fn no_parser(&self, info: &TypeInfo, raw: Option<&Value>) -> Error {
        self.error(
            ErrorKind::TypeConversion,
            raw,
            Message::NoParser.format(&[("type", info.name())]),
        )
    }

    /// A value was not of the type the caller promised
    pub fn type_mismatch(&self, expected: &TypeDescriptor, raw: Option<&Value>) -> Error {
        self.error(
            ErrorKind::TypeConversion,
            raw,
            Message::TypeMismatch.format(&[("type", expected.name())]),
        )
    }

    fn wrong_output(&self, parser: &TypeDescriptor, info: &TypeInfo, raw: Option<&Value>) -> Error {
        self.error(
            ErrorKind::TypeConversion,
            raw,
            Message::WrongParserOutput.format(&[("parser", parser.name()), ("type", info.name())]),
        )
    }

    pub fn empty_evidence(&self, raw: &Value) -> Error {
        self.error(
            ErrorKind::EmptyCollectionEvidence,
            Some(raw),
            Message::CannotDecipherEmptyArray.format(&[]),
        )
    }

    pub fn missing(&self) -> Error {
        self.error(
            ErrorKind::MissingRequiredValue,
            None,
            Message::MissingValue.format(&[]),
        )
    }
}
