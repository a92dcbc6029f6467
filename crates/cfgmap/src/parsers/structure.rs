//! structural fallback
//!
//! Types without a dedicated parser can still be stored as long as they implement [Structure].
//! They are written as a mapping of their fields and read back by filling a default constructed
//! instance field by field.
use super::Parser;
use crate::context::Context;
use crate::error::Result;
use crate::types::{AnyStructure, Shape, TypeDescriptor, TypeInfo, Typed};
use crate::value::Value;
use indexmap::IndexMap;
use std::any::Any;
use std::rc::Rc;

/// A record type stored as a mapping of its fields
///
/// ```
/// use cfgmap::parsers::{FieldReader, FieldWriter, Structure};
/// use cfgmap::types::{TypeInfo, Typed};
///
/// #[derive(Default)]
/// struct Listen {
///     host: String,
///     port: u16,
/// }
///
/// impl Typed for Listen {
///     fn type_info() -> TypeInfo {
///         TypeInfo::structure::<Self>()
///     }
/// }
///
/// impl Structure for Listen {
///     fn load_fields(&mut self, fields: &mut FieldReader<'_>) -> cfgmap::error::Result<()> {
///         fields.field("host", &mut self.host)?;
///         fields.field("port", &mut self.port)
///     }
///
///     fn dump_fields(&self, fields: &mut FieldWriter<'_>) -> cfgmap::error::Result<()> {
///         fields.field("host", &self.host)?;
///         fields.field("port", &self.port)
///     }
/// }
/// ```
pub trait Structure: Default + Typed {
    fn load_fields(&mut self, fields: &mut FieldReader<'_>) -> Result<()>;

    fn dump_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()>;
}

/// Reads fields out of a mapping
pub struct FieldReader<'a> {
    cx: &'a Context<'a>,
    entries: &'a IndexMap<String, Value>,
    visited: Vec<String>,
}

impl<'a> FieldReader<'a> {
    pub fn new(cx: &'a Context<'a>, entries: &'a IndexMap<String, Value>) -> Self {
        Self {
            cx,
            entries,
            visited: Vec::new(),
        }
    }

    pub fn context(&self) -> &Context<'a> {
        self.cx
    }

    /// Overwrite `slot` with the field's value
    ///
    /// Absent and null fields leave `slot` untouched.
    pub fn field<T: Typed>(&mut self, name: &str, slot: &mut T) -> Result<()> {
        if let Some(value) = self.read(name)? {
            *slot = value;
        }
        Ok(())
    }

    pub fn optional<T: Typed>(&mut self, name: &str, slot: &mut Option<T>) -> Result<()> {
        *slot = self.read(name)?;
        Ok(())
    }

    /// Fails with [crate::error::ErrorKind::MissingRequiredValue] if the field is absent or null
    pub fn required<T: Typed>(&mut self, name: &str) -> Result<T> {
        self.read(name)?
            .ok_or_else(|| self.cx.child(name).missing())
    }

    fn read<T: Typed>(&mut self, name: &str) -> Result<Option<T>> {
        self.visited.push(name.to_string());
        match self.entries.get(name) {
            Some(raw) if !raw.is_null() => self.cx.child(name).load(raw).map(Some),
            _ => Ok(None),
        }
    }

    /// Keys of the mapping no field asked for
    pub fn unknown(&self) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|key| !self.visited.contains(*key))
            .map(String::as_str)
            .collect()
    }
}

/// Collects fields into a mapping
pub struct FieldWriter<'a> {
    cx: &'a Context<'a>,
    entries: IndexMap<String, Value>,
}

impl<'a> FieldWriter<'a> {
    pub fn new(cx: &'a Context<'a>) -> Self {
        Self {
            cx,
            entries: IndexMap::new(),
        }
    }

    pub fn context(&self) -> &Context<'a> {
        self.cx
    }

    pub fn field<T: Typed>(&mut self, name: &str, value: &T) -> Result<()> {
        let raw = self.cx.child(name).dump(value)?;
        self.entries.insert(name.to_string(), raw);
        Ok(())
    }

    /// `None` is left out entirely
    pub fn optional<T: Typed>(&mut self, name: &str, value: &Option<T>) -> Result<()> {
        match value {
            Some(value) => self.field(name, value),
            None => Ok(()),
        }
    }

    pub fn into_entries(self) -> IndexMap<String, Value> {
        self.entries
    }
}

/// Catch-all parser for [Structure]s
///
/// A registry always ends with exactly one of these.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralParser;

impl StructuralParser {
    pub fn shared() -> Rc<dyn Parser> {
        Rc::new(Self)
    }
}

impl Parser for StructuralParser {
    fn target(&self) -> TypeDescriptor {
        TypeDescriptor::of::<AnyStructure>()
    }

    fn load(&self, cx: &Context<'_>, requested: &TypeInfo, raw: &Value) -> Result<Box<dyn Any>> {
        let Shape::Structure(shape) = requested.shape() else {
            return Err(cx.no_parser(requested, Some(raw)));
        };
        let Value::Mapping(entries) = raw else {
            return Err(cx.unexpected_type("mapping", raw));
        };

        let mut value = shape.default_value();
        let mut fields = FieldReader::new(cx, entries);
        shape.load(&mut *value, &mut fields)?;

        for key in fields.unknown() {
            tracing::debug!(path = cx.path(), key, ty = requested.name(), "ignoring unknown field");
        }

        Ok(value)
    }

    fn dump(&self, cx: &Context<'_>, requested: &TypeInfo, value: &dyn Any) -> Result<Value> {
        let Shape::Structure(shape) = requested.shape() else {
            return Err(cx.no_parser(requested, None));
        };

        let mut fields = FieldWriter::new(cx);
        shape.dump(value, &mut fields)?;
        Ok(Value::Mapping(fields.into_entries()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::ParserRegistry;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, PartialEq)]
    struct Listen {
        host: String,
        port: u16,
        backlog: Option<u32>,
    }

    impl Typed for Listen {
        fn type_info() -> TypeInfo {
            TypeInfo::structure::<Self>()
        }
    }

    impl Structure for Listen {
        fn load_fields(&mut self, fields: &mut FieldReader<'_>) -> Result<()> {
            fields.field("host", &mut self.host)?;
            self.port = fields.required("port")?;
            fields.optional("backlog", &mut self.backlog)
        }

        fn dump_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
            fields.field("host", &self.host)?;
            fields.field("port", &self.port)?;
            fields.optional("backlog", &self.backlog)
        }
    }

    fn registry() -> Rc<ParserRegistry> {
        Rc::new(ParserRegistry::with_defaults())
    }

    #[test]
    fn loads_fields_from_mapping() {
        let registry = registry();
        let cx = Context::new(&registry, "listen");
        let raw = Value::from_yaml_str("host: localhost\nport: 8080\nextra: true\n").unwrap();

        let listen: Listen = cx.load(&raw).unwrap();
        assert_eq!(
            listen,
            Listen {
                host: "localhost".to_string(),
                port: 8080,
                backlog: None,
            }
        );
    }

    #[test]
    fn dump_skips_absent_optionals() {
        let registry = registry();
        let cx = Context::new(&registry, "listen");
        let listen = Listen {
            host: "0.0.0.0".to_string(),
            port: 80,
            backlog: None,
        };

        let raw = cx.dump(&listen).unwrap();
        assert_eq!(raw, Value::from_yaml_str("host: 0.0.0.0\nport: 80\n").unwrap());
        assert_eq!(cx.load::<Listen>(&raw).unwrap(), listen);
    }

    #[test]
    fn missing_required_field() {
        let registry = registry();
        let cx = Context::new(&registry, "listen");
        let raw = Value::from_yaml_str("host: localhost\n").unwrap();

        let err = cx.load::<Listen>(&raw).unwrap_err();
        let crate::error::Error::Conversion(err) = err else {
            panic!("expected conversion error");
        };
        assert_eq!(err.kind(), ErrorKind::MissingRequiredValue);
        assert_eq!(err.full_path(), "listen.port");
    }

    #[test]
    fn rejects_scalars() {
        let registry = registry();
        let cx = Context::new(&registry, "listen");

        let err = cx.load::<Listen>(&Value::from("localhost:80")).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedType));
    }
}
