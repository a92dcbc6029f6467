//! parsers
//!
//! A [Parser] converts between a generic [Value] and one target type in both directions.
//! Parsers work type erased (`Box<dyn Any>`), the typed entry points are [Context::load] and
//! [Context::dump] or the tree accessors built on top of them.
//!
//! Specialized parsers ([CollectionParser], [SetParser], [ArrayParser], [EnumParser],
//! [MapParser]) take their element types from the requested [TypeInfo] and resolve element
//! parsers through the registry of the [Context] they are called with.
//! [StructuralParser] is the catch-all for [Structure]s.
use crate::context::Context;
use crate::error::Result;
use crate::tree::ConfigTree;
use crate::types::{TypeDescriptor, TypeInfo};
use crate::value::Value;
use std::any::Any;
use std::path::PathBuf;
use std::rc::Rc;

mod array;
mod collection;
mod enumeration;
mod map;
mod scalar;
pub(crate) mod structure;

pub use array::ArrayParser;
pub use collection::{CollectionParser, SetParser};
pub use enumeration::EnumParser;
pub use map::MapParser;
pub use scalar::{Mismatch, Scalar, ScalarParser, ValueParser};
pub use structure::{FieldReader, FieldWriter, StructuralParser, Structure};

/// Bidirectional conversion for a single target type
pub trait Parser {
    /// Type this parser is registered for
    fn target(&self) -> TypeDescriptor;

    /// Convert `raw` into the `requested` type
    ///
    /// `requested` is either [Parser::target] or a type declaring it as supertype. Type mismatches
    /// must be reported through the error constructors of `cx` so they carry the path.
    fn load(&self, cx: &Context<'_>, requested: &TypeInfo, raw: &Value) -> Result<Box<dyn Any>>;

    /// Inverse of [Parser::load]
    fn dump(&self, cx: &Context<'_>, requested: &TypeInfo, value: &dyn Any) -> Result<Value>;

    /// Read the value at `path` from `tree` and convert it
    ///
    /// Returns `None` when nothing (or null) is stored at `path`.
    fn load_from(
        &self,
        tree: &ConfigTree,
        path: &str,
        requested: &TypeInfo,
    ) -> Result<Option<Box<dyn Any>>> {
        match tree.get(path) {
            Some(raw) if !raw.is_null() => {
                self.load(&tree.context(path), requested, &raw).map(Some)
            }
            _ => Ok(None),
        }
    }
}

/// Parsers every [crate::registry::ParserRegistry::with_defaults] starts with, in registration
/// order
///
/// [SetParser] precedes [CollectionParser] so sets resolve to it rather than the more general
/// collection parser.
pub const DEFAULT_PARSERS: &[fn() -> Rc<dyn Parser>] = &[
    ScalarParser::<bool>::shared,
    ScalarParser::<i8>::shared,
    ScalarParser::<i16>::shared,
    ScalarParser::<i32>::shared,
    ScalarParser::<i64>::shared,
    ScalarParser::<isize>::shared,
    ScalarParser::<u8>::shared,
    ScalarParser::<u16>::shared,
    ScalarParser::<u32>::shared,
    ScalarParser::<u64>::shared,
    ScalarParser::<usize>::shared,
    ScalarParser::<f32>::shared,
    ScalarParser::<f64>::shared,
    ScalarParser::<char>::shared,
    ScalarParser::<String>::shared,
    ScalarParser::<PathBuf>::shared,
    ValueParser::shared,
    SetParser::shared,
    CollectionParser::shared,
    MapParser::shared,
];
