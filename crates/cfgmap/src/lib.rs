//! # cfgmap - typed access to yaml configuration trees
//!
//! ## Introduction for developers
//!
//! Read this to understand how `cfgmap` works internally.
//!
//! ### Values and trees
//!
//! A yaml document is decoded by [serde_yaml] and turned into a [value::Value]: mappings,
//! sequences and scalars, nothing else. The root mapping becomes a [tree::ConfigTree]. Nested
//! mappings become nested trees ("sections") which remember their dotted path from the root.
//!
//! ```yaml
//! server:
//!   listen:
//!     host: localhost
//!     port: 8080
//!   tags: [web, public]
//! ```
//!
//! | **path**                  | **stored as**                    |
//! |---------------------------|----------------------------------|
//! | `server`                  | section, path `server`           |
//! | `server.listen`           | section, path `server.listen`    |
//! | `server.listen.port`      | `Value::Integer(8080)`           |
//! | `server.tags`             | `Value::Sequence(..)`            |
//!
//! Writing to `a.b.c` creates the sections `a` and `a.b` on the way.
//!
//! ### Types
//!
//! Typed reads (`tree.get_as::<u16>("server.listen.port")`) need to find a parser for the
//! requested type at runtime. Every readable type implements [types::Typed], which describes it
//! with a [types::TypeInfo]:
//!
//! - its identity ([types::TypeDescriptor])
//! - its [types::Shape]: opaque, enum, array, sequence, map or structure, plus function tables to
//!   take values of that shape apart and put them back together
//! - its supertypes, for example `HashSet<T>` is an [types::AnySet] and an [types::AnyCollection]
//!
//! ### Parsers and resolution
//!
//! A [parsers::Parser] converts between [value::Value] and one target type. The
//! [registry::ParserRegistry] holds them in registration order and resolves a parser for a
//! requested type (see the module docs for the exact steps). Parsers for composite types ask the
//! registry again for their element types, so resolution recurses through the whole value.
//!
//! The registry always ends with [parsers::StructuralParser], which stores any
//! [parsers::Structure] as a mapping of its fields.
//!
//! ### Errors
//!
//! Conversion failures are [error::ConversionError]s carrying the dotted path, the field name and
//! the offending raw value. Nothing is recovered internally: the first failure aborts the whole
//! read.
//!
//! ### Files
//!
//! [file::FileConfig] wraps a root tree together with the file it was loaded from.
pub mod context;
pub mod error;
pub mod file;
pub mod messages;
pub mod parsers;
pub mod registry;
pub mod tree;
pub mod types;
mod util;
pub mod value;
