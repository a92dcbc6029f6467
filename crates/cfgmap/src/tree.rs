//! configuration trees
//!
//! A [ConfigTree] stores generic values under string keys. Nested mappings are stored as nested
//! trees ("sections") that know their dotted path from the root, so errors raised while reading
//! a section point at the full path.
//!
//! Typed reads and writes go through the [ParserRegistry] the tree was created with.
use crate::context::Context;
use crate::error::{Error, Result};
use crate::parsers::Parser;
use crate::registry::ParserRegistry;
use crate::types::{Shape, TypeDescriptor, TypeInfo, Typed};
use crate::util::{join_path, split_path};
use crate::value::Value;
use indexmap::IndexMap;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct ConfigTree {
    /// dotted path from the root, empty for the root itself
    path: String,
    entries: IndexMap<String, Node>,
    registry: Rc<ParserRegistry>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Section(ConfigTree),
    Value(Value),
}

impl Node {
    pub fn as_section(&self) -> Option<&ConfigTree> {
        match self {
            Node::Section(section) => Some(section),
            Node::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Node::Section(_) => None,
            Node::Value(value) => Some(value),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Node::Section(section) => section.to_value(),
            Node::Value(value) => value.clone(),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Node::Section(section) => section.to_value(),
            Node::Value(value) => value,
        }
    }
}

impl ConfigTree {
    pub fn new(registry: Rc<ParserRegistry>) -> Self {
        Self::at(String::new(), registry)
    }

    fn at(path: String, registry: Rc<ParserRegistry>) -> Self {
        Self {
            path,
            entries: IndexMap::new(),
            registry,
        }
    }

    /// Build a tree from a decoded document
    ///
    /// The document must be a mapping. Null is accepted as the empty document.
    pub fn from_value(value: Value, registry: Rc<ParserRegistry>) -> Result<Self> {
        Self::from_value_at(String::new(), value, registry)
    }

    pub(crate) fn from_value_at(
        path: String,
        value: Value,
        registry: Rc<ParserRegistry>,
    ) -> Result<Self> {
        let entries = match value {
            Value::Null => IndexMap::new(),
            Value::Mapping(entries) => entries,
            other => return Err(Context::new(&registry, path).unexpected_type("mapping", &other)),
        };

        let mut tree = Self::at(path, registry);
        for (key, value) in entries {
            let node = tree.node_from(&key, value);
            tree.entries.insert(key, node);
        }

        Ok(tree)
    }

    /// Mappings become sections, everything else is stored as is
    fn node_from(&self, key: &str, value: Value) -> Node {
        match value {
            Value::Mapping(entries) => {
                let mut section = Self::at(join_path(&self.path, key), self.registry.clone());
                for (key, value) in entries {
                    let node = section.node_from(&key, value);
                    section.entries.insert(key, node);
                }
                Node::Section(section)
            }
            value => Node::Value(value),
        }
    }

    /// Dotted path of this tree from the root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of [ConfigTree::path]
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or_default()
    }

    pub fn registry(&self) -> &Rc<ParserRegistry> {
        &self.registry
    }

    /// Path of `path` relative to the root
    pub fn full_path(&self, path: &str) -> String {
        join_path(&self.path, path)
    }

    pub(crate) fn context(&self, path: &str) -> Context<'_> {
        Context::new(&self.registry, self.full_path(path))
    }

    pub fn node(&self, path: &str) -> Option<&Node> {
        let segments = split_path(path).ok()?;
        let (last, parents) = segments.split_last()?;

        let mut tree = self;
        for segment in parents {
            tree = tree.entries.get(*segment)?.as_section()?;
        }

        tree.entries.get(*last)
    }

    /// Raw value at `path`, sections are returned as mappings
    pub fn get(&self, path: &str) -> Option<Value> {
        self.node(path).map(Node::to_value)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    pub fn section(&self, path: &str) -> Option<&ConfigTree> {
        self.node(path)?.as_section()
    }

    pub fn section_mut(&mut self, path: &str) -> Option<&mut ConfigTree> {
        let segments = split_path(path).ok()?;

        let mut tree = self;
        for segment in segments {
            tree = match tree.entries.get_mut(segment)? {
                Node::Section(section) => section,
                Node::Value(_) => return None,
            };
        }

        Some(tree)
    }

    /// Read the value at `path` as a `T`
    ///
    /// Absent and null values are `Ok(None)`.
    pub fn get_opt_as<T: Typed>(&self, path: &str) -> Result<Option<T>> {
        match self.get(path) {
            Some(raw) if !raw.is_null() => self.context(path).load(&raw).map(Some),
            _ => Ok(None),
        }
    }

    /// Like [ConfigTree::get_opt_as] but absent values are an error
    pub fn get_as<T: Typed>(&self, path: &str) -> Result<T> {
        self.get_opt_as(path)?
            .ok_or_else(|| self.context(path).missing())
    }

    /// Read the value at `path` through `parser` instead of the resolved one
    pub fn get_with<T: Typed>(&self, path: &str, parser: &dyn Parser) -> Result<Option<T>> {
        let Some(loaded) = parser.load_from(self, path, &T::type_info())? else {
            return Ok(None);
        };

        loaded
            .downcast::<T>()
            .map(|value| Some(*value))
            .map_err(|_| {
                self.context(path)
                    .type_mismatch(&TypeDescriptor::of::<T>(), self.get(path).as_ref())
            })
    }

    /// Convert `value` with its parser and store it at `path`
    pub fn set<T: Typed>(&mut self, path: &str, value: &T) -> Result<()> {
        let raw = self.context(path).dump(value)?;
        self.set_value(path, raw)
    }

    /// Store a raw value at `path`
    ///
    /// Missing sections along the way are created, values in the way are replaced by sections.
    /// Storing null removes the entry.
    #[tracing::instrument(level = "debug", skip(self, value), fields(tree = %self.path))]
    pub fn set_value(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let segments = split_path(path)?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(Error::InvalidPath(path.to_string()));
        };

        self.store(parents, last, value.into());
        Ok(())
    }

    /// Store `value` under `last` in the section at `parents`, creating sections on the way
    fn store(&mut self, parents: &[&str], last: &str, value: Value) {
        let Some((segment, rest)) = parents.split_first() else {
            if value.is_null() {
                self.entries.shift_remove(last);
            } else {
                let node = self.node_from(last, value);
                self.entries.insert(last.to_string(), node);
            }
            return;
        };

        match self.entries.get_mut(*segment) {
            Some(Node::Section(section)) => section.store(rest, last, value),
            existing => {
                let path = join_path(&self.path, segment);
                if let Some(Node::Value(previous)) = existing {
                    tracing::debug!(%path, kind = previous.kind(), "replacing value with section");
                }

                let mut section = Self::at(path, self.registry.clone());
                section.store(rest, last, value);
                self.entries.insert(segment.to_string(), Node::Section(section));
            }
        }
    }

    /// Remove the entry at `path` and return what was stored there
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let segments = split_path(path).ok()?;
        let (last, parents) = segments.split_last()?;

        let mut tree = self;
        for segment in parents {
            tree = match tree.entries.get_mut(*segment)? {
                Node::Section(section) => section,
                Node::Value(_) => return None,
            };
        }

        tree.entries.shift_remove(*last).map(Node::into_value)
    }

    /// Keys in insertion order
    ///
    /// With `deep`, the dotted keys of all nested sections follow their section's key.
    pub fn keys(&self, deep: bool) -> Vec<String> {
        let mut keys = Vec::new();
        for (key, node) in &self.entries {
            keys.push(key.clone());
            if let (true, Node::Section(section)) = (deep, node) {
                keys.extend(section.keys(true).into_iter().map(|nested| join_path(key, &nested)));
            }
        }
        keys
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the whole tree as a mapping
    pub fn to_value(&self) -> Value {
        Value::Mapping(
            self.entries
                .iter()
                .map(|(key, node)| (key.clone(), node.to_value()))
                .collect(),
        )
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new(Rc::new(ParserRegistry::with_defaults()))
    }
}

/// Trees are equal when they hold the same entries at the same path, whatever their registries
impl PartialEq for ConfigTree {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.entries == other.entries
    }
}

impl Typed for ConfigTree {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeDescriptor::of::<Self>(), Shape::Tree)
    }
}
