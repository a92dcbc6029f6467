//! parser registry
//!
//! An ordered list of parsers, at most one per target type. Resolution for a requested type:
//!
//! 1. enumerations get a fresh [EnumParser]
//! 2. arrays get a fresh [ArrayParser] without element hint
//! 3. [crate::tree::ConfigTree] resolves to nothing, trees are stored structurally
//! 4. the first parser whose target is exactly the requested type
//! 5. the first parser whose target is one of the requested type's supertypes
//!
//! Step 5 depends on registration order. A type declaring several supertypes is served by
//! whichever of their parsers was registered first.
//!
//! The registry always ends with exactly one [StructuralParser]. Every mutation restores that.
//! The fallback targets [AnyStructure], so only types implementing
//! [Structure](crate::parsers::Structure) reach it through step 5. An opaque type without a
//! parser of its own resolves to nothing and fails to convert.
use crate::parsers::{ArrayParser, EnumParser, Parser, StructuralParser, DEFAULT_PARSERS};
use crate::types::{AnyStructure, Shape, TypeDescriptor, TypeInfo, Typed};
use std::rc::Rc;

#[derive(Clone)]
pub struct ParserRegistry {
    parsers: Vec<Rc<dyn Parser>>,
}

impl ParserRegistry {
    /// A registry holding nothing but the structural fallback
    pub fn new() -> Self {
        let mut registry = Self {
            parsers: Vec::new(),
        };
        registry.normalize();
        registry
    }

    /// A registry with [DEFAULT_PARSERS]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_table(DEFAULT_PARSERS);
        registry
    }

    /// Append parsers whose target is not yet registered
    ///
    /// Duplicates are dropped, the first registration for a type stays in place.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn add_parsers(&mut self, parsers: impl IntoIterator<Item = Rc<dyn Parser>>) -> &mut Self {
        for parser in parsers {
            let target = parser.target();
            if self.contains(&target) {
                tracing::trace!(parser = target.name(), "parser already registered");
                continue;
            }

            tracing::debug!(parser = target.name(), "registering parser");
            self.parsers.push(parser);
        }

        self.normalize();
        self
    }

    pub fn add_parser(&mut self, parser: impl Parser + 'static) -> &mut Self {
        self.add_parsers([Rc::new(parser) as Rc<dyn Parser>])
    }

    /// Remove the parsers registered for the targets of `parsers`
    pub fn remove_parsers(
        &mut self,
        parsers: impl IntoIterator<Item = Rc<dyn Parser>>,
    ) -> &mut Self {
        let targets: Vec<_> = parsers.into_iter().map(|parser| parser.target()).collect();
        self.remove_types(&targets)
    }

    /// Remove the parsers registered for exactly these types
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn remove_types(&mut self, targets: &[TypeDescriptor]) -> &mut Self {
        self.parsers.retain(|parser| {
            let target = parser.target();
            let keep = !targets.contains(&target);
            if !keep {
                tracing::debug!(parser = target.name(), "removing parser");
            }
            keep
        });

        self.normalize();
        self
    }

    /// Register every parser of a table, in table order
    pub fn register_table(&mut self, table: &[fn() -> Rc<dyn Parser>]) -> &mut Self {
        self.add_parsers(table.iter().map(|make| make()))
    }

    pub fn unregister_table(&mut self, table: &[fn() -> Rc<dyn Parser>]) -> &mut Self {
        self.remove_parsers(table.iter().map(|make| make()))
    }

    /// All parsers in resolution order, the structural fallback last
    pub fn parsers(&self) -> &[Rc<dyn Parser>] {
        &self.parsers
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Never true, the fallback is always present
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// A parser is registered for exactly `target`
    pub fn contains(&self, target: &TypeDescriptor) -> bool {
        self.get(target).is_some()
    }

    /// The parser registered for exactly `target`
    pub fn get(&self, target: &TypeDescriptor) -> Option<&Rc<dyn Parser>> {
        self.parsers.iter().find(|parser| parser.target() == *target)
    }

    pub fn resolve<T: Typed>(&self) -> Option<Rc<dyn Parser>> {
        self.resolve_info(&T::type_info())
    }

    pub fn resolve_info(&self, info: &TypeInfo) -> Option<Rc<dyn Parser>> {
        let resolved = match info.shape() {
            Shape::Enum(shape) => {
                Some(Rc::new(EnumParser::new(info.descriptor(), shape)) as Rc<dyn Parser>)
            }
            Shape::Array(_) => {
                Some(Rc::new(ArrayParser::new(info.descriptor())) as Rc<dyn Parser>)
            }
            Shape::Tree => None,
            _ => self
                .get(&info.descriptor())
                .or_else(|| {
                    self.parsers
                        .iter()
                        .find(|parser| info.is_assignable_to(&parser.target()))
                })
                .cloned(),
        };

        match &resolved {
            Some(parser) => tracing::trace!(
                ty = info.name(),
                parser = parser.target().name(),
                "resolved parser"
            ),
            None => tracing::trace!(ty = info.name(), "no parser"),
        }

        resolved
    }

    /// Make the structural fallback the one and only last parser
    fn normalize(&mut self) {
        let fallback = TypeDescriptor::of::<AnyStructure>();
        if self.parsers.last().is_some_and(|last| last.target() == fallback) {
            return;
        }

        self.parsers.retain(|parser| parser.target() != fallback);
        self.parsers.push(StructuralParser::shared());
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.parsers.iter().map(|parser| parser.target()))
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parsers::{CollectionParser, MapParser, ScalarParser, SetParser, ValueParser};
    use crate::tree::ConfigTree;
    use crate::types::{AnyCollection, AnySet};
    use pretty_assertions::assert_eq;

    fn targets(registry: &ParserRegistry) -> Vec<TypeDescriptor> {
        registry.parsers().iter().map(|parser| parser.target()).collect()
    }

    fn last_is_fallback(registry: &ParserRegistry) -> bool {
        registry
            .parsers()
            .last()
            .is_some_and(|last| last.target() == TypeDescriptor::of::<AnyStructure>())
    }

    #[test]
    fn new_registry_only_holds_the_fallback() {
        let registry = ParserRegistry::new();
        assert_eq!(targets(&registry), vec![TypeDescriptor::of::<AnyStructure>()]);
    }

    #[test]
    fn duplicates_are_dropped() {
        let mut registry = ParserRegistry::new();
        registry.add_parser(ScalarParser::<u8>::new());
        registry.add_parser(ScalarParser::<u8>::new());
        registry.add_parsers([ValueParser::shared(), ScalarParser::<u8>::shared()]);

        assert_eq!(
            targets(&registry),
            vec![
                TypeDescriptor::of::<u8>(),
                TypeDescriptor::of::<crate::value::Value>(),
                TypeDescriptor::of::<AnyStructure>(),
            ]
        );
    }

    #[test]
    fn fallback_survives_mutation() {
        let mut registry = ParserRegistry::with_defaults();
        assert!(last_is_fallback(&registry));

        registry.remove_types(&[TypeDescriptor::of::<AnyStructure>()]);
        assert!(last_is_fallback(&registry));

        registry.add_parser(ScalarParser::<u8>::new());
        assert!(last_is_fallback(&registry));

        registry.add_parser(StructuralParser);
        let fallbacks = targets(&registry)
            .into_iter()
            .filter(|target| *target == TypeDescriptor::of::<AnyStructure>())
            .count();
        assert_eq!(fallbacks, 1);
    }

    #[test]
    fn removal_by_type() {
        let mut registry = ParserRegistry::with_defaults();
        let before = registry.len();

        registry.remove_parsers([CollectionParser::shared()]);
        assert_eq!(registry.len(), before - 1);
        assert!(!registry.contains(&TypeDescriptor::of::<AnyCollection>()));
        assert!(registry.resolve::<Vec<u8>>().is_none());

        registry.unregister_table(DEFAULT_PARSERS);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn exact_match_beats_supertype() {
        let registry = ParserRegistry::with_defaults();
        let parser = registry.resolve::<u16>().unwrap();
        assert_eq!(parser.target(), TypeDescriptor::of::<u16>());

        let parser = registry.resolve::<Vec<u16>>().unwrap();
        assert_eq!(parser.target(), TypeDescriptor::of::<AnyCollection>());
    }

    #[test]
    fn earlier_supertype_parser_wins() {
        let registry = ParserRegistry::with_defaults();
        let parser = registry.resolve::<std::collections::HashSet<u16>>().unwrap();
        assert_eq!(parser.target(), TypeDescriptor::of::<AnySet>());

        let mut registry = ParserRegistry::new();
        registry.add_parsers([CollectionParser::shared(), SetParser::shared()]);
        let parser = registry.resolve::<std::collections::HashSet<u16>>().unwrap();
        assert_eq!(parser.target(), TypeDescriptor::of::<AnyCollection>());
    }

    #[test]
    fn synthesized_and_missing_parsers() {
        let registry = ParserRegistry::with_defaults();

        let parser = registry.resolve::<[u8; 4]>().unwrap();
        assert_eq!(parser.target(), TypeDescriptor::of::<[u8; 4]>());

        assert!(registry.resolve::<ConfigTree>().is_none());

        let mut registry = ParserRegistry::new();
        registry.add_parser(MapParser);
        assert!(registry.resolve::<u8>().is_none());
    }
}
