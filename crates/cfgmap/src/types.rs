//! type descriptions
//!
//! Parsers are looked up by type. Rust has no runtime reflection, so every type that can be read
//! from or written to a [crate::tree::ConfigTree] implements [Typed] and describes itself with a
//! [TypeInfo]:
//!
//! - a [TypeDescriptor] (its `TypeId` and name), used for exact registry lookups
//! - a [Shape], telling the specialized parsers how to take it apart and put it back together
//! - a list of supertypes, used for the assignable-from fallback during resolution
//!
//! Supertypes are family markers such as [AnyCollection] or [AnyStructure]. A parser registered
//! for a marker serves every type that declares that marker.
//!
//! Collections, maps, enums and structures describe their contents through capability traits
//! ([Sequence], [Dictionary], [Enumeration], [Structure]) instead of field introspection.
use crate::error::Result;
use crate::parsers::structure::{FieldReader, FieldWriter, Structure};
use crate::value::Value;
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::path::PathBuf;

/// Identity of a type
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Supertype of all dynamically sized sequences (`Vec`, `VecDeque`, sets)
pub enum AnyCollection {}

/// Supertype of all sets
pub enum AnySet {}

/// Supertype of all string keyed maps
pub enum AnyMap {}

/// Supertype of all [Structure]s, served by the structural fallback parser
pub enum AnyStructure {}

/// A type that can be requested from a configuration tree
pub trait Typed: Any + Sized {
    fn type_info() -> TypeInfo;
}

#[derive(Clone, Debug)]
pub struct TypeInfo {
    descriptor: TypeDescriptor,
    shape: Shape,
    supertypes: Vec<TypeDescriptor>,
}

impl TypeInfo {
    pub fn new(descriptor: TypeDescriptor, shape: Shape) -> Self {
        Self {
            descriptor,
            shape,
            supertypes: Vec::new(),
        }
    }

    /// A type only dedicated parsers know how to convert
    pub fn opaque<T: Any>() -> Self {
        Self::new(TypeDescriptor::of::<T>(), Shape::Opaque)
    }

    pub fn enumeration<E: Enumeration>() -> Self {
        Self::new(TypeDescriptor::of::<E>(), Shape::Enum(EnumShape::of::<E>()))
    }

    pub fn structure<S: Structure>() -> Self {
        Self::new(
            TypeDescriptor::of::<S>(),
            Shape::Structure(StructureShape::of::<S>()),
        )
        .with_supertype::<AnyStructure>()
    }

    /// Declare `S` as a supertype
    ///
    /// Order matters only for documentation, resolution scans the registry order.
    pub fn with_supertype<S: ?Sized + 'static>(mut self) -> Self {
        self.supertypes.push(TypeDescriptor::of::<S>());
        self
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        self.descriptor
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name()
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn supertypes(&self) -> &[TypeDescriptor] {
        &self.supertypes
    }

    /// `target` is this type or one of its declared supertypes
    pub fn is_assignable_to(&self, target: &TypeDescriptor) -> bool {
        self.descriptor == *target || self.supertypes.contains(target)
    }
}

#[derive(Clone, Copy)]
pub enum Shape {
    /// Only converted by a parser registered for the type itself
    Opaque,
    /// A [crate::tree::ConfigTree], handled structurally instead of by a parser
    Tree,
    Enum(EnumShape),
    /// Fixed size containers
    Array(SequenceShape),
    /// Dynamically sized containers
    Sequence(SequenceShape),
    Map(MapShape),
    Structure(StructureShape),
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Shape::Opaque => "Opaque",
            Shape::Tree => "Tree",
            Shape::Enum(_) => "Enum",
            Shape::Array(_) => "Array",
            Shape::Sequence(_) => "Sequence",
            Shape::Map(_) => "Map",
            Shape::Structure(_) => "Structure",
        })
    }
}

/// A container of elements of a single type
pub trait Sequence: Typed {
    type Element: Typed;

    /// Length every instance must have, if any
    fn fixed_len() -> Option<usize> {
        None
    }

    /// `None` when the elements do not fit the container
    fn from_elements(elements: Vec<Self::Element>) -> Option<Self>;

    fn elements(&self) -> Vec<&Self::Element>;
}

/// A string keyed map
pub trait Dictionary: Typed {
    type Value: Typed;

    fn from_entries(entries: Vec<(String, Self::Value)>) -> Self;

    fn entries(&self) -> Vec<(&str, &Self::Value)>;
}

/// A fieldless enum with symbolic names
pub trait Enumeration: Typed + Clone {
    /// All variants in declaration order
    const VARIANTS: &'static [Self];

    /// Name used in documents
    fn name(&self) -> &'static str;
}

/// Type erased [Sequence]
#[derive(Clone, Copy)]
pub struct SequenceShape {
    element: fn() -> TypeInfo,
    fixed_len: Option<usize>,
    assemble: fn(Vec<Box<dyn Any>>) -> Option<Box<dyn Any>>,
    elements: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
}

impl SequenceShape {
    pub fn of<S: Sequence>() -> Self {
        Self {
            element: <S::Element as Typed>::type_info,
            fixed_len: S::fixed_len(),
            assemble: assemble_sequence::<S>,
            elements: sequence_elements::<S>,
        }
    }

    pub fn element(&self) -> TypeInfo {
        (self.element)()
    }

    pub fn fixed_len(&self) -> Option<usize> {
        self.fixed_len
    }

    pub fn assemble(&self, elements: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
        (self.assemble)(elements)
    }

    pub fn elements<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        (self.elements)(value)
    }
}

fn assemble_sequence<S: Sequence>(elements: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
    let elements = elements
        .into_iter()
        .map(|element| element.downcast::<S::Element>().ok().map(|element| *element))
        .collect::<Option<Vec<_>>>()?;

    S::from_elements(elements).map(|sequence| Box::new(sequence) as Box<dyn Any>)
}

fn sequence_elements<S: Sequence>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
    let sequence = value.downcast_ref::<S>()?;
    Some(
        sequence
            .elements()
            .into_iter()
            .map(|element| element as &dyn Any)
            .collect(),
    )
}

/// Type erased [Dictionary]
#[derive(Clone, Copy)]
pub struct MapShape {
    value: fn() -> TypeInfo,
    assemble: fn(Vec<(String, Box<dyn Any>)>) -> Option<Box<dyn Any>>,
    entries: fn(&dyn Any) -> Option<Vec<(&str, &dyn Any)>>,
}

impl MapShape {
    pub fn of<D: Dictionary>() -> Self {
        Self {
            value: <D::Value as Typed>::type_info,
            assemble: assemble_map::<D>,
            entries: map_entries::<D>,
        }
    }

    pub fn value(&self) -> TypeInfo {
        (self.value)()
    }

    pub fn assemble(&self, entries: Vec<(String, Box<dyn Any>)>) -> Option<Box<dyn Any>> {
        (self.assemble)(entries)
    }

    pub fn entries<'a>(&self, value: &'a dyn Any) -> Option<Vec<(&'a str, &'a dyn Any)>> {
        (self.entries)(value)
    }
}

fn assemble_map<D: Dictionary>(entries: Vec<(String, Box<dyn Any>)>) -> Option<Box<dyn Any>> {
    let entries = entries
        .into_iter()
        .map(|(key, value)| value.downcast::<D::Value>().ok().map(|value| (key, *value)))
        .collect::<Option<Vec<_>>>()?;

    Some(Box::new(D::from_entries(entries)) as Box<dyn Any>)
}

fn map_entries<D: Dictionary>(value: &dyn Any) -> Option<Vec<(&str, &dyn Any)>> {
    let map = value.downcast_ref::<D>()?;
    Some(
        map.entries()
            .into_iter()
            .map(|(key, value)| (key, value as &dyn Any))
            .collect(),
    )
}

/// Type erased [Enumeration]
#[derive(Clone, Copy)]
pub struct EnumShape {
    names: fn() -> Vec<&'static str>,
    variant: fn(usize) -> Option<Box<dyn Any>>,
    name_of: fn(&dyn Any) -> Option<&'static str>,
}

impl EnumShape {
    pub fn of<E: Enumeration>() -> Self {
        Self {
            names: enum_names::<E>,
            variant: enum_variant::<E>,
            name_of: enum_name_of::<E>,
        }
    }

    /// Symbolic names in declaration order
    pub fn names(&self) -> Vec<&'static str> {
        (self.names)()
    }

    pub fn variant(&self, index: usize) -> Option<Box<dyn Any>> {
        (self.variant)(index)
    }

    pub fn name_of(&self, value: &dyn Any) -> Option<&'static str> {
        (self.name_of)(value)
    }
}

impl std::fmt::Debug for EnumShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EnumShape").field(&self.names()).finish()
    }
}

fn enum_names<E: Enumeration>() -> Vec<&'static str> {
    E::VARIANTS.iter().map(Enumeration::name).collect()
}

fn enum_variant<E: Enumeration>(index: usize) -> Option<Box<dyn Any>> {
    E::VARIANTS
        .get(index)
        .map(|variant| Box::new(variant.clone()) as Box<dyn Any>)
}

fn enum_name_of<E: Enumeration>(value: &dyn Any) -> Option<&'static str> {
    value.downcast_ref::<E>().map(Enumeration::name)
}

/// Type erased [Structure]
#[derive(Clone, Copy)]
pub struct StructureShape {
    default: fn() -> Box<dyn Any>,
    load: fn(&mut dyn Any, &mut FieldReader<'_>) -> Result<()>,
    dump: fn(&dyn Any, &mut FieldWriter<'_>) -> Result<()>,
}

impl StructureShape {
    pub fn of<S: Structure>() -> Self {
        Self {
            default: structure_default::<S>,
            load: structure_load::<S>,
            dump: structure_dump::<S>,
        }
    }

    /// A default constructed instance
    pub fn default_value(&self) -> Box<dyn Any> {
        (self.default)()
    }

    pub fn load(&self, target: &mut dyn Any, fields: &mut FieldReader<'_>) -> Result<()> {
        (self.load)(target, fields)
    }

    pub fn dump(&self, value: &dyn Any, fields: &mut FieldWriter<'_>) -> Result<()> {
        (self.dump)(value, fields)
    }
}

fn structure_default<S: Structure>() -> Box<dyn Any> {
    Box::new(S::default())
}

fn structure_load<S: Structure>(target: &mut dyn Any, fields: &mut FieldReader<'_>) -> Result<()> {
    match target.downcast_mut::<S>() {
        Some(target) => target.load_fields(fields),
        None => Err(fields.context().type_mismatch(&TypeDescriptor::of::<S>(), None)),
    }
}

fn structure_dump<S: Structure>(value: &dyn Any, fields: &mut FieldWriter<'_>) -> Result<()> {
    match value.downcast_ref::<S>() {
        Some(value) => value.dump_fields(fields),
        None => Err(fields.context().type_mismatch(&TypeDescriptor::of::<S>(), None)),
    }
}

macro_rules! opaque {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Typed for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::opaque::<Self>()
                }
            }
        )+
    };
}

opaque!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, char, String, PathBuf,
    Value,
);

impl<T: Typed> Typed for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            TypeDescriptor::of::<Self>(),
            Shape::Sequence(SequenceShape::of::<Self>()),
        )
        .with_supertype::<AnyCollection>()
    }
}

impl<T: Typed> Sequence for Vec<T> {
    type Element = T;

    fn from_elements(elements: Vec<T>) -> Option<Self> {
        Some(elements)
    }

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: Typed> Typed for VecDeque<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            TypeDescriptor::of::<Self>(),
            Shape::Sequence(SequenceShape::of::<Self>()),
        )
        .with_supertype::<AnyCollection>()
    }
}

impl<T: Typed> Sequence for VecDeque<T> {
    type Element = T;

    fn from_elements(elements: Vec<T>) -> Option<Self> {
        Some(elements.into())
    }

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: Typed + Eq + Hash> Typed for HashSet<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            TypeDescriptor::of::<Self>(),
            Shape::Sequence(SequenceShape::of::<Self>()),
        )
        .with_supertype::<AnySet>()
        .with_supertype::<AnyCollection>()
    }
}

impl<T: Typed + Eq + Hash> Sequence for HashSet<T> {
    type Element = T;

    fn from_elements(elements: Vec<T>) -> Option<Self> {
        Some(elements.into_iter().collect())
    }

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: Typed + Ord> Typed for BTreeSet<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            TypeDescriptor::of::<Self>(),
            Shape::Sequence(SequenceShape::of::<Self>()),
        )
        .with_supertype::<AnySet>()
        .with_supertype::<AnyCollection>()
    }
}

impl<T: Typed + Ord> Sequence for BTreeSet<T> {
    type Element = T;

    fn from_elements(elements: Vec<T>) -> Option<Self> {
        Some(elements.into_iter().collect())
    }

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            TypeDescriptor::of::<Self>(),
            Shape::Array(SequenceShape::of::<Self>()),
        )
    }
}

impl<T: Typed, const N: usize> Sequence for [T; N] {
    type Element = T;

    fn fixed_len() -> Option<usize> {
        Some(N)
    }

    fn from_elements(elements: Vec<T>) -> Option<Self> {
        elements.try_into().ok()
    }

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: Typed> Typed for Box<[T]> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            TypeDescriptor::of::<Self>(),
            Shape::Array(SequenceShape::of::<Self>()),
        )
    }
}

impl<T: Typed> Sequence for Box<[T]> {
    type Element = T;

    fn from_elements(elements: Vec<T>) -> Option<Self> {
        Some(elements.into_boxed_slice())
    }

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

macro_rules! dictionary {
    ($($map:ident),+ $(,)?) => {
        $(
            impl<T: Typed> Typed for $map<String, T> {
                fn type_info() -> TypeInfo {
                    TypeInfo::new(TypeDescriptor::of::<Self>(), Shape::Map(MapShape::of::<Self>()))
                        .with_supertype::<AnyMap>()
                }
            }

            impl<T: Typed> Dictionary for $map<String, T> {
                type Value = T;

                fn from_entries(entries: Vec<(String, T)>) -> Self {
                    entries.into_iter().collect()
                }

                fn entries(&self) -> Vec<(&str, &T)> {
                    self.iter().map(|(key, value)| (key.as_str(), value)).collect()
                }
            }
        )+
    };
}

dictionary!(IndexMap, HashMap, BTreeMap);

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn descriptors_compare_by_type() {
        assert_eq!(TypeDescriptor::of::<u8>(), TypeDescriptor::of::<u8>());
        assert_ne!(TypeDescriptor::of::<u8>(), TypeDescriptor::of::<i8>());
    }

    #[test]
    fn sets_are_collections() {
        let info = HashSet::<String>::type_info();
        assert!(info.is_assignable_to(&TypeDescriptor::of::<AnySet>()));
        assert!(info.is_assignable_to(&TypeDescriptor::of::<AnyCollection>()));
        assert!(!info.is_assignable_to(&TypeDescriptor::of::<AnyMap>()));

        let info = Vec::<String>::type_info();
        assert!(!info.is_assignable_to(&TypeDescriptor::of::<AnySet>()));
    }

    #[test]
    fn arrays_check_their_length() {
        let Shape::Array(shape) = <[u8; 2]>::type_info().shape() else {
            panic!("arrays must have an array shape");
        };
        assert_eq!(shape.fixed_len(), Some(2));

        let too_short: Vec<Box<dyn Any>> = vec![Box::new(1u8)];
        assert!(shape.assemble(too_short).is_none());

        let fitting: Vec<Box<dyn Any>> = vec![Box::new(1u8), Box::new(2u8)];
        let array = shape.assemble(fitting).unwrap();
        assert_eq!(array.downcast_ref::<[u8; 2]>(), Some(&[1, 2]));
    }

    #[test]
    fn assemble_rejects_foreign_elements() {
        let Shape::Sequence(shape) = Vec::<u8>::type_info().shape() else {
            panic!("vec must have a sequence shape");
        };
        let foreign: Vec<Box<dyn Any>> = vec![Box::new("text")];
        assert!(shape.assemble(foreign).is_none());
    }
}
