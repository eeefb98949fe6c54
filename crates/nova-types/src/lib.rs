//! Java type model and type-relation queries.
//!
//! Types are plain, immutable descriptors ([`Type`]). Their nominal parts ([`ClassId`],
//! [`TypeVarId`]) are resolved through a [`TypeEnv`], which supplies every structural fact the
//! queries need (superclasses, interfaces, declared bounds). Nothing in this crate reflects over
//! a live program: callers either build a [`TypeStore`] directly or load one through
//! `nova-types-bridge`.
//!
//! The relation queries live on [`TypeRelations`]; the free functions re-exported here are thin
//! wrappers using the default [`RelationConfig`].

#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

mod bounds;
mod config;
mod error;
pub mod java;
mod relation;
mod store;
mod value;

pub use bounds::{contains_type_variables, implicit_lower_bounds, implicit_upper_bounds};
pub use config::{ConfigError, RelationConfig};
pub use error::{Result, TypeError};
pub use java::format::{format_type, TypeDisplay};
pub use java::helpers::{instantiate_as_supertype, substitute};
pub use relation::{
    get_array_component_type, get_implicit_bounds, get_raw_type, get_type_arguments,
    is_array_type, is_assignable, is_instance, normalize_upper_bounds, TypeArgs, TypeRelations,
};
pub use store::TypeStore;
pub use value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(u32);

impl TypeVarId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    /// The Java keyword spelling of this primitive (`int`, `boolean`, ...).
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Binary name of the boxed counterpart (`java.lang.Integer` for `int`).
    pub fn wrapper_binary_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    /// Identity or widening primitive conversion (JLS 5.1.2).
    pub fn widens_to(self, target: PrimitiveType) -> bool {
        use PrimitiveType::*;

        if self == target {
            return true;
        }
        match (self, target) {
            (Boolean, _) | (_, Boolean) => false,
            // Nothing widens to `char`, not even `byte`.
            (_, Char) => false,
            (Char, to) => to.numeric_rank() >= Int.numeric_rank(),
            (from, to) => from.numeric_rank() < to.numeric_rank(),
        }
    }

    fn numeric_rank(self) -> u8 {
        match self {
            PrimitiveType::Boolean => 0,
            PrimitiveType::Byte => 1,
            PrimitiveType::Short | PrimitiveType::Char => 2,
            PrimitiveType::Int => 3,
            PrimitiveType::Long => 4,
            PrimitiveType::Float => 5,
            PrimitiveType::Double => 6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    /// `?`
    Unbounded,
    /// `? extends T`
    Extends(Box<Type>),
    /// `? super T`
    Super(Box<Type>),
}

/// A nominal class or interface type. An empty `args` list is the raw (or non-generic) form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(Box<Type>),
    TypeVar(TypeVarId),
    /// Only meaningful as a type argument.
    Wildcard(WildcardBound),
    Intersection(Vec<Type>),
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Self {
        Type::Class(ClassType { def, args })
    }

    pub fn array(component: Type) -> Self {
        Type::Array(Box::new(component))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    /// `true` for class types that carry type arguments (`List<String>`, not `List`).
    pub fn is_parameterized(&self) -> bool {
        matches!(self, Type::Class(ClassType { args, .. }) if !args.is_empty())
    }

    /// The class this type names, ignoring type arguments.
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(ClassType { def, .. }) => Some(*def),
            _ => None,
        }
    }
}

impl From<PrimitiveType> for Type {
    fn from(value: PrimitiveType) -> Self {
        Type::Primitive(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    /// Binary name, e.g. `java.util.List`.
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    /// Declared upper bounds. Empty means the implicit `Object` bound.
    pub upper_bounds: Vec<Type>,
    pub lower_bound: Option<Type>,
}

/// Classes the relation queries need to know about by identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub string: ClassId,
    pub number: ClassId,
    pub boolean: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub character: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
}

impl WellKnownTypes {
    pub fn wrapper(&self, prim: PrimitiveType) -> ClassId {
        match prim {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
        }
    }

    /// The primitive boxed by `class`, if `class` is one of the eight wrappers.
    pub fn unwrap(&self, class: ClassId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|prim| self.wrapper(*prim) == class)
    }

    /// Classes every array type is a subtype of (JLS 4.10.3).
    pub fn is_array_supertype(&self, class: ClassId) -> bool {
        class == self.object || class == self.cloneable || class == self.serializable
    }
}

/// `int` → `java.lang.Integer`; reference types are returned unchanged.
pub fn primitive_to_wrapper(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Primitive(prim) => Type::class(env.well_known().wrapper(*prim), vec![]),
        other => other.clone(),
    }
}

/// `java.lang.Integer` → `int`; `None` for anything that is not a raw wrapper class.
pub fn wrapper_to_primitive(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    match ty {
        Type::Class(ClassType { def, args }) if args.is_empty() => env.well_known().unwrap(*def),
        _ => None,
    }
}

/// Source of structural facts about classes and type variables.
///
/// Implementations must be pure lookups: the relation queries may call them any number of times
/// and in any order.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;

    /// Resolve a binary name. Implementations may also accept simple `java.lang` names.
    fn lookup_class(&self, name: &str) -> Option<ClassId>;

    /// The class declaring `id`, or `None` for method-level (or unknown) type variables.
    fn type_param_owner(&self, id: TypeVarId) -> Option<ClassId>;

    fn well_known(&self) -> &WellKnownTypes;
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_follows_jls_table() {
        use PrimitiveType::*;

        assert!(Byte.widens_to(Short));
        assert!(Byte.widens_to(Double));
        assert!(Char.widens_to(Int));
        assert!(Int.widens_to(Float));
        assert!(Long.widens_to(Float));

        assert!(!Byte.widens_to(Char));
        assert!(!Short.widens_to(Char));
        assert!(!Char.widens_to(Short));
        assert!(!Long.widens_to(Int));
        assert!(!Boolean.widens_to(Int));
        assert!(!Int.widens_to(Boolean));
    }

    #[test]
    fn wrapper_round_trip_through_well_known() {
        let store = TypeStore::with_minimal_jdk();
        for prim in PrimitiveType::ALL {
            let boxed = primitive_to_wrapper(&store, &Type::Primitive(prim));
            assert_eq!(wrapper_to_primitive(&store, &boxed), Some(prim));
            assert_eq!(
                store.lookup_class(prim.wrapper_binary_name()),
                boxed.class_id()
            );
        }
        let string = Type::class(store.well_known().string, vec![]);
        assert_eq!(wrapper_to_primitive(&store, &string), None);
    }
}
