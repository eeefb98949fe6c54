use std::collections::HashMap;

use nova_types::{ClassKind, PrimitiveType};
use serde::{Deserialize, Serialize};

use crate::LoaderError;

/// Structural description of one class, as supplied by an external source (a classpath indexer,
/// a test fixture, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDefStub {
    pub binary_name: String,
    #[serde(default = "default_kind")]
    pub kind: ClassKind,
    #[serde(default)]
    pub type_params: Vec<TypeParamStub>,
    /// Ignored for interfaces. Classes without one extend `java.lang.Object`.
    #[serde(default)]
    pub super_class: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
}

fn default_kind() -> ClassKind {
    ClassKind::Class
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeParamStub {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<TypeRef>,
}

/// A type reference inside a stub. Classes are named by binary name and type variables by their
/// declared name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    Primitive {
        name: PrimitiveType,
    },
    Class {
        name: String,
        #[serde(default)]
        args: Vec<TypeRef>,
    },
    Array {
        component: Box<TypeRef>,
    },
    TypeVar {
        name: String,
    },
    Wildcard {
        #[serde(default)]
        bound: Option<WildcardRef>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardRef {
    Extends(Box<TypeRef>),
    Super(Box<TypeRef>),
}

impl TypeRef {
    pub fn class(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args,
        }
    }

    pub fn type_var(name: impl Into<String>) -> Self {
        TypeRef::TypeVar { name: name.into() }
    }
}

pub trait TypeProvider {
    fn lookup_type(&self, binary_name: &str) -> Option<TypeDefStub>;
}

/// A [`TypeProvider`] over a fixed set of stubs, typically read from a JSON array.
#[derive(Clone, Debug, Default)]
pub struct JsonTypeProvider {
    stubs: HashMap<String, TypeDefStub>,
}

impl JsonTypeProvider {
    pub fn from_json_str(text: &str) -> Result<Self, LoaderError> {
        let stubs: Vec<TypeDefStub> = serde_json::from_str(text)?;
        Ok(Self::from_stubs(stubs))
    }

    /// Later stubs win when two share a binary name.
    pub fn from_stubs(stubs: impl IntoIterator<Item = TypeDefStub>) -> Self {
        Self {
            stubs: stubs
                .into_iter()
                .map(|stub| (stub.binary_name.clone(), stub))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }
}

impl TypeProvider for JsonTypeProvider {
    fn lookup_type(&self, binary_name: &str) -> Option<TypeDefStub> {
        self.stubs.get(binary_name).cloned()
    }
}
