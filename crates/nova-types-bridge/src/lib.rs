#![forbid(unsafe_code)]

//! Loads externally supplied class stubs into a [`TypeStore`] on demand.
//!
//! The relation queries in `nova-types` never discover types on their own; this crate is the
//! adapter that turns structural facts from some other source into store entries.

use std::collections::{HashMap, HashSet};

use nova_types::{
    substitute, ClassDef, ClassId, ClassKind, Type, TypeEnv, TypeParamDef, TypeStore, TypeVarId,
    WildcardBound,
};
use thiserror::Error;

mod stub;

pub use stub::{JsonTypeProvider, TypeDefStub, TypeParamStub, TypeProvider, TypeRef, WildcardRef};

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{class}` refers to undeclared type variable `{name}`")]
    UnknownTypeVariable { class: String, name: String },
    #[error("`{class}` has a supertype that is not a class type")]
    InvalidSupertype { class: String },
}

/// Loads external [`TypeProvider`] stubs into a [`TypeStore`] on demand.
pub struct ExternalTypeLoader<'a> {
    pub store: &'a mut TypeStore,
    pub provider: &'a dyn TypeProvider,
    in_progress: HashSet<String>,
    loaded: HashSet<String>,
}

impl<'a> ExternalTypeLoader<'a> {
    pub fn new(store: &'a mut TypeStore, provider: &'a dyn TypeProvider) -> Self {
        Self {
            store,
            provider,
            in_progress: HashSet::new(),
            loaded: HashSet::new(),
        }
    }

    /// Ensure `binary_name` is present in the store; returns its `ClassId` if found/loaded.
    ///
    /// Classes already defined in the store are never overwritten. Classes referenced by the
    /// stub (supertypes, bound and argument types) are loaded transitively; references the
    /// provider cannot resolve stay interned-but-undefined. A stub that fails to convert also
    /// leaves its class interned-but-undefined, without allocating any type parameters.
    pub fn ensure_class(&mut self, binary_name: &str) -> Result<Option<ClassId>, LoaderError> {
        if self.loaded.contains(binary_name) || self.in_progress.contains(binary_name) {
            return Ok(self.store.class_id(binary_name));
        }

        let existing = self.store.class_id(binary_name);
        if let Some(id) = existing {
            if self.store.is_defined(id) {
                return Ok(Some(id));
            }
        }

        let Some(stub) = self.provider.lookup_type(binary_name) else {
            tracing::debug!(target: "nova.types.bridge", binary_name, "no stub for class");
            return Ok(existing);
        };

        // Intern before converting so self-references (`class Node<N extends Node<N>>`) resolve.
        let id = self.store.intern_class_id(binary_name);
        self.in_progress.insert(binary_name.to_string());
        let def = self.build_class_def(&stub);
        self.in_progress.remove(binary_name);

        self.store.define_class(id, def?);
        self.loaded.insert(binary_name.to_string());
        tracing::trace!(target: "nova.types.bridge", binary_name, ?id, "loaded class stub");

        Ok(Some(id))
    }

    fn build_class_def(&mut self, stub: &TypeDefStub) -> Result<ClassDef, LoaderError> {
        // Type parameters are converted against provisional ids (counting down from `u32::MAX`) so
        // self-referential bounds (`T extends Comparable<T>`) resolve. Real ids are allocated only
        // once the whole stub has converted, so a failed load leaves no type params behind.
        let provisional: Vec<TypeVarId> = (0..stub.type_params.len())
            .map(|idx| TypeVarId::from_raw(u32::MAX - idx as u32))
            .collect();
        let type_vars: HashMap<String, TypeVarId> = stub
            .type_params
            .iter()
            .map(|tp| tp.name.clone())
            .zip(provisional.iter().copied())
            .collect();

        let mut bounds = Vec::with_capacity(stub.type_params.len());
        for tp in &stub.type_params {
            bounds.push(
                tp.bounds
                    .iter()
                    .map(|bound| self.convert(stub, bound, &type_vars))
                    .collect::<Result<Vec<_>, _>>()?,
            );
        }
        let super_class = match stub.kind {
            ClassKind::Interface => None,
            ClassKind::Class => match &stub.super_class {
                Some(sup) => Some(self.convert_supertype(stub, sup, &type_vars)?),
                None if stub.binary_name == "java.lang.Object" => None,
                None => Some(Type::class(self.store.well_known().object, vec![])),
            },
        };
        let interfaces = stub
            .interfaces
            .iter()
            .map(|iface| self.convert_supertype(stub, iface, &type_vars))
            .collect::<Result<Vec<_>, _>>()?;

        let mut type_params = Vec::with_capacity(stub.type_params.len());
        for tp in &stub.type_params {
            type_params.push(self.store.add_type_param(tp.name.clone(), vec![]));
        }
        let subst: HashMap<TypeVarId, Type> = provisional
            .into_iter()
            .zip(type_params.iter().map(|id| Type::TypeVar(*id)))
            .collect();
        for ((tp, id), upper_bounds) in stub.type_params.iter().zip(&type_params).zip(bounds) {
            self.store.define_type_param(
                *id,
                TypeParamDef {
                    name: tp.name.clone(),
                    upper_bounds: upper_bounds
                        .iter()
                        .map(|bound| substitute(bound, &subst))
                        .collect(),
                    lower_bound: None,
                },
            );
        }

        Ok(ClassDef {
            name: stub.binary_name.clone(),
            kind: stub.kind,
            type_params,
            super_class: super_class.map(|ty| substitute(&ty, &subst)),
            interfaces: interfaces
                .iter()
                .map(|ty| substitute(ty, &subst))
                .collect(),
        })
    }

    fn convert_supertype(
        &mut self,
        stub: &TypeDefStub,
        ty: &TypeRef,
        type_vars: &HashMap<String, TypeVarId>,
    ) -> Result<Type, LoaderError> {
        if !matches!(ty, TypeRef::Class { .. }) {
            return Err(LoaderError::InvalidSupertype {
                class: stub.binary_name.clone(),
            });
        }
        self.convert(stub, ty, type_vars)
    }

    fn convert(
        &mut self,
        stub: &TypeDefStub,
        ty: &TypeRef,
        type_vars: &HashMap<String, TypeVarId>,
    ) -> Result<Type, LoaderError> {
        Ok(match ty {
            TypeRef::Primitive { name } => Type::Primitive(*name),
            TypeRef::Class { name, args } => {
                let id = self.class_ref(name)?;
                let args = args
                    .iter()
                    .map(|arg| self.convert(stub, arg, type_vars))
                    .collect::<Result<Vec<_>, _>>()?;
                Type::class(id, args)
            }
            TypeRef::Array { component } => Type::array(self.convert(stub, component, type_vars)?),
            TypeRef::TypeVar { name } => match type_vars.get(name) {
                Some(id) => Type::TypeVar(*id),
                None => {
                    return Err(LoaderError::UnknownTypeVariable {
                        class: stub.binary_name.clone(),
                        name: name.clone(),
                    })
                }
            },
            TypeRef::Wildcard { bound: None } => Type::Wildcard(WildcardBound::Unbounded),
            TypeRef::Wildcard {
                bound: Some(WildcardRef::Extends(upper)),
            } => Type::Wildcard(WildcardBound::Extends(Box::new(
                self.convert(stub, upper, type_vars)?,
            ))),
            TypeRef::Wildcard {
                bound: Some(WildcardRef::Super(lower)),
            } => Type::Wildcard(WildcardBound::Super(Box::new(
                self.convert(stub, lower, type_vars)?,
            ))),
        })
    }

    fn class_ref(&mut self, binary_name: &str) -> Result<ClassId, LoaderError> {
        match self.ensure_class(binary_name)? {
            Some(id) => Ok(id),
            None => Ok(self.store.intern_class_id(binary_name)),
        }
    }
}
