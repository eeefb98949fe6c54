use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{Result, TypeError};
use crate::java::helpers::{instantiate_as_supertype, type_var_bounds};
use crate::{
    format_type, ClassDef, ClassId, ClassType, PrimitiveType, RelationConfig, Type, TypeEnv,
    TypeParamDef, TypeVarId, Value, WildcardBound,
};

/// Type-variable assignments, ordered by id so iteration is deterministic.
pub type TypeArgs = BTreeMap<TypeVarId, Type>;

/// Relation queries (assignability, erasure, bounds) over a [`TypeEnv`].
///
/// Every query is a pure function of its inputs and the environment; a `TypeRelations` can be
/// shared freely and queried from any number of threads as long as the environment allows it.
#[derive(Clone)]
pub struct TypeRelations<'env> {
    env: &'env dyn TypeEnv,
    config: RelationConfig,
}

impl fmt::Debug for TypeRelations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRelations")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'env> TypeRelations<'env> {
    pub fn new(env: &'env dyn TypeEnv) -> Self {
        Self {
            env,
            config: RelationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RelationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RelationConfig {
        &self.config
    }

    pub fn env(&self) -> &'env dyn TypeEnv {
        self.env
    }

    /// Whether a value of type `source` may be used where `target` is expected.
    ///
    /// `None` stands for the type of the `null` reference: it is assignable to every reference
    /// type and to no primitive.
    pub fn is_assignable(&self, source: Option<&Type>, target: &Type) -> Result<bool> {
        self.check_well_formed(target)?;
        let Some(source) = source else {
            return Ok(!target.is_primitive());
        };
        self.check_well_formed(source)?;
        self.assignable(source, target, &mut HashSet::new())
    }

    /// Whether `value` is an instance of `target`.
    ///
    /// A missing target is never satisfied. A missing value (`null`) is an instance of every
    /// reference type.
    pub fn is_instance(&self, value: Option<&Value>, target: Option<&Type>) -> Result<bool> {
        let Some(target) = target else {
            return Ok(false);
        };
        let Some(value) = value else {
            return self.is_assignable(None, target);
        };
        let runtime = value.runtime_type(self.env)?;
        self.is_assignable(Some(&runtime), target)
    }

    /// Erase `ty` to its raw form: `List<String>[]` becomes `List[]`.
    ///
    /// Type variables can only be resolved against an `owner` type that supplies arguments for
    /// the variable's declaring class; without one (or for wildcards) the result is `None`.
    pub fn get_raw_type(&self, ty: &Type, owner: Option<&Type>) -> Result<Option<Type>> {
        self.check_well_formed(ty)?;
        if let Some(owner) = owner {
            self.check_well_formed(owner)?;
        }
        self.raw_type(ty, owner, &mut HashSet::new())
    }

    /// The arguments for `to_class`'s type parameters when `ty` is viewed as `to_class`.
    ///
    /// `None` means `ty` is not a subtype of `to_class`; a raw view yields an empty map.
    pub fn get_type_arguments(&self, ty: &Type, to_class: ClassId) -> Result<Option<TypeArgs>> {
        self.check_well_formed(ty)?;
        let to_def = self.class_def(to_class)?;
        let source = match ty {
            Type::Primitive(prim) => Type::class(self.env.well_known().wrapper(*prim), vec![]),
            other => other.clone(),
        };
        let Some(Type::Class(ClassType { args, .. })) =
            instantiate_as_supertype(self.env, &source, to_class)?
        else {
            return Ok(None);
        };
        Ok(Some(to_def.type_params.iter().copied().zip(args).collect()))
    }

    /// JLS 4.6 erasure. Unlike [`TypeRelations::get_raw_type`] this always produces a type:
    /// type variables erase to their leftmost bound.
    pub fn erasure(&self, ty: &Type) -> Result<Type> {
        self.check_well_formed(ty)?;
        self.erase(ty, &mut HashSet::new())
    }

    pub(crate) fn object_type(&self) -> Type {
        Type::class(self.env.well_known().object, vec![])
    }

    pub(crate) fn type_param_def(&self, id: TypeVarId) -> Result<&'env TypeParamDef> {
        self.env
            .type_param(id)
            .ok_or_else(|| self.reject(&Type::TypeVar(id), "type variable has no definition"))
    }

    fn class_def(&self, id: ClassId) -> Result<&'env ClassDef> {
        self.env
            .class(id)
            .ok_or_else(|| self.reject(&Type::class(id, vec![]), "class has no definition"))
    }

    fn reject(&self, ty: &Type, reason: &str) -> TypeError {
        let rendered = format_type(self.env, ty);
        tracing::debug!(target: "nova.types", ty = %rendered, reason, "rejecting type form");
        TypeError::unsupported(format!("{reason}: `{rendered}`"))
    }

    /// Validate the shape of `ty` before any relation is computed on it.
    pub(crate) fn check_well_formed(&self, ty: &Type) -> Result<()> {
        match ty {
            Type::Primitive(_) => Ok(()),
            Type::Class(ClassType { def, args }) => {
                let class_def = self.class_def(*def)?;
                if !args.is_empty() && args.len() != class_def.type_params.len() {
                    return Err(self.reject(ty, "wrong number of type arguments"));
                }
                for arg in args {
                    if arg.is_primitive() {
                        return Err(self.reject(ty, "primitive type argument"));
                    }
                    self.check_well_formed(arg)?;
                }
                Ok(())
            }
            Type::Array(component) => {
                if matches!(**component, Type::Wildcard(_)) {
                    return Err(self.reject(ty, "wildcard array component"));
                }
                self.check_well_formed(component)
            }
            Type::TypeVar(id) => self.type_param_def(*id).map(|_| ()),
            Type::Wildcard(WildcardBound::Unbounded) => Ok(()),
            Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound)) => {
                if matches!(**bound, Type::Primitive(_) | Type::Wildcard(_)) {
                    return Err(self.reject(ty, "wildcard bound must be a reference type"));
                }
                self.check_well_formed(bound)
            }
            Type::Intersection(parts) => {
                if parts.is_empty() {
                    return Err(self.reject(ty, "empty intersection"));
                }
                for part in parts {
                    if matches!(part, Type::Primitive(_) | Type::Wildcard(_)) {
                        return Err(self.reject(ty, "intersection component must be a reference type"));
                    }
                    self.check_well_formed(part)?;
                }
                Ok(())
            }
        }
    }

    fn assignable(
        &self,
        source: &Type,
        target: &Type,
        seen: &mut HashSet<TypeVarId>,
    ) -> Result<bool> {
        if source == target {
            return Ok(true);
        }

        match target {
            Type::Wildcard(bound) => return self.contained_by_wildcard(source, bound, seen),
            Type::Intersection(parts) => {
                for part in parts {
                    if !self.assignable(source, part, seen)? {
                        return Ok(false);
                    }
                }
                return Ok(true);
            }
            _ => {}
        }

        match source {
            Type::TypeVar(id) => return self.type_var_assignable(*id, target, seen),
            Type::Intersection(parts) => return self.any_assignable(parts, target, seen),
            // Wildcards only relate to other wildcards, which the target match above handles.
            Type::Wildcard(_) => return Ok(false),
            Type::Primitive(_) | Type::Class(_) | Type::Array(_) => {}
        }

        match target {
            Type::Primitive(to) => Ok(self.assignable_to_primitive(source, *to)),
            Type::Class(ClassType { def, args }) if args.is_empty() => {
                self.assignable_to_class(source, *def)
            }
            Type::Class(class_type) => self.assignable_to_parameterized(source, class_type, seen),
            Type::Array(component) => self.assignable_to_array(source, component, seen),
            // A concrete type is never assignable to a type variable.
            Type::TypeVar(_) | Type::Wildcard(_) | Type::Intersection(_) => Ok(false),
        }
    }

    fn any_assignable(
        &self,
        sources: &[Type],
        target: &Type,
        seen: &mut HashSet<TypeVarId>,
    ) -> Result<bool> {
        for source in sources {
            if self.assignable(source, target, seen)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn type_var_assignable(
        &self,
        id: TypeVarId,
        target: &Type,
        seen: &mut HashSet<TypeVarId>,
    ) -> Result<bool> {
        if !seen.insert(id) {
            return Ok(false);
        }
        let result = type_var_bounds(self.env, id)
            .and_then(|bounds| self.any_assignable(&bounds, target, seen));
        seen.remove(&id);
        result
    }

    fn assignable_to_primitive(&self, source: &Type, to: PrimitiveType) -> bool {
        let from = match source {
            Type::Primitive(from) => *from,
            Type::Class(ClassType { def, args }) if self.config.allow_unboxing && args.is_empty() => {
                match self.env.well_known().unwrap(*def) {
                    Some(from) => from,
                    None => return false,
                }
            }
            _ => return false,
        };
        if self.config.primitive_widening {
            from.widens_to(to)
        } else {
            from == to
        }
    }

    fn assignable_to_class(&self, source: &Type, to: ClassId) -> Result<bool> {
        let from = match source {
            Type::Primitive(prim) => self.env.well_known().wrapper(*prim),
            Type::Class(ClassType { def, .. }) => *def,
            Type::Array(_) => return Ok(self.env.well_known().is_array_supertype(to)),
            _ => return Ok(false),
        };
        Ok(instantiate_as_supertype(self.env, &Type::class(from, vec![]), to)?.is_some())
    }

    fn assignable_to_parameterized(
        &self,
        source: &Type,
        to: &ClassType,
        seen: &mut HashSet<TypeVarId>,
    ) -> Result<bool> {
        let from = match source {
            Type::Primitive(prim) => Type::class(self.env.well_known().wrapper(*prim), vec![]),
            Type::Class(_) => source.clone(),
            // Array supertypes are never generic.
            _ => return Ok(false),
        };

        let Some(Type::Class(ClassType { args: from_args, .. })) =
            instantiate_as_supertype(self.env, &from, to.def)?
        else {
            return Ok(false);
        };

        if from_args.is_empty() {
            return Ok(self.config.unchecked_raw_conversion);
        }

        // Type arguments are invariant unless the target argument is a wildcard.
        for (from_arg, to_arg) in from_args.iter().zip(&to.args) {
            if from_arg == to_arg {
                continue;
            }
            if matches!(to_arg, Type::Wildcard(_)) && self.assignable(from_arg, to_arg, seen)? {
                continue;
            }
            return Ok(false);
        }
        Ok(true)
    }

    fn assignable_to_array(
        &self,
        source: &Type,
        to_component: &Type,
        seen: &mut HashSet<TypeVarId>,
    ) -> Result<bool> {
        let Type::Array(from_component) = source else {
            return Ok(false);
        };
        match (&**from_component, to_component) {
            (Type::Primitive(from), Type::Primitive(to)) => Ok(from == to),
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => Ok(false),
            (from, to) => self.assignable(from, to, seen),
        }
    }

    fn contained_by_wildcard(
        &self,
        source: &Type,
        bound: &WildcardBound,
        seen: &mut HashSet<TypeVarId>,
    ) -> Result<bool> {
        if let Type::Wildcard(from) = source {
            let from_upper = self.wildcard_upper(from);
            let to_upper = self.wildcard_upper(bound);
            if !self.assignable(&from_upper, &to_upper, seen)? {
                return Ok(false);
            }
            return match (wildcard_lower(bound), wildcard_lower(from)) {
                (None, _) => Ok(true),
                (Some(_), None) => Ok(false),
                (Some(to_lower), Some(from_lower)) => self.assignable(to_lower, from_lower, seen),
            };
        }

        if source.is_primitive() {
            return Ok(false);
        }
        match bound {
            WildcardBound::Unbounded => Ok(true),
            WildcardBound::Extends(upper) => self.assignable(source, upper, seen),
            WildcardBound::Super(lower) => self.assignable(lower, source, seen),
        }
    }

    fn wildcard_upper(&self, bound: &WildcardBound) -> Type {
        match bound {
            WildcardBound::Extends(upper) => (**upper).clone(),
            WildcardBound::Unbounded | WildcardBound::Super(_) => self.object_type(),
        }
    }

    fn raw_type(
        &self,
        ty: &Type,
        owner: Option<&Type>,
        seen: &mut HashSet<TypeVarId>,
    ) -> Result<Option<Type>> {
        match ty {
            Type::Primitive(_) => Ok(Some(ty.clone())),
            Type::Class(ClassType { def, .. }) => Ok(Some(Type::class(*def, vec![]))),
            Type::Array(component) => Ok(self.raw_type(component, owner, seen)?.map(Type::array)),
            Type::TypeVar(id) => {
                let Some(owner) = owner else {
                    return Ok(None);
                };
                let Some(declaring) = self.env.type_param_owner(*id) else {
                    return Ok(None);
                };
                if !seen.insert(*id) {
                    return Ok(None);
                }
                let result = self
                    .get_type_arguments(owner, declaring)
                    .and_then(|args| match args.and_then(|mut args| args.remove(id)) {
                        Some(arg) => self.raw_type(&arg, Some(owner), seen),
                        None => Ok(None),
                    });
                seen.remove(id);
                result
            }
            Type::Wildcard(_) => Ok(None),
            Type::Intersection(_) => Err(self.reject(ty, "intersection types have no raw form")),
        }
    }

    fn erase(&self, ty: &Type, seen: &mut HashSet<TypeVarId>) -> Result<Type> {
        match ty {
            Type::Primitive(_) => Ok(ty.clone()),
            Type::Class(ClassType { def, .. }) => Ok(Type::class(*def, vec![])),
            Type::Array(component) => Ok(Type::array(self.erase(component, seen)?)),
            Type::TypeVar(id) => {
                if !seen.insert(*id) {
                    return Ok(self.object_type());
                }
                let result = type_var_bounds(self.env, *id).and_then(|bounds| match bounds.first() {
                    Some(leftmost) => self.erase(leftmost, seen),
                    None => Ok(self.object_type()),
                });
                seen.remove(id);
                result
            }
            Type::Wildcard(WildcardBound::Extends(upper)) => self.erase(upper, seen),
            Type::Wildcard(_) => Ok(self.object_type()),
            Type::Intersection(parts) => match parts.first() {
                Some(leftmost) => self.erase(leftmost, seen),
                None => Ok(self.object_type()),
            },
        }
    }
}

fn wildcard_lower(bound: &WildcardBound) -> Option<&Type> {
    match bound {
        WildcardBound::Super(lower) => Some(lower),
        WildcardBound::Unbounded | WildcardBound::Extends(_) => None,
    }
}

/// See [`TypeRelations::is_assignable`].
pub fn is_assignable(env: &dyn TypeEnv, source: Option<&Type>, target: &Type) -> Result<bool> {
    TypeRelations::new(env).is_assignable(source, target)
}

/// See [`TypeRelations::is_instance`].
pub fn is_instance(env: &dyn TypeEnv, value: Option<&Value>, target: Option<&Type>) -> Result<bool> {
    TypeRelations::new(env).is_instance(value, target)
}

/// `true` for array types of any dimension, including generic arrays (`List<String>[]`).
pub fn is_array_type(ty: &Type) -> bool {
    ty.is_array()
}

/// The component one dimension down, with its parameterization intact; `None` for non-arrays.
pub fn get_array_component_type(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Array(component) => Some(component),
        _ => None,
    }
}

/// See [`TypeRelations::get_raw_type`].
pub fn get_raw_type(env: &dyn TypeEnv, ty: &Type, owner: Option<&Type>) -> Result<Option<Type>> {
    TypeRelations::new(env).get_raw_type(ty, owner)
}

/// See [`TypeRelations::get_type_arguments`].
pub fn get_type_arguments(
    env: &dyn TypeEnv,
    ty: &Type,
    to_class: ClassId,
) -> Result<Option<TypeArgs>> {
    TypeRelations::new(env).get_type_arguments(ty, to_class)
}

/// See [`TypeRelations::normalize_upper_bounds`].
pub fn normalize_upper_bounds(env: &dyn TypeEnv, bounds: &[Type]) -> Result<Vec<Type>> {
    TypeRelations::new(env).normalize_upper_bounds(bounds)
}

/// See [`TypeRelations::get_implicit_bounds`].
pub fn get_implicit_bounds(env: &dyn TypeEnv, type_var: TypeVarId) -> Result<Vec<Type>> {
    TypeRelations::new(env).get_implicit_bounds(type_var)
}
