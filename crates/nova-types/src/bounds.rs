use std::collections::HashMap;

use crate::error::{Result, TypeError};
use crate::relation::{TypeArgs, TypeRelations};
use crate::{
    format_type, substitute, ClassType, RelationConfig, Type, TypeEnv, TypeVarId, WildcardBound,
};

fn trace_dropped(env: &dyn TypeEnv, dropped: &Type, implied_by: &Type) {
    tracing::trace!(
        target: "nova.types",
        dropped = %format_type(env, dropped),
        implied_by = %format_type(env, implied_by),
        "dropping redundant upper bound"
    );
}

impl TypeRelations<'_> {
    /// Drop every bound that is implied by a more specific one.
    ///
    /// `[Collection, List]` normalizes to `[List]`. A bound is only dropped for a surviving bound
    /// that is a checked subtype of it. Duplicates collapse to their first occurrence, survivors
    /// keep their input order, and the result is never empty. Applying the
    /// normalization twice gives the same result as applying it once.
    pub fn normalize_upper_bounds(&self, bounds: &[Type]) -> Result<Vec<Type>> {
        if bounds.is_empty() {
            return Err(TypeError::InvalidArgument(
                "upper bound list must not be empty".to_string(),
            ));
        }
        for bound in bounds {
            self.check_well_formed(bound)?;
        }

        // Redundancy is decided by checked subtyping: an unchecked raw conversion does not make
        // `List` imply `List<String>`.
        let checked = TypeRelations::new(self.env()).with_config(RelationConfig {
            unchecked_raw_conversion: false,
            ..self.config().clone()
        });

        let mut out: Vec<Type> = Vec::with_capacity(bounds.len());
        'bounds: for bound in bounds {
            for kept in &out {
                // Also covers duplicates: the earlier occurrence stays.
                if checked.is_assignable(Some(kept), bound)? {
                    trace_dropped(self.env(), bound, kept);
                    continue 'bounds;
                }
            }
            let mut idx = 0;
            while idx < out.len() {
                if checked.is_assignable(Some(bound), &out[idx])? {
                    let dropped = out.remove(idx);
                    trace_dropped(self.env(), &dropped, bound);
                } else {
                    idx += 1;
                }
            }
            out.push(bound.clone());
        }
        Ok(out)
    }

    /// The bounds actually enforced on `type_var`: its declared bounds, normalized, or
    /// `[Object]` when it declares none.
    pub fn get_implicit_bounds(&self, type_var: TypeVarId) -> Result<Vec<Type>> {
        let declared = &self.type_param_def(type_var)?.upper_bounds;
        if declared.is_empty() {
            return Ok(vec![self.object_type()]);
        }
        self.normalize_upper_bounds(declared)
    }

    /// Whether every assigned type satisfies the (substituted) implicit bounds of its variable.
    ///
    /// Bounds may refer to other variables in `assignments` (`T extends Comparable<T>`); those
    /// references are substituted before checking.
    pub fn types_satisfy_variables(&self, assignments: &TypeArgs) -> Result<bool> {
        let subst: HashMap<TypeVarId, Type> = assignments
            .iter()
            .map(|(var, ty)| (*var, ty.clone()))
            .collect();
        for (var, ty) in assignments {
            for bound in self.get_implicit_bounds(*var)? {
                let bound = substitute(&bound, &subst);
                if !self.is_assignable(Some(ty), &bound)? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

/// Upper bounds of a wildcard: `[T]` for `? extends T`, `[Object]` otherwise.
pub fn implicit_upper_bounds(env: &dyn TypeEnv, bound: &WildcardBound) -> Vec<Type> {
    match bound {
        WildcardBound::Extends(upper) => vec![(**upper).clone()],
        WildcardBound::Unbounded | WildcardBound::Super(_) => {
            vec![Type::class(env.well_known().object, vec![])]
        }
    }
}

/// Lower bounds of a wildcard: `[T]` for `? super T`, empty otherwise.
pub fn implicit_lower_bounds(bound: &WildcardBound) -> Vec<Type> {
    match bound {
        WildcardBound::Super(lower) => vec![(**lower).clone()],
        WildcardBound::Unbounded | WildcardBound::Extends(_) => Vec::new(),
    }
}

/// Whether a type variable occurs anywhere inside `ty`.
pub fn contains_type_variables(ty: &Type) -> bool {
    match ty {
        Type::TypeVar(_) => true,
        Type::Primitive(_) => false,
        Type::Class(ClassType { args, .. }) => args.iter().any(contains_type_variables),
        Type::Array(component) => contains_type_variables(component),
        Type::Wildcard(WildcardBound::Unbounded) => false,
        Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound)) => {
            contains_type_variables(bound)
        }
        Type::Intersection(parts) => parts.iter().any(contains_type_variables),
    }
}
