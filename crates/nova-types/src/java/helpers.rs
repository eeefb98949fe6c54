use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{Result, TypeError};
use crate::{ClassId, ClassKind, ClassType, Type, TypeEnv, TypeVarId, WildcardBound};

/// Return `ty` viewed as `target` by walking the supertype graph and applying type argument
/// substitution along the way.
///
/// Example: `ArrayList<String>` viewed as `List` returns `List<String>`; a raw `ArrayList`
/// returns the raw `List`.
///
/// Returns `Ok(None)` when `ty` is not a subtype of `target`. Missing class metadata or a
/// parameterization whose arity does not match its declaration is an error.
pub fn instantiate_as_supertype(
    env: &dyn TypeEnv,
    ty: &Type,
    target: ClassId,
) -> Result<Option<Type>> {
    fn inner(
        env: &dyn TypeEnv,
        ty: &Type,
        target: ClassId,
        seen_type_vars: &mut HashSet<TypeVarId>,
    ) -> Result<Option<Type>> {
        match ty {
            Type::Array(_) => {
                if env.well_known().is_array_supertype(target) {
                    return Ok(Some(Type::class(target, vec![])));
                }
                return Ok(None);
            }
            Type::Intersection(parts) => {
                let mut out: Option<Type> = None;
                for part in parts {
                    let Some(found) = inner(env, part, target, seen_type_vars)? else {
                        continue;
                    };
                    out = match out {
                        None => Some(found),
                        // Conflicting instantiations (`List<String> & List<Integer>`) are
                        // ambiguous.
                        Some(existing) => match merge_instantiated_supertypes(existing, found) {
                            Some(merged) => Some(merged),
                            None => return Ok(None),
                        },
                    };
                }
                return Ok(out);
            }
            Type::TypeVar(id) => {
                if !seen_type_vars.insert(*id) {
                    return Ok(None);
                }
                let result = type_var_bounds(env, *id).and_then(|bounds| {
                    inner(env, &Type::Intersection(bounds), target, seen_type_vars)
                });
                seen_type_vars.remove(id);
                return result;
            }
            Type::Class(_) => {}
            Type::Primitive(_) | Type::Wildcard(_) => return Ok(None),
        }

        let Type::Class(ClassType { def, args }) = ty else {
            return Ok(None);
        };

        let mut queue: VecDeque<Type> = VecDeque::new();
        let mut seen: HashSet<(ClassId, Vec<Type>)> = HashSet::new();
        queue.push_back(Type::class(*def, args.clone()));

        while let Some(current) = queue.pop_front() {
            let Type::Class(ClassType { def, args }) = &current else {
                continue;
            };
            if !seen.insert((*def, args.clone())) {
                continue;
            }

            if *def == target {
                return Ok(Some(current));
            }

            let class_def = env
                .class(*def)
                .ok_or_else(|| TypeError::unsupported(format!("no definition for {def:?}")))?;

            // A raw instantiation (`List` rather than `List<String>`) has no type arguments to
            // propagate; its supertypes are raw as well.
            let raw = args.is_empty() && !class_def.type_params.is_empty();
            if !raw && args.len() != class_def.type_params.len() {
                return Err(TypeError::unsupported(format!(
                    "`{}` declares {} type parameter(s) but was given {}",
                    class_def.name,
                    class_def.type_params.len(),
                    args.len()
                )));
            }

            let subst: HashMap<TypeVarId, Type> = class_def
                .type_params
                .iter()
                .copied()
                .zip(args.iter().cloned())
                .collect();

            let supertypes = class_def
                .super_class
                .iter()
                .chain(class_def.interfaces.iter());
            for sup in supertypes {
                let sup = if raw {
                    erase_class(sup)
                } else {
                    substitute(sup, &subst)
                };
                queue.push_back(sup);
            }

            // Every interface implicitly has `Object` as a supertype (JLS 4.10.2).
            if class_def.kind == ClassKind::Interface {
                queue.push_back(Type::class(env.well_known().object, vec![]));
            }
        }

        Ok(None)
    }

    let mut seen_type_vars = HashSet::new();
    inner(env, ty, target, &mut seen_type_vars)
}

/// Declared upper bounds of `id`, with the implicit `Object` bound made explicit.
pub(crate) fn type_var_bounds(env: &dyn TypeEnv, id: TypeVarId) -> Result<Vec<Type>> {
    let def = env
        .type_param(id)
        .ok_or_else(|| TypeError::unsupported(format!("no definition for {id:?}")))?;
    if def.upper_bounds.is_empty() {
        return Ok(vec![Type::class(env.well_known().object, vec![])]);
    }
    Ok(def.upper_bounds.clone())
}

fn merge_instantiated_supertypes(a: Type, b: Type) -> Option<Type> {
    if a == b {
        return Some(a);
    }
    // A raw view carries no information; prefer the parameterized one.
    match (a.is_parameterized(), b.is_parameterized()) {
        (true, false) => Some(a),
        (false, true) => Some(b),
        _ => None,
    }
}

fn erase_class(ty: &Type) -> Type {
    match ty {
        Type::Class(ClassType { def, .. }) => Type::class(*def, vec![]),
        other => other.clone(),
    }
}

/// Replace every type variable in `ty` that has an entry in `subst`.
pub fn substitute(ty: &Type, subst: &HashMap<TypeVarId, Type>) -> Type {
    match ty {
        Type::TypeVar(id) => subst.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Class(ClassType { def, args }) => Type::class(
            *def,
            args.iter().map(|arg| substitute(arg, subst)).collect(),
        ),
        Type::Array(component) => Type::array(substitute(component, subst)),
        Type::Wildcard(WildcardBound::Unbounded) => ty.clone(),
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            Type::Wildcard(WildcardBound::Extends(Box::new(substitute(upper, subst))))
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(substitute(lower, subst))))
        }
        Type::Intersection(parts) => {
            Type::Intersection(parts.iter().map(|part| substitute(part, subst)).collect())
        }
        Type::Primitive(_) => ty.clone(),
    }
}
