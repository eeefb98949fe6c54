use std::fmt;

use crate::{ClassType, Type, TypeEnv, WildcardBound};

/// Render `ty` the way Java source spells it, with binary names for classes.
///
/// `List<? extends Number>[]` renders as `java.util.List<? extends java.lang.Number>[]`.
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    TypeDisplay { env, ty }.to_string()
}

/// [`fmt::Display`] adapter for a [`Type`] resolved through an environment.
pub struct TypeDisplay<'a> {
    pub env: &'a dyn TypeEnv,
    pub ty: &'a Type,
}

impl<'a> TypeDisplay<'a> {
    pub fn new(env: &'a dyn TypeEnv, ty: &'a Type) -> Self {
        Self { env, ty }
    }

    fn nested(&self, ty: &'a Type) -> TypeDisplay<'a> {
        TypeDisplay { env: self.env, ty }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            Type::Primitive(prim) => f.write_str(prim.name()),
            Type::Class(ClassType { def, args }) => {
                match self.env.class(*def) {
                    Some(class_def) => f.write_str(&class_def.name)?,
                    None => write!(f, "<unknown class #{}>", def.to_raw())?,
                }
                if args.is_empty() {
                    return Ok(());
                }
                f.write_str("<")?;
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", self.nested(arg))?;
                }
                f.write_str(">")
            }
            Type::Array(component) => write!(f, "{}[]", self.nested(component)),
            Type::TypeVar(id) => match self.env.type_param(*id) {
                Some(def) => f.write_str(&def.name),
                None => write!(f, "<unknown type variable #{}>", id.to_raw()),
            },
            Type::Wildcard(WildcardBound::Unbounded) => f.write_str("?"),
            Type::Wildcard(WildcardBound::Extends(upper)) => {
                write!(f, "? extends {}", self.nested(upper))
            }
            Type::Wildcard(WildcardBound::Super(lower)) => {
                write!(f, "? super {}", self.nested(lower))
            }
            Type::Intersection(parts) => {
                for (idx, part) in parts.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" & ")?;
                    }
                    write!(f, "{}", self.nested(part))?;
                }
                Ok(())
            }
        }
    }
}
