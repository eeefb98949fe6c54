use crate::error::Result;
use crate::{ClassId, PrimitiveType, Type, TypeEnv, TypeRelations};

/// A runtime value, as far as instance checks are concerned.
///
/// Runtime types are erased: an `Object` carries only its class, and primitives are seen boxed,
/// the way they are when passed around as `Object`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Object { class: ClassId },
    Array { component: Type, len: usize },
}

impl Value {
    pub fn runtime_type(&self, env: &dyn TypeEnv) -> Result<Type> {
        let wk = env.well_known();
        let boxed = |prim: PrimitiveType| -> Result<Type> { Ok(Type::class(wk.wrapper(prim), vec![])) };
        match self {
            Value::Boolean(_) => boxed(PrimitiveType::Boolean),
            Value::Byte(_) => boxed(PrimitiveType::Byte),
            Value::Short(_) => boxed(PrimitiveType::Short),
            Value::Char(_) => boxed(PrimitiveType::Char),
            Value::Int(_) => boxed(PrimitiveType::Int),
            Value::Long(_) => boxed(PrimitiveType::Long),
            Value::Float(_) => boxed(PrimitiveType::Float),
            Value::Double(_) => boxed(PrimitiveType::Double),
            Value::String(_) => Ok(Type::class(wk.string, vec![])),
            Value::Object { class } => Ok(Type::class(*class, vec![])),
            Value::Array { component, .. } => {
                let component = TypeRelations::new(env).erasure(component)?;
                Ok(Type::array(component))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeStore;

    #[test]
    fn primitives_report_their_wrapper() {
        let store = TypeStore::with_minimal_jdk();
        assert_eq!(
            Value::Int(3).runtime_type(&store).unwrap(),
            Type::class(store.well_known().integer, vec![])
        );
        assert_eq!(
            Value::Char('x').runtime_type(&store).unwrap(),
            Type::class(store.well_known().character, vec![])
        );
    }

    #[test]
    fn array_components_are_erased() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let string = Type::class(store.well_known().string, vec![]);

        let value = Value::Array {
            component: Type::class(list, vec![string]),
            len: 2,
        };
        assert_eq!(
            value.runtime_type(&store).unwrap(),
            Type::array(Type::class(list, vec![]))
        );
    }
}
