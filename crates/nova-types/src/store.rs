use std::collections::HashMap;

use crate::{
    ClassDef, ClassId, ClassKind, PrimitiveType, Type, TypeEnv, TypeParamDef, TypeVarId,
    WellKnownTypes,
};

/// In-memory [`TypeEnv`].
///
/// Class ids can be reserved with [`TypeStore::intern_class_id`] before their definition is
/// known, which is what lets self-referential declarations (`E extends Enum<E>`) be built up
/// in two passes.
#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: Vec<Option<ClassDef>>,
    class_by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_minimal_jdk()
    }
}

impl TypeStore {
    /// A store preloaded with the handful of JDK types the relation queries rely on.
    pub fn with_minimal_jdk() -> Self {
        let mut classes = Vec::new();
        let mut class_by_name = HashMap::new();
        let mut intern = |name: &str| {
            let id = ClassId(classes.len() as u32);
            classes.push(None);
            class_by_name.insert(name.to_string(), id);
            id
        };

        let well_known = WellKnownTypes {
            object: intern("java.lang.Object"),
            cloneable: intern("java.lang.Cloneable"),
            serializable: intern("java.io.Serializable"),
            string: intern("java.lang.String"),
            number: intern("java.lang.Number"),
            boolean: intern("java.lang.Boolean"),
            byte: intern("java.lang.Byte"),
            short: intern("java.lang.Short"),
            character: intern("java.lang.Character"),
            integer: intern("java.lang.Integer"),
            long: intern("java.lang.Long"),
            float: intern("java.lang.Float"),
            double: intern("java.lang.Double"),
        };

        let mut store = TypeStore {
            classes,
            class_by_name,
            type_params: Vec::new(),
            well_known,
        };
        store.define_minimal_jdk();
        store
    }

    fn define_minimal_jdk(&mut self) {
        let wk = self.well_known.clone();
        let object = Type::class(wk.object, vec![]);
        let serializable = Type::class(wk.serializable, vec![]);

        self.define_class(wk.object, class_def("java.lang.Object", ClassKind::Class, None));
        self.define_class(wk.cloneable, interface_def("java.lang.Cloneable", vec![], vec![]));
        self.define_class(
            wk.serializable,
            interface_def("java.io.Serializable", vec![], vec![]),
        );

        // interface Comparable<T>
        let comparable_t = self.add_type_param("T", vec![]);
        let comparable = self.add_class(interface_def(
            "java.lang.Comparable",
            vec![comparable_t],
            vec![],
        ));
        let comparable_of = |id: crate::ClassId| Type::class(comparable, vec![Type::class(id, vec![])]);

        let char_sequence =
            self.add_class(interface_def("java.lang.CharSequence", vec![], vec![]));

        self.define_class(
            wk.string,
            ClassDef {
                interfaces: vec![
                    serializable.clone(),
                    comparable_of(wk.string),
                    Type::class(char_sequence, vec![]),
                ],
                ..class_def("java.lang.String", ClassKind::Class, Some(object.clone()))
            },
        );

        self.define_class(
            wk.number,
            ClassDef {
                interfaces: vec![serializable.clone()],
                ..class_def("java.lang.Number", ClassKind::Class, Some(object.clone()))
            },
        );

        for prim in PrimitiveType::ALL {
            let id = wk.wrapper(prim);
            let super_class = match prim {
                PrimitiveType::Boolean | PrimitiveType::Char => object.clone(),
                _ => Type::class(wk.number, vec![]),
            };
            let mut interfaces = vec![comparable_of(id)];
            if matches!(prim, PrimitiveType::Boolean | PrimitiveType::Char) {
                interfaces.insert(0, serializable.clone());
            }
            self.define_class(
                id,
                ClassDef {
                    interfaces,
                    ..class_def(prim.wrapper_binary_name(), ClassKind::Class, Some(super_class))
                },
            );
        }

        // Collections: Iterable<T> <- Collection<E> <- List<E> / Set<E>, ArrayList<E>, Map<K, V>.
        let iterable_t = self.add_type_param("T", vec![]);
        let iterable = self.add_class(interface_def("java.lang.Iterable", vec![iterable_t], vec![]));

        let collection_e = self.add_type_param("E", vec![]);
        let collection = self.add_class(interface_def(
            "java.util.Collection",
            vec![collection_e],
            vec![Type::class(iterable, vec![Type::TypeVar(collection_e)])],
        ));

        let list_e = self.add_type_param("E", vec![]);
        let list = self.add_class(interface_def(
            "java.util.List",
            vec![list_e],
            vec![Type::class(collection, vec![Type::TypeVar(list_e)])],
        ));

        let set_e = self.add_type_param("E", vec![]);
        self.add_class(interface_def(
            "java.util.Set",
            vec![set_e],
            vec![Type::class(collection, vec![Type::TypeVar(set_e)])],
        ));

        let random_access = self.add_class(interface_def("java.util.RandomAccess", vec![], vec![]));

        let array_list_e = self.add_type_param("E", vec![]);
        self.add_class(ClassDef {
            type_params: vec![array_list_e],
            interfaces: vec![
                Type::class(list, vec![Type::TypeVar(array_list_e)]),
                Type::class(random_access, vec![]),
                Type::class(wk.cloneable, vec![]),
                serializable.clone(),
            ],
            ..class_def("java.util.ArrayList", ClassKind::Class, Some(object.clone()))
        });

        let map_k = self.add_type_param("K", vec![]);
        let map_v = self.add_type_param("V", vec![]);
        let map = self.add_class(interface_def("java.util.Map", vec![map_k, map_v], vec![]));

        let hash_map_k = self.add_type_param("K", vec![]);
        let hash_map_v = self.add_type_param("V", vec![]);
        self.add_class(ClassDef {
            type_params: vec![hash_map_k, hash_map_v],
            interfaces: vec![
                Type::class(
                    map,
                    vec![Type::TypeVar(hash_map_k), Type::TypeVar(hash_map_v)],
                ),
                Type::class(wk.cloneable, vec![]),
                serializable,
            ],
            ..class_def("java.util.HashMap", ClassKind::Class, Some(object))
        });
    }

    /// Reserve an id for `name` without defining it. Returns the existing id if already known.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_by_name.get(name) {
            return *id;
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(None);
        self.class_by_name.insert(name.to_string(), id);
        id
    }

    /// Intern `def.name` and define it. Redefining an existing class replaces it.
    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        let idx = id.0 as usize;
        if idx >= self.classes.len() {
            self.classes.resize(idx + 1, None);
        }
        self.class_by_name.insert(def.name.clone(), id);
        self.classes[idx] = Some(def);
    }

    /// `true` once `id` has a definition (interned-only ids are placeholders).
    pub fn is_defined(&self, id: ClassId) -> bool {
        matches!(self.classes.get(id.0 as usize), Some(Some(_)))
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.0 as usize)?.as_mut()
    }

    /// Exact binary-name lookup (no implicit `java.lang` resolution).
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_by_name.get(name).copied()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
        });
        id
    }

    /// Replace the definition of an already allocated type parameter.
    pub fn define_type_param(&mut self, id: TypeVarId, def: TypeParamDef) {
        if let Some(slot) = self.type_params.get_mut(id.0 as usize) {
            *slot = def;
        }
    }

    pub fn type_param_count(&self) -> usize {
        self.type_params.len()
    }
}

fn class_def(name: &str, kind: ClassKind, super_class: Option<Type>) -> ClassDef {
    ClassDef {
        name: name.to_string(),
        kind,
        type_params: vec![],
        super_class,
        interfaces: vec![],
    }
}

fn interface_def(name: &str, type_params: Vec<TypeVarId>, interfaces: Vec<Type>) -> ClassDef {
    ClassDef {
        type_params,
        interfaces,
        ..class_def(name, ClassKind::Interface, None)
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.0 as usize)?.as_ref()
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.0 as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.class_by_name.get(name) {
            return Some(*id);
        }
        if name.contains('.') {
            return None;
        }
        self.class_by_name.get(&format!("java.lang.{name}")).copied()
    }

    fn type_param_owner(&self, id: TypeVarId) -> Option<ClassId> {
        self.classes.iter().enumerate().find_map(|(idx, def)| {
            let def = def.as_ref()?;
            def.type_params
                .contains(&id)
                .then_some(ClassId(idx as u32))
        })
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_java_lang_names_resolve() {
        let store = TypeStore::default();
        assert_eq!(store.lookup_class("Object"), Some(store.well_known().object));
        assert_eq!(store.lookup_class("Integer"), Some(store.well_known().integer));
        assert_eq!(store.lookup_class("List"), None);
        assert!(store.lookup_class("java.util.List").is_some());
        assert_eq!(store.class_id("String"), None);
    }

    #[test]
    fn interned_ids_are_placeholders_until_defined() {
        let mut store = TypeStore::with_minimal_jdk();
        let before = store.class_count();

        let id = store.intern_class_id("com.example.Later");
        assert_eq!(store.intern_class_id("com.example.Later"), id);
        assert_eq!(store.class_count(), before + 1);
        assert!(!store.is_defined(id));
        assert!(store.class(id).is_none());

        store.define_class(
            id,
            class_def(
                "com.example.Later",
                ClassKind::Class,
                Some(Type::class(store.well_known().object, vec![])),
            ),
        );
        assert!(store.is_defined(id));
    }

    #[test]
    fn type_param_owner_finds_declaring_class() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let e = store.class(list).unwrap().type_params[0];

        assert_eq!(store.type_param_owner(e), Some(list));
        assert_eq!(store.type_param(e).unwrap().name, "E");
    }

    #[test]
    fn method_level_type_params_have_no_owner() {
        let mut store = TypeStore::with_minimal_jdk();
        let t = store.add_type_param("T", vec![]);
        assert_eq!(store.type_param_owner(t), None);
    }
}
