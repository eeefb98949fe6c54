use nova_types::{
    is_assignable, ClassDef, ClassKind, PrimitiveType, Type, TypeEnv, TypeStore, WildcardBound,
};

fn class(env: &TypeStore, name: &str) -> Type {
    let id = env
        .lookup_class(name)
        .unwrap_or_else(|| panic!("{name} must exist in minimal JDK"));
    Type::class(id, vec![])
}

fn generic(env: &TypeStore, name: &str, args: Vec<Type>) -> Type {
    let id = env
        .lookup_class(name)
        .unwrap_or_else(|| panic!("{name} must exist in minimal JDK"));
    Type::class(id, args)
}

fn assignable(env: &TypeStore, source: &Type, target: &Type) -> bool {
    is_assignable(env, Some(source), target).expect("well-formed types")
}

#[test]
fn class_to_class() {
    let env = TypeStore::with_minimal_jdk();
    let integer = class(&env, "Integer");
    let number = class(&env, "Number");
    let object = class(&env, "Object");
    let string = class(&env, "String");

    assert!(assignable(&env, &integer, &number));
    assert!(assignable(&env, &integer, &object));
    assert!(!assignable(&env, &number, &integer));
    assert!(!assignable(&env, &string, &number));
}

#[test]
fn interfaces_are_subtypes_of_object() {
    let env = TypeStore::with_minimal_jdk();
    let object = class(&env, "Object");
    let list_string = generic(&env, "java.util.List", vec![class(&env, "String")]);

    assert!(assignable(&env, &list_string, &object));
    assert!(assignable(&env, &class(&env, "Cloneable"), &object));
}

#[test]
fn wrappers_are_never_assignable_to_primitives() {
    let env = TypeStore::with_minimal_jdk();
    for prim in PrimitiveType::ALL {
        let wrapper = class(&env, prim.wrapper_binary_name());
        assert!(
            !assignable(&env, &wrapper, &Type::Primitive(prim)),
            "{} should not be assignable to {prim}",
            prim.wrapper_binary_name()
        );
    }
}

#[test]
fn primitives_box_to_their_wrapper_and_its_supertypes() {
    let env = TypeStore::with_minimal_jdk();
    let int = Type::Primitive(PrimitiveType::Int);

    assert!(assignable(&env, &int, &class(&env, "Integer")));
    assert!(assignable(&env, &int, &class(&env, "Number")));
    assert!(assignable(&env, &int, &class(&env, "Object")));
    assert!(assignable(
        &env,
        &int,
        &generic(&env, "java.lang.Comparable", vec![class(&env, "Integer")])
    ));
    assert!(!assignable(&env, &int, &class(&env, "Long")));
    assert!(!assignable(
        &env,
        &Type::Primitive(PrimitiveType::Boolean),
        &class(&env, "Number")
    ));
}

#[test]
fn primitive_widening() {
    let env = TypeStore::with_minimal_jdk();
    let int = Type::Primitive(PrimitiveType::Int);
    let long = Type::Primitive(PrimitiveType::Long);
    let char_ = Type::Primitive(PrimitiveType::Char);

    assert!(assignable(&env, &int, &long));
    assert!(assignable(&env, &char_, &int));
    assert!(!assignable(&env, &long, &int));
    assert!(!assignable(&env, &int, &char_));
}

#[test]
fn null_is_assignable_to_every_reference_type() {
    let mut env = TypeStore::with_minimal_jdk();
    let t = env.add_type_param("T", vec![]);

    let references = [
        class(&env, "Integer"),
        generic(&env, "java.util.List", vec![class(&env, "String")]),
        Type::array(Type::Primitive(PrimitiveType::Int)),
        Type::TypeVar(t),
    ];
    for target in &references {
        assert!(is_assignable(&env, None, target).unwrap(), "{target:?}");
    }
    for prim in PrimitiveType::ALL {
        assert!(!is_assignable(&env, None, &Type::Primitive(prim)).unwrap());
    }
}

#[test]
fn parameterized_targets_use_inherited_type_arguments() {
    let env = TypeStore::with_minimal_jdk();
    let string = class(&env, "String");
    let object = class(&env, "Object");

    let array_list_string = generic(&env, "java.util.ArrayList", vec![string.clone()]);
    let list_string = generic(&env, "java.util.List", vec![string.clone()]);
    let list_object = generic(&env, "java.util.List", vec![object]);
    let iterable_string = generic(&env, "java.lang.Iterable", vec![string]);

    assert!(assignable(&env, &array_list_string, &list_string));
    assert!(assignable(&env, &array_list_string, &iterable_string));
    assert!(!assignable(&env, &array_list_string, &list_object));
}

#[test]
fn raw_sources_are_unchecked_assignable() {
    let env = TypeStore::with_minimal_jdk();
    let raw = class(&env, "java.util.ArrayList");
    let list_string = generic(&env, "java.util.List", vec![class(&env, "String")]);

    assert!(assignable(&env, &raw, &list_string));
    assert!(assignable(&env, &list_string, &class(&env, "java.util.Collection")));
}

#[test]
fn wildcard_arguments() {
    let env = TypeStore::with_minimal_jdk();
    let integer = class(&env, "Integer");
    let number = class(&env, "Number");
    let object = class(&env, "Object");

    let list_integer = generic(&env, "java.util.List", vec![integer.clone()]);
    let list_number = generic(&env, "java.util.List", vec![number.clone()]);
    let list_object = generic(&env, "java.util.List", vec![object]);

    let extends_number = generic(
        &env,
        "java.util.List",
        vec![Type::Wildcard(WildcardBound::Extends(Box::new(number.clone())))],
    );
    let super_integer = generic(
        &env,
        "java.util.List",
        vec![Type::Wildcard(WildcardBound::Super(Box::new(integer.clone())))],
    );
    let unbounded = generic(
        &env,
        "java.util.List",
        vec![Type::Wildcard(WildcardBound::Unbounded)],
    );

    assert!(assignable(&env, &list_integer, &extends_number));
    assert!(assignable(&env, &list_number, &extends_number));
    assert!(!assignable(&env, &list_object, &extends_number));

    assert!(assignable(&env, &list_number, &super_integer));
    assert!(assignable(&env, &list_object, &super_integer));
    assert!(!assignable(
        &env,
        &generic(&env, "java.util.List", vec![class(&env, "String")]),
        &super_integer
    ));

    assert!(assignable(&env, &list_integer, &unbounded));
    assert!(assignable(&env, &extends_number, &unbounded));
    assert!(!assignable(&env, &unbounded, &extends_number));

    // `List<? extends Integer>` fits `List<? extends Number>`, not the other way around.
    let extends_integer = generic(
        &env,
        "java.util.List",
        vec![Type::Wildcard(WildcardBound::Extends(Box::new(integer)))],
    );
    assert!(assignable(&env, &extends_integer, &extends_number));
    assert!(!assignable(&env, &extends_number, &extends_integer));
}

#[test]
fn array_covariance() {
    let env = TypeStore::with_minimal_jdk();
    let integer_array = Type::array(class(&env, "Integer"));
    let number_array = Type::array(class(&env, "Number"));
    let int_array = Type::array(Type::Primitive(PrimitiveType::Int));
    let long_array = Type::array(Type::Primitive(PrimitiveType::Long));

    assert!(assignable(&env, &integer_array, &number_array));
    assert!(!assignable(&env, &number_array, &integer_array));
    assert!(!assignable(&env, &int_array, &long_array));
    assert!(!assignable(&env, &int_array, &Type::array(class(&env, "Integer"))));

    for supertype in ["Object", "Cloneable", "java.io.Serializable"] {
        assert!(assignable(&env, &int_array, &class(&env, supertype)));
    }
    assert!(!assignable(&env, &int_array, &class(&env, "Number")));
    assert!(assignable(
        &env,
        &Type::array(int_array.clone()),
        &Type::array(class(&env, "Object"))
    ));
}

#[test]
fn type_variables() {
    let mut env = TypeStore::with_minimal_jdk();
    let number = class(&env, "Number");
    let integer = class(&env, "Integer");

    let t = env.add_type_param("T", vec![number.clone()]);
    let u = env.add_type_param("U", vec![Type::TypeVar(t)]);
    let unbounded = env.add_type_param("V", vec![]);

    assert!(assignable(&env, &Type::TypeVar(t), &number));
    assert!(assignable(&env, &Type::TypeVar(t), &class(&env, "Object")));
    assert!(!assignable(&env, &Type::TypeVar(t), &integer));
    assert!(!assignable(&env, &integer, &Type::TypeVar(t)));

    assert!(assignable(&env, &Type::TypeVar(u), &Type::TypeVar(t)));
    assert!(assignable(&env, &Type::TypeVar(u), &number));
    assert!(!assignable(&env, &Type::TypeVar(t), &Type::TypeVar(u)));

    assert!(assignable(&env, &Type::TypeVar(unbounded), &class(&env, "Object")));
    assert!(!assignable(&env, &Type::TypeVar(unbounded), &number));
}

#[test]
fn intersections_are_order_independent() {
    let env = TypeStore::with_minimal_jdk();
    let cloneable = class(&env, "Cloneable");
    let serializable = class(&env, "java.io.Serializable");

    let ab = Type::Intersection(vec![cloneable.clone(), serializable.clone()]);
    let ba = Type::Intersection(vec![serializable.clone(), cloneable.clone()]);

    assert!(assignable(&env, &ab, &ba));
    assert!(assignable(&env, &ba, &ab));
    assert!(assignable(&env, &ab, &cloneable));
    assert!(!assignable(&env, &cloneable, &ab));

    let array_list = class(&env, "java.util.ArrayList");
    assert!(assignable(&env, &array_list, &ab));
}

#[test]
fn user_defined_hierarchy() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = class(&env, "String");
    let integer = class(&env, "Integer");

    // interface Box<X>; class StringBox implements Box<String>
    let x = env.add_type_param("X", vec![]);
    let box_ = env.add_class(ClassDef {
        name: "com.example.Box".to_string(),
        kind: ClassKind::Interface,
        type_params: vec![x],
        super_class: None,
        interfaces: vec![],
    });
    let string_box = env.add_class(ClassDef {
        name: "com.example.StringBox".to_string(),
        kind: ClassKind::Class,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![Type::class(box_, vec![string.clone()])],
    });

    let source = Type::class(string_box, vec![]);
    assert!(assignable(&env, &source, &Type::class(box_, vec![string])));
    assert!(!assignable(&env, &source, &Type::class(box_, vec![integer])));
    assert!(assignable(&env, &source, &Type::class(box_, vec![])));
}
