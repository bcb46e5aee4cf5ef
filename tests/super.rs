#[macro_use]
mod common;

lox_ok!(
    super_calls_the_overridden_method,
    r#"
    class A { method() { print "A"; } }
    class B < A { method() { super.method(); print "B"; } }
    B().method();
    "#,
    "A\nB\n"
);

lox_ok!(
    super_resolves_relative_to_the_method_defining_class_not_the_receiver,
    r#"
    class A { method() { print "A method"; } }
    class B < A {
        method() { print "B method"; }
        test() { super.method(); }
    }
    class C < B {}
    C().test();
    "#,
    "A method\n"
);

lox_ok!(
    this_inside_a_superclass_method_still_sees_the_subclass_instance,
    r#"
    class A {
        greet() { print "hi, " + this.name; }
    }
    class B < A {
        init(name) { this.name = name; }
    }
    B("Ada").greet();
    "#,
    "hi, Ada\n"
);

lox_compile_error!(
    super_outside_any_class_is_a_resolve_error,
    "super.method();"
);

lox_compile_error!(
    super_in_a_class_with_no_superclass_is_a_resolve_error,
    "class A { method() { super.method(); } }"
);

lox_runtime_error!(
    calling_an_undefined_method_through_super_is_a_runtime_error,
    r#"
    class A {}
    class B < A { test() { super.missing(); } }
    B().test();
    "#
);
