#[macro_use]
mod common;

lox_ok!(
    init_runs_on_construction_and_returns_the_instance,
    r#"
    class Point {
        init(x, y) {
            this.x = x;
            this.y = y;
        }
    }
    var p = Point(1, 2);
    print p.x;
    print p.y;
    "#,
    "1\n2\n"
);

lox_ok!(
    bare_return_in_init_still_yields_this,
    r#"
    class Thing {
        init(value) {
            this.value = value;
            return;
        }
    }
    print Thing(7).value;
    "#,
    "7\n"
);

lox_ok!(
    class_with_no_init_takes_no_arguments,
    "class Empty {} print Empty();",
    "Empty instance\n"
);

lox_compile_error!(
    returning_a_value_from_init_is_a_resolve_error,
    "class A { init() { return 1; } }"
);

lox_runtime_error!(
    constructing_with_the_wrong_arity_is_a_runtime_error,
    r#"class Point { init(x, y) { this.x = x; this.y = y; } } Point(1);"#
);
