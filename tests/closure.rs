#[macro_use]
mod common;

lox_ok!(
    closure_captures_enclosing_local,
    r#"
    fun makeCounter() {
        var i = 0;
        fun count() {
            i = i + 1;
            print i;
        }
        return count;
    }
    var counter = makeCounter();
    counter();
    counter();
    "#,
    "1\n2\n"
);

lox_ok!(
    separately_created_closures_do_not_share_state,
    r#"
    fun makeCounter() {
        var i = 0;
        fun count() { i = i + 1; return i; }
        return count;
    }
    var a = makeCounter();
    var b = makeCounter();
    print a();
    print a();
    print b();
    "#,
    "1\n2\n1\n"
);

lox_ok!(
    closure_keeps_variable_alive_after_enclosing_scope_ends,
    r#"
    var globalCounter;
    {
        var local = "captured";
        fun reader() { print local; }
        globalCounter = reader;
    }
    globalCounter();
    "#,
    "captured\n"
);

lox_ok!(
    assigning_through_a_closure_is_visible_to_a_later_closure,
    r#"
    fun outer() {
        var x = "before";
        fun setter() { x = "after"; }
        fun getter() { print x; }
        setter();
        getter();
    }
    outer();
    "#,
    "after\n"
);
