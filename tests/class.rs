#[macro_use]
mod common;

lox_ok!(
    instance_stringifies_as_name_instance,
    "class Foo {} print Foo();",
    "Foo instance\n"
);

lox_ok!(
    fields_are_created_on_first_assignment,
    r#"
    class Bagel {}
    var bagel = Bagel();
    bagel.flavor = "plain";
    print bagel.flavor;
    "#,
    "plain\n"
);

lox_ok!(
    method_sees_fields_through_this,
    r#"
    class Cake {
        taste() {
            var adj = "delicious";
            print this.flavor + " cake is " + adj + "!";
        }
    }
    var c = Cake();
    c.flavor = "German chocolate";
    c.taste();
    "#,
    "German chocolate cake is delicious!\n"
);

lox_ok!(
    field_shadows_a_method_of_the_same_name,
    r#"
    class Box {
        value() { return "method"; }
    }
    var b = Box();
    b.value = "field";
    print b.value;
    "#,
    "field\n"
);

lox_compile_error!(class_cannot_inherit_from_itself, "class Oops < Oops {}");

lox_runtime_error!(
    accessing_an_undefined_property_is_a_runtime_error,
    "class Empty {} print Empty().nothing;"
);

lox_runtime_error!(
    calling_a_number_is_a_runtime_error,
    "var notAFunction = 1; notAFunction();"
);

lox_runtime_error!(
    getting_a_property_off_a_non_instance_is_a_runtime_error,
    r#"print "hi".length;"#
);
