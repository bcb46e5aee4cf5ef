#[macro_use]
mod common;

lox_ok!(
    nested_blocks_restore_outer_bindings,
    r#"var a="global a"; { var a="outer a"; { var a="inner a"; print a; } print a; } print a;"#,
    "inner a\nouter a\nglobal a\n"
);

lox_ok!(
    empty_block_is_a_no_op,
    "{} print 1;",
    "1\n"
);

lox_ok!(
    block_scoped_shadowing_does_not_leak,
    "var a = 1; { var a = 2; print a; } print a;",
    "2\n1\n"
);
