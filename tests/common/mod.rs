/// Runs `$source` through the library's public [`lox::Lox`] entry point
/// and asserts the captured stdout, with no pipeline error of any kind.
/// Mirrors the teacher's per-feature `tests!` macro, but drives inline
/// Lox source directly instead of an external `tests/target/*.rocks`
/// fixture file, since this repo has no such fixture tree.
#[macro_export]
macro_rules! lox_ok {
    ($name:ident, $source:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let mut lox = lox::Lox::new();
            let mut output = Vec::new();
            lox.run($source, &mut output);
            assert!(!lox.had_error(), "unexpected scan/parse/resolve error for {}", stringify!($name));
            assert!(!lox.had_runtime_error(), "unexpected runtime error for {}", stringify!($name));
            assert_eq!(String::from_utf8(output).unwrap(), $expected);
        }
    };
}

/// Asserts `$source` is rejected before evaluation (scan, parse, or
/// resolution error).
#[macro_export]
macro_rules! lox_compile_error {
    ($name:ident, $source:expr) => {
        #[test]
        fn $name() {
            let mut lox = lox::Lox::new();
            let mut output = Vec::new();
            lox.run($source, &mut output);
            assert!(lox.had_error(), "expected a compile-time error for {}", stringify!($name));
        }
    };
}

/// Asserts `$source` parses and resolves cleanly but fails during
/// evaluation.
#[macro_export]
macro_rules! lox_runtime_error {
    ($name:ident, $source:expr) => {
        #[test]
        fn $name() {
            let mut lox = lox::Lox::new();
            let mut output = Vec::new();
            lox.run($source, &mut output);
            assert!(!lox.had_error(), "unexpected compile-time error for {}", stringify!($name));
            assert!(lox.had_runtime_error(), "expected a runtime error for {}", stringify!($name));
        }
    };
}
