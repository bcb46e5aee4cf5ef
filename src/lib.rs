//! Lox is a tree-walking interpreter for the dynamically typed scripting
//! language defined in *Crafting Interpreters* (chapters 1-13): a
//! hand-written scanner, a recursive-descent parser with error recovery, a
//! static resolver that binds every variable use to an exact scope depth,
//! and a visitor-style evaluator carrying lexically scoped environments
//! through closures, first-class functions, classes, inheritance and
//! bound methods.
//!
//! The pipeline is strictly linear and aborts on failure:
//! ```text
//! source text -> Scanner -> tokens -> Parser -> AST
//!             -> Resolver -> {expr id -> scope depth}
//!             -> Interpreter -> side effects + exit status
//! ```
//!
//! Scan, parse and resolve errors are accumulated and reported without
//! unwinding the pipeline (so a single run can report more than one); a
//! runtime error aborts the current run. Both flag state live on a
//! [`error::Diagnostics`] owned per [`Lox`] instance rather than as global
//! statics, so more than one interpreter can be embedded in one process.

use std::io::Write;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use error::{Diagnostics, SharedDiagnostics};
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;
use stmt::Stmt;

/// Exit codes mandated by `spec.md` §6.3.
pub const EXIT_USAGE: i32 = 64;
pub const EXIT_DATA_ERROR: i32 = 65;
pub const EXIT_SOFTWARE_ERROR: i32 = 70;

/// One embeddable interpreter instance: its own diagnostics flags and its
/// own global environment. A caller can run many of these in one process
/// without them interfering with each other.
pub struct Lox {
    diagnostics: SharedDiagnostics,
}

impl Lox {
    pub fn new() -> Self {
        Lox { diagnostics: Diagnostics::shared() }
    }

    pub fn had_error(&self) -> bool {
        self.diagnostics.borrow().had_error()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.diagnostics.borrow().had_runtime_error()
    }

    /// Scans and parses `source`, returning the statement list even when
    /// scan/parse errors were reported (best-effort, for `debug`
    /// subcommands that want to inspect what little did parse).
    pub fn parse(&self, source: &str) -> Vec<Stmt> {
        let tokens = Scanner::new(source, self.diagnostics.clone()).scan_tokens();
        Parser::new(tokens, self.diagnostics.clone()).parse()
    }

    /// Scans `source` and returns its tokens, for the `debug lex`
    /// subcommand.
    pub fn scan(&self, source: &str) -> Vec<token::Token> {
        Scanner::new(source, self.diagnostics.clone()).scan_tokens()
    }

    /// Runs the full pipeline, writing `print` output to `stdout`. Stops
    /// at whichever stage first reports an error: resolution is skipped
    /// after a scan/parse error, and evaluation is skipped after a
    /// resolution error (`spec.md` §7).
    pub fn run(&mut self, source: &str, stdout: &mut dyn Write) {
        let statements = self.parse(source);
        if self.had_error() {
            return;
        }

        let locals = Resolver::new(self.diagnostics.clone()).resolve(&statements);
        if self.had_error() {
            return;
        }

        let mut interpreter = Interpreter::new(locals, stdout);
        if let Err(err) = interpreter.interpret(&statements) {
            self.diagnostics.borrow_mut().runtime_error(&err);
        }
    }

    /// Runs `source` and reports via the bespoke error channel, returning
    /// the process exit status the CLI's `run` subcommand should use
    /// (`spec.md` §6.3). Never called from a REPL loop: REPL sessions
    /// never exit based on a single input.
    pub fn run_file(&mut self, source: &str, stdout: &mut dyn Write) -> i32 {
        self.run(source, stdout);

        if self.had_error() {
            EXIT_DATA_ERROR
        } else if self.had_runtime_error() {
            EXIT_SOFTWARE_ERROR
        } else {
            0
        }
    }

    /// Runs one REPL line. Clears both error flags afterward so a bad
    /// line does not poison the rest of the session (`spec.md` §4.7).
    pub fn run_line(&mut self, source: &str, stdout: &mut dyn Write) {
        self.run(source, stdout);
        self.diagnostics.borrow_mut().reset();
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}
