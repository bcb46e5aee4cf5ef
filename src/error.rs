use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use thiserror::Error;

use crate::token::{Token, Type};

/// Raised by the scanner: unterminated strings, unexpected characters.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

/// Raised by the parser: token mismatches, invalid assignment targets,
/// argument/parameter lists over 255 entries.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

/// Raised by the resolver: illegal `this`/`super`, duplicate locals,
/// top-level `return`, self-inheriting classes, and similar static errors.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

/// Raised by the evaluator: type mismatches, undefined names, arity
/// mismatches, and anything else only observable at run time.
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl Into<String>) -> Self {
        RuntimeError { token: token.clone(), message: message.into() }
    }
}

/// Per-interpreter error state. `spec.md` §9 explicitly flags the
/// reference implementation's process-wide error flags as something a
/// library-grade rewrite should scope to an instance instead of global
/// state, so this is owned by `Lox` and shared (via `Rc<RefCell<_>>`, not
/// `static mut`) with whichever stage is currently running.
#[derive(Debug, Default)]
pub struct Diagnostics {
    had_error: bool,
    had_runtime_error: bool,
}

pub type SharedDiagnostics = Rc<RefCell<Diagnostics>>;

impl Diagnostics {
    pub fn shared() -> SharedDiagnostics {
        Rc::new(RefCell::new(Diagnostics::default()))
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clears both flags. Used between REPL lines so one bad line does not
    /// poison the rest of the session.
    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    pub fn scan_error(&mut self, err: &ScanError) {
        eprintln!("[line {}] Error: {}", err.line, err.message);
        self.had_error = true;
    }

    pub fn parse_error(&mut self, err: &ParseError) {
        self.report_at_token(&err.token, &err.message);
        self.had_error = true;
    }

    pub fn resolve_error(&mut self, err: &ResolveError) {
        self.report_at_token(&err.token, &err.message);
        self.had_error = true;
    }

    pub fn runtime_error(&mut self, err: &RuntimeError) {
        eprintln!("{}", err.message);
        eprintln!("[line {}]", err.token.line);
        self.had_runtime_error = true;
    }

    fn report_at_token(&self, token: &Token, message: &str) {
        if token.kind == Type::Eof {
            eprintln!("[line {}] Error at end: {}", token.line, message);
        } else {
            eprintln!("[line {}] Error at '{}': {}", token.line, token.lexeme, message);
        }
    }
}

/// Flushes stderr so interleaved stdout/stderr in tests and REPL sessions
/// stays in the order it was written.
pub fn flush_stderr() {
    let _ = std::io::stderr().flush();
}
