use std::rc::Rc;
use std::time::Instant;

use crate::environment::{Env, Environment};
use crate::error::RuntimeError;
use crate::interpreter::{Flow, Interpreter};
use crate::object::{Callable, Object};
use crate::stmt::Stmt;
use crate::token::Token;

/// A user-defined function or method. Declared once by `fun` (or by a
/// class body) and captured by whatever environment was active at
/// declaration time, which is what makes closures work (`spec.md` §4.6).
#[derive(Debug)]
pub struct Function {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Env,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(name: Token, params: Vec<Token>, body: Rc<Vec<Stmt>>, closure: Env, is_initializer: bool) -> Self {
        Function { name, params, body, closure, is_initializer }
    }

    /// Calling a free (unbound) function runs its body directly on top of
    /// its captured closure. Only methods can be initializers, so
    /// `is_initializer` is always false here in practice, but `invoke`
    /// handles it uniformly regardless.
    pub fn call(self: &Rc<Self>, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        invoke(interpreter, self, Rc::clone(&self.closure), arguments)
    }
}

/// Runs `function`'s body in a fresh scope nested under `enclosing`,
/// binding parameters there, and reconciles its control flow with the
/// caller's expectations:
///
/// - a bare `return;` or falling off the end yields `nil`, unless this is
///   an initializer, in which case it yields `this` regardless of what (if
///   anything) the body returned (`spec.md` §4.6, §7: `init` always
///   returns the instance being constructed).
fn invoke(
    interpreter: &mut Interpreter,
    function: &Function,
    enclosing: Env,
    arguments: Vec<Object>,
) -> Result<Object, RuntimeError> {
    let call_env = Environment::new(Some(Rc::clone(&enclosing)));
    for (param, argument) in function.params.iter().zip(arguments) {
        call_env.borrow_mut().define(&param.lexeme, argument);
    }

    let flow = interpreter.execute_block(&function.body, call_env)?;

    if function.is_initializer {
        return Ok(Environment::get_at(&enclosing, 0, "this"));
    }

    match flow {
        Flow::Return(value) => Ok(value),
        Flow::Normal => Ok(Object::Nil),
    }
}

/// Entry point used by the evaluator for `Callable::BoundMethod`. A bound
/// method is a distinct runtime value pairing a method with the instance
/// it was looked up on, rather than a `Function` whose closure is mutated
/// in place (`spec.md` §4.6 item 4); calling one wraps the method's
/// closure in a fresh scope that binds `this` to the receiver and
/// delegates to the same [`invoke`] every other call goes through.
pub fn invoke_bound(
    interpreter: &mut Interpreter,
    method: &Rc<Function>,
    receiver: Object,
    arguments: Vec<Object>,
) -> Result<Object, RuntimeError> {
    let bound_scope = Environment::new(Some(Rc::clone(&method.closure)));
    bound_scope.borrow_mut().define("this", receiver);
    invoke(interpreter, method, bound_scope, arguments)
}

/// A function implemented in Rust rather than Lox, exposed to Lox programs
/// as an ordinary callable (`spec.md` §4.6: `clock`).
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub started_at: Instant,
    pub implementation: fn(&Instant, &[Object]) -> Object,
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction").field("name", &self.name).finish()
    }
}

impl NativeFunction {
    pub fn call(&self, arguments: &[Object]) -> Object {
        (self.implementation)(&self.started_at, arguments)
    }
}

/// Seconds elapsed since the interpreter started, as a Lox number.
/// Grounded on the book's `clock()` native, reimplemented over
/// `std::time::Instant` instead of a wall-clock epoch read.
pub fn clock() -> Callable {
    Callable::Native(Rc::new(NativeFunction {
        name: "clock",
        arity: 0,
        started_at: Instant::now(),
        implementation: |started_at, _args| Object::Number(started_at.elapsed().as_secs_f64()),
    }))
}
