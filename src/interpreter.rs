use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::class::{Class, Instance};
use crate::environment::{Env, Environment};
use crate::error::RuntimeError;
use crate::expr::*;
use crate::function::{self, clock, Function};
use crate::object::{Callable, Object};
use crate::stmt::*;
use crate::token::{Token, Type};

/// The outcome of executing a statement list. `spec.md` §9 REDESIGN FLAGS
/// picks this explicit sum type over the source's throw-to-unwind
/// `return`: a bare `return;`/fallthrough is `Normal`, a `return expr;`
/// is `Return(value)`, and every statement visitor that can contain one
/// (blocks, loops, ifs) propagates it upward instead of catching it.
pub enum Flow {
    Normal,
    Return(Object),
}

/// Walks the resolved AST, carrying the current environment and the
/// side-table the resolver produced (`spec.md` §4.5). Generic over the
/// output stream so tests can capture `print` output in a `Vec<u8>`
/// instead of going through real stdout.
pub struct Interpreter<'a> {
    pub globals: Env,
    environment: Env,
    locals: HashMap<ExprId, usize>,
    stdout: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(locals: HashMap<ExprId, usize>, stdout: &'a mut dyn Write) -> Self {
        let globals = Environment::new(None);
        globals.borrow_mut().define("clock", Object::Callable(clock()));

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals,
            stdout,
        }
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        expr.accept(self)
    }

    /// Runs `statements` in `environment`, restoring whatever environment
    /// was current before the call on every exit path — including an
    /// error or a `return` unwinding through it (`spec.md` §4.5, §5).
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Env) -> Result<Flow, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = (|| {
            for statement in statements {
                match self.execute(statement)? {
                    Flow::Normal => {}
                    returned => return Ok(returned),
                }
            }
            Ok(Flow::Normal)
        })();

        self.environment = previous;
        result
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(distance) => Ok(Environment::get_at(&self.environment, *distance, &name.lexeme)),
            None => self.globals.borrow().get(name),
        }
    }

    fn call(&mut self, paren: &Token, callable: Callable, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let arity = callable.arity();
        if arguments.len() != arity {
            return Err(RuntimeError::new(
                paren,
                format!("Expected {arity} arguments but got {}", arguments.len()),
            ));
        }

        match callable {
            Callable::Native(native) => Ok(native.call(&arguments)),
            Callable::Function(fun) => fun.call(self, arguments),
            Callable::BoundMethod(method, instance) => {
                function::invoke_bound(self, &method, Object::Instance(instance), arguments)
            }
            Callable::Class(class) => {
                let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(&class))));
                if let Some(initializer) = class.find_method("init") {
                    function::invoke_bound(self, &initializer, Object::Instance(Rc::clone(&instance)), arguments)?;
                }
                Ok(Object::Instance(instance))
            }
        }
    }
}

impl ExprVisitor<Result<Object, RuntimeError>> for Interpreter<'_> {
    fn visit_literal_expr(&mut self, data: &LiteralData) -> Result<Object, RuntimeError> {
        Ok(match &data.value {
            LiteralValue::Nil => Object::Nil,
            LiteralValue::Bool(b) => Object::Bool(*b),
            LiteralValue::Number(n) => Object::Number(*n),
            LiteralValue::String(s) => Object::String(s.clone()),
        })
    }

    fn visit_grouping_expr(&mut self, data: &GroupingData) -> Result<Object, RuntimeError> {
        self.evaluate(&data.expression)
    }

    fn visit_unary_expr(&mut self, data: &UnaryData) -> Result<Object, RuntimeError> {
        let right = self.evaluate(&data.right)?;

        match data.operator.kind {
            Type::Minus => match right {
                Object::Number(n) => Ok(Object::Number(-n)),
                _ => Err(RuntimeError::new(&data.operator, "Operand must be a number")),
            },
            Type::Bang => Ok(Object::Bool(!right.is_truthy())),
            _ => unreachable!("unary operators are limited to '!' and '-' by the parser"),
        }
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) -> Result<Object, RuntimeError> {
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;

        macro_rules! numeric {
            ($op:tt) => {
                match (&left, &right) {
                    (Object::Number(l), Object::Number(r)) => Ok(Object::Number(l $op r)),
                    _ => Err(RuntimeError::new(&data.operator, "Operands must be numbers")),
                }
            };
        }

        macro_rules! comparison {
            ($op:tt) => {
                match (&left, &right) {
                    (Object::Number(l), Object::Number(r)) => Ok(Object::Bool(l $op r)),
                    _ => Err(RuntimeError::new(&data.operator, "Operands must be numbers")),
                }
            };
        }

        match data.operator.kind {
            Type::Minus => numeric!(-),
            Type::Slash => numeric!(/),
            Type::Star => numeric!(*),
            Type::Greater => comparison!(>),
            Type::GreaterEqual => comparison!(>=),
            Type::Less => comparison!(<),
            Type::LessEqual => comparison!(<=),
            Type::Plus => match (left, right) {
                (Object::Number(l), Object::Number(r)) => Ok(Object::Number(l + r)),
                (Object::String(l), Object::String(r)) => Ok(Object::String(l + &r)),
                _ => Err(RuntimeError::new(&data.operator, "Operands must be two numbers or two strings")),
            },
            Type::BangEqual => Ok(Object::Bool(left != right)),
            Type::EqualEqual => Ok(Object::Bool(left == right)),
            _ => unreachable!("binary operators are limited to the arithmetic/comparison set by the parser"),
        }
    }

    fn visit_logical_expr(&mut self, data: &LogicalData) -> Result<Object, RuntimeError> {
        let left = self.evaluate(&data.left)?;

        match data.operator.kind {
            Type::Or if left.is_truthy() => Ok(left),
            Type::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(&data.right),
        }
    }

    fn visit_variable_expr(&mut self, data: &VariableData) -> Result<Object, RuntimeError> {
        self.look_up_variable(&data.name, data.id)
    }

    fn visit_assign_expr(&mut self, data: &AssignData) -> Result<Object, RuntimeError> {
        let value = self.evaluate(&data.value)?;

        match self.locals.get(&data.id) {
            Some(distance) => {
                Environment::assign_at(&self.environment, *distance, &data.name.lexeme, value.clone());
            }
            None => {
                self.globals.borrow_mut().assign(&data.name, value.clone())?;
            }
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, data: &CallData) -> Result<Object, RuntimeError> {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let Object::Callable(callable) = callee else {
            return Err(RuntimeError::new(&data.paren, "Can only call functions and classes"));
        };

        self.call(&data.paren, callable, arguments)
    }

    fn visit_get_expr(&mut self, data: &GetData) -> Result<Object, RuntimeError> {
        let object = self.evaluate(&data.object)?;

        let Object::Instance(instance) = object else {
            return Err(RuntimeError::new(&data.name, "Only instances have properties"));
        };

        instance
            .borrow()
            .get(&data.name, &instance)
            .ok_or_else(|| RuntimeError::new(&data.name, format!("Undefined property '{}'", data.name.lexeme)))
    }

    fn visit_set_expr(&mut self, data: &SetData) -> Result<Object, RuntimeError> {
        let object = self.evaluate(&data.object)?;

        let Object::Instance(instance) = object else {
            return Err(RuntimeError::new(&data.name, "Only instances have fields"));
        };

        let value = self.evaluate(&data.value)?;
        instance.borrow_mut().set(&data.name, value.clone());
        Ok(value)
    }

    fn visit_this_expr(&mut self, data: &ThisData) -> Result<Object, RuntimeError> {
        self.look_up_variable(&data.keyword, data.id)
    }

    fn visit_super_expr(&mut self, data: &SuperData) -> Result<Object, RuntimeError> {
        let distance = *self
            .locals
            .get(&data.id)
            .expect("resolver records a depth for every 'super' expression it accepts");

        let superclass = Environment::get_at(&self.environment, distance, "super");
        let Object::Callable(Callable::Class(superclass)) = superclass else {
            unreachable!("'super' always resolves to a class")
        };

        let instance = Environment::get_at(&self.environment, distance - 1, "this");
        let Object::Instance(instance) = instance else {
            unreachable!("'this' always resolves to an instance one scope inside 'super'")
        };

        let method = superclass
            .find_method(&data.method.lexeme)
            .ok_or_else(|| RuntimeError::new(&data.method, format!("Undefined property '{}'", data.method.lexeme)))?;

        Ok(Object::Callable(Callable::BoundMethod(method, instance)))
    }
}

impl StmtVisitor<Result<Flow, RuntimeError>> for Interpreter<'_> {
    fn visit_expression_stmt(&mut self, data: &ExpressionData) -> Result<Flow, RuntimeError> {
        self.evaluate(&data.expr)?;
        Ok(Flow::Normal)
    }

    fn visit_print_stmt(&mut self, data: &PrintData) -> Result<Flow, RuntimeError> {
        let value = self.evaluate(&data.expr)?;
        let _ = writeln!(self.stdout, "{value}");
        Ok(Flow::Normal)
    }

    fn visit_var_stmt(&mut self, data: &VarData) -> Result<Flow, RuntimeError> {
        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::Nil,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        Ok(Flow::Normal)
    }

    fn visit_block_stmt(&mut self, data: &BlockData) -> Result<Flow, RuntimeError> {
        let scope = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&data.statements, scope)
    }

    fn visit_if_stmt(&mut self, data: &IfData) -> Result<Flow, RuntimeError> {
        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            Ok(Flow::Normal)
        }
    }

    fn visit_while_stmt(&mut self, data: &WhileData) -> Result<Flow, RuntimeError> {
        while self.evaluate(&data.condition)?.is_truthy() {
            match self.execute(&data.body)? {
                Flow::Normal => {}
                returned => return Ok(returned),
            }
        }
        Ok(Flow::Normal)
    }

    fn visit_function_stmt(&mut self, data: &FunctionData) -> Result<Flow, RuntimeError> {
        let function = Function::new(
            data.name.clone(),
            data.params.clone(),
            Rc::clone(&data.body),
            Rc::clone(&self.environment),
            false,
        );
        self.environment
            .borrow_mut()
            .define(&data.name.lexeme, Object::Callable(Callable::Function(Rc::new(function))));
        Ok(Flow::Normal)
    }

    fn visit_return_stmt(&mut self, data: &ReturnData) -> Result<Flow, RuntimeError> {
        let value = match &data.value {
            Some(expr) => self.evaluate(expr)?,
            None => Object::Nil,
        };
        Ok(Flow::Return(value))
    }

    fn visit_class_stmt(&mut self, data: &ClassData) -> Result<Flow, RuntimeError> {
        let superclass = match &data.superclass {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                match value {
                    Object::Callable(Callable::Class(class)) => Some(class),
                    _ => {
                        let Expr::Variable(variable) = expr else {
                            unreachable!("the parser only ever records a superclass as a Variable")
                        };
                        return Err(RuntimeError::new(&variable.name, "Superclass must be a class"));
                    }
                }
            }
            None => None,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, Object::Nil);

        let previous = superclass.as_ref().map(|sup| {
            let scope = Environment::new(Some(Rc::clone(&self.environment)));
            scope
                .borrow_mut()
                .define("super", Object::Callable(Callable::Class(Rc::clone(sup))));
            std::mem::replace(&mut self.environment, scope)
        });

        let mut methods = HashMap::new();
        for method in &data.methods {
            let is_initializer = method.name.lexeme == "init";
            let function = Function::new(
                method.name.clone(),
                method.params.clone(),
                Rc::clone(&method.body),
                Rc::clone(&self.environment),
                is_initializer,
            );
            methods.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        if let Some(previous) = previous {
            self.environment = previous;
        }

        let class = Class::new(data.name.lexeme.clone(), superclass, methods);
        self.environment
            .borrow_mut()
            .assign(&data.name, Object::Callable(Callable::Class(Rc::new(class))))?;

        Ok(Flow::Normal)
    }
}
