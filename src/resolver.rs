use std::collections::HashMap;
use std::mem;

use crate::error::{ResolveError, SharedDiagnostics};
use crate::expr::*;
use crate::stmt::*;
use crate::token::Token;

#[derive(Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Static pass run after parsing and before evaluation: walks the AST once
/// to bind every variable reference to the number of scopes between its
/// use and its declaration, so the evaluator can do an O(1) environment
/// walk instead of a name search at every lookup (`spec.md` §4.4). Also
/// where the "can't read a local in its own initializer", "can't return
/// from top-level code", and `this`/`super` placement errors live.
pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>,
    locals: HashMap<ExprId, usize>,
    current_function: FunctionType,
    current_class: ClassType,
    diagnostics: SharedDiagnostics,
}

impl Resolver {
    pub fn new(diagnostics: SharedDiagnostics) -> Self {
        Resolver {
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            diagnostics,
        }
    }

    /// Resolves every statement and returns the id-to-depth side table the
    /// interpreter consults at runtime.
    pub fn resolve(mut self, statements: &[Stmt]) -> HashMap<ExprId, usize> {
        self.resolve_statements(statements);
        self.locals
    }

    fn resolve_statements(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn error(&mut self, token: &Token, message: impl Into<String>) {
        self.diagnostics.borrow_mut().resolve_error(&ResolveError { token: token.clone(), message: message.into() });
    }

    fn resolve_function(&mut self, function: &FunctionData, kind: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, kind);

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_statements(&function.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Marks a name as declared-but-not-yet-ready in the innermost scope,
    /// rejecting a second declaration of the same name in that scope
    /// (`spec.md` §4.4: shadowing is fine across scopes, not within one).
    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };

        if scope.contains_key(&name.lexeme) {
            self.error(name, format!("Already a variable with this name '{}' in this scope", name.lexeme));
        }
        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.locals.insert(id, depth);
                return;
            }
        }
        // Not found in any local scope: treated as global at runtime.
    }
}

impl ExprVisitor<()> for Resolver {
    fn visit_variable_expr(&mut self, data: &VariableData) {
        if let Some(scope) = self.scopes.last() {
            if scope.get(&data.name.lexeme) == Some(&false) {
                self.error(&data.name, "Can't read local variable in its own initializer");
            }
        }
        self.resolve_local(data.id, &data.name);
    }

    fn visit_assign_expr(&mut self, data: &AssignData) {
        self.resolve_expr(&data.value);
        self.resolve_local(data.id, &data.name);
    }

    fn visit_literal_expr(&mut self, _data: &LiteralData) {}

    fn visit_logical_expr(&mut self, data: &LogicalData) {
        self.resolve_expr(&data.left);
        self.resolve_expr(&data.right);
    }

    fn visit_unary_expr(&mut self, data: &UnaryData) {
        self.resolve_expr(&data.right);
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) {
        self.resolve_expr(&data.left);
        self.resolve_expr(&data.right);
    }

    fn visit_grouping_expr(&mut self, data: &GroupingData) {
        self.resolve_expr(&data.expression);
    }

    fn visit_call_expr(&mut self, data: &CallData) {
        self.resolve_expr(&data.callee);
        for argument in &data.arguments {
            self.resolve_expr(argument);
        }
    }

    fn visit_get_expr(&mut self, data: &GetData) {
        self.resolve_expr(&data.object);
    }

    fn visit_set_expr(&mut self, data: &SetData) {
        self.resolve_expr(&data.value);
        self.resolve_expr(&data.object);
    }

    fn visit_this_expr(&mut self, data: &ThisData) {
        if self.current_class == ClassType::None {
            self.error(&data.keyword, "Can't use 'this' outside of a class");
            return;
        }
        self.resolve_local(data.id, &data.keyword);
    }

    fn visit_super_expr(&mut self, data: &SuperData) {
        match self.current_class {
            ClassType::Subclass => {}
            ClassType::None => self.error(&data.keyword, "Can't use 'super' outside of a class"),
            ClassType::Class => self.error(&data.keyword, "Can't use 'super' in a class with no superclass"),
        }
        self.resolve_local(data.id, &data.keyword);
    }
}

impl StmtVisitor<()> for Resolver {
    fn visit_block_stmt(&mut self, data: &BlockData) {
        self.begin_scope();
        self.resolve_statements(&data.statements);
        self.end_scope();
    }

    fn visit_var_stmt(&mut self, data: &VarData) {
        self.declare(&data.name);
        if let Some(initializer) = &data.initializer {
            self.resolve_expr(initializer);
        }
        self.define(&data.name);
    }

    fn visit_function_stmt(&mut self, data: &FunctionData) {
        self.declare(&data.name);
        self.define(&data.name);
        self.resolve_function(data, FunctionType::Function);
    }

    fn visit_expression_stmt(&mut self, data: &ExpressionData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_if_stmt(&mut self, data: &IfData) {
        self.resolve_expr(&data.condition);
        self.resolve_stmt(&data.then_branch);
        if let Some(else_branch) = &data.else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_print_stmt(&mut self, data: &PrintData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_return_stmt(&mut self, data: &ReturnData) {
        if self.current_function == FunctionType::None {
            self.error(&data.keyword, "Can't return from top-level code");
        }

        if let Some(value) = &data.value {
            if self.current_function == FunctionType::Initializer {
                self.error(&data.keyword, "Can't return a value from an initializer");
                return;
            }
            self.resolve_expr(value);
        }
    }

    fn visit_while_stmt(&mut self, data: &WhileData) {
        self.resolve_expr(&data.condition);
        self.resolve_stmt(&data.body);
    }

    fn visit_class_stmt(&mut self, data: &ClassData) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(&data.name);
        self.define(&data.name);

        if let Some(superclass) = &data.superclass {
            if let Expr::Variable(variable) = superclass {
                if variable.name.lexeme == data.name.lexeme {
                    self.error(&variable.name, "A class can't inherit from itself");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.scopes.last_mut().expect("scope just pushed").insert("super".to_string(), true);
        }

        self.begin_scope();
        self.scopes.last_mut().expect("scope just pushed").insert("this".to_string(), true);

        for method in &data.methods {
            let kind = if method.name.lexeme == "init" { FunctionType::Initializer } else { FunctionType::Method };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if data.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }
}
