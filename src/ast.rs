use crate::expr::*;
use crate::stmt::*;

/// Lisp-style parenthesized dump of a parsed program, used by the `debug
/// parse` CLI subcommand (`spec.md` §6.4). Grounded in the teacher's own
/// `ASTPrinter`, generalized to the full statement/expression set.
pub struct AstPrinter;

macro_rules! parenthesize {
    ($self:ident, $name:expr, $( $x:expr ),+ $(,)?) => {{
        let mut out = String::from("(");
        out.push_str($name);
        $(
            out.push(' ');
            out.push_str(&$x.accept($self));
        )+
        out.push(')');
        out
    }};
}

impl AstPrinter {
    pub fn print_statements(&mut self, statements: &[Stmt]) -> String {
        statements.iter().map(|s| s.accept(self)).collect::<Vec<_>>().join("\n")
    }
}

impl ExprVisitor<String> for AstPrinter {
    fn visit_literal_expr(&mut self, data: &LiteralData) -> String {
        match &data.value {
            LiteralValue::Nil => "nil".to_string(),
            LiteralValue::Bool(b) => b.to_string(),
            LiteralValue::Number(n) => n.to_string(),
            LiteralValue::String(s) => s.clone(),
        }
    }

    fn visit_grouping_expr(&mut self, data: &GroupingData) -> String {
        parenthesize!(self, "group", data.expression)
    }

    fn visit_unary_expr(&mut self, data: &UnaryData) -> String {
        parenthesize!(self, &data.operator.lexeme, data.right)
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) -> String {
        parenthesize!(self, &data.operator.lexeme, data.left, data.right)
    }

    fn visit_logical_expr(&mut self, data: &LogicalData) -> String {
        parenthesize!(self, &data.operator.lexeme, data.left, data.right)
    }

    fn visit_variable_expr(&mut self, data: &VariableData) -> String {
        data.name.lexeme.clone()
    }

    fn visit_assign_expr(&mut self, data: &AssignData) -> String {
        parenthesize!(self, &format!("= {}", data.name.lexeme), data.value)
    }

    fn visit_call_expr(&mut self, data: &CallData) -> String {
        let mut out = format!("(call {}", data.callee.accept(self));
        for argument in &data.arguments {
            out.push(' ');
            out.push_str(&argument.accept(self));
        }
        out.push(')');
        out
    }

    fn visit_get_expr(&mut self, data: &GetData) -> String {
        format!("(. {} {})", data.object.accept(self), data.name.lexeme)
    }

    fn visit_set_expr(&mut self, data: &SetData) -> String {
        format!("(set {} {} {})", data.object.accept(self), data.name.lexeme, data.value.accept(self))
    }

    fn visit_this_expr(&mut self, _data: &ThisData) -> String {
        "this".to_string()
    }

    fn visit_super_expr(&mut self, data: &SuperData) -> String {
        format!("(super {})", data.method.lexeme)
    }
}

impl StmtVisitor<String> for AstPrinter {
    fn visit_expression_stmt(&mut self, data: &ExpressionData) -> String {
        parenthesize!(self, "expr", data.expr)
    }

    fn visit_print_stmt(&mut self, data: &PrintData) -> String {
        parenthesize!(self, "print", data.expr)
    }

    fn visit_var_stmt(&mut self, data: &VarData) -> String {
        match &data.initializer {
            Some(initializer) => format!("(var {} {})", data.name.lexeme, initializer.accept(self)),
            None => format!("(var {})", data.name.lexeme),
        }
    }

    fn visit_block_stmt(&mut self, data: &BlockData) -> String {
        let mut out = String::from("(block");
        for stmt in &data.statements {
            out.push(' ');
            out.push_str(&stmt.accept(self));
        }
        out.push(')');
        out
    }

    fn visit_if_stmt(&mut self, data: &IfData) -> String {
        let mut out = format!("(if {} {}", data.condition.accept(self), data.then_branch.accept(self));
        if let Some(else_branch) = &data.else_branch {
            out.push(' ');
            out.push_str(&else_branch.accept(self));
        }
        out.push(')');
        out
    }

    fn visit_while_stmt(&mut self, data: &WhileData) -> String {
        parenthesize!(self, "while", data.condition, data.body)
    }

    fn visit_function_stmt(&mut self, data: &FunctionData) -> String {
        let params = data.params.iter().map(|p| p.lexeme.as_str()).collect::<Vec<_>>().join(" ");
        let body = data.body.iter().map(|s| s.accept(self)).collect::<Vec<_>>().join(" ");
        format!("(fun {}({}) {})", data.name.lexeme, params, body)
    }

    fn visit_return_stmt(&mut self, data: &ReturnData) -> String {
        match &data.value {
            Some(value) => format!("(return {})", value.accept(self)),
            None => "(return)".to_string(),
        }
    }

    fn visit_class_stmt(&mut self, data: &ClassData) -> String {
        let mut out = format!("(class {}", data.name.lexeme);
        if let Some(superclass) = &data.superclass {
            out.push_str(" < ");
            out.push_str(&superclass.accept(self));
        }
        for method in &data.methods {
            out.push(' ');
            out.push_str(&self.visit_function_stmt(method));
        }
        out.push(')');
        out
    }
}
