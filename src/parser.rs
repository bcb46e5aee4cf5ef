use std::rc::Rc;

use crate::error::{ParseError, SharedDiagnostics};
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Token, Type};

type ParseResult<T> = Result<T, ParseError>;

const MAX_ARGS: usize = 255;

/// Recursive-descent parser over the token stream. Grammar:
///
/// - program     -> declaration* EOF ;
/// - declaration -> classDecl | funDecl | varDecl | statement ;
/// - classDecl   -> "class" IDENTIFIER ( "<" IDENTIFIER )? "{" function* "}" ;
/// - funDecl     -> "fun" function ;
/// - varDecl     -> "var" IDENTIFIER ( "=" expression )? ";" ;
/// - function    -> IDENTIFIER "(" parameters? ")" block ;
/// - parameters  -> IDENTIFIER ( "," IDENTIFIER )* ;
/// - statement   -> exprStmt | forStmt | ifStmt | printStmt | returnStmt | whileStmt | block ;
/// - exprStmt    -> expression ";" ;
/// - forStmt     -> "for" "(" ( varDecl | exprStmt | ";" ) expression? ";" expression? ")" statement ;
/// - ifStmt      -> "if" "(" expression ")" statement ( "else" statement )? ;
/// - printStmt   -> "print" expression ";" ;
/// - returnStmt  -> "return" expression? ";" ;
/// - whileStmt   -> "while" "(" expression ")" statement ;
/// - block       -> "{" declaration* "}" ;
/// - expression  -> assignment ;
/// - assignment  -> ( call "." )? IDENTIFIER "=" assignment | logic_or ;
/// - logic_or    -> logic_and ( "or" logic_and )* ;
/// - logic_and   -> equality ( "and" equality )* ;
/// - equality    -> comparison ( ( "!=" | "==" ) comparison )* ;
/// - comparison  -> term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
/// - term        -> factor ( ( "+" | "-" ) factor )* ;
/// - factor      -> unary ( ( "*" | "/" ) unary )* ;
/// - unary       -> ( "!" | "-" ) unary | call ;
/// - call        -> primary ( "(" arguments? ")" | "." IDENTIFIER )* ;
/// - arguments   -> expression ( "," expression )* ;
/// - primary     -> NUMBER | STRING | "false" | "true" | "nil" | "this"
///                | "(" expression ")" | IDENTIFIER | "super" "." IDENTIFIER ;
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_expr_id: ExprId,
    diagnostics: SharedDiagnostics,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, diagnostics: SharedDiagnostics) -> Self {
        Parser { tokens, current: 0, next_expr_id: 0, diagnostics }
    }

    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        statements
    }

    fn fresh_id(&mut self) -> ExprId {
        let id = self.next_expr_id;
        self.next_expr_id += 1;
        id
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == Type::Eof
    }

    fn check(&self, kind: Type) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn matches(&mut self, kinds: &[Type]) -> bool {
        if kinds.iter().any(|k| self.check(*k)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: Type, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(ParseError { token: self.peek().clone(), message: message.to_string() })
    }

    fn error(&mut self, err: ParseError) {
        self.diagnostics.borrow_mut().parse_error(&err);
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches(&[Type::Class]) {
            self.class_declaration()
        } else if self.matches(&[Type::Fun]) {
            self.function("function")
        } else if self.matches(&[Type::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(err) => {
                self.error(err);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect class name")?;

        let superclass = if self.matches(&[Type::Less]) {
            self.consume(Type::Identifier, "Expect superclass name")?;
            Some(Expr::Variable(VariableData { id: self.fresh_id(), name: self.previous().clone() }))
        } else {
            None
        };

        self.consume(Type::LeftBrace, "Expect '{' before class body")?;

        let mut methods = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            match self.function("method")? {
                Stmt::Function(data) => methods.push(data),
                _ => unreachable!("function() always returns Stmt::Function"),
            }
        }

        self.consume(Type::RightBrace, "Expect '}' after class body")?;

        Ok(Stmt::Class(ClassData { name, superclass, methods }))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect variable name")?;

        let initializer = if self.matches(&[Type::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(Type::Semicolon, "Expect ';' after variable declaration")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[Type::For]) {
            return self.for_statement();
        }
        if self.matches(&[Type::If]) {
            return self.if_statement();
        }
        if self.matches(&[Type::Print]) {
            return self.print_statement();
        }
        if self.matches(&[Type::Return]) {
            return self.return_statement();
        }
        if self.matches(&[Type::While]) {
            return self.while_statement();
        }
        if self.matches(&[Type::LeftBrace]) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }
        self.expression_statement()
    }

    /// Desugars `for` into a `while` loop wrapped in whatever initializer
    /// block it needs, rather than adding a dedicated loop node
    /// (`spec.md` §4.2).
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'for'")?;

        let initializer = if self.matches(&[Type::Semicolon]) {
            None
        } else if self.matches(&[Type::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "Expect ';' after loop condition")?;

        let increment = if !self.check(Type::RightParen) { Some(self.expression()?) } else { None };
        self.consume(Type::RightParen, "Expect ')' after for clauses")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(BlockData {
                statements: vec![body, Stmt::Expression(ExpressionData { expr: increment })],
            });
        }

        let condition = condition.unwrap_or_else(|| {
            Expr::Literal(LiteralData { id: self.fresh_id(), value: LiteralValue::Bool(true) })
        });
        body = Stmt::While(WhileData { condition, body: Box::new(body) });

        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockData { statements: vec![initializer, body] });
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after if condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[Type::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after value")?;
        Ok(Stmt::Print(PrintData { expr }))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "Expect ';' after return value")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While(WhileData { condition, body }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after expression")?;
        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    fn function(&mut self, kind: &str) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, &format!("Expect {kind} name"))?;
        self.consume(Type::LeftParen, &format!("Expect '(' after {kind} name"))?;

        let mut params = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    self.error(ParseError {
                        token: self.peek().clone(),
                        message: format!("Can't have more than {MAX_ARGS} parameters"),
                    });
                }
                params.push(self.consume(Type::Identifier, "Expect parameter name")?);
                if !self.matches(&[Type::Comma]) {
                    break;
                }
            }
        }
        self.consume(Type::RightParen, "Expect ')' after parameters")?;

        self.consume(Type::LeftBrace, &format!("Expect '{{' before {kind} body"))?;
        let body = Rc::new(self.block()?);

        Ok(Stmt::Function(FunctionData { name, params, body }))
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(Type::RightBrace, "Expect '}' after block")?;
        Ok(statements)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// Parses the target as an ordinary expression first, then rewrites it
    /// into an assignment target on seeing `=` — a variable becomes an
    /// `Assign`, a property access becomes a `Set`. Anything else is an
    /// invalid target, reported without aborting the parse (`spec.md`
    /// §4.2: assignment targets are checked, not part of the grammar).
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.matches(&[Type::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(data) => {
                    Ok(Expr::Assign(AssignData { id: self.fresh_id(), name: data.name, value: Box::new(value) }))
                }
                Expr::Get(data) => {
                    Ok(Expr::Set(SetData { id: self.fresh_id(), object: data.object, name: data.name, value: Box::new(value) }))
                }
                _ => {
                    self.error(ParseError { token: equals, message: "Invalid assignment target".to_string() });
                    Ok(expr)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while self.matches(&[Type::Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData { id: self.fresh_id(), left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[Type::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalData { id: self.fresh_id(), left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;
        while self.matches(&[Type::BangEqual, Type::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(BinaryData { id: self.fresh_id(), left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;
        while self.matches(&[Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(BinaryData { id: self.fresh_id(), left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;
        while self.matches(&[Type::Minus, Type::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(BinaryData { id: self.fresh_id(), left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;
        while self.matches(&[Type::Slash, Type::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(BinaryData { id: self.fresh_id(), left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[Type::Bang, Type::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(UnaryData { id: self.fresh_id(), operator, right: Box::new(right) }));
        }
        self.call()
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    self.error(ParseError {
                        token: self.peek().clone(),
                        message: format!("Can't have more than {MAX_ARGS} arguments"),
                    });
                }
                arguments.push(self.expression()?);
                if !self.matches(&[Type::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expect ')' after arguments")?;
        Ok(Expr::Call(CallData { id: self.fresh_id(), callee: Box::new(callee), paren, arguments }))
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[Type::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[Type::Dot]) {
                let name = self.consume(Type::Identifier, "Expect property name after '.'")?;
                expr = Expr::Get(GetData { id: self.fresh_id(), object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[Type::False]) {
            return Ok(Expr::Literal(LiteralData { id: self.fresh_id(), value: LiteralValue::Bool(false) }));
        }
        if self.matches(&[Type::True]) {
            return Ok(Expr::Literal(LiteralData { id: self.fresh_id(), value: LiteralValue::Bool(true) }));
        }
        if self.matches(&[Type::Nil]) {
            return Ok(Expr::Literal(LiteralData { id: self.fresh_id(), value: LiteralValue::Nil }));
        }
        if self.matches(&[Type::Number, Type::String]) {
            let value = match self.previous().literal.clone() {
                Some(Literal::Number(n)) => LiteralValue::Number(n),
                Some(Literal::String(s)) => LiteralValue::String(s),
                None => unreachable!("number/string tokens always carry a literal"),
            };
            return Ok(Expr::Literal(LiteralData { id: self.fresh_id(), value }));
        }
        if self.matches(&[Type::Super]) {
            let keyword = self.previous().clone();
            self.consume(Type::Dot, "Expect '.' after 'super'")?;
            let method = self.consume(Type::Identifier, "Expect superclass method name")?;
            return Ok(Expr::Super(SuperData { id: self.fresh_id(), keyword, method }));
        }
        if self.matches(&[Type::This]) {
            return Ok(Expr::This(ThisData { id: self.fresh_id(), keyword: self.previous().clone() }));
        }
        if self.matches(&[Type::Identifier]) {
            return Ok(Expr::Variable(VariableData { id: self.fresh_id(), name: self.previous().clone() }));
        }
        if self.matches(&[Type::LeftParen]) {
            let expression = self.expression()?;
            self.consume(Type::RightParen, "Expect ')' after expression")?;
            return Ok(Expr::Grouping(GroupingData { id: self.fresh_id(), expression: Box::new(expression) }));
        }

        Err(ParseError { token: self.peek().clone(), message: "Expect expression".to_string() })
    }

    /// After a parse error, discards tokens until we're plausibly at the
    /// start of the next statement, so a single syntax error doesn't
    /// cascade into a wall of spurious ones (`spec.md` §4.2, §7).
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == Type::Semicolon {
                return;
            }

            match self.peek().kind {
                Type::Class | Type::Fun | Type::Var | Type::For | Type::If | Type::While | Type::Print | Type::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostics;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> (Vec<Stmt>, SharedDiagnostics) {
        let diagnostics = Diagnostics::shared();
        let tokens = Scanner::new(source, diagnostics.clone()).scan_tokens();
        let statements = Parser::new(tokens, diagnostics.clone()).parse();
        (statements, diagnostics)
    }

    #[test]
    fn parses_expression_statement() {
        let (statements, diagnostics) = parse("1 + 2;");
        assert_eq!(statements.len(), 1);
        assert!(!diagnostics.borrow().had_error());
    }

    #[test]
    fn parses_var_declaration_without_initializer() {
        let (statements, diagnostics) = parse("var a;");
        assert!(matches!(statements[0], Stmt::Var(VarData { initializer: None, .. })));
        assert!(!diagnostics.borrow().had_error());
    }

    #[test]
    fn missing_semicolon_is_reported() {
        let (_, diagnostics) = parse("1 + 2");
        assert!(diagnostics.borrow().had_error());
    }

    #[test]
    fn invalid_assignment_target_is_reported_but_recovers() {
        let (statements, diagnostics) = parse("1 = 2;");
        assert!(diagnostics.borrow().had_error());
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn for_loop_desugars_to_while_in_a_block() {
        let (statements, diagnostics) = parse("for (var i = 0; i < 1; i = i + 1) print i;");
        assert!(!diagnostics.borrow().had_error());
        match &statements[0] {
            Stmt::Block(BlockData { statements }) => {
                assert_eq!(statements.len(), 2);
                assert!(matches!(statements[1], Stmt::While(_)));
            }
            other => panic!("expected desugared block, got {other:?}"),
        }
    }

    #[test]
    fn class_with_superclass_and_methods() {
        let (statements, diagnostics) = parse("class A < B { f() { return 1; } }");
        assert!(!diagnostics.borrow().had_error());
        match &statements[0] {
            Stmt::Class(ClassData { superclass, methods, .. }) => {
                assert!(superclass.is_some());
                assert_eq!(methods.len(), 1);
            }
            other => panic!("expected class decl, got {other:?}"),
        }
    }

    #[test]
    fn call_and_get_chain() {
        let (statements, diagnostics) = parse("a.b(1, 2).c;");
        assert!(!diagnostics.borrow().had_error());
        assert_eq!(statements.len(), 1);
    }
}
