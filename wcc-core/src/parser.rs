//! Recursive-descent parser with a Pratt expression grammar.
//!
//! The parser pulls tokens through a three-token window (`cur`, `peek`,
//! `peek2`), resolves identifiers against the symbol table of the
//! function being parsed, and accumulates syntax errors instead of
//! failing fast. Top-level statements outside any function are routed
//! into the synthetic `_global` function so symbol resolution has a
//! single code path; that function is never emitted.

use std::mem;

use crate::ast::{
    AssignOp, Expression, Function, InfixOp, PrefixOp, Program, Statement, GLOBAL_SCOPE,
};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
use crate::types::ValueType;

/// Binding power of infix operators, weakest first. `==` and `!=` share
/// a level with the relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::LtEq
        | TokenKind::GtEq => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Star | TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

fn infix_op(kind: TokenKind) -> Option<InfixOp> {
    match kind {
        TokenKind::Plus => Some(InfixOp::Add),
        TokenKind::Minus => Some(InfixOp::Sub),
        TokenKind::Star => Some(InfixOp::Mul),
        TokenKind::Slash => Some(InfixOp::Div),
        TokenKind::Lt => Some(InfixOp::Lt),
        TokenKind::Gt => Some(InfixOp::Gt),
        TokenKind::LtEq => Some(InfixOp::LtEq),
        TokenKind::GtEq => Some(InfixOp::GtEq),
        TokenKind::Eq => Some(InfixOp::Eq),
        TokenKind::NotEq => Some(InfixOp::NotEq),
        _ => None,
    }
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Assign => Some(AssignOp::Assign),
        TokenKind::PlusAssign => Some(AssignOp::AddAssign),
        TokenKind::MinusAssign => Some(AssignOp::SubAssign),
        TokenKind::StarAssign => Some(AssignOp::MulAssign),
        TokenKind::SlashAssign => Some(AssignOp::DivAssign),
        _ => None,
    }
}

/// Maps a type keyword to its value type; `None` for anything else.
fn type_keyword(kind: TokenKind) -> Option<ValueType> {
    match kind {
        TokenKind::Int => Some(ValueType::Int),
        TokenKind::Float => Some(ValueType::Float),
        TokenKind::Char => Some(ValueType::Char),
        TokenKind::Void => Some(ValueType::Void),
        _ => None,
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    peek: Token,
    peek2: Token,
    errors: Vec<ParseError>,
    program: Program,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let cur = lexer.next_token();
        let peek = lexer.next_token();
        let peek2 = lexer.next_token();
        Parser {
            lexer,
            cur,
            peek,
            peek2,
            errors: Vec::new(),
            program: Program::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    fn next_token(&mut self) {
        self.cur = mem::replace(
            &mut self.peek,
            mem::replace(&mut self.peek2, self.lexer.next_token()),
        );
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn cur_precedence(&self) -> Precedence {
        precedence_of(self.cur.kind)
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.kind)
    }

    fn error(&mut self, message: impl Into<String>, line: usize) {
        self.errors.push(ParseError::new(message, line));
    }

    /// Advances past `kind` or records an error and stays put.
    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.next_token();
            true
        } else {
            let message = format!("expected {} but found {}", kind, self.peek.kind);
            let line = self.peek.line;
            self.error(message, line);
            false
        }
    }

    fn skip_to_semicolon(&mut self) {
        while !self.cur_is(TokenKind::Semicolon) && !self.cur_is(TokenKind::EndOfFile) {
            self.next_token();
        }
    }

    /// True when `cur`..`peek2` look like `type name (`.
    fn at_function_declaration(&self) -> bool {
        self.cur.kind.is_type_keyword()
            && self.peek.kind == TokenKind::Ident
            && self.peek2.kind == TokenKind::LParen
    }

    /// Parses the whole translation unit.
    pub fn parse_program(&mut self) -> Program {
        let mut global = Function::new(GLOBAL_SCOPE, ValueType::Void);
        global.has_body = true;

        while !self.cur_is(TokenKind::EndOfFile) {
            if self.cur_is(TokenKind::Extern) {
                let line = self.cur.line;
                self.next_token();
                if self.at_function_declaration() {
                    self.parse_function(true);
                } else {
                    self.error("expected a function declaration after 'extern'", line);
                    self.next_token();
                }
            } else if self.at_function_declaration() {
                self.parse_function(false);
            } else if self.cur_is(TokenKind::Semicolon) {
                self.next_token();
            } else {
                match self.parse_statement(&mut global) {
                    Some(stmt) => global.statements.push(stmt),
                    None => {}
                }
                self.next_token();
            }
        }

        let mut program = mem::take(&mut self.program);
        program.global = global;
        program
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// Parses `type name ( params )` followed by `;` (external or stub)
    /// or a `{ ... }` body, and registers the result in the program.
    fn parse_function(&mut self, external: bool) {
        let return_type = type_keyword(self.cur.kind).unwrap_or(ValueType::Void);
        self.next_token();
        let name = self.cur.literal.clone();
        let line = self.cur.line;
        let mut func = Function::new(&name, return_type);
        self.next_token();

        if !self.parse_function_params(&mut func) {
            return;
        }

        if external {
            if !self.expect_peek(TokenKind::Semicolon) {
                return;
            }
            self.next_token();
            self.declare_external(func, line);
            return;
        }

        if self.peek_is(TokenKind::Semicolon) {
            // forward declaration: body may be filled in later
            self.next_token();
            self.next_token();
            self.declare_function(func, line);
            return;
        }

        if !self.expect_peek(TokenKind::LBrace) {
            return;
        }
        self.next_token();
        while !self.cur_is(TokenKind::RBrace) && !self.cur_is(TokenKind::EndOfFile) {
            if self.cur_is(TokenKind::Semicolon) {
                self.next_token();
                continue;
            }
            if let Some(stmt) = self.parse_statement(&mut func) {
                func.statements.push(stmt);
            }
            self.next_token();
        }
        self.next_token();

        func.has_body = true;
        self.declare_function(func, line);
    }

    /// Parses `( type name, ... )` into the function's parameter slots.
    /// `cur` sits on `(` on entry and `)` on success.
    fn parse_function_params(&mut self, func: &mut Function) -> bool {
        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return true;
        }
        loop {
            self.next_token();
            let ty = match type_keyword(self.cur.kind) {
                Some(ValueType::Void) | None => {
                    let message = format!("expected a parameter type but found {}", self.cur.kind);
                    let line = self.cur.line;
                    self.error(message, line);
                    return false;
                }
                Some(ty) => ty,
            };
            if !self.expect_peek(TokenKind::Ident) {
                return false;
            }
            let name = self.cur.literal.clone();
            func.define_param(&name, ty);
            if self.peek_is(TokenKind::Comma) {
                self.next_token();
            } else {
                break;
            }
        }
        self.expect_peek(TokenKind::RParen)
    }

    fn declare_external(&mut self, func: Function, line: usize) {
        if self.program.find_external(&func.name).is_some()
            || self.program.find_function(&func.name).is_some()
        {
            let message = format!("function '{}' is already defined", func.name);
            self.error(message, line);
            return;
        }
        self.program.external_functions.push(func);
    }

    fn declare_function(&mut self, func: Function, line: usize) {
        if self.program.find_external(&func.name).is_some() {
            let message = format!("function '{}' is already defined", func.name);
            self.error(message, line);
            return;
        }
        let existing = self
            .program
            .find_function(&func.name)
            .map(|(index, f)| (index, f.has_body));
        match existing {
            Some((_, true)) if func.has_body => {
                let message = format!("function '{}' is already defined", func.name);
                self.error(message, line);
            }
            Some((index, false)) if func.has_body => {
                // a definition fills in the earlier stub, keeping its
                // position in the function index space
                self.program.functions[index] = func;
            }
            Some(_) => {} // redundant forward declaration
            None => self.program.functions.push(func),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self, func: &mut Function) -> Option<Statement> {
        match self.cur.kind {
            TokenKind::Const | TokenKind::Int | TokenKind::Float | TokenKind::Char => {
                self.parse_variable_define(func)
            }
            TokenKind::Ident if self.peek.kind.is_assignment() => self.parse_variable_update(func),
            TokenKind::Return => self.parse_return(func),
            _ => self.parse_expression_statement(func),
        }
    }

    fn parse_variable_define(&mut self, func: &mut Function) -> Option<Statement> {
        let constant = if self.cur_is(TokenKind::Const) {
            self.next_token();
            if type_keyword(self.cur.kind).map_or(true, |ty| ty == ValueType::Void) {
                let message = format!("expected a type after 'const' but found {}", self.cur.kind);
                let line = self.cur.line;
                self.error(message, line);
                return None;
            }
            true
        } else {
            false
        };

        let ty = type_keyword(self.cur.kind)?;
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = self.cur.literal.clone();
        let symbol = func.define_symbol(&name, ty, constant);

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
            return Some(Statement::VariableDefine {
                ty,
                name,
                symbol,
                value: None,
            });
        }

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(func, Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::Semicolon) {
            return None;
        }
        Some(Statement::VariableDefine {
            ty,
            name,
            symbol,
            value: Some(value),
        })
    }

    fn parse_variable_update(&mut self, func: &mut Function) -> Option<Statement> {
        let name = self.cur.literal.clone();
        let line = self.cur.line;
        let op = assign_op(self.peek.kind)?;

        let symbol = match func.symbol(&name) {
            Some(symbol) => symbol,
            None => {
                self.error(format!("variable '{name}' is not defined"), line);
                return None;
            }
        };
        if symbol.constant {
            self.error(format!("cannot assign to constant variable '{name}'"), line);
            self.skip_to_semicolon();
            return None;
        }

        self.next_token();
        self.next_token();
        let value = self.parse_expression(func, Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::Semicolon) {
            return None;
        }
        Some(Statement::VariableUpdate {
            name,
            symbol,
            op,
            value,
        })
    }

    fn parse_return(&mut self, func: &mut Function) -> Option<Statement> {
        self.next_token();
        let value = self.parse_expression(func, Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::Semicolon) {
            return None;
        }
        Some(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self, func: &mut Function) -> Option<Statement> {
        let expression = self.parse_expression(func, Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Expression { expression })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expression(
        &mut self,
        func: &mut Function,
        precedence: Precedence,
    ) -> Option<Expression> {
        let mut left = self.parse_prefix(func)?;

        while !self.peek_is(TokenKind::Semicolon)
            && !self.peek_is(TokenKind::Comma)
            && !self.peek_is(TokenKind::EndOfFile)
            && precedence < self.peek_precedence()
        {
            if infix_op(self.peek.kind).is_none() {
                break;
            }
            self.next_token();
            left = self.parse_infix(func, left)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self, func: &mut Function) -> Option<Expression> {
        match self.cur.kind {
            TokenKind::IntegerLiteral => self.parse_integer_literal(),
            TokenKind::FloatLiteral => self.parse_float_literal(),
            TokenKind::CharLiteral => self.parse_char_literal(),
            TokenKind::Ident => {
                if self.peek_is(TokenKind::LParen) {
                    self.parse_call(func)
                } else {
                    self.parse_identifier(func)
                }
            }
            TokenKind::Minus => self.parse_prefix_operator(func, PrefixOp::Neg),
            TokenKind::Bang => self.parse_prefix_operator(func, PrefixOp::Not),
            TokenKind::LParen => self.parse_grouped(func),
            _ => {
                let message = format!("unexpected token {} in expression", self.cur.kind);
                let line = self.cur.line;
                self.error(message, line);
                None
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(_) => {
                let message = format!("could not parse '{}' as an integer", self.cur.literal);
                let line = self.cur.line;
                self.error(message, line);
                None
            }
        }
    }

    fn parse_float_literal(&mut self) -> Option<Expression> {
        match self.cur.literal.parse::<f64>() {
            Ok(value) => Some(Expression::FloatLiteral(value)),
            Err(_) => {
                let message = format!("could not parse '{}' as a float", self.cur.literal);
                let line = self.cur.line;
                self.error(message, line);
                None
            }
        }
    }

    fn parse_char_literal(&mut self) -> Option<Expression> {
        match self.cur.literal.as_bytes().first() {
            Some(&byte) => Some(Expression::CharLiteral(byte)),
            None => {
                let line = self.cur.line;
                self.error("empty character literal", line);
                None
            }
        }
    }

    fn parse_identifier(&mut self, func: &mut Function) -> Option<Expression> {
        let name = self.cur.literal.clone();
        match func.symbol(&name) {
            Some(symbol) => Some(Expression::Identifier { name, symbol }),
            None => {
                let message = format!("variable '{name}' is not defined");
                let line = self.cur.line;
                self.error(message, line);
                None
            }
        }
    }

    fn parse_prefix_operator(&mut self, func: &mut Function, op: PrefixOp) -> Option<Expression> {
        self.next_token();
        let right = self.parse_expression(func, Precedence::Prefix)?;
        Some(Expression::Prefix {
            op,
            right: Box::new(right),
        })
    }

    fn parse_grouped(&mut self, func: &mut Function) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(func, Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(expr)
    }

    fn parse_infix(&mut self, func: &mut Function, left: Expression) -> Option<Expression> {
        let op = infix_op(self.cur.kind)?;
        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(func, precedence)?;
        Some(Expression::Infix {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// Parses `name ( args )`. The callee must already be declared; for
    /// external callees the import index is resolved right here, local
    /// callees are resolved against the function list at code
    /// generation.
    fn parse_call(&mut self, func: &mut Function) -> Option<Expression> {
        let name = self.cur.literal.clone();
        let line = self.cur.line;

        let resolved = self
            .program
            .find_function(&name)
            .map(|(_, f)| (None, f))
            .or_else(|| {
                self.program
                    .find_external(&name)
                    .map(|(index, f)| (Some(index), f))
            })
            .map(|(external_index, f)| {
                (
                    external_index,
                    f.return_type,
                    f.params.len(),
                )
            });
        let (external_index, return_type, arity) = match resolved {
            Some(resolved) => resolved,
            None => {
                self.error(format!("unknown function '{name}'"), line);
                return None;
            }
        };

        self.next_token();
        let args = self.parse_call_arguments(func)?;
        if args.len() != arity {
            let message = format!(
                "function '{name}' expects {arity} argument(s) but received {}",
                args.len()
            );
            self.error(message, line);
            return None;
        }

        Some(Expression::Call {
            name,
            args,
            external_index,
            return_type,
        })
    }

    /// Parses a comma-separated argument list; `cur` sits on `(` on
    /// entry and `)` on success.
    fn parse_call_arguments(&mut self, func: &mut Function) -> Option<Vec<Expression>> {
        let mut args = Vec::new();
        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Some(args);
        }
        self.next_token();
        args.push(self.parse_expression(func, Precedence::Lowest)?);
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            args.push(self.parse_expression(func, Precedence::Lowest)?);
        }
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (Program, Vec<ParseError>) {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        let errors = parser.errors().to_vec();
        (program, errors)
    }

    fn parse_clean(source: &str) -> Program {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        program
    }

    fn rendered_global(program: &Program, index: usize) -> String {
        match &program.global_statements()[index] {
            Statement::Expression { expression } => expression.to_string(),
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn operator_precedence_shapes_the_tree() {
        let program = parse_clean("int a; int b; int c; -a*b; a+b+c; a+b/c;");
        assert_eq!(rendered_global(&program, 3), "((-a) * b)");
        assert_eq!(rendered_global(&program, 4), "((a + b) + c)");
        assert_eq!(rendered_global(&program, 5), "(a + (b / c))");
    }

    #[test]
    fn comparisons_share_a_precedence_level() {
        let program = parse_clean("int a; int b; a < b == b >= a; !(a < b);");
        assert_eq!(rendered_global(&program, 2), "(((a < b) == b) >= a)");
        assert_eq!(rendered_global(&program, 3), "(!(a < b))");
    }

    #[test]
    fn parenthesized_groups_override_precedence() {
        let program = parse_clean("int a; int b; (a + b) * a;");
        assert_eq!(rendered_global(&program, 2), "((a + b) * a)");
    }

    #[test]
    fn declaration_then_assignment_yields_two_statements() {
        let program = parse_clean("int x; x = 5;");
        assert_eq!(program.global_statements().len(), 2);
        assert!(matches!(
            program.global_statements()[0],
            Statement::VariableDefine { value: None, .. }
        ));
        assert!(matches!(
            program.global_statements()[1],
            Statement::VariableUpdate {
                op: AssignOp::Assign,
                ..
            }
        ));
    }

    #[test]
    fn extern_declaration_registers_an_external_function() {
        let program = parse_clean("extern void foo();");
        assert_eq!(program.external_functions.len(), 1);
        assert_eq!(program.functions.len(), 0);
        let foo = &program.external_functions[0];
        assert_eq!(foo.name, "foo");
        assert_eq!(foo.return_type, ValueType::Void);
        assert!(!foo.has_body);
    }

    #[test]
    fn assignment_to_const_is_rejected_and_skipped() {
        let (program, errors) = parse("const int x = 5; x = 10;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("constant"));
        assert_eq!(program.global_statements().len(), 1);
    }

    #[test]
    fn compound_assignments_parse_with_their_operator() {
        let program = parse_clean("int main() { int x = 10; x += 10; return x; }");
        let main = &program.functions[0];
        assert_eq!(main.statements.len(), 3);
        assert!(matches!(
            main.statements[1],
            Statement::VariableUpdate {
                op: AssignOp::AddAssign,
                ..
            }
        ));
    }

    #[test]
    fn function_parameters_claim_the_first_slots() {
        let program = parse_clean("float timestwo(float x) { return x * 2.0; }");
        let timestwo = &program.functions[0];
        assert_eq!(timestwo.params.len(), 1);
        assert_eq!(timestwo.params[0].ty, ValueType::Float);
        assert_eq!(timestwo.symbols.len(), 1);
        assert_eq!(timestwo.symbol("x").unwrap().index, 0);
    }

    #[test]
    fn calls_to_local_functions_resolve_lazily() {
        let program = parse_clean(
            "float timestwo(float x) { return x * 2.0; }\
             float main() { return timestwo(2.0); }",
        );
        let main = &program.functions[1];
        match &main.statements[0] {
            Statement::Return {
                value: Expression::Call {
                    name,
                    external_index,
                    return_type,
                    args,
                },
            } => {
                assert_eq!(name, "timestwo");
                assert_eq!(*external_index, None);
                assert_eq!(*return_type, ValueType::Float);
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected call in return, got {other:?}"),
        }
    }

    #[test]
    fn calls_to_external_functions_resolve_eagerly() {
        let program = parse_clean(
            "extern float fmodf(float x, float y);\
             extern float fabsf(float x);\
             float main() { return fabsf(-2.5); }",
        );
        let main = &program.functions[0];
        match &main.statements[0] {
            Statement::Return {
                value: Expression::Call { external_index, .. },
            } => assert_eq!(*external_index, Some(1)),
            other => panic!("expected call in return, got {other:?}"),
        }
    }

    #[test]
    fn forward_declarations_are_filled_in_place() {
        let program = parse_clean(
            "int helper();\
             int main() { return helper(); }\
             int helper() { return 3; }",
        );
        assert_eq!(program.functions.len(), 2);
        assert_eq!(program.functions[0].name, "helper");
        assert!(program.functions[0].has_body);
        assert_eq!(program.functions[1].name, "main");
    }

    #[test]
    fn duplicate_definitions_are_rejected() {
        let (_, errors) = parse("int main() { return 1; } int main() { return 2; }");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("already defined"));
    }

    #[test]
    fn unknown_functions_are_parse_errors() {
        let (_, errors) = parse("int main() { return missing(1); }");
        assert!(!errors.is_empty());
        assert!(errors[0].message.contains("unknown function 'missing'"));
    }

    #[test]
    fn undeclared_identifiers_are_parse_errors() {
        let (_, errors) = parse("int main() { return x; }");
        assert!(!errors.is_empty());
        assert!(errors[0].message.contains("'x' is not defined"));
    }

    #[test]
    fn call_arity_is_checked() {
        let (_, errors) = parse(
            "float timestwo(float x) { return x * 2.0; }\
             float main() { return timestwo(1.0, 2.0); }",
        );
        assert!(!errors.is_empty());
        assert!(errors[0].message.contains("expects 1 argument(s)"));
    }

    #[test]
    fn char_literals_carry_their_byte_value() {
        let program = parse_clean("char main() { char x = 'a'; return x; }");
        let main = &program.functions[0];
        match &main.statements[0] {
            Statement::VariableDefine {
                value: Some(Expression::CharLiteral(byte)),
                ..
            } => assert_eq!(*byte, b'a'),
            other => panic!("expected char define, got {other:?}"),
        }
    }

    #[test]
    fn global_statements_live_in_the_synthetic_scope() {
        let program = parse_clean("int x = 1;");
        assert_eq!(program.global.name, GLOBAL_SCOPE);
        assert_eq!(program.global_statements().len(), 1);
        assert_eq!(program.functions.len(), 0);
    }

    #[test]
    fn errors_carry_line_numbers() {
        let (_, errors) = parse("int x = 1;\nint y = ;\n");
        assert!(!errors.is_empty());
        assert_eq!(errors[0].line, 2);
    }
}
