//! Recursive-descent parser producing the `ast` shapes from source text,
//! grounded on the teacher's hand-written (non-generator) `parse.rs`: a
//! `Parser` struct holding a token cursor, one `parse_*` method per grammar
//! production, precedence climbing for binary operators.

use std::fmt;
use std::rc::Rc;

use crate::ast::{BinOp, Call, DottedName, Expr, FuncDef, ParamDecl, PassingScheme, Program, Stmt, UnOp};
use crate::lexer::{self, LexError, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        Self {
            line: error.line,
            message: error.message,
        }
    }
}

/// Parses a complete Brewin' program: zero or more `func` declarations.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let tokens = lexer::lex(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut functions = Vec::new();
    while !parser.at_eof() {
        functions.push(Rc::new(parser.parse_func_def()?));
    }
    Ok(Program { functions })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn line(&self) -> usize {
        self.tokens[self.pos].line
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if std::mem::discriminant(self.peek()) == std::mem::discriminant(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {kind:?} but found {:?}", self.peek())))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            TokenKind::Ident(name) => Ok(name),
            other => Err(self.error(format!("expected identifier but found {other:?}"))),
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line(),
            message: message.into(),
        }
    }

    fn parse_func_def(&mut self) -> Result<FuncDef, ParseError> {
        self.expect(&TokenKind::Func)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_param_list()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(FuncDef {
            name: Some(name),
            params,
            body,
        })
    }

    fn parse_param_list(&mut self) -> Result<Vec<ParamDecl>, ParseError> {
        let mut params = Vec::new();
        if matches!(self.peek(), TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let scheme = if matches!(self.peek(), TokenKind::RefArg) {
                self.advance();
                PassingScheme::RefArg
            } else {
                PassingScheme::ByVal
            };
            let name = self.expect_ident()?;
            params.push(ParamDecl { name, scheme });
            if matches!(self.peek(), TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(params)
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace) {
            stmts.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Ident(_) => self.parse_assign_or_call(),
            other => Err(self.error(format!("expected statement but found {other:?}"))),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::If)?;
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let then_body = self.parse_block()?;
        let else_body = if matches!(self.peek(), TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Return)?;
        let value = if matches!(self.peek(), TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::Return(value))
    }

    /// An identifier at statement position starts either an assignment
    /// (`name = expr;` / `name.member = expr;`) or a call statement
    /// (`name(...);` / `name.method(...);`).
    fn parse_assign_or_call(&mut self) -> Result<Stmt, ParseError> {
        let base = self.expect_ident()?;
        let member = if matches!(self.peek(), TokenKind::Dot) {
            self.advance();
            Some(self.expect_ident()?)
        } else {
            None
        };
        match self.peek() {
            TokenKind::LParen => {
                self.advance();
                let args = self.parse_arg_list()?;
                self.expect(&TokenKind::RParen)?;
                self.expect(&TokenKind::Semicolon)?;
                let call = match member {
                    None => Call::Func { name: base, args },
                    Some(method) => Call::Method {
                        objref: base,
                        name: method,
                        args,
                    },
                };
                Ok(Stmt::Call(call))
            }
            TokenKind::Assign => {
                self.advance();
                let value = self.parse_expr()?;
                self.expect(&TokenKind::Semicolon)?;
                Ok(Stmt::Assign {
                    target: DottedName { base, member },
                    value,
                })
            }
            other => Err(self.error(format!("expected '=' or '(' but found {other:?}"))),
        }
    }

    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if matches!(self.peek(), TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if matches!(self.peek(), TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(args)
    }

    // Precedence, low to high: || , && , equality , relational , additive , multiplicative , unary.
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek(), TokenKind::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality()?;
        while matches!(self.peek(), TokenKind::AndAnd) {
            self.advance();
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Unary(UnOp::Neg, Box::new(self.parse_unary()?)))
            }
            TokenKind::Bang => {
                self.advance();
                Ok(Expr::Unary(UnOp::Not, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr::Int(n))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::Nil)
            }
            TokenKind::At => {
                self.advance();
                Ok(Expr::ObjectLiteral)
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Lambda => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let params = self.parse_param_list()?;
                self.expect(&TokenKind::RParen)?;
                let body = self.parse_block()?;
                Ok(Expr::Lambda(Rc::new(FuncDef { name: None, params, body })))
            }
            TokenKind::Ident(base) => {
                self.advance();
                let member = if matches!(self.peek(), TokenKind::Dot) {
                    self.advance();
                    Some(self.expect_ident()?)
                } else {
                    None
                };
                if matches!(self.peek(), TokenKind::LParen) {
                    // `mcall` is a statement-only production; a method call's
                    // return value can never be consumed by an expression.
                    if member.is_some() {
                        return Err(self.error("method calls cannot be used as expressions"));
                    }
                    self.advance();
                    let args = self.parse_arg_list()?;
                    self.expect(&TokenKind::RParen)?;
                    Ok(Expr::Call(Box::new(Call::Func { name: base, args })))
                } else {
                    Ok(Expr::Var(DottedName { base, member }))
                }
            }
            other => Err(self.error(format!("unexpected token {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_main() {
        let program = parse_program("func main() { print(\"hi\"); }").unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name.as_deref(), Some("main"));
    }

    #[test]
    fn parses_refarg_params_and_overloads() {
        let program = parse_program(
            "func swap(refarg a, refarg b) { }\n\
             func f() { return 1; }\n\
             func f(x) { return x; }",
        )
        .unwrap();
        assert_eq!(program.functions.len(), 3);
        assert_eq!(program.functions[0].params[0].scheme, PassingScheme::RefArg);
    }

    #[test]
    fn binary_precedence_nests_multiplicative_under_additive() {
        let program = parse_program("func main() { return 1 + 2 * 3; }").unwrap();
        let Stmt::Return(Some(Expr::Binary(BinOp::Add, _, rhs))) = &program.functions[0].body[0] else {
            panic!("expected addition at top level");
        };
        assert!(matches!(**rhs, Expr::Binary(BinOp::Mul, _, _)));
    }

    #[test]
    fn member_call_parses_as_method_call() {
        let program = parse_program("func main() { x.greet(\"a\"); }").unwrap();
        let Stmt::Call(Call::Method { objref, name, .. }) = &program.functions[0].body[0] else {
            panic!("expected method call");
        };
        assert_eq!(objref, "x");
        assert_eq!(name, "greet");
    }

    #[test]
    fn method_call_in_expression_position_is_a_syntax_error() {
        let err = parse_program("func main() { x = y.greet(\"a\"); }").unwrap_err();
        assert!(err.message.contains("method calls"));
    }

    #[test]
    fn reports_line_number_on_syntax_error() {
        let err = parse_program("func main(\n{ return; }").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
