//! Recursive-descent parser for expressions.

use super::ast::{BinaryOp, Expr};
use super::lexer::{Lexer, Token, TokenKind};
use crate::error::{MdoError, Result};

/// Parser for expression strings.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Tokenize `input` and prepare to parse it.
    pub fn new(input: &str) -> Result<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }

    /// Parse the whole input as one expression.
    pub fn parse(&mut self) -> Result<Expr> {
        if self.current().kind == TokenKind::Eof {
            return Err(MdoError::syntax(self.current().column, "empty expression"));
        }
        let expr = self.parse_sum()?;
        let tok = self.current();
        if tok.kind != TokenKind::Eof {
            return Err(MdoError::syntax(
                tok.column,
                format!("unexpected '{}' after expression", tok.text),
            ));
        }
        Ok(expr)
    }

    fn current(&self) -> &Token {
        // tokenize() always ends with Eof, and we never advance past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        let tok = self.current();
        if tok.kind == kind {
            Ok(self.advance())
        } else {
            Err(MdoError::syntax(
                tok.column,
                format!("expected {:?}, got '{}'", kind, tok.text),
            ))
        }
    }

    // sum = product { ('+' | '-') product }
    fn parse_sum(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_product()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_product()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    // product = unary { ('*' | '/') unary }
    fn parse_product(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    // unary = ('-' | '+') unary | power
    fn parse_unary(&mut self) -> Result<Expr> {
        match self.current().kind {
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    // power = atom [ '^' unary ]   (right associative)
    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_atom()?;
        if self.current().kind == TokenKind::Caret {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Number => tok
                .text
                .parse::<f64>()
                .map(Expr::Number)
                .map_err(|_| MdoError::syntax(tok.column, format!("invalid number '{}'", tok.text))),
            TokenKind::Name => {
                if self.current().kind == TokenKind::OpenParen {
                    self.advance();
                    let args = self.parse_arguments()?;
                    Ok(Expr::Call { name: tok.text, args, column: tok.column })
                } else {
                    Ok(Expr::Name { name: tok.text, column: tok.column })
                }
            }
            TokenKind::OpenParen => {
                let inner = self.parse_sum()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(inner)
            }
            TokenKind::Eof => Err(MdoError::syntax(tok.column, "unexpected end of expression")),
            _ => Err(MdoError::syntax(tok.column, format!("unexpected '{}'", tok.text))),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.current().kind == TokenKind::CloseParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_sum()?);
            match self.current().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::CloseParen => {
                    self.advance();
                    return Ok(args);
                }
                _ => {
                    let tok = self.current();
                    return Err(MdoError::syntax(
                        tok.column,
                        format!("expected ',' or ')', got '{}'", tok.text),
                    ));
                }
            }
        }
    }
}

/// Parse an expression string into an AST.
pub fn parse(input: &str) -> Result<Expr> {
    Parser::new(input)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Box<Expr> {
        Box::new(Expr::Number(v))
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                lhs: num(1.0),
                rhs: Box::new(Expr::Binary { op: BinaryOp::Mul, lhs: num(2.0), rhs: num(3.0) }),
            }
        );
    }

    #[test]
    fn test_power_binds_tighter_than_negation() {
        // -2^2 is -(2^2)
        let expr = parse("-2^2").unwrap();
        assert_eq!(
            expr,
            Expr::Neg(Box::new(Expr::Binary { op: BinaryOp::Pow, lhs: num(2.0), rhs: num(2.0) }))
        );
    }

    #[test]
    fn test_call_and_names() {
        let expr = parse("unit.kt_mps(aircraft.performance.approach.app_speed_eff) * 2").unwrap();
        assert_eq!(expr.names(), vec!["aircraft.performance.approach.app_speed_eff"]);
        match expr {
            Expr::Binary { lhs, .. } => match *lhs {
                Expr::Call { ref name, ref args, .. } => {
                    assert_eq!(name, "unit.kt_mps");
                    assert_eq!(args.len(), 1);
                }
                ref other => panic!("expected call, got {:?}", other),
            },
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse(""), Err(MdoError::Syntax { .. })));
        assert!(matches!(parse("1 +"), Err(MdoError::Syntax { .. })));
        assert!(matches!(parse("(1 + 2"), Err(MdoError::Syntax { .. })));
        assert!(matches!(parse("max(1 2)"), Err(MdoError::Syntax { .. })));
        assert!(matches!(parse("1 2"), Err(MdoError::Syntax { .. })));
    }
}
