//! Recursive-descent parser for zoning expressions.
//!
//! Precedence, loosest to tightest: `or`, `and`, `not`, comparison,
//! additive, multiplicative, unary minus. Comparison is left-associative
//! like the rest; chained comparisons type-error at evaluation.

use crate::ast::{BinOp, Expr, Reduce};
use crate::error::ExprError;
use crate::lexer::{lex, Spanned, Token};

pub fn parse(src: &str) -> Result<Expr, ExprError> {
    let tokens = lex(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    parser.expect_eof()?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(word) if word == w)
    }

    fn err(&self, message: impl Into<String>) -> ExprError {
        ExprError::Parse {
            message: message.into(),
        }
    }

    fn expect_eof(&self) -> Result<(), ExprError> {
        if self.peek() == &Token::Eof {
            Ok(())
        } else {
            Err(self.err(format!("trailing input at token {:?}", self.peek())))
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_and()?;
        while self.peek() == &Token::OrOr || self.is_word("or") {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_not()?;
        while self.peek() == &Token::AndAnd || self.is_word("and") {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::Binary {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ExprError> {
        if self.peek() == &Token::Bang || self.is_word("not") {
            self.advance();
            let e = self.parse_not()?;
            return Ok(Expr::Not(Box::new(e)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::Eq => BinOp::Eq,
                Token::Neq => BinOp::Neq,
                Token::Lt => BinOp::Lt,
                Token::Lte => BinOp::Lte,
                Token::Gt => BinOp::Gt,
                Token::Gte => BinOp::Gte,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.peek() == &Token::Minus {
            self.advance();
            let e = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(e)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.peek().clone() {
            Token::Num(n) => {
                self.advance();
                Ok(Expr::Num(n))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            Token::Word(w) if w == "true" || w == "True" => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            Token::Word(w) if w == "false" || w == "False" => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            Token::Word(w) if (w == "min" || w == "max") && self.next_is_lparen() => {
                let reduce = if w == "min" { Reduce::Min } else { Reduce::Max };
                self.advance();
                self.advance(); // '('
                let mut args = Vec::new();
                if self.peek() != &Token::RParen {
                    loop {
                        args.push(self.parse_or()?);
                        if self.peek() == &Token::Comma {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                if self.peek() != &Token::RParen {
                    return Err(self.err("expected ')' to close call"));
                }
                self.advance();
                if args.is_empty() {
                    return Err(self.err("min()/max() requires at least one argument"));
                }
                Ok(Expr::Call { reduce, args })
            }
            Token::Word(w) => {
                self.advance();
                Ok(Expr::Var(w))
            }
            Token::LParen => {
                self.advance();
                let e = self.parse_or()?;
                if self.peek() != &Token::RParen {
                    return Err(self.err("expected closing ')'"));
                }
                self.advance();
                Ok(e)
            }
            other => Err(self.err(format!("expected expression, got {:?}", other))),
        }
    }

    fn next_is_lparen(&self) -> bool {
        self.pos + 1 < self.tokens.len() && self.tokens[self.pos + 1].token == Token::LParen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_precedence_mul_over_add() {
        let e = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            e,
            Expr::Binary {
                op: BinOp::Add,
                left: Box::new(Expr::Num(1.0)),
                right: Box::new(Expr::Binary {
                    op: BinOp::Mul,
                    left: Box::new(Expr::Num(2.0)),
                    right: Box::new(Expr::Num(3.0)),
                }),
            }
        );
    }

    #[test]
    fn parse_and_binds_tighter_than_or() {
        let e = parse("a or b and c").unwrap();
        match e {
            Expr::Binary { op: BinOp::Or, right, .. } => match *right {
                Expr::Binary { op: BinOp::And, .. } => {}
                other => panic!("expected And on the right, got {:?}", other),
            },
            other => panic!("expected Or at the root, got {:?}", other),
        }
    }

    #[test]
    fn parse_comparison_with_arithmetic() {
        let e = parse("lot_area * 0.4 >= fl_area").unwrap();
        match e {
            Expr::Binary { op: BinOp::Gte, .. } => {}
            other => panic!("expected Gte, got {:?}", other),
        }
    }

    #[test]
    fn parse_min_call() {
        let e = parse("min(20, lot_width * 0.2)").unwrap();
        match e {
            Expr::Call { reduce: Reduce::Min, args } => assert_eq!(args.len(), 2),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn min_as_plain_identifier_still_parses() {
        // `min_unit_size` style facts must not be mistaken for calls
        assert_eq!(parse("min_unit_size").unwrap(), Expr::Var("min_unit_size".into()));
        assert_eq!(parse("min").unwrap(), Expr::Var("min".into()));
    }

    #[test]
    fn parse_unary_minus() {
        assert_eq!(parse("-5").unwrap(), Expr::Neg(Box::new(Expr::Num(5.0))));
    }

    #[test]
    fn parse_trailing_input_rejected() {
        assert!(parse("1 2").is_err());
        assert!(parse("(1").is_err());
    }
}
