//! Recursive-descent parser for the formula grammar (see `SPEC_FULL.md`,
//! `sheet-engine::formula`):
//!
//! ```text
//! Expr   := Term (('+' | '-') Term)*
//! Term   := Unary (('*' | '/') Unary)*
//! Unary  := ('+' | '-')* Primary
//! Primary:= Number | CellRef | '(' Expr ')'
//! Number := decimal with optional exponent
//! CellRef:= [A-Z]+[1-9][0-9]*   (must decode to a valid Position)
//! ```

use super::ast::Expr;
use crate::position::Position;
use crate::value::FormulaError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ref(Position),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Eof,
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    current: Token,
}

/// Parse formula text (the part after the leading `=`) into an [`Expr`].
///
/// Succeeds iff the input is a syntactically well-formed expression *and*
/// every reference token decodes to a valid [`Position`] — an out-of-grid
/// reference such as `XFE16384` is rejected here, at parse time, not at
/// evaluation time.
pub fn parse(text: &str) -> Result<Expr, FormulaError> {
    let mut parser = Parser::new(text);
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        let mut p = Parser {
            input: input.as_bytes(),
            pos: 0,
            current: Token::Eof,
        };
        p.advance();
        p
    }

    fn syntax_error(msg: impl Into<String>) -> FormulaError {
        FormulaError::Syntax(msg.into())
    }

    fn expect_eof(&self) -> Result<(), FormulaError> {
        if self.current == Token::Eof {
            Ok(())
        } else {
            Err(Self::syntax_error(format!(
                "unexpected trailing input at byte {}",
                self.pos
            )))
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.current = self.scan_token();
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Token::Eof;
        };
        match c {
            b'+' => {
                self.pos += 1;
                Token::Plus
            }
            b'-' => {
                self.pos += 1;
                Token::Minus
            }
            b'*' => {
                self.pos += 1;
                Token::Star
            }
            b'/' => {
                self.pos += 1;
                Token::Slash
            }
            b'(' => {
                self.pos += 1;
                Token::LParen
            }
            b')' => {
                self.pos += 1;
                Token::RParen
            }
            b'0'..=b'9' | b'.' => self.scan_number(),
            b'A'..=b'Z' => self.scan_ref(),
            _ => {
                // Not a valid token start. Consume the byte and report it as
                // an invalid reference so `parse_primary` turns it into a
                // syntax error instead of looping forever.
                self.pos += 1;
                Token::Ref(Position::NONE)
            }
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if matches!(self.peek(), Some(b'0'..=b'9')) {
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            } else {
                // Not actually an exponent (e.g. trailing bare "e"); back off.
                self.pos = mark;
            }
        }
        let text = std::str::from_utf8(&self.input[start..self.pos]).unwrap_or("");
        match text.parse::<f64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Ref(Position::NONE),
        }
    }

    fn scan_ref(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(b'A'..=b'Z')) {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos]).unwrap_or("");
        Token::Ref(Position::from_a1(text))
    }

    fn parse_expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.current {
                Token::Plus => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Add(Box::new(lhs), Box::new(rhs));
                }
                Token::Minus => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Sub(Box::new(lhs), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.current {
                Token::Star => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::Mul(Box::new(lhs), Box::new(rhs));
                }
                Token::Slash => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::Div(Box::new(lhs), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        match self.current {
            Token::Minus => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            Token::Plus => {
                self.advance();
                Ok(Expr::Plus(Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        match self.current.clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::Ref(pos) => {
                self.advance();
                if pos.is_valid() {
                    Ok(Expr::Ref(pos))
                } else {
                    Err(Self::syntax_error(format!(
                        "invalid cell reference near byte {}",
                        self.pos
                    )))
                }
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                if self.current != Token::RParen {
                    return Err(Self::syntax_error("expected closing ')'"));
                }
                self.advance();
                Ok(inner)
            }
            Token::RParen => Err(Self::syntax_error("unexpected ')'")),
            Token::Eof => Err(Self::syntax_error("unexpected end of formula")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::eval::eval;
    use crate::formula::print::print;

    struct EmptySheet;
    impl super::super::SheetView for EmptySheet {
        fn cell_value(&self, _pos: Position) -> Result<f64, FormulaError> {
            Ok(0.0)
        }
    }

    fn eval_str(text: &str) -> f64 {
        let ast = parse(text).expect("parses");
        match eval(&ast, &EmptySheet) {
            Ok(n) => n,
            Err(e) => panic!("eval error: {e}"),
        }
    }

    #[test]
    fn arithmetic_worked_example() {
        // (12+13) * (14+(13-24/(1+1))*55-46) -> 575
        let n = eval_str("(12+13) * (14+(13-24/(1+1))*55-46)");
        assert!((n - 575.0).abs() < 1e-9);
    }

    #[test]
    fn whitespace_is_ignored() {
        let a = parse("2 + 2").unwrap();
        let b = parse("2+2").unwrap();
        assert_eq!(print(&a), print(&b));
    }

    #[test]
    fn out_of_grid_reference_is_a_syntax_error() {
        assert!(matches!(parse("XFE16384"), Err(FormulaError::Syntax(_))));
    }

    #[test]
    fn unbalanced_parens_are_a_syntax_error() {
        assert!(parse("(1+2").is_err());
        assert!(parse("1+2)").is_err());
    }

    #[test]
    fn trailing_garbage_is_a_syntax_error() {
        assert!(parse("1 1").is_err());
    }

    #[test]
    fn unary_chains() {
        assert_eq!(eval_str("--5"), 5.0);
        assert_eq!(eval_str("-+5"), -5.0);
        assert_eq!(eval_str("+-5"), -5.0);
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(eval_str("1e2"), 100.0);
        assert_eq!(eval_str("1.5e1"), 15.0);
        assert_eq!(eval_str("2E-1"), 0.2);
    }
}
