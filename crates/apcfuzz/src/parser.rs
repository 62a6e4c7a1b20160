//! Reader for typed expressions
//!
//! Accepts the canonical form and everything the subject form uses:
//!
//! ```text
//! query   := expr ('#' DECIMAL)?
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary | primary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMERAL ('_' DECIMAL)? | '(' expr ')'
//! ```
//!
//! A primary written directly after a term is an implicit product, so
//! `(3)(4)`, `3(4)` and `(3)4` all read as `3 * 4`.

use num_bigint::BigInt;

use crate::error::{Error, Result};
use crate::expr::{BinaryOp, Expr, MulSpelling, UnaryOp};
use crate::limbs::{DEFAULT_BASE, check_base};
use crate::oracle;

/// A parsed line: an expression and an optional output base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub expr: Expr,
    pub target_base: Option<u32>,
}

impl Query {
    /// Evaluate with the oracle and write the value in the requested base.
    pub fn evaluate(&self) -> Result<String> {
        let value = oracle::evaluate(&self.expr)?;
        oracle::render_numeral(&value, self.target_base.unwrap_or(DEFAULT_BASE))
    }
}

/// Parse a full line, including an optional `# base` tail.
pub fn parse_query(input: &str) -> Result<Query> {
    let tokens = tokenize(input)?;
    let mut parser = ExprParser::new(&tokens, input.len());
    let expr = parser.parse_expr()?;
    let target_base = match parser.peek() {
        Some(Token {
            kind: TokenKind::Hash,
            ..
        }) => {
            parser.advance();
            Some(parser.expect_base()?)
        }
        _ => None,
    };
    parser.expect_end()?;
    Ok(Query { expr, target_base })
}

/// Parse an expression with no base-conversion tail.
pub fn parse_expr(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = ExprParser::new(&tokens, input.len());
    let expr = parser.parse_expr()?;
    parser.expect_end()?;
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    /// Alphanumeric run; digits are checked once the base is known.
    Word(String),
    Underscore,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Hash,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let kind = match c {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
                continue;
            }
            c if c.is_ascii_alphanumeric() => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !c.is_ascii_alphanumeric() {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Word(word),
                    offset,
                });
                continue;
            }
            '_' => TokenKind::Underscore,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '#' => TokenKind::Hash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            c => return Err(Error::parse_at(format!("illegal character '{c}'"), offset)),
        };
        chars.next();
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: usize,
}

impl<'a> ExprParser<'a> {
    fn new(tokens: &'a [Token], end: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.end, |t| t.offset)
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(Error::parse_at(
                format!("unexpected {}", describe(&tok.kind)),
                tok.offset,
            )),
        }
    }

    /// A decimal base number, as in `_16` or `# 16`.
    fn expect_base(&mut self) -> Result<u32> {
        let offset = self.offset();
        match self.advance() {
            Some(Token {
                kind: TokenKind::Word(word),
                ..
            }) => {
                let base = word
                    .parse::<u32>()
                    .map_err(|_| Error::parse_at(format!("bad base '{word}'"), offset))?;
                check_base(base)
            }
            _ => Err(Error::parse_at("expected a base", offset)),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_term()?;

        while let Some(tok) = self.peek() {
            let op = match tok.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;

        while let Some(tok) = self.peek() {
            let (op, spelling, right) = match tok.kind {
                TokenKind::Star => {
                    self.advance();
                    (BinaryOp::Mul, MulSpelling::Explicit, self.parse_unary()?)
                }
                TokenKind::Slash => {
                    self.advance();
                    (BinaryOp::Div, MulSpelling::Explicit, self.parse_unary()?)
                }
                TokenKind::Percent => {
                    self.advance();
                    (BinaryOp::Rem, MulSpelling::Explicit, self.parse_unary()?)
                }
                TokenKind::LParen | TokenKind::Word(_) => {
                    (BinaryOp::Mul, MulSpelling::GroupBoth, self.parse_primary()?)
                }
                _ => break,
            };
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
                spelling,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Minus) => UnaryOp::Minus,
            Some(TokenKind::Plus) => UnaryOp::Plus,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::unary(op, operand))
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let offset = self.offset();
        match self.advance().map(|t| &t.kind) {
            Some(TokenKind::Word(digits)) => {
                let base = match self.peek().map(|t| &t.kind) {
                    Some(TokenKind::Underscore) => {
                        self.advance();
                        self.expect_base()?
                    }
                    _ => DEFAULT_BASE,
                };
                let value: BigInt = oracle::parse_numeral(digits, base)?;
                Ok(Expr::number_in_base(value, base))
            }
            Some(TokenKind::LParen) => {
                let inner = self.parse_expr()?;
                match self.advance().map(|t| &t.kind) {
                    Some(TokenKind::RParen) => Ok(inner),
                    _ => Err(Error::parse_at("missing )", self.offset_before())),
                }
            }
            Some(kind) => Err(Error::parse_at(
                format!("unexpected {}", describe(kind)),
                offset,
            )),
            None => Err(Error::parse_at("unexpected end of input", offset)),
        }
    }

    // Offset of the token just consumed, or end of input.
    fn offset_before(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(self.end, |t| t.offset)
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Word(w) => format!("'{w}'"),
        TokenKind::Underscore => "'_'".to_string(),
        TokenKind::Plus => "'+'".to_string(),
        TokenKind::Minus => "'-'".to_string(),
        TokenKind::Star => "'*'".to_string(),
        TokenKind::Slash => "'/'".to_string(),
        TokenKind::Percent => "'%'".to_string(),
        TokenKind::Hash => "'#'".to_string(),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
    }
}
