//! Parsing one side of a statement into a [`LinearExpression`].
//!
//! A term is `[sign][sign] number identifier`, `[sign][sign] identifier` or
//! `[sign][sign] number`. Of the two signs at most one may be detached
//! (whitespace or another sign after it) and at most one attached (directly
//! touching the number or identifier).

use crate::error::ErrorKind;
use crate::lexer::{Token, TokenKind};
use crate::model::LinearExpression;

/// Signs seen so far in front of the current term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignState {
    NoSign,
    OneDetached,
    OneAttached,
    OneOfEach,
}

impl SignState {
    fn push(self, attached: bool) -> Option<SignState> {
        match (self, attached) {
            (SignState::NoSign, false) => Some(SignState::OneDetached),
            (SignState::NoSign, true) => Some(SignState::OneAttached),
            (SignState::OneDetached, true) => Some(SignState::OneOfEach),
            _ => None,
        }
    }
}

struct TermParser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TermParser<'t> {
    fn current(&self) -> Option<&'t Token> {
        self.tokens
            .get(self.pos)
            .filter(|t| t.kind != TokenKind::Terminator)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.current();
        self.pos += 1;
        token
    }

    /// Consume leading signs and return the combined factor (+1 or -1).
    fn parse_signs(&mut self) -> Result<f64, ErrorKind> {
        let mut state = SignState::NoSign;
        let mut factor = 1.0;
        while let Some(sign) = self.current().filter(|t| t.kind.is_sign()) {
            let attached = self
                .tokens
                .get(self.pos + 1)
                .is_some_and(|next| next.kind.is_operand() && sign.span.touches(next.span));
            state = state.push(attached).ok_or_else(|| {
                ErrorKind::TooManySigns(self.remaining_text())
            })?;
            if sign.kind == TokenKind::Minus {
                factor = -factor;
            }
            self.advance();
        }
        Ok(factor)
    }

    fn remaining_text(&self) -> String {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| t.kind != TokenKind::Terminator)
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Literals too large for `f64` are rejected rather than read as infinity.
    fn parse_number(token: &Token) -> Result<f64, ErrorKind> {
        token
            .text
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ErrorKind::InvalidNumber(token.text.clone()))
    }

    fn parse_term(&mut self, expr: &mut LinearExpression) -> Result<(), ErrorKind> {
        let sign_start = self.pos;
        let factor = self.parse_signs()?;

        let Some(token) = self.advance() else {
            let dangling = self.tokens[sign_start].text.clone();
            return Err(ErrorKind::DanglingSign(dangling));
        };

        match token.kind {
            TokenKind::Number => {
                let value = Self::parse_number(token)?;
                if self.peek_kind() == Some(TokenKind::Ident) {
                    let name = self.advance().map(|t| t.text.as_str()).unwrap_or_default();
                    expr.add_term(name, factor * value);
                } else {
                    expr.add_constant(factor * value);
                }
            }
            TokenKind::Ident => expr.add_term(&token.text, factor),
            _ => return Err(ErrorKind::UnexpectedToken(token.text.clone())),
        }
        Ok(())
    }
}

/// Parse the tokens of one side of a statement.
///
/// Terms without a sign between them are added (`x1 x2` is `x1 + x2`).
pub fn parse_expression(tokens: &[Token]) -> Result<LinearExpression, ErrorKind> {
    let mut parser = TermParser { tokens, pos: 0 };
    let mut expr = LinearExpression::new();

    if parser.current().is_none() {
        return Err(ErrorKind::EmptyExpression);
    }
    while parser.current().is_some() {
        parser.parse_term(&mut expr)?;
    }
    Ok(expr)
}
