use std::str::Chars;

use crate::error::ErrorKind;
use crate::model::ConstraintOp;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when `next` begins exactly where this span ends.
    pub fn touches(self, next: Span) -> bool {
        self.end == next.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Ident,
    Number,

    // Signs
    Plus,
    Minus,

    // Relational operators
    LessEq,
    GreaterEq,
    Equal,

    // Punctuation
    Colon,
    Comma,

    // End of statement
    Terminator,
}

impl TokenKind {
    pub fn is_sign(self) -> bool {
        matches!(self, TokenKind::Plus | TokenKind::Minus)
    }

    pub fn is_operand(self) -> bool {
        matches!(self, TokenKind::Ident | TokenKind::Number)
    }

    pub fn relational(self) -> Option<ConstraintOp> {
        match self {
            TokenKind::LessEq => Some(ConstraintOp::Le),
            TokenKind::GreaterEq => Some(ConstraintOp::Ge),
            TokenKind::Equal => Some(ConstraintOp::Eq),
            _ => None,
        }
    }
}

/// Words with a meaning in leading position. Anywhere else they are identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Max,
    Min,
    Int,
    Bin,
    Free,
}

impl Keyword {
    pub fn lookup(word: &str) -> Option<Keyword> {
        match word {
            "max" => Some(Keyword::Max),
            "min" => Some(Keyword::Min),
            "int" => Some(Keyword::Int),
            "bin" => Some(Keyword::Bin),
            "free" => Some(Keyword::Free),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

/// `[A-Za-z]+[A-Za-z0-9_]*`
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `[0-9]+(\.[0-9]+)?`
pub fn is_valid_number(text: &str) -> bool {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text, None),
    };
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    digits(int_part) && frac_part.is_none_or(digits)
}

fn is_word_char(c: char) -> bool {
    !(c.is_whitespace() || matches!(c, '+' | '-' | '<' | '>' | '=' | ':' | ',' | ';'))
}

/// Tokenizer for the body of one statement (the terminating `;` already removed).
pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    /// Tokenize a whole statement. The last token is always `Terminator`.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, ErrorKind> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let is_end = token.kind == TokenKind::Terminator;
            tokens.push(token);
            if is_end {
                break;
            }
        }
        Ok(tokens)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    fn read_relational(&mut self) -> Token {
        let start = self.pos;
        let first = self.advance();
        let second = self.peek();
        let kind = match (first, second) {
            (Some('<'), Some('=')) | (Some('='), Some('<')) => {
                self.advance();
                TokenKind::LessEq
            }
            (Some('>'), Some('=')) | (Some('='), Some('>')) => {
                self.advance();
                TokenKind::GreaterEq
            }
            (Some('<'), _) => TokenKind::LessEq,
            (Some('>'), _) => TokenKind::GreaterEq,
            _ => TokenKind::Equal,
        };
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    fn read_number(&mut self) -> Result<Token, ErrorKind> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                self.advance();
            } else {
                break;
            }
        }
        if self.at_exponent() {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            let text = &self.source[start..self.pos];
            return Err(ErrorKind::InvalidNumber(text.to_string()));
        }
        let text = &self.source[start..self.pos];
        if !is_valid_number(text) {
            return Err(ErrorKind::InvalidNumber(text.to_string()));
        }
        Ok(Token::new(TokenKind::Number, Span::new(start, self.pos), text))
    }

    /// `e`/`E` followed by a digit, or by a sign and a digit. `3ex` stays a
    /// coefficient on `ex`.
    fn at_exponent(&self) -> bool {
        if !matches!(self.peek(), Some('e' | 'E')) {
            return false;
        }
        let mut rest = self.chars.clone();
        match rest.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('+' | '-') => rest.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn read_ident(&mut self) -> Result<Token, ErrorKind> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_word_char(c) {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        if !is_valid_variable_name(text) {
            return Err(ErrorKind::InvalidVariableName(text.to_string()));
        }
        Ok(Token::new(TokenKind::Ident, Span::new(start, self.pos), text))
    }

    pub fn next_token(&mut self) -> Result<Token, ErrorKind> {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Terminator, Span::new(start, start), ""));
        };

        match c {
            '+' => Ok(self.single(TokenKind::Plus)),
            '-' => Ok(self.single(TokenKind::Minus)),
            ':' => Ok(self.single(TokenKind::Colon)),
            ',' => Ok(self.single(TokenKind::Comma)),
            '<' | '>' | '=' => Ok(self.read_relational()),
            // A numeric prefix followed directly by letters is a coefficient
            // attached to a variable: `3x1` lexes as `3` then `x1`.
            c if c.is_ascii_digit() || c == '.' => self.read_number(),
            _ => self.read_ident(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_terms() {
        let tokens = Lexer::tokenize("3 x1 + 2.5x2 - x_3").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["3", "x1", "+", "2.5", "x2", "-", "x_3", ""]);
        assert!(tokens[3].span.touches(tokens[4].span));
        assert!(!tokens[0].span.touches(tokens[1].span));
    }

    #[test]
    fn test_relational() {
        assert_eq!(
            kinds("<= >= = < > =< =>"),
            vec![
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::Equal,
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::Terminator,
            ]
        );
    }

    #[test]
    fn test_relational_without_spaces() {
        assert_eq!(
            kinds("x1<=-3"),
            vec![
                TokenKind::Ident,
                TokenKind::LessEq,
                TokenKind::Minus,
                TokenKind::Number,
                TokenKind::Terminator,
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("c1: a, b"),
            vec![
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Ident,
                TokenKind::Comma,
                TokenKind::Ident,
                TokenKind::Terminator,
            ]
        );
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(
            Lexer::tokenize("x1 <= 30.44.44"),
            Err(ErrorKind::InvalidNumber("30.44.44".into()))
        );
        assert_eq!(
            Lexer::tokenize("5. x"),
            Err(ErrorKind::InvalidNumber("5.".into()))
        );
        assert_eq!(
            Lexer::tokenize(".5 x"),
            Err(ErrorKind::InvalidNumber(".5".into()))
        );
    }

    #[test]
    fn test_scientific_notation_rejected() {
        assert_eq!(
            Lexer::tokenize("x1 <= 3e8"),
            Err(ErrorKind::InvalidNumber("3e8".into()))
        );
        assert_eq!(
            Lexer::tokenize("1.5e-3x1 + x2"),
            Err(ErrorKind::InvalidNumber("1.5e-3".into()))
        );
        assert_eq!(
            Lexer::tokenize("2E+10"),
            Err(ErrorKind::InvalidNumber("2E+10".into()))
        );
    }

    #[test]
    fn test_coefficient_on_e_variable() {
        let tokens = Lexer::tokenize("3ex + 2e - 4e_1").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["3", "ex", "+", "2", "e", "-", "4", "e_1", ""]);
    }

    #[test]
    fn test_invalid_identifiers() {
        assert_eq!(
            Lexer::tokenize("x|1 + x2"),
            Err(ErrorKind::InvalidVariableName("x|1".into()))
        );
        assert_eq!(
            Lexer::tokenize("_x"),
            Err(ErrorKind::InvalidVariableName("_x".into()))
        );
        assert_eq!(
            Lexer::tokenize("33.33|x1"),
            Err(ErrorKind::InvalidVariableName("|x1".into()))
        );
    }

    #[test]
    fn test_variable_name_language() {
        for name in ["x1", "X1", "x_1", "abc", "e8"] {
            assert!(is_valid_variable_name(name), "{name} should be accepted");
        }
        for name in ["1x", "x-1", "_x", "", "x|1", "é"] {
            assert!(!is_valid_variable_name(name), "{name} should be rejected");
        }
    }

    #[test]
    fn test_number_language() {
        for text in ["0", "30", "0.3", "30.44"] {
            assert!(is_valid_number(text));
        }
        for text in ["", ".", "1.", ".1", "1.2.3", "3e8", "-1"] {
            assert!(!is_valid_number(text), "{text} should be rejected");
        }
    }

    #[test]
    fn test_keywords() {
        assert_eq!(Keyword::lookup("max"), Some(Keyword::Max));
        assert_eq!(Keyword::lookup("free"), Some(Keyword::Free));
        assert_eq!(Keyword::lookup("MAX"), None);
        assert_eq!(Keyword::lookup("sos"), None);
    }
}
