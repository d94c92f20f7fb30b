//! Tokenizer for the query text a future query layer will accept.
//!
//! The storage core never calls this; it only fixes the token stream a
//! query front end is built on.
//!
//! ```
//! use lsm_core::lexer::{Lexer, TokenKind};
//!
//! let kinds: Vec<TokenKind> = Lexer::new("select * from t")
//!     .tokens()
//!     .into_iter()
//!     .map(|t| t.kind)
//!     .collect();
//! assert_eq!(
//!     kinds,
//!     [TokenKind::Select, TokenKind::Asterisk, TokenKind::From, TokenKind::Ident]
//! );
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Select,
    From,
    Where,
    Ident,
    /// Text between single quotes, quotes stripped.
    Str,
    Number,
    /// `=`, `<` or `>`.
    Operator,
    Comma,
    Asterisk,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Select => "SELECT",
            TokenKind::From => "FROM",
            TokenKind::Where => "WHERE",
            TokenKind::Ident => "IDENTIFIER",
            TokenKind::Str => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Comma => "COMMA",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Eof => "EOF",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The source text; keywords keep their original casing.
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }
}

/// Pull-based scanner. Holds nothing but the input and a cursor.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Next token. Once the input is used up this keeps returning `Eof`.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek() else {
                return Token::new(TokenKind::Eof, "");
            };

            match ch {
                ',' => {
                    self.bump();
                    return Token::new(TokenKind::Comma, ",");
                }
                '*' => {
                    self.bump();
                    return Token::new(TokenKind::Asterisk, "*");
                }
                '=' | '<' | '>' => {
                    self.bump();
                    return Token::new(TokenKind::Operator, ch.to_string());
                }
                '\'' => return Token::new(TokenKind::Str, self.read_string()),
                c if c.is_ascii_digit() => {
                    let digits = self.take_while(|c| c.is_ascii_digit());
                    return Token::new(TokenKind::Number, digits);
                }
                c if c.is_alphabetic() => {
                    let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
                    return Token::new(keyword(word), word);
                }
                // unknown characters are dropped
                _ => self.bump(),
            }
        }
    }

    /// Drain the rest of the input. The trailing `Eof` is not included.
    pub fn tokens(&mut self) -> Vec<Token> {
        self.collect()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    // Opening quote is at `pos`. An unterminated literal runs to the end.
    fn read_string(&mut self) -> &'a str {
        self.bump();
        let body = self.take_while(|c| c != '\'');
        self.bump();
        body
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}

fn keyword(word: &str) -> TokenKind {
    if word.eq_ignore_ascii_case("select") {
        TokenKind::Select
    } else if word.eq_ignore_ascii_case("from") {
        TokenKind::From
    } else if word.eq_ignore_ascii_case("where") {
        TokenKind::Where
    } else {
        TokenKind::Ident
    }
}
