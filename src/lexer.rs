use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::{
    ast::{Spanned, Token},
    error::CompileError,
};

/// Quoted literals of this shape are date-times rather than text.
static DATE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}$").expect("date literal pattern")
});

pub(crate) const DATE_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A 1-based line and column in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn text_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, start: Position) -> Result<String, CompileError> {
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '\'' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.here();
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(ch) => {
                            return Err(CompileError::syntax(
                                escape_at,
                                "escape sequence",
                                format!("'\\{}'", ch),
                            ));
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(CompileError::syntax(start, "closing quote", "end of input"))
    }

    fn read_number(&mut self) -> Token {
        let mut number = String::new();
        let mut is_decimal = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_decimal
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_decimal = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if is_decimal {
            Token::Decimal(number)
        } else {
            Token::Integer(number)
        }
    }

    /// Quoted text becomes a date-time only when it has the exact literal shape.
    fn string_or_date(&self, text: String, start: Position) -> Result<Token, CompileError> {
        if !DATE_LITERAL.is_match(&text) {
            return Ok(Token::String(text));
        }
        NaiveDateTime::parse_from_str(&text, DATE_INPUT_FORMAT)
            .map(Token::DateTime)
            .map_err(|_| CompileError::syntax(start, "valid date", format!("'{}'", text)))
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn pair(&mut self, token: Token) -> Token {
        self.advance();
        self.advance();
        token
    }

    pub fn next_token(&mut self) -> Result<Spanned, CompileError> {
        self.skip_whitespace();

        let position = self.here();
        let start = self.position;

        let token = match self.current_char() {
            None => {
                return Ok(Spanned {
                    token: Token::Eof,
                    text: String::new(),
                    position,
                });
            }
            Some(',') => self.single(Token::Comma),
            Some('.') => self.single(Token::Dot),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('+') => self.single(Token::Plus),
            Some('-') => self.single(Token::Minus),
            Some('*') => self.single(Token::Star),
            Some('/') => self.single(Token::Slash),
            Some('=') => self.single(Token::Eq),
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.pair(Token::NotEq)
                } else {
                    return Err(CompileError::syntax(position, "'!='", "'!'"));
                }
            }
            Some('<') => match self.peek_char(1) {
                Some('=') => self.pair(Token::LtEq),
                Some('>') => self.pair(Token::NotEq),
                _ => self.single(Token::Lt),
            },
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.pair(Token::GtEq)
                } else {
                    self.single(Token::Gt)
                }
            }
            Some('\'') => {
                let text = self.read_string(position)?;
                self.string_or_date(text, position)?
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                Token::keyword(&ident).unwrap_or(Token::Identifier(ident))
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) => {
                return Err(CompileError::syntax(
                    position,
                    "token",
                    format!("'{}'", ch),
                ));
            }
        };

        Ok(Spanned {
            token,
            text: self.text_from(start),
            position,
        })
    }

    /// Read the whole input. The last token is always [`Token::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, CompileError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Convert query text into positioned tokens.
pub fn tokenize(text: &str) -> Result<Vec<Spanned>, CompileError> {
    Lexer::new(text).tokenize()
}
