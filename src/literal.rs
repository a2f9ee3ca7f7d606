//! Strict parser for item-list cells such as `['Milk', "Bread"]`
//!
//! Cells are treated purely as data. The accepted grammar is
//!
//! ```text
//! cell := ws ( list | item ) ws
//! list := '[' ws ( item ( ws ',' ws item )* ( ws ',' )? )? ws ']'
//! item := '\'' chars '\'' | '"' chars '"'
//! ```
//!
//! A lone quoted string is read as a one-item list. Backslash escapes
//! follow the usual string-literal forms (`\n`, `\xNN`, `\uNNNN`,
//! `\UNNNNNNNN`, octal); an unknown escape keeps its backslash.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

/// Why a cell was rejected, with the byte offset where parsing stopped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at offset {offset}")]
pub struct ListLiteralError {
    pub offset: usize,
    pub reason: &'static str,
}

/// Parse a cell into its item names
pub fn parse_item_list(input: &str) -> Result<Vec<String>, ListLiteralError> {
    let mut parser = Parser::new(input);
    parser.skip_ws();

    let items = match parser.peek() {
        Some('[') => parser.list()?,
        Some('\'') | Some('"') => vec![parser.quoted()?],
        Some(_) => return Err(parser.error("expected '[' or a quoted item")),
        None => return Err(parser.error("empty cell")),
    };

    parser.skip_ws();
    if parser.peek().is_some() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(items)
}

struct Parser<'a> {
    len: usize,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            len: input.len(),
            chars: input.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.len, |&(i, _)| i)
    }

    fn error(&mut self, reason: &'static str) -> ListLiteralError {
        ListLiteralError {
            offset: self.offset(),
            reason,
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn list(&mut self) -> Result<Vec<String>, ListLiteralError> {
        self.bump(); // '['
        self.skip_ws();

        let mut items = Vec::new();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(items);
        }

        loop {
            match self.peek() {
                Some('\'') | Some('"') => items.push(self.quoted()?),
                Some(_) => return Err(self.error("expected a quoted item")),
                None => return Err(self.error("unterminated list")),
            }

            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    self.skip_ws();
                    // trailing comma
                    if self.peek() == Some(']') {
                        self.bump();
                        return Ok(items);
                    }
                }
                Some(']') => {
                    self.bump();
                    return Ok(items);
                }
                Some(_) => return Err(self.error("expected ',' or ']'")),
                None => return Err(self.error("unterminated list")),
            }
        }
    }

    fn quoted(&mut self) -> Result<String, ListLiteralError> {
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected a quote")),
        };

        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => self.escape(&mut value)?,
                Some(c) => value.push(c),
            }
        }
    }

    /// Decode the escape after a backslash into `value`
    fn escape(&mut self, value: &mut String) -> Result<(), ListLiteralError> {
        let decoded = match self.bump() {
            None => return Err(self.error("unterminated string")),
            Some('\n') => return Ok(()), // line continuation
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"') => '"',
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('a') => '\u{07}',
            Some('b') => '\u{08}',
            Some('f') => '\u{0c}',
            Some('v') => '\u{0b}',
            Some('x') => self.code_point(2)?,
            Some('u') => self.code_point(4)?,
            Some('U') => self.code_point(8)?,
            Some(d @ '0'..='7') => self.octal(d)?,
            Some(other) => {
                value.push('\\');
                other
            }
        };
        value.push(decoded);
        Ok(())
    }

    /// Exactly `digits` hex digits naming a Unicode scalar value
    fn code_point(&mut self, digits: usize) -> Result<char, ListLiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    self.bump();
                    code = code * 16 + d;
                }
                None => return Err(self.error("truncated hex escape")),
            }
        }
        char::from_u32(code).ok_or_else(|| self.error("escape is not a valid code point"))
    }

    /// Up to three octal digits, the first already consumed
    fn octal(&mut self, first: char) -> Result<char, ListLiteralError> {
        let mut code = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            match self.peek().and_then(|c| c.to_digit(8)) {
                Some(d) => {
                    self.bump();
                    code = code * 8 + d;
                }
                None => break,
            }
        }
        char::from_u32(code).ok_or_else(|| self.error("escape is not a valid code point"))
    }
}
