// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pull-based lexer for E file text
//!
//! Tokens are numbers, words (`\w+`) or single punctuation characters, and
//! are produced one at a time as the parser asks for them. Quoted strings and
//! brace comments are not lexed: the parser switches to raw scanning with
//! [`Tokenizer::skip_to`], which returns everything up to a closing delimiter.

use crate::error::{ParseError, ParseResult};

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Word,
    Punct,
}

/// Token borrowed from the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// 1-based line of the first character
    pub line: usize,
    /// 1-based column of the first character
    pub column: usize,
}

impl<'a> Token<'a> {
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

/// Lexer state: current line, byte offset in it, and one token of lookahead
pub struct Tokenizer<'a> {
    lines: Vec<&'a str>,
    line: usize,
    pos: usize,
    peeked: Option<Token<'a>>,
    last: (usize, usize),
    /// 0-based line and byte offset just past the last consumed token
    consumed: (usize, usize),
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
            line: 0,
            pos: 0,
            peeked: None,
            last: (1, 1),
            consumed: (0, 0),
        }
    }

    /// Location (line, column) of the most recently produced token
    pub fn position(&self) -> (usize, usize) {
        self.last
    }

    /// Error located at the most recently produced token
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(message, self.last.0, self.last.1)
    }

    /// Peek at the next token without consuming it
    pub fn lookahead(&mut self) -> Option<Token<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.scan();
        }
        self.peeked
    }

    /// Whether the next token is `text`
    pub fn peek_is(&mut self, text: &str) -> bool {
        self.lookahead().is_some_and(|token| token.is(text))
    }

    /// Consume the next token and require it to be `expected`
    pub fn expect(&mut self, expected: &str) -> ParseResult<Token<'a>> {
        match self.next() {
            Some(token) if token.is(expected) => Ok(token),
            Some(token) => Err(ParseError::at(
                format!("'{}' expected, got '{}' instead", expected, token.text),
                token.line,
                token.column,
            )),
            None => Err(self.error(format!("'{}' expected, got end of file instead", expected))),
        }
    }

    /// Consume the next token and require it to be one of `choices`
    pub fn expect_one_of(&mut self, choices: &[&str]) -> ParseResult<Token<'a>> {
        match self.next() {
            Some(token) if choices.contains(&token.text) => Ok(token),
            Some(token) => Err(ParseError::at(
                format!("unexpected '{}'", token.text),
                token.line,
                token.column,
            )),
            None => Err(self.error("unexpected end of file")),
        }
    }

    /// Require the end of the stream
    pub fn expect_end(&mut self) -> ParseResult<()> {
        match self.next() {
            None => Ok(()),
            Some(token) => Err(ParseError::at(
                format!("end of file expected, got '{}' instead", token.text),
                token.line,
                token.column,
            )),
        }
    }

    /// Consume the next token, failing at end of stream
    pub fn next_required(&mut self) -> ParseResult<Token<'a>> {
        self.next().ok_or_else(|| self.error("unexpected end of file"))
    }

    /// Consume a token followed by a `terminator` token, returning the first
    pub fn next_then(&mut self, terminator: &str) -> ParseResult<Token<'a>> {
        let token = self.next_required()?;
        self.expect(terminator)?;
        Ok(token)
    }

    /// Scan raw text up to `delimiter` and consume the delimiter.
    ///
    /// The span starts right after the last consumed token and may run over
    /// several lines, which are joined with `\n`.
    pub fn skip_to(&mut self, delimiter: &str) -> ParseResult<String> {
        if self.peeked.take().is_some() {
            (self.line, self.pos) = self.consumed;
        }

        let mut parts: Vec<&str> = Vec::new();
        while self.line < self.lines.len() {
            let text = self.lines[self.line];
            let rest = &text[self.pos..];
            if let Some(found) = rest.find(delimiter) {
                parts.push(&rest[..found]);
                self.last = (self.line + 1, self.pos + found + 1);
                self.pos += found + delimiter.len();
                self.consumed = (self.line, self.pos);
                return Ok(parts.join("\n"));
            }
            parts.push(rest);
            self.line += 1;
            self.pos = 0;
        }

        Err(self.error(format!("'{}' expected", delimiter)))
    }

    fn scan(&mut self) -> Option<Token<'a>> {
        while self.line < self.lines.len() {
            let text = self.lines[self.line];
            let bytes = text.as_bytes();
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= bytes.len() {
                self.line += 1;
                self.pos = 0;
                continue;
            }

            let start = self.pos;
            let (kind, end) = lex_at(text, start);
            self.pos = end;
            return Some(Token {
                kind,
                text: &text[start..end],
                line: self.line + 1,
                column: start + 1,
            });
        }
        None
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    /// Consume the next token, or `None` at end of stream
    fn next(&mut self) -> Option<Self::Item> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan()?,
        };
        self.last = (token.line, token.column);
        self.consumed = (token.line - 1, token.column - 1 + token.text.len());
        Some(token)
    }
}

/// Classify the token starting at `start`; returns its kind and end offset.
///
/// The longest of the numeric forms and the word form wins, numbers on ties.
fn lex_at(text: &str, start: usize) -> (TokenKind, usize) {
    let bytes = text.as_bytes();
    let number = match_number(bytes, start);
    let word = match_word(bytes, start);

    match (number, word) {
        (Some(n), Some(w)) if w > n => (TokenKind::Word, w),
        (Some(n), _) => (TokenKind::Number, n),
        (None, Some(w)) => (TokenKind::Word, w),
        (None, None) => {
            let width = text[start..].chars().next().map_or(1, char::len_utf8);
            (TokenKind::Punct, start + width)
        }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn match_word(bytes: &[u8], start: usize) -> Option<usize> {
    let end = scan_while(bytes, start, is_word_byte);
    (end > start).then_some(end)
}

fn scan_while(bytes: &[u8], mut pos: usize, pred: impl Fn(u8) -> bool) -> usize {
    while pos < bytes.len() && pred(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// Optional exponent `[Ee][+-]?\d+`, returning the end if complete
fn match_exponent(bytes: &[u8], pos: usize) -> usize {
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut digits = pos + 1;
        if digits < bytes.len() && (bytes[digits] == b'+' || bytes[digits] == b'-') {
            digits += 1;
        }
        let end = scan_while(bytes, digits, |b| b.is_ascii_digit());
        if end > digits {
            return end;
        }
    }
    pos
}

/// Match `-?\d+\.\d*`, `-?\.\d+` or `-?\d+`, each with an optional exponent
fn match_number(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    if pos < bytes.len() && bytes[pos] == b'-' {
        pos += 1;
    }

    let int_end = scan_while(bytes, pos, |b| b.is_ascii_digit());
    let has_int = int_end > pos;
    let has_dot = int_end < bytes.len() && bytes[int_end] == b'.';

    if has_int && has_dot {
        let frac_end = scan_while(bytes, int_end + 1, |b| b.is_ascii_digit());
        return Some(match_exponent(bytes, frac_end));
    }
    if has_int {
        return Some(match_exponent(bytes, int_end));
    }
    if has_dot {
        let frac_end = scan_while(bytes, int_end + 1, |b| b.is_ascii_digit());
        if frac_end > int_end + 1 {
            return Some(match_exponent(bytes, frac_end));
        }
    }
    None
}
