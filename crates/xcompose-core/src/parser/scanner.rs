// XCompose Scanner
// Byte-level tokenizer for Compose files

use std::sync::Arc;

use crate::error::{ComposeError, ComposeResult, Location};
use crate::escape::{self, DropReason};

/// Tokens of the Compose grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'s> {
    EndOfFile,
    EndOfLine,
    Include,
    /// `<name>` on the left-hand side
    Keysym(&'s str),
    Colon,
    Bang,
    Tilde,
    /// A decoded string literal
    String(String),
    Ident(&'s str),
}

impl Token<'_> {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::EndOfFile => "end of file".to_string(),
            Token::EndOfLine => "end of line".to_string(),
            Token::Include => "\"include\"".to_string(),
            Token::Keysym(name) => format!("keysym <{}>", name),
            Token::Colon => "\":\"".to_string(),
            Token::Bang => "\"!\"".to_string(),
            Token::Tilde => "\"~\"".to_string(),
            Token::String(_) => "string literal".to_string(),
            Token::Ident(name) => format!("identifier \"{}\"", name),
        }
    }
}

fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

pub(crate) struct Scanner<'s> {
    input: &'s str,
    source: Arc<str>,
    pos: usize,
    line: usize,
    column: usize,
    token_line: usize,
    token_column: usize,
}

impl<'s> Scanner<'s> {
    pub(crate) fn new(input: &'s str, source: Arc<str>) -> Self {
        Self {
            input,
            source,
            pos: 0,
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
        }
    }

    /// Location of the most recently started token
    pub(crate) fn location(&self) -> Location {
        Location::new(self.source.clone(), self.token_line, self.token_column)
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> ComposeError {
        ComposeError::syntax(self.location(), reason)
    }

    fn bytes(&self) -> &'s [u8] {
        self.input.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn eol(&self) -> bool {
        self.peek() == Some(b'\n')
    }

    fn next(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn accept(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.next();
            true
        } else {
            false
        }
    }

    fn skip_to_eol(&mut self) {
        while !self.eof() && !self.eol() {
            self.next();
        }
    }

    fn start_token(&mut self) {
        self.token_line = self.line;
        self.token_column = self.column;
    }

    /// Skip blanks and comments. Returns true if a newline was consumed.
    fn skip_blanks(&mut self) -> bool {
        loop {
            while let Some(byte) = self.peek() {
                if !is_space(byte) {
                    break;
                }
                self.start_token();
                if self.next() == Some(b'\n') {
                    return true;
                }
            }
            if self.peek() == Some(b'#') {
                self.skip_to_eol();
                continue;
            }
            return false;
        }
    }

    pub(crate) fn lex(&mut self) -> ComposeResult<Token<'s>> {
        if self.skip_blanks() {
            return Ok(Token::EndOfLine);
        }
        self.start_token();
        if self.eof() {
            return Ok(Token::EndOfFile);
        }

        if self.accept(b'<') {
            let start = self.pos;
            while !self.eof() && !self.eol() && self.peek() != Some(b'>') {
                self.next();
            }
            let end = self.pos;
            if !self.accept(b'>') {
                return Err(self.error("unterminated keysym literal"));
            }
            return Ok(Token::Keysym(&self.input[start..end]));
        }

        if self.accept(b':') {
            return Ok(Token::Colon);
        }
        if self.accept(b'!') {
            return Ok(Token::Bang);
        }
        if self.accept(b'~') {
            return Ok(Token::Tilde);
        }

        if self.accept(b'"') {
            return self.lex_string();
        }

        if matches!(self.peek(), Some(b) if b.is_ascii_alphabetic() || b == b'_') {
            let start = self.pos;
            while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
                self.next();
            }
            let ident = &self.input[start..self.pos];
            if ident == "include" {
                return Ok(Token::Include);
            }
            return Ok(Token::Ident(ident));
        }

        Err(self.error("unrecognized token"))
    }

    /// Isolate the literal body, honouring `\"` and `\\`, then decode it.
    fn lex_string(&mut self) -> ComposeResult<Token<'s>> {
        let start = self.pos;
        while !self.eof() && !self.eol() && self.peek() != Some(b'"') {
            if self.next() == Some(b'\\') && !self.eof() && !self.eol() {
                self.next();
            }
        }
        let end = self.pos;
        if !self.accept(b'"') {
            return Err(self.error("unterminated string literal"));
        }

        let decoded = escape::decode(&self.bytes()[start..end])?;
        for dropped in &decoded.dropped {
            let what = match dropped.reason {
                DropReason::OctalOverflow => "octal escape sequence overflows a byte",
                DropReason::Nul => "NUL byte",
                DropReason::MissingHexDigits => "illegal hexadecimal escape sequence",
                DropReason::UnknownEscape => "unknown escape sequence",
            };
            log::warn!("{}: {} in string literal; ignoring it", self.location(), what);
        }

        String::from_utf8(decoded.bytes)
            .map(Token::String)
            .map_err(|_| self.error("string literal is not a valid UTF-8 string"))
    }

    /// The quoted path after an `include` keyword, returned verbatim.
    pub(crate) fn lex_include_path(&mut self) -> ComposeResult<&'s str> {
        while matches!(self.peek(), Some(b) if is_space(b) && b != b'\n') {
            self.next();
        }
        self.start_token();
        if !self.accept(b'"') {
            return Err(self.error("include statement must be followed by a path"));
        }
        let start = self.pos;
        while !self.eof() && !self.eol() && self.peek() != Some(b'"') {
            self.next();
        }
        let end = self.pos;
        if !self.accept(b'"') {
            return Err(self.error("unterminated include statement"));
        }
        Ok(&self.input[start..end])
    }
}
