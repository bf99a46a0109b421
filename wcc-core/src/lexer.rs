//! Byte-accurate tokenizer for the wcc source language.
//!
//! The lexer walks the source as raw bytes with a one-byte lookahead
//! (`position` / `read_position`) and hands out tokens on demand via
//! [`Lexer::next_token`]. Comments and whitespace are consumed silently;
//! a 1-based line counter follows every newline for diagnostics.

use crate::token::{lookup_ident, Token, TokenKind};

fn is_letter(c: u8) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_uppercase()
}

fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

pub struct Lexer<'a> {
    source: &'a [u8],
    position: usize,
    read_position: usize,
    ch: u8,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer {
            source: source.as_bytes(),
            position: 0,
            read_position: 0,
            ch: 0,
            line: 1,
        };
        lexer.read_char();
        lexer
    }

    fn read_char(&mut self) {
        self.ch = if self.read_position >= self.source.len() {
            0
        } else {
            self.source[self.read_position]
        };
        self.position = self.read_position;
        self.read_position += 1;
    }

    /// The next byte without advancing; `0` at end of input.
    fn peek_char(&self) -> u8 {
        if self.read_position >= self.source.len() {
            0
        } else {
            self.source[self.read_position]
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, b' ' | b'\t' | b'\n' | b'\r') {
            if self.ch == b'\n' {
                self.line += 1;
            }
            self.read_char();
        }
    }

    fn read_identifier(&mut self) -> &'a str {
        let start = self.position;
        while is_letter(self.ch) || is_digit(self.ch) {
            self.read_char();
        }
        // source is always valid UTF-8 and the run is pure ASCII
        core::str::from_utf8(&self.source[start..self.position]).unwrap_or("")
    }

    /// Reads a digit run with at most one `.`, classifying the token as
    /// an integer or float literal.
    fn read_number(&mut self) -> Token {
        let start = self.position;
        let line = self.line;
        let mut kind = TokenKind::IntegerLiteral;
        while is_digit(self.ch) || (self.ch == b'.' && kind != TokenKind::FloatLiteral) {
            if self.ch == b'.' {
                kind = TokenKind::FloatLiteral;
            }
            self.read_char();
        }
        let literal = core::str::from_utf8(&self.source[start..self.position]).unwrap_or("");
        Token::new(kind, literal, line)
    }

    /// Reads the content of a character literal up to the closing quote
    /// (or end of input), unescaping `\n`.
    fn read_char_literal(&mut self) -> String {
        let start = self.position + 1;
        loop {
            self.read_char();
            if self.ch == b'\'' || self.ch == 0 {
                break;
            }
        }
        let raw = core::str::from_utf8(&self.source[start..self.position]).unwrap_or("");
        raw.replace("\\n", "\n")
    }

    /// Consumes a `//` comment to the end of the line.
    fn read_line_comment(&mut self) {
        while self.ch != b'\n' && self.ch != 0 {
            self.read_char();
        }
    }

    /// Consumes a `/* ... */` comment and then the remainder of the line
    /// the terminator sits on. Unterminated comments run to end of input.
    fn read_block_comment(&mut self) {
        loop {
            if self.ch == 0 {
                return;
            }
            if self.ch == b'\n' {
                self.line += 1;
            }
            if self.ch == b'*' && self.peek_char() == b'/' {
                self.read_char();
                self.read_char();
                break;
            }
            self.read_char();
        }
        self.read_line_comment();
    }

    /// Emits either the two-character operator `with_eq` (when the next
    /// byte is `=`) or the single-character `single`.
    fn compound_or(&mut self, single: TokenKind, with_eq: TokenKind) -> Token {
        if self.peek_char() == b'=' {
            let first = self.ch;
            self.read_char();
            let literal = format!("{}{}", first as char, self.ch as char);
            Token::new(with_eq, literal, self.line)
        } else {
            Token::new(single, (self.ch as char).to_string(), self.line)
        }
    }

    /// Produces the next token, skipping whitespace and comments.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let tok = match self.ch {
            b'=' => self.compound_or(TokenKind::Assign, TokenKind::Eq),
            b'!' => self.compound_or(TokenKind::Bang, TokenKind::NotEq),
            b'<' => self.compound_or(TokenKind::Lt, TokenKind::LtEq),
            b'>' => self.compound_or(TokenKind::Gt, TokenKind::GtEq),
            b'+' => self.compound_or(TokenKind::Plus, TokenKind::PlusAssign),
            b'-' => self.compound_or(TokenKind::Minus, TokenKind::MinusAssign),
            b'*' => self.compound_or(TokenKind::Star, TokenKind::StarAssign),
            b'/' => {
                if self.peek_char() == b'/' {
                    self.read_line_comment();
                    return self.next_token();
                } else if self.peek_char() == b'*' {
                    self.read_block_comment();
                    return self.next_token();
                } else {
                    self.compound_or(TokenKind::Slash, TokenKind::SlashAssign)
                }
            }
            b';' => Token::new(TokenKind::Semicolon, ";", self.line),
            b',' => Token::new(TokenKind::Comma, ",", self.line),
            b'(' => Token::new(TokenKind::LParen, "(", self.line),
            b')' => Token::new(TokenKind::RParen, ")", self.line),
            b'{' => Token::new(TokenKind::LBrace, "{", self.line),
            b'}' => Token::new(TokenKind::RBrace, "}", self.line),
            b'\'' => {
                let line = self.line;
                let content = self.read_char_literal();
                Token::new(TokenKind::CharLiteral, content, line)
            }
            0 => Token::new(TokenKind::EndOfFile, "", self.line),
            c if is_letter(c) => {
                let line = self.line;
                let ident = self.read_identifier();
                return Token::new(lookup_ident(ident), ident, line);
            }
            c if is_digit(c) => return self.read_number(),
            c => Token::new(TokenKind::Illegal, (c as char).to_string(), self.line),
        };

        self.read_char();
        tok
    }

    /// Drains the whole source, including the trailing EOF token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok.kind == TokenKind::EndOfFile;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }
}
