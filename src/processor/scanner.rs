//! Cursor over the lexer with exactly one token of lookahead.
//!
//! `advance` moves the lookahead into the current slot and pulls the next
//! token from the lexer on demand. The typed accessors return `None` when
//! asked for a value the current token does not carry.

use std::iter::Peekable;

use super::lexer::{Keyword, Lexer, Located, Token, TokenKind};
use crate::error::CompileError;

pub struct Scanner<'a> {
    tokens: Peekable<Lexer<'a>>,
    current: Option<Located>,
    last_line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            tokens: Lexer::new(src).peekable(),
            current: None,
            last_line: 1,
        }
    }

    /// True when another token (or a lexical error) is waiting.
    pub fn has_more_tokens(&mut self) -> bool {
        self.tokens.peek().is_some()
    }

    /// Drops the current token and loads the next one. At end of input the
    /// current slot becomes empty.
    pub fn advance(&mut self) -> Result<(), CompileError> {
        self.current = self.tokens.next().transpose()?;
        if let Some(located) = &self.current {
            self.last_line = located.line;
        }
        Ok(())
    }

    pub fn token(&self) -> Option<&Token> {
        self.current.as_ref().map(|l| &l.token)
    }

    pub fn token_kind(&self) -> Option<TokenKind> {
        self.token().map(Token::kind)
    }

    /// Line of the current token, or of the last token seen once the input
    /// is exhausted.
    pub fn line(&self) -> usize {
        self.last_line
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.token() {
            Some(Token::Keyword(k)) => Some(*k),
            _ => None,
        }
    }

    pub fn symbol(&self) -> Option<char> {
        match self.token() {
            Some(Token::Symbol(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn int_val(&self) -> Option<u32> {
        match self.token() {
            Some(Token::IntegerConstant(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn string_val(&self) -> Option<&str> {
        match self.token() {
            Some(Token::StringConstant(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match self.token() {
            Some(Token::Identifier(id)) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Human readable description of the current token for error messages.
    pub fn describe(&self) -> String {
        match self.token() {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        }
    }
}
