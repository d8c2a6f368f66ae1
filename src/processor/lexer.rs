//! Hand-written lexer for Jack source text.
//!
//! The lexer is an `Iterator` that produces one `Located` token at a time,
//! so a file is never tokenised up front. Whitespace and comments are
//! discarded here; the scanner and compiler only ever see real tokens.
//
//  Lexical items:
//
//      Keyword     ::= class | constructor | function | method | field | static
//                    | var | int | char | boolean | void | true | false | null
//                    | this | let | do | if | else | while | return
//      Symbol      ::= { } ( ) [ ] . , ; + - * / & | < > = ~   (always one char)
//      Integer     ::= [0-9]+
//      String      ::= '"' [^"\n]* '"'
//      Identifier  ::= [A-Za-z_][A-Za-z0-9_]*
//      Comments    ::= '//' .. end-of-line | '/*' .. '*/'
//
//  A word run ends at whitespace, a symbol or a quote. The whole run is then
//  classified: keyword first, then all digits, then identifier.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use serde::Serialize;

use crate::error::{CompileError, LexErrorKind};

pub const SYMBOLS: &[char] = &[
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=',
    '~',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    pub const ALL: &'static [Keyword] = &[
        Keyword::Class,
        Keyword::Constructor,
        Keyword::Function,
        Keyword::Method,
        Keyword::Field,
        Keyword::Static,
        Keyword::Var,
        Keyword::Int,
        Keyword::Char,
        Keyword::Boolean,
        Keyword::Void,
        Keyword::True,
        Keyword::False,
        Keyword::Null,
        Keyword::This,
        Keyword::Let,
        Keyword::Do,
        Keyword::If,
        Keyword::Else,
        Keyword::While,
        Keyword::Return,
    ];

    pub fn from_lexeme(lexeme: &str) -> Option<Keyword> {
        Keyword::ALL.iter().copied().find(|k| k.as_str() == lexeme)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Constructor => "constructor",
            Keyword::Function => "function",
            Keyword::Method => "method",
            Keyword::Field => "field",
            Keyword::Static => "static",
            Keyword::Var => "var",
            Keyword::Int => "int",
            Keyword::Char => "char",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::This => "this",
            Keyword::Let => "let",
            Keyword::Do => "do",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Return => "return",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Symbol,
    IntegerConstant,
    StringConstant,
    Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Token {
    Keyword(Keyword),
    Symbol(char),
    /// Not range checked here; the compiler rejects values above 32767.
    IntegerConstant(u32),
    /// Text between the quotes, quotes excluded.
    StringConstant(String),
    Identifier(String),
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Keyword(_) => TokenKind::Keyword,
            Token::Symbol(_) => TokenKind::Symbol,
            Token::IntegerConstant(_) => TokenKind::IntegerConstant,
            Token::StringConstant(_) => TokenKind::StringConstant,
            Token::Identifier(_) => TokenKind::Identifier,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(k) => write!(f, "'{}'", k.as_str()),
            Token::Symbol(c) => write!(f, "'{c}'"),
            Token::IntegerConstant(n) => write!(f, "{n}"),
            Token::StringConstant(s) => write!(f, "\"{s}\""),
            Token::Identifier(id) => write!(f, "identifier '{id}'"),
        }
    }
}

/// A token together with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Located {
    pub token: Token,
    pub line: usize,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            line: 1,
            finished: false,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.next_char() {
            if c == '\n' {
                break;
            }
        }
    }

    // An unterminated block comment swallows the rest of the input.
    fn skip_block_comment(&mut self) {
        while let Some(c) = self.next_char() {
            if c == '*' && self.peek_char() == Some('/') {
                self.next_char();
                break;
            }
        }
    }

    fn read_word(&mut self, first: char) -> String {
        let mut word = String::new();
        word.push(first);
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || c == '"' || SYMBOLS.contains(&c) {
                break;
            }
            word.push(c);
            self.next_char();
        }
        word
    }

    fn read_string(&mut self) -> Result<String, LexErrorKind> {
        let mut text = String::new();
        loop {
            match self.peek_char() {
                None => return Err(LexErrorKind::UnterminatedString),
                Some('\n') => return Err(LexErrorKind::NewlineInString),
                Some('"') => {
                    self.next_char();
                    return Ok(text);
                }
                Some(c) => {
                    text.push(c);
                    self.next_char();
                }
            }
        }
    }

    fn classify(word: String) -> Result<Token, LexErrorKind> {
        if let Some(keyword) = Keyword::from_lexeme(&word) {
            return Ok(Token::Keyword(keyword));
        }
        if word.chars().all(|c| c.is_ascii_digit()) {
            return match word.parse::<u32>() {
                Ok(value) => Ok(Token::IntegerConstant(value)),
                Err(_) => Err(LexErrorKind::IntegerTooLarge(word)),
            };
        }
        if is_identifier(&word) {
            return Ok(Token::Identifier(word));
        }
        Err(LexErrorKind::MalformedToken(word))
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Located, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let ch = match self.next_char() {
                Some(c) => c,
                None => {
                    self.finished = true;
                    return None;
                }
            };
            let line = self.line;

            let token_res = match ch {
                c if c.is_whitespace() => continue,
                '/' => match self.peek_char() {
                    Some('/') => {
                        self.skip_line_comment();
                        continue;
                    }
                    Some('*') => {
                        self.next_char();
                        self.skip_block_comment();
                        continue;
                    }
                    _ => Ok(Token::Symbol('/')),
                },
                '"' => self.read_string().map(Token::StringConstant),
                c if SYMBOLS.contains(&c) => Ok(Token::Symbol(c)),
                c if c.is_ascii_alphanumeric() || c == '_' => {
                    let word = self.read_word(c);
                    Self::classify(word)
                }
                c => Err(LexErrorKind::UnexpectedCharacter(c)),
            };

            return Some(match token_res {
                Ok(token) => Ok(Located { token, line }),
                Err(kind) => {
                    self.finished = true;
                    Err(CompileError::Lexical { line, kind })
                }
            });
        }
    }
}
