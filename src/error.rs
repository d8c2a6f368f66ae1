use std::io;

/// Everything that can abort the compilation of one source file.
#[derive(thiserror::Error, Debug)]
pub enum CompileError {
    #[error("line {line}: {kind}")]
    Lexical { line: usize, kind: LexErrorKind },

    #[error("line {line}: expected {expected}, found {found}")]
    Syntax {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line}: {source}")]
    Symbol { line: usize, source: SymbolError },

    #[error("line {line}: integer constant {value} is out of range 0..=32767")]
    IntegerOutOfRange { line: usize, value: u32 },

    #[error("line {line}: character {ch:?} (code {}) cannot be pushed as a constant", *.ch as u32)]
    CharOutOfRange { line: usize, ch: char },

    #[error("line {line}: string constant of {len} characters is too long")]
    StringTooLong { line: usize, len: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Malformed input found by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    NewlineInString,
    UnexpectedCharacter(char),
    MalformedToken(String),
    IntegerTooLarge(String),
}

impl std::fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use LexErrorKind::*;
        match self {
            UnterminatedString => write!(f, "unterminated string constant"),
            NewlineInString => write!(f, "newline inside string constant"),
            UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
            MalformedToken(t) => write!(f, "malformed token '{t}'"),
            IntegerTooLarge(t) => write!(f, "integer constant {t} is too large"),
        }
    }
}

/// Symbol table failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("variable name cannot be empty")]
    EmptyName,
    #[error("invalid variable name: {0}")]
    InvalidName(String),
    #[error("variable {0} already defined")]
    Duplicate(String),
    #[error("identifier {0} not found")]
    Undefined(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_line() {
        let test_cases = vec![
            (
                CompileError::Lexical {
                    line: 3,
                    kind: LexErrorKind::UnterminatedString,
                },
                "line 3: unterminated string constant",
            ),
            (
                CompileError::Syntax {
                    line: 7,
                    expected: "';'".into(),
                    found: "'}'".into(),
                },
                "line 7: expected ';', found '}'",
            ),
            (
                CompileError::Symbol {
                    line: 12,
                    source: SymbolError::Duplicate("x".into()),
                },
                "line 12: variable x already defined",
            ),
            (
                CompileError::CharOutOfRange { line: 4, ch: '😀' },
                "line 4: character '😀' (code 128512) cannot be pushed as a constant",
            ),
            (
                CompileError::Lexical {
                    line: 2,
                    kind: LexErrorKind::IntegerTooLarge("99999999999".into()),
                },
                "line 2: integer constant 99999999999 is too large",
            ),
        ];

        for (err, expected) in test_cases {
            assert_eq!(err.to_string(), expected);
        }
    }
}
