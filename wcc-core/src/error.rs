use core::fmt;

use thiserror::Error;

/// A single syntax error with the 1-based source line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        ParseError {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to read source: {0}")]
    SourceIo(#[from] std::io::Error),
    #[error("preprocessor error: {0}")]
    Preprocess(String),
    #[error("parsing failed with {} error(s)", .0.len())]
    Parse(Vec<ParseError>),
    #[error("type error: {0}")]
    Type(String),
    #[error("code generation error: {0}")]
    Codegen(String),
}
