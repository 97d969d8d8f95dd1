use std::fmt;

/// Errors raised while loading a program.
///
/// Resolution itself never fails with an error: a rejected clause is
/// ordinary backtracking and an exhausted search is `None` from
/// [`crate::engine::Machine::ask_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicError {
    /// Tokenizer error.
    ReadError(String),

    /// A clause the linker could not turn into well-formed cells.
    MalformedTerm(String),

    /// Syntax the engine recognises but does not execute.
    Unsupported(String),

    /// The program has no clauses, so there is no query to run.
    EmptyProgram,

    /// I/O error while reading program text.
    Io(String),
}

impl fmt::Display for LogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicError::ReadError(msg) => write!(f, "Read error: {}", msg),
            LogicError::MalformedTerm(msg) => write!(f, "Malformed clause: {}", msg),
            LogicError::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            LogicError::EmptyProgram => write!(f, "Error: program has no clauses"),
            LogicError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for LogicError {}

impl From<std::io::Error> for LogicError {
    fn from(e: std::io::Error) -> Self {
        LogicError::Io(e.to_string())
    }
}

pub type LogicResult<T> = Result<T, LogicError>;
