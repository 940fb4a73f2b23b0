#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Representing a location, line number and column number, in a source file.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn advance(&self, width: usize) -> Self {
        Location {
            col: self.col + width,
            line: self.line,
        }
    }
}

impl From<(usize, usize)> for Location {
    fn from(tuple: (usize, usize)) -> Self {
        Location {
            line: tuple.0,
            col: tuple.1,
        }
    }
}

/// A string wrapped in [`Arc`](std::sync::Arc)
/// representing the source file path.
pub type SrcFile = Arc<String>;

/// Represents a range in a source file. Every entry parsed from a `.luca`
/// file keeps one, and every [`Error`] points at one.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub file: SrcFile,
    pub start: Location,
    pub end: Location,
}

impl Source {
    /// A source covering the first character of `file`, used for things
    /// that belong to a file as a whole.
    pub fn file_start(file: SrcFile) -> Self {
        Source {
            file,
            start: (1, 1).into(),
            end: (1, 1).into(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.start.line, self.start.col)
    }
}

/// Kinds of errors that `luca` encounters while parsing text or building a
/// [`Ledger`](crate::Ledger).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// IO error, e.g., the context of an input file cannot be read.
    Io,
    /// Malformed indentation, an unterminated string or a character the
    /// tokenizer does not recognize.
    Lex,
    /// A token that is not valid in the current parser state.
    Syntax,
    /// A commodity or an account is defined twice.
    Duplicate,
    /// Reference to an unknown commodity, or an account that needs the
    /// default commodity when there is none.
    Commodity,
    /// Reference to an unknown account, or an account name the ledger
    /// refuses.
    Account,
    /// The default commodity cannot be decided.
    Ambiguous,
    /// Parsing was cancelled by the caller.
    Cancelled,
}

/// Contains the full information of an error.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Error {
    pub msg: String,
    pub src: Source,
    pub r#type: ErrorType,
}

impl Error {
    pub fn new(r#type: ErrorType, msg: impl Into<String>, src: Source) -> Self {
        Error {
            msg: msg.into(),
            src,
            r#type,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {}\n  {}:{}:{}",
            self.r#type, self.msg, self.src.file, self.src.start.line, self.src.start.col
        )
    }
}

impl std::error::Error for Error {}
