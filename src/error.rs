//! Error types for zopml

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Position in the XML source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Kind of low-level XML failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlErrorKind {
    InvalidToken,
    UnexpectedEof,
    MismatchedTag { expected: String, found: String },
    InvalidEntity,
    InvalidUtf8,
    UnterminatedMarkup,
}

impl fmt::Display for XmlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid token"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::MismatchedTag { expected, found } => {
                write!(
                    f,
                    "mismatched closing tag: expected </{expected}>, found </{found}>"
                )
            }
            Self::InvalidEntity => write!(f, "invalid xml entity"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::UnterminatedMarkup => write!(f, "unterminated markup"),
        }
    }
}

/// Error reported by the XML event reader
#[derive(Error, Clone, Debug, PartialEq)]
pub struct XmlError {
    kind: XmlErrorKind,
    pos: Pos,
    message: String,
}

impl XmlError {
    pub fn new(kind: XmlErrorKind, pos: Pos) -> Self {
        let message = kind.to_string();
        Self { kind, pos, message }
    }

    pub fn with_message(kind: XmlErrorKind, pos: Pos, message: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &XmlErrorKind {
        &self.kind
    }

    pub const fn pos(&self) -> Pos {
        self.pos
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error at {}: {}", self.pos, self.message)
    }
}

/// Main error type for zopml
///
/// All three kinds are terminal for the invocation that produced them.
/// Malformed header sub-fields (bad dates, bad URIs, empty strings) are not
/// errors; the parser leaves those fields absent and carries on.
#[derive(Error, Debug)]
pub enum Error {
    /// The source could not be opened before any parsing began
    #[error("unable to open {}", .path.display())]
    UnableToOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The underlying XML was not well-formed
    #[error("xml parse error: {0}")]
    Parse(#[from] XmlError),
    /// Well-formed XML that never completed an opml document
    #[error("invalid or missing opml document")]
    InvalidDocument,
}

/// Result type alias for zopml
pub type Result<T> = std::result::Result<T, Error>;
