use core::{error::Error, fmt};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadErrorKind {
    UnterminatedList,
    UnterminatedString,
    UnexpectedCloseParen,
    UnexpectedEnd,
    TrailingInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadError {
    pub kind: ReadErrorKind,
    pub message: String,
}

impl ReadError {
    pub fn new(kind: ReadErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// True when more input could still complete the expression
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self.kind,
            ReadErrorKind::UnterminatedList | ReadErrorKind::UnterminatedString | ReadErrorKind::UnexpectedEnd
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlinkError {
    ReadError(ReadError),
    KeyNotFound(String),
    DuplicateDefinition(String),
    TypeMismatch(String),
    ArityMismatch(String),
    NotCallable(String),
    Io(String),
}

impl SlinkError {
    pub(crate) fn read(kind: ReadErrorKind, message: impl Into<String>) -> Self {
        Self::ReadError(ReadError::new(kind, message))
    }

    pub(crate) fn arity(name: &str, expected: &str, got: usize) -> Self {
        Self::ArityMismatch(format!("{} expects {} argument(s), got {}", name, expected, got))
    }

    /// Stable name of the error variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReadError(_) => "ReadError",
            Self::KeyNotFound(_) => "KeyNotFound",
            Self::DuplicateDefinition(_) => "DuplicateDefinition",
            Self::TypeMismatch(_) => "TypeMismatch",
            Self::ArityMismatch(_) => "ArityMismatch",
            Self::NotCallable(_) => "NotCallable",
            Self::Io(_) => "Io",
        }
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::ReadError(error) if error.is_incomplete())
    }
}

impl fmt::Display for SlinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::ReadError(error) => &error.message,
            Self::KeyNotFound(message)
            | Self::DuplicateDefinition(message)
            | Self::TypeMismatch(message)
            | Self::ArityMismatch(message)
            | Self::NotCallable(message)
            | Self::Io(message) => message,
        };
        write!(f, "{}: {}", self.kind(), message)
    }
}

impl Error for SlinkError {}

impl From<std::io::Error> for SlinkError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
