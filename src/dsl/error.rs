//! Error types for the command language.

use std::fmt;

/// A problem found with one command of a batch, before anything executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    /// 1-based position of the command in its batch.
    pub position: usize,
    pub message: String,
    /// The offending command's source text.
    pub original: String,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A macro whose arguments could not be expanded.
    Expansion,
    /// A primitive command with a malformed argument list.
    Validation,
    /// A command type outside the vocabulary.
    Unknown,
}

impl CommandError {
    pub fn expansion(position: usize, message: impl Into<String>, original: &str) -> Self {
        Self::new(position, message, original, ErrorKind::Expansion)
    }

    pub fn validation(position: usize, message: impl Into<String>, original: &str) -> Self {
        Self::new(position, message, original, ErrorKind::Validation)
    }

    pub fn unknown(position: usize, message: impl Into<String>, original: &str) -> Self {
        Self::new(position, message, original, ErrorKind::Unknown)
    }

    fn new(position: usize, message: impl Into<String>, original: &str, kind: ErrorKind) -> Self {
        Self {
            position,
            message: message.into(),
            original: original.to_string(),
            kind,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Command {}: {} ({})",
            self.position, self.message, self.original
        )
    }
}

impl std::error::Error for CommandError {}
