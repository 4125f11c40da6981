//! Protocol error types.

use thiserror::Error;

pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised while framing, parsing or writing protocol lines.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line had no command token (leading space, or a bare prefix).
    #[error("empty message: no command token")]
    EmptyMessage,

    /// The command token is neither a known keyword nor an integer.
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),

    /// A line was not terminated by `\r\n`.
    #[error("line not terminated by CRLF")]
    MissingCrlf,

    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong { actual: usize, limit: usize },

    #[error("line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Whether the current line can be dropped and the stream used further.
    ///
    /// Everything except transport failures is scoped to a single line.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ProtocolError::Io(_))
    }
}
