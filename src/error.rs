use thiserror::Error;

/// Why the normalized event stream ended.
///
/// Decoding ambiguity never shows up here; only the end of the stream does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The backend stopped producing events (I/O failure, closed tty).
    #[error("input source lost: {reason}")]
    SourceLost {
        /// Backend-supplied description of the failure.
        reason: String,
    },

    /// The producer shut down normally and the queue is drained.
    #[error("input stream closed")]
    Closed,
}

impl InputError {
    pub fn lost(reason: impl Into<String>) -> Self {
        Self::SourceLost {
            reason: reason.into(),
        }
    }

    /// `true` for a backend failure, `false` for an orderly shutdown.
    pub fn is_source_lost(&self) -> bool {
        matches!(self, Self::SourceLost { .. })
    }
}

impl From<std::io::Error> for InputError {
    fn from(err: std::io::Error) -> Self {
        Self::lost(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_become_source_lost() {
        let err: InputError = std::io::Error::other("tty gone").into();
        assert!(err.is_source_lost());
        assert_eq!(err.to_string(), "input source lost: tty gone");
    }

    #[test]
    fn closed_is_not_source_lost() {
        assert!(!InputError::Closed.is_source_lost());
    }
}
