//! Error types for hcisnoop

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Conversion errors. Lines that simply do not match an accepted trace
/// grammar are filtered out upstream and never reach these variants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed hex payload on an accepted trace line
    #[error("malformed hex payload {payload:?}: {reason}")]
    Format {
        /// The hex field as it appeared on the line
        payload: String,
        /// What was wrong with it
        reason: String,
    },

    /// A filtered line unexpectedly lacks the HCI token structure
    #[error("unexpected line structure {line:?}: {reason}")]
    Structure {
        /// The offending line
        line: String,
        /// Which token was missing
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
