//! Error types for decimesh

use thiserror::Error;

/// Main error type for decimesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid target of {target} triangles for a mesh of {triangles} triangles: {reason}")]
    InvalidTarget {
        target: usize,
        triangles: usize,
        reason: String,
    },

    #[error("Malformed input at line {line}: {message}")]
    MalformedWireInput { line: usize, message: String },

    #[error("No contraction candidate left with {triangles} triangles (target {target})")]
    NoCandidate { triangles: usize, target: usize },

    #[error("Decimation cancelled with {triangles} triangles remaining")]
    Cancelled { triangles: usize },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Create an invalid target error.
    pub fn invalid_target(target: usize, triangles: usize, reason: impl Into<String>) -> Self {
        Error::InvalidTarget {
            target,
            triangles,
            reason: reason.into(),
        }
    }

    /// Create a malformed wire input error for a 1-based line number.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Error::MalformedWireInput {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for decimesh operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_target(12, 10, "target must be below the triangle count");
        let text = format!("{err}");
        assert!(text.contains("12"));
        assert!(text.contains("10 triangles"));

        let err = Error::malformed(3, "face line has 5 tokens");
        assert_eq!(format!("{err}"), "Malformed input at line 3: face line has 5 tokens");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.obj");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
