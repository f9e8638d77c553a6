//! Error types for CSV format checking.

use std::any::Any;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The category of a format-check failure.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum CheckErrorKind {
    /// The file has no content or its first line is empty.
    Structural,
    /// The character encoding could not be detected or is not accepted.
    Encoding,
    /// The file has more records than the allowed ceiling.
    Volume,
    /// Any other failure raised while checking.
    Unexpected,
}

impl fmt::Display for CheckErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Structural => "structural",
            Self::Encoding => "encoding",
            Self::Volume => "volume",
            Self::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

/// A hard failure while checking a stream.
///
/// These never reach the caller of `CsvFormatChecker::check_format`: they are
/// converted into a single file-level "unexpected error" entry there.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CheckError {
    /// Reading or seeking the underlying stream failed.
    #[error("I/O error on CSV stream: {0}")]
    Io(#[from] std::io::Error),

    /// A format-specific check gave up.
    #[error("Format-specific check failed: {0}")]
    SpecificCheck(String),

    /// A check panicked; holds the panic message when it was a string.
    #[error("Format check panicked: {0}")]
    Panicked(String),
}

impl CheckError {
    /// Build a [`CheckError::Panicked`] from a caught panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        Self::Panicked(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&CheckErrorKind::Unexpected).unwrap();
        assert_eq!(json, "\"unexpected\"");
        assert_eq!(CheckErrorKind::Volume.to_string(), "volume");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err: CheckError = io.into();
        assert!(matches!(err, CheckError::Io(_)));
        assert!(err.to_string().contains("short read"));
    }

    #[test]
    fn test_from_panic_keeps_message() {
        let err = CheckError::from_panic(&"index out of bounds");
        assert!(matches!(&err, CheckError::Panicked(m) if m == "index out of bounds"));

        let err = CheckError::from_panic(&String::from("bad row"));
        assert!(err.to_string().contains("bad row"));

        let err = CheckError::from_panic(&42_u32);
        assert!(err.to_string().contains("non-string"));
    }
}
