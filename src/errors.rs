//! ## Errors
//!
//! This module defines the error type used internally by birchrng and
//! returned across its public API.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Helper alias for a call that could fail with a [`BirchError`].
pub type BirchResult<T> = Result<T, BirchError>;

/// Errors that can occur while ingesting points, mutating the tree, or
/// exporting its contents.
#[derive(Debug)]
pub enum BirchError {
    /// The requested input file does not exist or could not be opened.
    InputMissing(PathBuf),
    /// A point was presented with a dimensionality different from the one
    /// the tree was constructed with.
    DimensionMismatch {
        /// Dimensionality the tree expects.
        expected: usize,
        /// Dimensionality found on the offending point.
        found: usize,
    },
    /// A line in an input file could not be parsed into a point.
    MalformedRecord {
        /// 1-based line number within the source file.
        line: usize,
        /// A short description of what went wrong.
        reason: String,
    },
    /// An internal invariant was violated. Carries a short, static
    /// description of the invariant that failed.
    InvariantBreach(&'static str),
    /// Reading or writing an artifact failed.
    ExportIo(io::Error),
}

impl fmt::Display for BirchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BirchError::InputMissing(path) => {
                write!(f, "input file not found: {}", path.display())
            }
            BirchError::DimensionMismatch { expected, found } => {
                write!(
                    f,
                    "dimension mismatch: tree expects {expected} dimensions, point has {found}"
                )
            }
            BirchError::MalformedRecord { line, reason } => {
                write!(f, "malformed record at line {line}: {reason}")
            }
            BirchError::InvariantBreach(what) => {
                write!(f, "internal invariant violated: {what}")
            }
            BirchError::ExportIo(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl Error for BirchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BirchError::ExportIo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for BirchError {
    fn from(err: io::Error) -> Self {
        BirchError::ExportIo(err)
    }
}

impl From<serde_json::Error> for BirchError {
    fn from(err: serde_json::Error) -> Self {
        BirchError::ExportIo(io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = BirchError::DimensionMismatch {
            expected: 3,
            found: 2,
        };
        assert_eq!(
            format!("{err}"),
            "dimension mismatch: tree expects 3 dimensions, point has 2"
        );
    }

    #[test]
    fn test_input_missing_display() {
        let err = BirchError::InputMissing(PathBuf::from("missing.txt"));
        assert_eq!(format!("{err}"), "input file not found: missing.txt");
    }

    #[test]
    fn test_export_io_source() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: BirchError = io_err.into();
        assert!(err.source().is_some());
    }
}
