// error.rs — Crate-level error taxonomy.
//
// Three kinds of failure, all fatal to a run:
//   Validation — the input text is malformed (bad token, ragged row,
//                oversize grid). Carries the 1-based line number.
//   Io         — the input file could not be read.
//   Gpu        — anything the device or driver reported (see GpuError).
//
// Values above MAX_VALUE are NOT an error: the parser clips them and logs a
// warning. Engines return these errors; only the binary prints them.

use std::path::PathBuf;

use thiserror::Error;

use crate::gpu::device::GpuError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SatError>;

/// Errors surfaced by parsing and by either engine.
#[derive(Error, Debug)]
pub enum SatError {
    /// Malformed input text.
    #[error("line {line}: {reason}")]
    Validation { reason: String, line: usize },

    /// The input file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Device, driver, or shader failure.
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

impl SatError {
    pub(crate) fn validation(line: usize, reason: impl Into<String>) -> Self {
        SatError::Validation { reason: reason.into(), line }
    }

    /// Line number of a validation error, if this is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            SatError::Validation { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_names_line() {
        let e = SatError::validation(4, "has less data than the others");
        assert_eq!(e.to_string(), "line 4: has less data than the others");
        assert_eq!(e.line(), Some(4));
    }

    #[test]
    fn test_gpu_error_is_transparent() {
        let e = SatError::from(GpuError::NoSuitableAdapter);
        assert_eq!(e.to_string(), GpuError::NoSuitableAdapter.to_string());
        assert_eq!(e.line(), None);
    }

    #[test]
    fn test_io_error_names_path() {
        let e = SatError::Io {
            path: PathBuf::from("data/missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(e.to_string().contains("data/missing.txt"));
    }
}
