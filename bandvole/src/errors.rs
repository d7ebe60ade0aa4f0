// -*- mode: rust; -*-
//
// This file is part of `bandvole`.
// See LICENSE for licensing information.

/// Errors produced by `bandvole`.
#[derive(Debug)]
pub enum Error {
    /// The requested or received number of correlations is not the expected one.
    InvalidInputLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
    /// A pre-dealt correlation was already handed out.
    CorrelationExhausted,
    /// An I/O error has occurred.
    IoError(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IoError(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidInputLength { expected, actual } => write!(
                f,
                "invalid input length: expected {}, got {}",
                expected, actual
            ),
            Error::CorrelationExhausted => "VOLE correlation already consumed".fmt(f),
            Error::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}
