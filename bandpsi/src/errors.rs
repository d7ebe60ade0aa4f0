/// Errors produced by the OKVS and the private set intersection protocol.
#[derive(Debug)]
pub enum Error {
    /// The OKVS system is singular: the sorted row with this index has no
    /// pivot left after elimination.
    EncodeFailure(usize),
    /// A message from the peer had the wrong length, in bytes.
    ProtocolViolation {
        /// The expected length.
        expected: usize,
        /// The length actually announced.
        actual: usize,
    },
    /// The requested parameters are unusable.
    ConfigurationError(String),
    /// A locally supplied input had the wrong length.
    InvalidInputLength {
        /// The expected length.
        expected: usize,
        /// The length actually supplied.
        actual: usize,
    },
    /// The underlying VOLE failed.
    VoleError(bandvole::Error),
    /// An input/output error occurred.
    IoError(std::io::Error),
}

impl From<std::io::Error> for Error {
    #[inline]
    fn from(e: std::io::Error) -> Error {
        Error::IoError(e)
    }
}

impl From<bandvole::Error> for Error {
    #[inline]
    fn from(e: bandvole::Error) -> Error {
        Error::VoleError(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::EncodeFailure(row) => {
                write!(f, "OKVS encoding failed: row {} has no pivot", row)
            }
            Error::ProtocolViolation { expected, actual } => write!(
                f,
                "protocol violation: expected a message of {} bytes, got {}",
                expected, actual
            ),
            Error::ConfigurationError(s) => write!(f, "invalid configuration: {}", s),
            Error::InvalidInputLength { expected, actual } => write!(
                f,
                "invalid input length: expected {}, got {}",
                expected, actual
            ),
            Error::VoleError(e) => write!(f, "VOLE error: {}", e),
            Error::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::VoleError(e) => Some(e),
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}
