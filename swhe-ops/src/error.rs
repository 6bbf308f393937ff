//! Error types surfaced by the scheme.

use std::{error, fmt, io};

/// Reasons a [`Settings`](crate::Settings) value fails validation.
///
/// The discriminants are the diagnostic codes of the settings check, where
/// `0` means "valid".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SettingsIssue {
    /// The polynomial degree `n` is not a power of two.
    DegreeNotPowerOfTwo = 1,
    /// The stored bit length does not match `q`.
    QBitsMismatch = 2,
    /// The coefficient modulus `q` is not prime.
    QNotPrime = 3,
    /// The plaintext modulus `t` is not smaller than `q`.
    PlainModulusTooLarge = 4,
    /// The encoding base `b` is below the smallest supported base.
    BaseTooSmall = 5,
}

impl SettingsIssue {
    /// The numeric diagnostic code.
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for SettingsIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SettingsIssue::DegreeNotPowerOfTwo => "polynomial degree is not a power of two",
            SettingsIssue::QBitsMismatch => "stored bit length does not match q",
            SettingsIssue::QNotPrime => "coefficient modulus is not prime",
            SettingsIssue::PlainModulusTooLarge => "plaintext modulus is not smaller than q",
            SettingsIssue::BaseTooSmall => "encoding base is too small",
        };
        write!(f, "{msg} (code {})", self.code())
    }
}

/// Errors surfaced to callers. No operation retries internally.
#[derive(Debug)]
pub enum Error {
    /// An encoding or digit-decomposition base outside `[2, 62]`.
    InvalidBase(u32),
    /// A ciphertext has no room for the requested operation.
    CiphertextFull {
        /// Length the operation would need.
        len: usize,
        /// Capacity bound `D` of the parameter set.
        max_len: usize,
    },
    /// A ciphertext length the operation does not support.
    LengthUnsupported {
        /// The offending length.
        len: usize,
        /// Capacity bound `D` of the parameter set.
        max_len: usize,
    },
    /// A parameter set failed validation.
    SettingsInvalid(SettingsIssue),
    /// A key file could not be read, written, or parsed.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBase(b) => {
                write!(f, "base {b} is outside the supported range [2, 62]")
            }
            Error::CiphertextFull { len, max_len } => {
                write!(f, "ciphertext length {len} exceeds the maximum {max_len}")
            }
            Error::LengthUnsupported { len, max_len } => {
                write!(
                    f,
                    "ciphertext length {len} is unsupported by this operation (maximum {max_len})"
                )
            }
            Error::SettingsInvalid(issue) => write!(f, "invalid settings: {issue}"),
            Error::Io(err) => write!(f, "key file error: {err}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
