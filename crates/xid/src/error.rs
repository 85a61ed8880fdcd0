/// A result type defaulting to [`DecodeError`].
pub type Result<T, E = DecodeError> = core::result::Result<T, E>;

/// Errors produced when turning untrusted input into an [`crate::Xid`].
///
/// Every variant is an expected outcome of malformed input. None of them
/// leave any shared state behind, so callers can map them straight to a
/// "no value" result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The input is not the fixed width of the representation being decoded
    /// (12 bytes for binary, 20 characters for text).
    #[error("invalid length: expected {expected}, got {actual}")]
    WrongLength {
        /// Required input length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// The text input contains a byte outside the base32hex alphabet.
    #[error("invalid character {byte:#04x} at index {index}")]
    InvalidCharacter {
        /// The offending byte.
        byte: u8,
        /// Its position in the input.
        index: usize,
    },

    /// The final character carries padding bits that a canonical encoding
    /// always leaves at zero.
    #[error("non-canonical encoding: padding bits in the last character must be zero")]
    NonCanonical,
}
