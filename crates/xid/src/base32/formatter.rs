use core::{fmt, ops::Deref};

use super::{ENCODED_LEN, encode_base32};
use crate::Xid;

/// A stack buffer holding the text form of an [`Xid`].
///
/// Returned by [`Xid::encode_text`]. It implements [`fmt::Display`],
/// [`AsRef<str>`] and derefs to `str`, so it can be printed, compared or
/// copied into a `String` without an intermediate allocation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct XidFormatter {
    buf: [u8; ENCODED_LEN],
}

impl XidFormatter {
    /// Encodes `id` into a new stack buffer.
    #[must_use]
    pub fn new(id: &Xid) -> Self {
        let mut buf = [0_u8; ENCODED_LEN];
        encode_base32(id.as_bytes(), &mut buf);
        Self { buf }
    }

    /// Returns a `&str` view of the encoding.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: `self.buf` is only ever written by `encode_base32`, which
        // emits bytes from the ASCII alphabet.
        unsafe { core::str::from_utf8_unchecked(&self.buf) }
    }

    /// Returns the raw ASCII bytes of the encoding.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ENCODED_LEN] {
        &self.buf
    }
}

impl Deref for XidFormatter {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for XidFormatter {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<[u8]> for XidFormatter {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl fmt::Display for XidFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for XidFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl PartialEq<str> for XidFormatter {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for XidFormatter {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<XidFormatter> for &str {
    fn eq(&self, other: &XidFormatter) -> bool {
        *self == other.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_encodes_the_identifier() {
        let id = Xid::from_bytes([
            0x4d, 0x88, 0xe1, 0x5b, 0x60, 0xf4, 0x86, 0xe4, 0x28, 0x41, 0x2d, 0xc9,
        ]);
        let formatter = XidFormatter::new(&id);
        assert_eq!(formatter.as_str(), "9m4e2mr0ui3e8a215n4g");
        assert_eq!(formatter.as_bytes(), b"9m4e2mr0ui3e8a215n4g");
        assert_eq!(formatter, id.encode_text());
    }
}
