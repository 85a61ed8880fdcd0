use core::{fmt, str::FromStr};

use crate::{
    DecodeError, Result,
    base32::{ENCODED_LEN, RAW_LEN, XidFormatter, decode_base32},
};

/// Largest value the 3-byte counter field can hold.
pub const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// A 12-byte, globally unique, time-sortable identifier.
///
/// ```text
///  Byte Index:  0        3 4        6 7     8 9       11
///               +---------+----------+-------+---------+
///  Field:       | time    | machine  | pid   | counter |
///               | (32)    | (24)     | (16)  | (24)    |
///               +---------+----------+-------+---------+
///               |<-- MSB ------ 96 bits ------ LSB --->|
/// ```
///
/// All fields are big-endian, so ordering the raw bytes (which is what the
/// derived [`Ord`] does) orders identifiers by creation second first.
///
/// Any 12 bytes form a valid `Xid`, even if no generator ever produced them.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Xid {
    bytes: [u8; RAW_LEN],
}

impl Xid {
    /// Number of bytes in the binary form.
    pub const RAW_LEN: usize = RAW_LEN;

    /// Number of characters in the text form.
    pub const ENCODED_LEN: usize = ENCODED_LEN;

    /// The all-zero identifier.
    pub const NIL: Self = Self::from_bytes([0; RAW_LEN]);

    /// Wraps 12 raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; RAW_LEN]) -> Self {
        Self { bytes }
    }

    /// Packs the four fields into an identifier.
    ///
    /// Only the low 24 bits of `counter` are kept.
    #[must_use]
    pub const fn from_components(time: u32, machine: [u8; 3], pid: u16, counter: u32) -> Self {
        let t = time.to_be_bytes();
        let p = pid.to_be_bytes();
        let c = (counter & COUNTER_MASK).to_be_bytes();
        Self::from_bytes([
            t[0], t[1], t[2], t[3], machine[0], machine[1], machine[2], p[0], p[1], c[1], c[2],
            c[3],
        ])
    }

    /// Returns a reference to the binary form.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; RAW_LEN] {
        &self.bytes
    }

    /// Returns the binary form.
    ///
    /// This is the identity projection; it cannot fail.
    #[must_use]
    pub const fn encode_bytes(&self) -> [u8; RAW_LEN] {
        self.bytes
    }

    /// Wraps an untrusted byte sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::WrongLength`] unless `raw` is exactly 12 bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use xid::{DecodeError, Xid};
    ///
    /// assert_eq!(Xid::decode_bytes(&[0; 12]), Ok(Xid::NIL));
    /// assert_eq!(
    ///     Xid::decode_bytes(&[0; 11]),
    ///     Err(DecodeError::WrongLength { expected: 12, actual: 11 })
    /// );
    /// ```
    pub fn decode_bytes(raw: &[u8]) -> Result<Self> {
        raw.try_into()
            .map(Self::from_bytes)
            .map_err(|_| DecodeError::WrongLength {
                expected: RAW_LEN,
                actual: raw.len(),
            })
    }

    /// Returns the 20-character text form.
    ///
    /// The returned formatter lives on the stack and implements
    /// [`fmt::Display`] and `Deref<Target = str>`.
    ///
    /// # Example
    ///
    /// ```
    /// use xid::Xid;
    ///
    /// let id = Xid::from_bytes([
    ///     0x4d, 0x88, 0xe1, 0x5b, 0x60, 0xf4, 0x86, 0xe4, 0x28, 0x41, 0x2d, 0xc9,
    /// ]);
    /// assert_eq!(id.encode_text(), "9m4e2mr0ui3e8a215n4g");
    /// ```
    pub fn encode_text(&self) -> XidFormatter {
        XidFormatter::new(self)
    }

    /// Encodes into a caller-provided buffer and returns it as `&str`.
    pub fn encode_to_buf<'buf>(&self, buf: &'buf mut [u8; ENCODED_LEN]) -> &'buf str {
        crate::base32::encode_base32(&self.bytes, buf);
        // SAFETY: `encode_base32` writes only ASCII alphabet bytes and fills
        // every slot of `buf`.
        unsafe { core::str::from_utf8_unchecked(buf) }
    }

    /// Parses the 20-character text form.
    ///
    /// Accepts any byte sequence; nothing about the input is trusted. Only
    /// lowercase alphabet characters are accepted.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::WrongLength`] if the input is not 20 bytes.
    /// - [`DecodeError::InvalidCharacter`] if any byte is outside the
    ///   alphabet.
    /// - [`DecodeError::NonCanonical`] if the padding bits of the last
    ///   character are set.
    pub fn decode_text(text: impl AsRef<[u8]>) -> Result<Self> {
        decode_base32(text.as_ref()).map(Self::from_bytes)
    }

    /// Seconds since the UNIX epoch at which the identifier was generated
    /// (modulo 2^32).
    #[must_use]
    pub const fn time(&self) -> u32 {
        u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    /// The 3-byte machine tag.
    #[must_use]
    pub const fn machine(&self) -> [u8; 3] {
        [self.bytes[4], self.bytes[5], self.bytes[6]]
    }

    /// The 2-byte process tag.
    #[must_use]
    pub const fn pid(&self) -> u16 {
        u16::from_be_bytes([self.bytes[7], self.bytes[8]])
    }

    /// The 3-byte counter, as an integer in `0..=0xFF_FFFF`.
    #[must_use]
    pub const fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.bytes[9], self.bytes[10], self.bytes[11]])
    }

    /// Returns `true` for [`Xid::NIL`].
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        let mut i = 0;
        while i < RAW_LEN {
            if self.bytes[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// The generation time as a [`std::time::SystemTime`].
    #[cfg(feature = "std")]
    #[must_use]
    pub fn timestamp(&self) -> crate::time::SystemTime {
        crate::time::UNIX_EPOCH + core::time::Duration::from_secs(u64::from(self.time()))
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encode_text().as_str())
    }
}

impl fmt::Debug for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Xid").field(&self.encode_text().as_str()).finish()
    }
}

impl FromStr for Xid {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode_text(s)
    }
}

impl TryFrom<&[u8]> for Xid {
    type Error = DecodeError;

    fn try_from(raw: &[u8]) -> Result<Self> {
        Self::decode_bytes(raw)
    }
}

impl From<[u8; RAW_LEN]> for Xid {
    fn from(bytes: [u8; RAW_LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Xid> for [u8; RAW_LEN] {
    fn from(id: Xid) -> Self {
        id.encode_bytes()
    }
}

impl AsRef<[u8]> for Xid {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
