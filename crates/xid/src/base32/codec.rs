use crate::{DecodeError, Result};

/// Number of bytes in the binary form.
pub const RAW_LEN: usize = 12;

/// Number of characters in the text form.
pub const ENCODED_LEN: usize = 20;

/// Base32hex alphabet, lowercase. Symbols are in ASCII order so that text
/// comparison matches byte comparison.
pub const ALPHABET: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: usize = 5;
const CHAR_MASK: u128 = 0x1F;

/// 20 symbols carry 100 bits; the 96 payload bits are followed by this many
/// zero bits.
const PAD_BITS: usize = ENCODED_LEN * BITS_PER_CHAR - RAW_LEN * 8;
const PAD_MASK: u128 = (1 << PAD_BITS) - 1;

/// Lookup table for base32hex decoding. Only the lowercase alphabet maps to a
/// value; everything else, including uppercase, is `NO_VALUE`.
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    while i < 32 {
        lut[ALPHABET[i as usize] as usize] = i;
        i += 1;
    }
    lut
};

/// Encodes 12 bytes into 20 base32hex characters.
///
/// The input is read as one big-endian 96-bit string followed by four zero
/// bits, then cut into 5-bit symbols from the most significant end. The last
/// symbol is therefore always `0` or `g`.
#[inline]
pub fn encode_base32(input: &[u8; RAW_LEN], out: &mut [u8; ENCODED_LEN]) {
    let acc = load_be(input) << PAD_BITS;
    for (i, slot) in out.iter_mut().enumerate() {
        let shift = (ENCODED_LEN - 1 - i) * BITS_PER_CHAR;
        *slot = ALPHABET[((acc >> shift) & CHAR_MASK) as usize];
    }
}

/// Decodes 20 base32hex characters back into 12 bytes.
///
/// # Errors
///
/// - [`DecodeError::WrongLength`] if `encoded` is not exactly 20 bytes long.
/// - [`DecodeError::InvalidCharacter`] on the first byte outside the
///   lowercase alphabet.
/// - [`DecodeError::NonCanonical`] if the padding bits are not zero.
#[inline]
pub fn decode_base32(encoded: &[u8]) -> Result<[u8; RAW_LEN]> {
    if encoded.len() != ENCODED_LEN {
        return Err(DecodeError::WrongLength {
            expected: ENCODED_LEN,
            actual: encoded.len(),
        });
    }

    let mut acc = 0_u128;
    for (index, &byte) in encoded.iter().enumerate() {
        let val = LOOKUP[byte as usize];
        if val == NO_VALUE {
            return Err(DecodeError::InvalidCharacter { byte, index });
        }
        acc = (acc << BITS_PER_CHAR) | u128::from(val);
    }

    if acc & PAD_MASK != 0 {
        return Err(DecodeError::NonCanonical);
    }

    Ok(store_be(acc >> PAD_BITS))
}

/// Returns `true` if `byte` is a member of the text alphabet.
#[must_use]
pub const fn is_alphabet_byte(byte: u8) -> bool {
    LOOKUP[byte as usize] != NO_VALUE
}

#[inline]
fn load_be(bytes: &[u8; RAW_LEN]) -> u128 {
    let mut wide = [0_u8; 16];
    wide[16 - RAW_LEN..].copy_from_slice(bytes);
    u128::from_be_bytes(wide)
}

#[inline]
fn store_be(value: u128) -> [u8; RAW_LEN] {
    let wide = value.to_be_bytes();
    let mut out = [0_u8; RAW_LEN];
    out.copy_from_slice(&wide[16 - RAW_LEN..]);
    out
}
