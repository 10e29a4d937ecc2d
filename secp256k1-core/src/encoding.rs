//! Dual bytes/hex input normalization: a standalone codec that accepts a
//! big-endian byte string *or* its hex encoding through a single chokepoint
//! rejecting odd-length hex, non-hex characters, and wrong-size inputs. The
//! arithmetic modules ([`crate::ecdsa`], [`crate::schnorr`], [`crate::ecdh`])
//! take concrete fixed-size byte arrays directly rather than routing through
//! this; it's here for callers building a hex-flexible API on top (a CLI, a
//! JSON-RPC boundary) without re-deriving bytes-or-hex handling themselves.

use crate::error::{Error, Result};

/// A caller-supplied byte string, in either of the two shapes every entry
/// point accepts.
#[derive(Clone, Copy, Debug)]
pub enum Encoded<'a> {
    /// Raw bytes, used as-is.
    Bytes(&'a [u8]),
    /// A hex string, decoded before use.
    Hex(&'a str),
}

impl<'a> From<&'a [u8]> for Encoded<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Encoded<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self::Bytes(bytes.as_slice())
    }
}

impl<'a> From<&'a str> for Encoded<'a> {
    fn from(hex: &'a str) -> Self {
        Self::Hex(hex)
    }
}

/// Normalize `input` to exactly `N` raw bytes. Hex input must decode to
/// exactly `N` bytes (an odd-length or wrong-length string is rejected
/// before any hex digit is even inspected); byte input must already be
/// exactly `N` bytes.
pub fn decode_fixed<const N: usize>(input: Encoded<'_>) -> Result<[u8; N]> {
    match input {
        Encoded::Bytes(bytes) => bytes.try_into().map_err(|_| Error::InvalidHash),
        Encoded::Hex(hex) => {
            if hex.len() != N * 2 {
                return Err(Error::InvalidHash);
            }
            let mut out = [0u8; N];
            base16ct::mixed::decode(hex.as_bytes(), &mut out).map_err(|_| Error::InvalidHash)?;
            Ok(out)
        }
    }
}

/// Whether `input` arrived as hex, so an output can be encoded back in the
/// same shape the caller used: bytes in, bytes out; hex in, hex out.
pub fn is_hex(input: &Encoded<'_>) -> bool {
    matches!(input, Encoded::Hex(_))
}

/// Hex-encode a fixed-size byte array into a stack buffer twice its size,
/// without requiring `alloc`. `out` must be exactly `2 * bytes.len()` long.
pub fn encode_hex<'b>(bytes: &[u8], out: &'b mut [u8]) -> Result<&'b str> {
    base16ct::lower::encode_str(bytes, out).map_err(|_| Error::InvalidHash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_input_passes_through() {
        let bytes = [0x11u8; 32];
        let decoded: [u8; 32] = decode_fixed(Encoded::from(bytes.as_slice())).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn hex_input_decodes() {
        let hex = "11".repeat(32);
        let decoded: [u8; 32] = decode_fixed(Encoded::from(hex.as_str())).unwrap();
        assert_eq!(decoded, [0x11u8; 32]);
    }

    #[test]
    fn rejects_odd_length_hex() {
        let hex = "abc";
        assert!(decode_fixed::<32>(Encoded::from(hex)).is_err());
    }

    #[test]
    fn rejects_non_hex_chars() {
        let hex = "zz".repeat(32);
        assert!(decode_fixed::<32>(Encoded::from(hex.as_str())).is_err());
    }

    #[test]
    fn rejects_wrong_size_bytes() {
        let bytes = [0u8; 31];
        assert!(decode_fixed::<32>(Encoded::from(bytes.as_slice())).is_err());
    }

    #[test]
    fn hex_roundtrip() {
        let bytes = [0xabu8; 4];
        let mut buf = [0u8; 8];
        let encoded = encode_hex(&bytes, &mut buf).unwrap();
        assert_eq!(encoded, "abababab");
    }
}
