//! ASN.1 DER codec for `(r, s)`, adapted from the BearSSL-derived `ecdsa`
//! crate's `asn1` encoder, specialized to this curve's fixed 32-byte
//! scalars instead of a generic `FieldSize`.
//!
//! Strict on parse (rejects non-minimal integers, negative integers, and
//! oversized lengths); emits only minimal encodings.

use crate::error::{Error, Result};

/// `0x30 || len || INTEGER(r) || INTEGER(s)`, at most 72 bytes (6 bytes of
/// tag/length overhead plus up to 33 bytes for each of `r` and `s`).
pub const MAX_DER_LEN: usize = 72;

/// Encode `r` and `s` (big-endian, 32 bytes each) as ASN.1 DER. Returns the
/// fixed-size buffer and the number of leading bytes that are significant.
pub fn encode(r: &[u8; 32], s: &[u8; 32]) -> ([u8; MAX_DER_LEN], usize) {
    let mut buf = [0u8; MAX_DER_LEN];
    buf[0] = 0x30;
    let mut pos = 2;
    pos += encode_integer(r, &mut buf[pos..]);
    pos += encode_integer(s, &mut buf[pos..]);
    buf[1] = (pos - 2) as u8;
    (buf, pos)
}

/// Decode ASN.1 DER into big-endian `(r, s)` byte pairs. Does not itself
/// check `r, s ∈ [1, n)`; callers run the result through
/// [`crate::scalar::Scalar::from_bytes`] for that.
pub fn decode(bytes: &[u8]) -> Result<([u8; 32], [u8; 32])> {
    if bytes.len() < 8 || bytes[0] != 0x30 {
        return Err(Error::InvalidSignature);
    }
    let len = bytes[1] as usize;
    if len > 70 || bytes.len() != len + 2 {
        return Err(Error::InvalidSignature);
    }

    let mut pos = 2;
    let (r, consumed) = decode_integer(&bytes[pos..])?;
    pos += consumed;
    let (s, consumed) = decode_integer(&bytes[pos..])?;
    pos += consumed;
    if pos != bytes.len() {
        return Err(Error::InvalidSignature);
    }
    Ok((r, s))
}

/// Write one ASN.1 `INTEGER`, stripping superfluous leading zero bytes and
/// prepending exactly one `0x00` when the high bit of the leading byte
/// would otherwise flip the sign. Returns the number of bytes written.
fn encode_integer(value: &[u8; 32], out: &mut [u8]) -> usize {
    let mut start = 0;
    while start < 31 && value[start] == 0 {
        start += 1;
    }
    let trimmed = &value[start..];
    let need_pad = (trimmed[0] & 0x80) != 0;
    let content_len = trimmed.len() + need_pad as usize;

    out[0] = 0x02;
    out[1] = content_len as u8;
    let mut idx = 2;
    if need_pad {
        out[idx] = 0;
        idx += 1;
    }
    out[idx..idx + trimmed.len()].copy_from_slice(trimmed);
    idx + trimmed.len()
}

/// Parse one ASN.1 `INTEGER`, rejecting non-minimal or negative encodings,
/// and left-pad the result out to 32 bytes. Returns the value and the
/// number of input bytes consumed (`2 + content length`).
fn decode_integer(input: &[u8]) -> Result<([u8; 32], usize)> {
    if input.len() < 3 || input[0] != 0x02 {
        return Err(Error::InvalidSignature);
    }
    let len = input[1] as usize;
    if len == 0 || len > 33 || input.len() < 2 + len {
        return Err(Error::InvalidSignature);
    }
    let content = &input[2..2 + len];

    if content[0] == 0x00 {
        if len > 1 && content[1] & 0x80 == 0 {
            return Err(Error::InvalidSignature); // superfluous leading zero
        }
    } else if content[0] & 0x80 != 0 {
        return Err(Error::InvalidSignature); // negative integer
    }

    let significant = if content.len() == 33 {
        &content[1..]
    } else {
        content
    };
    if significant.len() > 32 {
        return Err(Error::InvalidSignature);
    }

    let mut out = [0u8; 32];
    out[32 - significant.len()..].copy_from_slice(significant);
    Ok((out, 2 + len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_arbitrary_values() {
        let r = [0x11u8; 32];
        let s = [0x22u8; 32];
        let (buf, len) = encode(&r, &s);
        let (r2, s2) = decode(&buf[..len]).unwrap();
        assert_eq!(r, r2);
        assert_eq!(s, s2);
    }

    #[test]
    fn roundtrip_high_bit_needs_padding() {
        let mut r = [0x80u8; 32];
        r[0] = 0x80;
        let s = {
            let mut s = [0u8; 32];
            s[31] = 1;
            s
        };
        let (buf, len) = encode(&r, &s);
        assert_eq!(buf[2], 0x02);
        assert_eq!(buf[3], 33); // content_len = 32 + 1 pad byte
        let (r2, s2) = decode(&buf[..len]).unwrap();
        assert_eq!(r, r2);
        assert_eq!(s, s2);
    }

    #[test]
    fn rejects_non_minimal_leading_zero() {
        // INTEGER whose content is `00 01` (superfluous pad: 0x01 has no
        // high bit set, so the leading zero wasn't needed).
        let bad = [0x30, 0x06, 0x02, 0x02, 0x00, 0x01, 0x02, 0x01];
        assert!(decode(&bad).is_err());
    }

    #[test]
    fn rejects_negative_integer() {
        let bad = [0x30, 0x06, 0x02, 0x01, 0x80, 0x02, 0x01, 0x01];
        assert!(decode(&bad).is_err());
    }

    #[test]
    fn rejects_wrong_outer_tag() {
        let mut r = [0x11u8; 32];
        let s = [0x22u8; 32];
        r[0] = 0x01;
        let (mut buf, len) = encode(&r, &s);
        buf[0] = 0x31;
        assert!(decode(&buf[..len]).is_err());
    }
}
