//! Deterministic ECDSA nonce derivation (RFC 6979 §3.2), wiring the
//! curve-agnostic [`rfc6979::generate_k`] to this crate's scalar field: it
//! knows how to turn a 32-byte HMAC-DRBG draw into a candidate `k` and
//! reject it unless it lands in `[1, n)`.
//!
//! BIP-340 Schnorr does *not* use this: its synthetic nonce is a single
//! tagged-hash draw, not an HMAC-DRBG loop, so it lives in [`crate::schnorr`]
//! instead.

use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::scalar::Scalar;

/// Derive the ECDSA ephemeral scalar `k` for signing key `d` and message
/// digest `h`, per RFC 6979 §3.2, retrying until a candidate lands in
/// `[1, n)` (astronomically likely on the first draw).
///
/// `extra_entropy` is folded in as RFC 6979 §3.6 additional data; pass `&[]`
/// for the fully deterministic form. `h` may be any length, per
/// [`crate::scalar::Scalar::from_hash`].
pub fn generate_k(d: &Scalar, h: &[u8], extra_entropy: &[u8]) -> Result<Zeroizing<Scalar>> {
    let x = Zeroizing::new(d.to_bytes());
    let h1 = Scalar::from_hash(h).to_bytes();

    // `is_valid` decodes each candidate anyway; capture the result here
    // instead of re-decoding the accepted candidate's bytes afterward.
    let mut found: Option<Scalar> = None;
    let raw = rfc6979::generate_k::<Sha256>(&x, &h1, extra_entropy, |candidate| {
        match Option::<Scalar>::from(Scalar::from_bytes(candidate)) {
            Some(k) => {
                found = Some(k);
                true
            }
            None => false,
        }
    });

    match (raw, found) {
        (Ok(_), Some(k)) => Ok(Zeroizing::new(k)),
        _ => Err(Error::ProbabilityExhausted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_inputs() {
        let mut d_bytes = [0u8; 32];
        d_bytes[31] = 0x2a;
        let d = Scalar::from_bytes(&d_bytes).unwrap();
        let h = [0x11u8; 32];

        let k1 = generate_k(&d, &h, &[]).unwrap();
        let k2 = generate_k(&d, &h, &[]).unwrap();
        assert_eq!(*k1, *k2);
    }

    #[test]
    fn extra_entropy_changes_output() {
        let mut d_bytes = [0u8; 32];
        d_bytes[31] = 0x2a;
        let d = Scalar::from_bytes(&d_bytes).unwrap();
        let h = [0x11u8; 32];

        let k1 = generate_k(&d, &h, &[]).unwrap();
        let k2 = generate_k(&d, &h, &[0x01]).unwrap();
        assert_ne!(*k1, *k2);
    }
}
