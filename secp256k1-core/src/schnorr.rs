//! BIP-340 Schnorr signatures over secp256k1: tagged hashes, x-only public
//! keys, and synthetic-nonce `sign`/`verify`.
//!
//! Unlike [`crate::ecdsa`], BIP-340 fixes the message to exactly 32 bytes
//! (see [`crate::scalar::Scalar::from_hash`]'s doc comment for the
//! documented asymmetry) and derives its nonce from a single tagged-hash
//! draw rather than an RFC 6979 HMAC-DRBG loop, so it does not go through
//! [`crate::nonce`].

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::field::FieldElement;
use crate::point::Point;
use crate::scalar::Scalar;

/// `SHA256(SHA256(tag) || SHA256(tag) || msg)`, BIP-340's domain-separated
/// hash construction.
fn tagged_hash(tag: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let tag_hash = Sha256::digest(tag);
    let mut hasher = Sha256::new();
    hasher.update(tag_hash);
    hasher.update(tag_hash);
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn xor32(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for i in 0..32 {
        out[i] = a[i] ^ b[i];
    }
    out
}

/// A BIP-340 Schnorr signature: `R.x (32 B) || s (32 B)`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    r: FieldElement,
    s: Scalar,
}

impl Signature {
    /// 64-byte encoding: `R.x || s`, big-endian.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r.to_bytes());
        out[32..].copy_from_slice(&self.s.to_bytes());
        out
    }

    /// Decode a 64-byte signature, rejecting `R.x >= p` or `s >= n` (`s = 0`
    /// is accepted at parse time; it can only arise from a signing bug and
    /// simply fails the verification equation).
    pub fn from_bytes(bytes: &[u8; 64]) -> Result<Self> {
        let mut r_bytes = [0u8; 32];
        let mut s_bytes = [0u8; 32];
        r_bytes.copy_from_slice(&bytes[..32]);
        s_bytes.copy_from_slice(&bytes[32..]);
        let r = Option::<FieldElement>::from(FieldElement::from_bytes(&r_bytes))
            .ok_or(Error::InvalidSignature)?;
        let s = Option::<Scalar>::from(Scalar::from_bytes_allow_zero(&s_bytes))
            .ok_or(Error::InvalidSignature)?;
        Ok(Self { r, s })
    }
}

/// Sign a 32-byte message `m` with private scalar `d`.
/// `aux` is the 32 bytes of auxiliary randomness (BIP-340 step 2); pass
/// freshly drawn random bytes for ordinary use, or a fixed value for
/// reproducible tests. Self-verifies before returning (BIP-340 step 7); a
/// self-verify failure surfaces as [`Error::ProbabilityExhausted`] and
/// indicates a bug rather than bad input.
pub fn sign(d: &Scalar, m: &[u8; 32], aux: &[u8; 32]) -> Result<Signature> {
    if bool::from(d.is_zero()) {
        return Err(Error::InvalidPrivateKey);
    }
    let big_p = Point::mul_generator(d);
    let (_, py) = Option::from(big_p.to_affine()).ok_or(Error::InvalidPrivateKey)?;
    let d_prime = if bool::from(py.is_odd()) { d.negate() } else { *d };
    let px = big_p.to_xonly()?;

    let h_aux = tagged_hash(b"BIP0340/aux", &[aux]);
    let t = xor32(&d_prime.to_bytes(), &h_aux);

    let rand = tagged_hash(b"BIP0340/nonce", &[&t, &px, m]);
    let k_prime = Scalar::from_bytes_reduced(&rand);
    if bool::from(k_prime.is_zero()) {
        return Err(Error::ProbabilityExhausted);
    }

    let big_r = Point::mul_generator(&k_prime);
    let (rx, ry) = Option::from(big_r.to_affine()).ok_or(Error::ProbabilityExhausted)?;
    let k = if bool::from(ry.is_odd()) { k_prime.negate() } else { k_prime };

    let e_bytes = tagged_hash(b"BIP0340/challenge", &[&rx.to_bytes(), &px, m]);
    let e = Scalar::from_bytes_reduced(&e_bytes);

    let s = k.add(&e.mul(&d_prime));
    let signature = Signature { r: rx, s };

    if !verify(&signature, m, &px) {
        return Err(Error::ProbabilityExhausted);
    }
    Ok(signature)
}

/// Verify `signature` over 32-byte message `m` against the x-only public
/// key `px`. Never returns an error for malformed input — any parsing or
/// range failure simply yields `false`.
pub fn verify(signature: &Signature, m: &[u8; 32], px: &[u8; 32]) -> bool {
    let big_p = match Point::lift_x(px) {
        Ok(p) => p,
        Err(_) => return false,
    };

    let e_bytes = tagged_hash(b"BIP0340/challenge", &[&signature.r.to_bytes(), px, m]);
    let e = Scalar::from_bytes_reduced(&e_bytes);

    let big_r = Point::mul_generator(&signature.s).add(&big_p.mul(&e.negate()));
    if bool::from(big_r.is_identity()) {
        return false;
    }
    let (rx, ry) = match Option::from(big_r.to_affine()) {
        Some(v) => v,
        None => return false,
    };
    if bool::from(ry.is_odd()) {
        return false;
    }
    rx == signature.r
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    // BIP-340 test vector 0: d = 3, m = aux = 0x00..00.
    #[test]
    fn matches_bip340_vector_0() {
        let d = Scalar::from_u64(3);
        let m = [0u8; 32];
        let aux = [0u8; 32];

        let sig = sign(&d, &m, &aux).unwrap();
        let px = Point::mul_generator(&d).to_xonly().unwrap();
        assert_eq!(
            px,
            hex!("f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9")
        );

        let expected_r = hex!("e907831f80848d1069a5371b402410364bdf1c5f8307b0084c55f1ce2dca821");
        assert_eq!(&sig.to_bytes()[..32], &expected_r[..]);

        assert!(verify(&sig, &m, &px));
    }

    #[test]
    fn full_64_byte_vector_matches() {
        let d = Scalar::from_u64(3);
        let m = [0u8; 32];
        let aux = [0u8; 32];
        let sig = sign(&d, &m, &aux).unwrap();

        let expected = hex!(
            "e907831f80848d1069a5371b402410364bdf1c5f8307b0084c55f1ce2dca821\
             525f66a4a85ea8b71e482a74f382d2ce5ebeee8fdb2172f477df4900d310536c0"
        );
        assert_eq!(sig.to_bytes(), expected);
    }

    #[test]
    fn sign_is_deterministic_given_aux() {
        let d = Scalar::from_u64(12345);
        let m = [0x42u8; 32];
        let aux = [0x11u8; 32];
        let sig1 = sign(&d, &m, &aux).unwrap();
        let sig2 = sign(&d, &m, &aux).unwrap();
        assert!(sig1 == sig2);
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let d = Scalar::from_u64(99);
        let m = [0x01u8; 32];
        let aux = [0x02u8; 32];
        let sig = sign(&d, &m, &aux).unwrap();
        let px = Point::mul_generator(&d).to_xonly().unwrap();
        assert!(verify(&sig, &m, &px));

        let mut bad_m = m;
        bad_m[0] ^= 1;
        assert!(!verify(&sig, &bad_m, &px));
    }

    #[test]
    fn verify_rejects_bad_pubkey() {
        let d = Scalar::from_u64(99);
        let m = [0x01u8; 32];
        let aux = [0x02u8; 32];
        let sig = sign(&d, &m, &aux).unwrap();
        let wrong_px = Point::mul_generator(&Scalar::from_u64(100)).to_xonly().unwrap();
        assert!(!verify(&sig, &m, &wrong_px));
    }

    #[test]
    fn different_aux_yields_different_signature() {
        let d = Scalar::from_u64(7);
        let m = [0x05u8; 32];
        let sig1 = sign(&d, &m, &[0u8; 32]).unwrap();
        let sig2 = sign(&d, &m, &[1u8; 32]).unwrap();
        assert!(sig1 != sig2);
    }

    #[test]
    fn rejects_zero_private_key() {
        assert!(sign(&Scalar::ZERO, &[0u8; 32], &[0u8; 32]).is_err());
    }

    #[test]
    fn signature_roundtrip() {
        let d = Scalar::from_u64(55);
        let m = [0x09u8; 32];
        let aux = [0x0au8; 32];
        let sig = sign(&d, &m, &aux).unwrap();
        let decoded = Signature::from_bytes(&sig.to_bytes()).unwrap();
        assert!(decoded == sig);
    }
}
