//! ECDSA over secp256k1 with RFC 6979 deterministic nonces: `sign`,
//! `verify`, `recover_public_key`, DER and compact signature codecs, and
//! low-`s` canonicalization.
//!
//! Follows the `ecdsa` crate's shape (`Signature`, `SigningKey`/
//! `VerifyingKey`, `RecoveryId`, `Signature::normalize_s`) but specialized
//! to a single concrete curve instead of its generic `C: EcdsaCurve`
//! parameter.

mod der;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::point::Point;
use crate::scalar::Scalar;

/// An ECDSA signature: a pair `(r, s)`, each in `[1, n)`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    r: Scalar,
    s: Scalar,
}

impl Signature {
    fn from_scalars(r: Scalar, s: Scalar) -> Result<Self> {
        if bool::from(r.is_zero()) || bool::from(s.is_zero()) {
            return Err(Error::InvalidSignature);
        }
        Ok(Self { r, s })
    }

    /// The `r` component.
    pub fn r(&self) -> &Scalar {
        &self.r
    }

    /// The `s` component.
    pub fn s(&self) -> &Scalar {
        &self.s
    }

    /// `true` iff `s <= n/2` (BIP-62 / low-`s` canonical form).
    pub fn is_low_s(&self) -> bool {
        !bool::from(self.s.is_high())
    }

    /// Return the canonical (low-`s`) form of this signature, or `None` if
    /// `self` is already canonical, matching `ecdsa::Signature::normalize_s`:
    /// a standalone post-hoc normalizer for signatures produced elsewhere,
    /// complementing the sign-time `canonical` flag.
    pub fn normalize_s(&self) -> Option<Self> {
        if self.is_low_s() {
            None
        } else {
            Some(Self {
                r: self.r,
                s: self.s.negate(),
            })
        }
    }

    /// 64-byte compact encoding: `r || s`, big-endian.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r.to_bytes());
        out[32..].copy_from_slice(&self.s.to_bytes());
        out
    }

    /// Decode a 64-byte compact signature, rejecting `r` or `s` outside
    /// `[1, n)`.
    pub fn from_bytes(bytes: &[u8; 64]) -> Result<Self> {
        let mut r_bytes = [0u8; 32];
        let mut s_bytes = [0u8; 32];
        r_bytes.copy_from_slice(&bytes[..32]);
        s_bytes.copy_from_slice(&bytes[32..]);
        let r = Option::<Scalar>::from(Scalar::from_bytes(&r_bytes)).ok_or(Error::InvalidSignature)?;
        let s = Option::<Scalar>::from(Scalar::from_bytes(&s_bytes)).ok_or(Error::InvalidSignature)?;
        Self::from_scalars(r, s)
    }

    /// Strict ASN.1 DER encoding.
    pub fn to_der(&self) -> ([u8; der::MAX_DER_LEN], usize) {
        der::encode(&self.r.to_bytes(), &self.s.to_bytes())
    }

    /// Parse a strict ASN.1 DER signature.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let (r_bytes, s_bytes) = der::decode(bytes)?;
        let r = Option::<Scalar>::from(Scalar::from_bytes(&r_bytes)).ok_or(Error::InvalidSignature)?;
        let s = Option::<Scalar>::from(Scalar::from_bytes(&s_bytes)).ok_or(Error::InvalidSignature)?;
        Self::from_scalars(r, s)
    }
}

/// A 2-bit recovery id: which of (up to) 4 candidate points `R` produced a
/// given signature's `r`. Low bit is `R.y`'s parity; high bit is whether
/// `R.x` overflowed the group order `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryId(u8);

impl RecoveryId {
    /// Largest representable value (inclusive).
    pub const MAX: u8 = 3;

    /// Build from the two underlying bits.
    pub const fn new(is_y_odd: bool, is_x_reduced: bool) -> Self {
        Self((is_x_reduced as u8) << 1 | (is_y_odd as u8))
    }

    /// Did `R.x` overflow `n` (the rare case `R.x >= n`, `R.x` still `< p`)?
    pub const fn is_x_reduced(self) -> bool {
        self.0 & 0b10 != 0
    }

    /// Was `R.y` odd?
    pub const fn is_y_odd(self) -> bool {
        self.0 & 1 != 0
    }

    /// Parse from a `0..=3` byte.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        if byte <= Self::MAX {
            Some(Self(byte))
        } else {
            None
        }
    }

    /// The raw `0..=3` value.
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Find, by brute-force trial over all 4 candidates, the recovery id
    /// that makes `recover_public_key` return `verifying_key`. Grounded on
    /// `ecdsa::recovery::RecoveryId::trial_recovery_from_prehash` — useful
    /// when a signature was persisted as bare `(r, s)` without its
    /// recovery id.
    pub fn trial_recovery_from_prehash(
        verifying_key: &Point,
        h: &[u8],
        signature: &Signature,
    ) -> Result<Self> {
        for byte in 0..=Self::MAX {
            let candidate = Self(byte);
            if let Ok(q) = recover_public_key(h, signature, candidate) {
                if q == *verifying_key {
                    return Ok(candidate);
                }
            }
        }
        Err(Error::NoSolution)
    }
}

/// Deterministically sign a message digest `h` (of any length — longer
/// digests are truncated and shorter ones zero-extended per
/// [`Scalar::from_hash`]) with private scalar `d`.
/// `canonical` requests low-`s` normalization (flipping the recovery id's
/// parity bit to match); `extra_entropy` is folded into the RFC 6979
/// derivation as additional data (pass `&[]` for the fully deterministic
/// form).
pub fn sign(
    d: &Scalar,
    h: &[u8],
    canonical: bool,
    extra_entropy: &[u8],
) -> Result<(Signature, RecoveryId)> {
    if bool::from(d.is_zero()) {
        return Err(Error::InvalidPrivateKey);
    }
    let e = Scalar::from_hash(h);
    let h1 = e.to_bytes();
    let x_bytes = Zeroizing::new(d.to_bytes());

    let mut found: Option<(Scalar, Scalar, bool, bool)> = None; // r, s, y_odd, x_overflowed
    let raw = rfc6979::generate_k::<Sha256>(&x_bytes, &h1, extra_entropy, |candidate| {
        let k = match Option::<Scalar>::from(Scalar::from_bytes(candidate)) {
            Some(k) => k,
            None => return false,
        };
        let r_point = Point::mul_generator(&k);
        let (rx, ry) = match Option::from(r_point.to_affine()) {
            Some(v) => v,
            None => return false,
        };
        let (r, overflowed) = Scalar::from_field_element(&rx);
        if bool::from(r.is_zero()) {
            return false;
        }
        let k_inv = match Option::<Scalar>::from(k.invert()) {
            Some(v) => v,
            None => return false,
        };
        let s = k_inv.mul(&e.add(&r.mul(d)));
        if bool::from(s.is_zero()) {
            return false;
        }
        found = Some((r, s, bool::from(ry.is_odd()), overflowed));
        true
    });

    let (r, s, y_odd, overflowed) = match (raw, found) {
        (Ok(_), Some(v)) => v,
        _ => return Err(Error::ProbabilityExhausted),
    };

    let (s_final, y_odd_final) = if canonical && bool::from(s.is_high()) {
        (s.negate(), !y_odd)
    } else {
        (s, y_odd)
    };

    let signature = Signature::from_scalars(r, s_final)?;
    let recovery = RecoveryId::new(y_odd_final, overflowed);
    Ok((signature, recovery))
}

/// Verify `signature` over digest `h` against public key `q`. Never
/// returns an error for malformed input — any parsing or range failure
/// simply yields `false`.
pub fn verify(signature: &Signature, h: &[u8], q: &Point) -> bool {
    if bool::from(q.is_identity()) {
        return false;
    }
    let e = Scalar::from_hash(h);
    let w = match Option::<Scalar>::from(signature.s.invert()) {
        Some(w) => w,
        None => return false,
    };
    let u1 = e.mul(&w);
    let u2 = signature.r.mul(&w);

    let r_point = Point::mul_generator(&u1).add(&q.mul(&u2));
    if bool::from(r_point.is_identity()) {
        return false;
    }
    let (rx, _) = match Option::from(r_point.to_affine()) {
        Some(v) => v,
        None => return false,
    };
    let (r_computed, _) = Scalar::from_field_element(&rx);
    r_computed == signature.r
}

/// Recover the public key(s) consistent with `(h, signature, recovery)`.
pub fn recover_public_key(h: &[u8], signature: &Signature, recovery: RecoveryId) -> Result<Point> {
    use crate::field::FieldElement;

    let x_field = if recovery.is_x_reduced() {
        // x = r + n; only ever needed when R.x itself overflowed n.
        let r_limbs = signature.r.to_canonical_limbs();
        let (sum, carry) = crate::util::add4(&r_limbs, &Scalar::order_limbs());
        if carry != 0 {
            return Err(Error::InvalidSignature);
        }
        FieldElement::try_from_limbs(sum).ok_or(Error::InvalidSignature)?
    } else {
        let r_bytes = signature.r.to_bytes();
        Option::<FieldElement>::from(FieldElement::from_bytes(&r_bytes)).ok_or(Error::InvalidSignature)?
    };

    let ry = crate::point::recover_y(&x_field, recovery.is_y_odd()).ok_or(Error::InvalidPublicKey)?;
    let r_point = Point::from_affine_unchecked(x_field, ry);

    let r_inv = Option::<Scalar>::from(signature.r.invert()).ok_or(Error::InvalidSignature)?;
    let e = Scalar::from_hash(h);
    let u1 = e.mul(&r_inv).negate();
    let u2 = signature.s.mul(&r_inv);

    let q = Point::mul_generator(&u1).add(&r_point.mul(&u2));
    if bool::from(q.is_identity()) {
        return Err(Error::NoSolution);
    }
    Ok(q)
}

/// An ECDSA signing key: a non-zero scalar, plus the public key it
/// corresponds to. Follows `ecdsa::SigningKey`, simplified from its
/// `C: EcdsaCurve` generic parameter to this crate's one concrete curve.
#[derive(Clone)]
pub struct SigningKey {
    secret_scalar: Scalar,
    verifying_key: VerifyingKey,
}

impl SigningKey {
    /// Wrap a raw private scalar, rejecting zero.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let secret_scalar =
            Option::<Scalar>::from(Scalar::from_bytes(bytes)).ok_or(Error::InvalidPrivateKey)?;
        let verifying_key = VerifyingKey::from_point(Point::mul_generator(&secret_scalar));
        Ok(Self {
            secret_scalar,
            verifying_key,
        })
    }

    /// Generate a random signing key using the operating system RNG.
    #[cfg(feature = "std")]
    pub fn random() -> Self {
        use rand_core::OsRng;
        let secret_scalar = Scalar::random(&mut OsRng);
        let verifying_key = VerifyingKey::from_point(Point::mul_generator(&secret_scalar));
        Self {
            secret_scalar,
            verifying_key,
        }
    }

    /// Serialize the raw private scalar.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret_scalar.to_bytes())
    }

    /// The [`VerifyingKey`] corresponding to this signing key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Sign a message digest `h`, as [`sign`]. `canonical` and
    /// `extra_entropy` are as documented there.
    pub fn sign(
        &self,
        h: &[u8],
        canonical: bool,
        extra_entropy: &[u8],
    ) -> Result<(Signature, RecoveryId)> {
        sign(&self.secret_scalar, h, canonical, extra_entropy)
    }
}

/// An ECDSA public key. Follows `ecdsa::VerifyingKey`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyingKey {
    point: Point,
}

impl VerifyingKey {
    fn from_point(point: Point) -> Self {
        Self { point }
    }

    /// Decode a SEC1 (compressed or uncompressed) public key, rejecting the
    /// identity.
    pub fn from_sec1(bytes: &[u8]) -> Result<Self> {
        let point = Point::from_sec1(bytes)?;
        if bool::from(point.is_identity()) {
            return Err(Error::InvalidPublicKey);
        }
        Ok(Self { point })
    }

    /// The underlying curve point.
    pub fn as_point(&self) -> &Point {
        &self.point
    }

    /// SEC1 compressed encoding.
    pub fn to_sec1_compressed(&self) -> Result<[u8; 33]> {
        self.point.to_sec1_compressed()
    }

    /// Verify `signature` over digest `h`, as [`verify`].
    pub fn verify(&self, h: &[u8], signature: &Signature) -> bool {
        verify(signature, h, &self.point)
    }
}
