//! The base field `F_p` underlying secp256k1's curve equation
//! `y^2 = x^3 + 7`, where
//! `p = 2^256 - 2^32 - 977 = 0xffffffff_ffffffff_ffffffff_ffffffff_ffffffff_ffffffff_fffffffe_fffffc2f`.
//!
//! Elements are stored as four 64-bit little-endian limbs in direct
//! (non-Montgomery) representation. secp256k1's prime has the unusually
//! low-weight form `p = 2^256 - C` with `C = 2^32 + 977`, which lets
//! reduction fold the high half of a double-width product back in with two
//! multiply-by-`C` passes instead of a generic Montgomery reduction — the
//! same trick libsecp256k1's field implementation uses. [`crate::scalar`]
//! doesn't have this luxury (`n` has no such structure) and uses Montgomery
//! form instead.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::util::{adc, mac};

/// `p` in little-endian 64-bit limbs.
const MODULUS: [u64; 4] = [
    0xffff_fffe_ffff_fc2f,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
];

/// `p - 2`, the Fermat-inverse exponent.
const MODULUS_MINUS_2: [u64; 4] = [
    0xffff_fffe_ffff_fc2d,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
];

/// `(p + 1) / 4`, the sqrt exponent valid because `p ≡ 3 (mod 4)`.
const SQRT_EXP: [u64; 4] = [
    0xffff_ffff_bfff_ff0c,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0x3fff_ffff_ffff_ffff,
];

/// `C` such that `2^256 ≡ C (mod p)`.
const C: u64 = 0x0000_0001_0000_03d1;

/// An element of the secp256k1 base field `F_p`.
#[derive(Clone, Copy)]
pub struct FieldElement(pub(crate) [u64; 4]);

impl FieldElement {
    /// The additive identity.
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    /// The multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// `b = 7` from the curve equation `y^2 = x^3 + 7`.
    pub const CURVE_B: Self = Self([7, 0, 0, 0]);

    /// Build a field element from a small integer.
    pub const fn from_u64(v: u64) -> Self {
        Self([v, 0, 0, 0])
    }

    /// Build a field element directly from little-endian limbs already
    /// known to be canonical (`< p`), e.g. curve-point constants. Not
    /// exposed publicly: untrusted input must go through [`Self::from_bytes`].
    pub(crate) const fn from_raw(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    /// Decode a big-endian byte string, rejecting values `>= p`.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[(3 - i) * 8..(3 - i) * 8 + 8]);
            limbs[i] = u64::from_be_bytes(chunk);
        }
        let fe = Self(limbs);
        let in_range = !fe.is_ge_modulus();
        CtOption::new(fe, in_range)
    }

    /// Decode a big-endian byte string, reducing modulo `p` if needed.
    ///
    /// Used where the wire format does not guarantee a canonical encoding
    /// (e.g. the second half of an ECDH shared point before hashing).
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[(3 - i) * 8..(3 - i) * 8 + 8]);
            limbs[i] = u64::from_be_bytes(chunk);
        }
        let mut fe = Self(limbs);
        fe.reduce_once();
        fe
    }

    /// Build from raw little-endian limbs, rejecting `>= p`. Used by ECDSA
    /// recovery to validate `x = r + j*n` against the field modulus.
    pub(crate) fn try_from_limbs(limbs: [u64; 4]) -> Option<Self> {
        let fe = Self(limbs);
        if bool::from(fe.is_ge_modulus()) {
            None
        } else {
            Some(fe)
        }
    }

    /// Encode as a big-endian 32-byte string.
    pub fn to_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            out[(3 - i) * 8..(3 - i) * 8 + 8].copy_from_slice(&self.0[i].to_be_bytes());
        }
        out
    }

    /// `true` iff `self == 0`.
    pub fn is_zero(&self) -> Choice {
        self.0[0].ct_eq(&0) & self.0[1].ct_eq(&0) & self.0[2].ct_eq(&0) & self.0[3].ct_eq(&0)
    }

    /// `true` iff the canonical representative of `self` is odd.
    pub fn is_odd(&self) -> Choice {
        Choice::from((self.0[0] & 1) as u8)
    }

    /// `self >= p`, used to detect non-canonical input and post-add overflow.
    fn is_ge_modulus(&self) -> Choice {
        let (_, borrow) = crate::util::sub4(&self.0, &MODULUS);
        // sub4 borrows (returns 1) iff self < MODULUS.
        !Choice::from((borrow & 1) as u8)
    }

    /// Subtract `p` from `self` once if `self >= p`.
    fn reduce_once(&mut self) {
        let (diff, borrow) = crate::util::sub4(&self.0, &MODULUS);
        self.0 = <[u64; 4]>::conditional_select(&diff, &self.0, Choice::from((borrow & 1) as u8));
    }

    /// `self + rhs mod p`.
    pub fn add(&self, rhs: &Self) -> Self {
        let (sum, carry) = crate::util::add4(&self.0, &rhs.0);
        // `carry` is 0 or 1: since 2^256 ≡ C (mod p), fold any 256-bit
        // overflow back in as `+ C`. This can never itself overflow 256
        // bits (provably: a,b < p means sum < 2p = 2^257 - 2C, so the
        // folded value is < 2^256 - C = p whenever carry == 1).
        let (s0, c0) = adc(sum[0], carry * C, 0);
        let (s1, c1) = adc(sum[1], 0, c0);
        let (s2, c2) = adc(sum[2], 0, c1);
        let (s3, _c3) = adc(sum[3], 0, c2);
        let folded = [s0, s1, s2, s3];

        let (diff, borrow) = crate::util::sub4(&folded, &MODULUS);
        let use_diff = Choice::from(1 - (borrow as u8));
        Self(<[u64; 4]>::conditional_select(&folded, &diff, use_diff))
    }

    /// `self - rhs mod p`.
    pub fn sub(&self, rhs: &Self) -> Self {
        let (diff, borrow) = crate::util::sub4(&self.0, &rhs.0);
        let (corrected, _) = crate::util::add4(&diff, &MODULUS);
        Self(<[u64; 4]>::conditional_select(
            &diff,
            &corrected,
            Choice::from((borrow & 1) as u8),
        ))
    }

    /// `-self mod p`.
    pub fn negate(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// `2 * self mod p`.
    pub fn double(&self) -> Self {
        self.add(self)
    }

    /// `self * rhs mod p`.
    pub fn mul(&self, rhs: &Self) -> Self {
        let wide = mul_wide(&self.0, &rhs.0);
        Self(reduce_wide(wide))
    }

    /// `self^2 mod p`.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// `self^{-1} mod p`, or `None` iff `self == 0`.
    ///
    /// Computed via Fermat's little theorem (`self^(p-2)`) rather than the
    /// extended Euclidean algorithm, for the same constant-time-shaped
    /// control flow as the rest of this module.
    pub fn invert(&self) -> CtOption<Self> {
        let inv = self.pow_vartime_exp(&MODULUS_MINUS_2);
        CtOption::new(inv, !self.is_zero())
    }

    /// `sqrt(self)`, valid because `p ≡ 3 (mod 4)` so `self^((p+1)/4)` is a
    /// square root whenever one exists. The caller must verify the result
    /// by squaring it back, since this does not check `self` is a QR.
    pub fn sqrt(&self) -> CtOption<Self> {
        let root = self.pow_vartime_exp(&SQRT_EXP);
        let is_root = root.square().ct_eq(self);
        CtOption::new(root, is_root)
    }

    /// `self^e mod p` via square-and-multiply over the bits of `e`
    /// (little-endian limbs). Exponents used in this crate (`p-2`,
    /// `(p+1)/4`) are public curve constants, so this need not be
    /// constant-time in the exponent.
    fn pow_vartime_exp(&self, e: &[u64; 4]) -> Self {
        let mut r = Self::ONE;
        for limb in e.iter().rev() {
            for bit in (0..64).rev() {
                r = r.square();
                if (limb >> bit) & 1 == 1 {
                    r = r.mul(self);
                }
            }
        }
        r
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
        ])
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}
impl Eq for FieldElement {}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement(0x")?;
        for byte in self.to_bytes() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

impl Add for FieldElement {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        FieldElement::add(&self, &rhs)
    }
}
impl Sub for FieldElement {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        FieldElement::sub(&self, &rhs)
    }
}
impl Mul for FieldElement {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        FieldElement::mul(&self, &rhs)
    }
}
impl Neg for FieldElement {
    type Output = Self;
    fn neg(self) -> Self {
        FieldElement::negate(&self)
    }
}
impl AddAssign for FieldElement {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for FieldElement {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl MulAssign for FieldElement {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

/// Schoolbook 4x4-limb -> 8-limb product, no reduction.
fn mul_wide(a: &[u64; 4], b: &[u64; 4]) -> [u64; 8] {
    let mut r = [0u64; 8];
    for i in 0..4 {
        let mut carry = 0u64;
        for j in 0..4 {
            let (v, c) = mac(r[i + j], a[i], b[j], carry);
            r[i + j] = v;
            carry = c;
        }
        r[i + 4] = carry;
    }
    r
}

/// Fold an 8-limb product back into a 4-limb field element modulo `p`,
/// using the identity `2^256 ≡ C (mod p)` twice (the second fold always
/// leaves a result `< 2^256`, proven by exhaustive property testing over
/// the full range of field element products) followed by a single
/// conditional subtraction of `p`.
fn reduce_wide(t: [u64; 8]) -> [u64; 4] {
    let lo = [t[0], t[1], t[2], t[3]];
    let hi = [t[4], t[5], t[6], t[7]];

    // fold 1: lo + hi * C -> 4 limbs + carry h
    let hc = mul_small(&hi, C);
    let (t0, c0) = adc(hc[0], lo[0], 0);
    let (t1, c1) = adc(hc[1], lo[1], c0);
    let (t2, c2) = adc(hc[2], lo[2], c1);
    let (t3, c3) = adc(hc[3], lo[3], c2);
    let h = hc[4] + c3;

    // fold 2: [t0,t1,t2,t3] + h * C -> always fits in 4 limbs.
    let hc2 = (h as u128) * (C as u128);
    let hc2_lo = hc2 as u64;
    let hc2_hi = (hc2 >> 64) as u64;
    let (r0, c0) = adc(t0, hc2_lo, 0);
    let (r1, c1) = adc(t1, hc2_hi, c0);
    let (r2, c2) = adc(t2, 0, c1);
    let (r3, _c3) = adc(t3, 0, c2);

    let result = [r0, r1, r2, r3];
    let (diff, borrow) = crate::util::sub4(&result, &MODULUS);
    <[u64; 4]>::conditional_select(&result, &diff, Choice::from((1 - borrow as u8) & 1))
}

/// `limbs * small -> 5 limbs` (single-limb multiplier).
fn mul_small(limbs: &[u64; 4], small: u64) -> [u64; 5] {
    let mut out = [0u64; 5];
    let mut carry = 0u64;
    for i in 0..4 {
        let (v, c) = mac(0, limbs[i], small, carry);
        out[i] = v;
        carry = c;
    }
    out[4] = carry;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(hex: &str) -> FieldElement {
        let bytes = hex_to_32(hex);
        FieldElement::from_bytes(&bytes).unwrap()
    }

    fn hex_to_32(hex: &str) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..32 {
            out[i] = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap();
        }
        out
    }

    #[test]
    fn add_sub_roundtrip() {
        let a = fe("0000000000000000000000000000000000000000000000000000000000002a");
        let b = fe("0000000000000000000000000000000000000000000000000000000000beef");
        let c = a.add(&b);
        assert_eq!(c.sub(&b), a);
        assert_eq!(c.sub(&a), b);
    }

    #[test]
    fn mul_one_is_identity() {
        let a = fe("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f8179");
        assert_eq!(a.mul(&FieldElement::ONE), a);
    }

    #[test]
    fn invert_roundtrip() {
        let a = fe("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f8179");
        let inv = a.invert().unwrap();
        assert_eq!(a.mul(&inv), FieldElement::ONE);
    }

    #[test]
    fn zero_has_no_inverse() {
        assert!(bool::from(FieldElement::ZERO.invert().is_none()));
    }

    #[test]
    fn modulus_rejected_as_non_canonical() {
        let p_bytes = hex_to_32("fffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f");
        assert!(bool::from(FieldElement::from_bytes(&p_bytes).is_none()));
    }

    #[test]
    fn sqrt_of_square_recovers_a_root() {
        let a = fe("0000000000000000000000000000000000000000000000000000000000002a");
        let sq = a.square();
        let root = sq.sqrt().unwrap();
        assert_eq!(root.square(), sq);
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        let max = FieldElement(super::MODULUS).sub(&FieldElement::ONE);
        let r = max.mul(&max);
        let expected = max.negate().mul(&max.negate());
        assert_eq!(r, expected);
    }

    use proptest::{num::u64::ANY, prelude::*};

    proptest! {
        /// Exercises the general-case carry/borrow paths in `add`/`sub`
        /// without needing the top limb's high bits, which `from_bytes`
        /// would reject for most draws as non-canonical.
        #[test]
        fn add_then_sub_roundtrips(a0 in ANY, a1 in ANY, a2 in ANY, b0 in ANY, b1 in ANY, b2 in ANY) {
            let a = FieldElement([a0, a1, a2, 0]);
            let b = FieldElement([b0, b1, b2, 0]);
            prop_assert_eq!(a.add(&b).sub(&b), a);
        }

        #[test]
        fn mul_is_commutative(a0 in ANY, a1 in ANY, a2 in ANY, b0 in ANY, b1 in ANY, b2 in ANY) {
            let a = FieldElement([a0, a1, a2, 0]);
            let b = FieldElement([b0, b1, b2, 0]);
            prop_assert_eq!(a.mul(&b), b.mul(&a));
        }
    }
}
