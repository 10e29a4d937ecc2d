//! Points on the secp256k1 curve `y^2 = x^3 + 7` in Jacobian coordinates
//! `(X, Y, Z)` representing the affine point `(X/Z^2, Y/Z^3)`, with the
//! point at infinity represented by `Z = 0`.
//!
//! Jacobian coordinates avoid a field inversion on every addition/doubling
//! (the dominant cost of affine arithmetic); only encoding to SEC1/x-only
//! bytes pays for a single inversion back to affine form. Formulas below
//! are the standard `dbl-2009-l` (doubling, specialized for `a = 0`) and
//! `add-2007-bl` (addition) formulas, the same family used by libsecp256k1
//! and by every serious from-scratch secp256k1 implementation.

use core::fmt;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::error::Error;
use crate::field::FieldElement;
use crate::scalar::Scalar;

/// `Gx`, the generator's x-coordinate.
const GX: [u64; 4] = [
    0x59f2_815b_16f8_1798,
    0x029b_fcdb_2dce_28d9,
    0x55a0_6295_ce87_0b07,
    0x79be_667e_f9dc_bbac,
];

/// `Gy`, the generator's y-coordinate.
const GY: [u64; 4] = [
    0x9c47_d08f_fb10_d4b8,
    0xfd17_b448_a685_5419,
    0x5da4_fbfc_0e11_08a8,
    0x483a_da77_26a3_c465,
];

/// A point on the secp256k1 curve, in Jacobian projective coordinates.
#[derive(Clone, Copy)]
pub struct Point {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
}

impl Point {
    /// The point at infinity (additive identity of the curve group).
    pub const IDENTITY: Self = Self {
        x: FieldElement::ONE,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// The conventional base point `G`.
    pub const GENERATOR: Self = Self {
        x: FieldElement::from_raw(GX),
        y: FieldElement::from_raw(GY),
        z: FieldElement::ONE,
    };

    /// Build a point directly from affine coordinates known to satisfy the
    /// curve equation (internal use: decoding trusts the caller to have
    /// checked this already).
    pub(crate) fn from_affine_unchecked(x: FieldElement, y: FieldElement) -> Self {
        Self {
            x,
            y,
            z: FieldElement::ONE,
        }
    }

    /// `true` iff `self` is the point at infinity.
    pub fn is_identity(&self) -> Choice {
        self.z.is_zero()
    }

    /// `true` iff `(x, y)` lies on the curve: `y^2 == x^3 + 7`.
    pub fn is_on_curve(x: &FieldElement, y: &FieldElement) -> Choice {
        let lhs = y.square();
        let rhs = x.square().mul(x).add(&FieldElement::CURVE_B);
        lhs.ct_eq(&rhs)
    }

    /// Convert to affine `(x, y)`, or `None` for the point at infinity.
    pub fn to_affine(&self) -> CtOption<(FieldElement, FieldElement)> {
        self.z.invert().map(|zinv| {
            let zinv2 = zinv.square();
            let zinv3 = zinv2.mul(&zinv);
            (self.x.mul(&zinv2), self.y.mul(&zinv3))
        })
    }

    /// Point negation: `(x, y) -> (x, -y)`.
    pub fn negate(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.negate(),
            z: self.z,
        }
    }

    /// Point doubling (`dbl-2009-l`, specialized for curve parameter `a = 0`).
    pub fn double(&self) -> Self {
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();
        let x1_plus_b = self.x.add(&b);
        let d = x1_plus_b.square().sub(&a).sub(&c).double();
        let e = a.double().add(&a);
        let f = e.square();
        let x3 = f.sub(&d.double());
        let y3 = e.mul(&d.sub(&x3)).sub(&c.double().double().double());
        let z3 = self.y.mul(&self.z).double();

        let result = Self { x: x3, y: y3, z: z3 };
        // Doubling the identity must yield the identity: the formula above
        // produces a spurious non-identity Z when Z1 == 0, so force it.
        Self::conditional_select(&result, &Self::IDENTITY, self.is_identity())
    }

    /// General point addition (`add-2007-bl`), complete for the
    /// cases this crate actually exercises (both operands finite and
    /// `self != ±other`) plus explicit handling of the degenerate cases
    /// (either operand at infinity, or `self == ±other`) via constant-time
    /// selection rather than branching, so callers never need to special
    /// case scalar multiplication around doubling or infinity.
    pub fn add(&self, other: &Self) -> Self {
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x.mul(&z2z2);
        let u2 = other.x.mul(&z1z1);
        let s1 = self.y.mul(&other.z).mul(&z2z2);
        let s2 = other.y.mul(&self.z).mul(&z1z1);

        let h = u2.sub(&u1);
        let i = h.double().square();
        let j = h.mul(&i);
        let r = s2.sub(&s1).double();
        let v = u1.mul(&i);

        let x3 = r.square().sub(&j).sub(&v.double());
        let y3 = r.mul(&v.sub(&x3)).sub(&s1.mul(&j).double());
        let z3 = self
            .z
            .add(&other.z)
            .square()
            .sub(&z1z1)
            .sub(&z2z2)
            .mul(&h);

        let generic = Self { x: x3, y: y3, z: z3 };

        let same_x = u1.ct_eq(&u2);
        let same_y = s1.ct_eq(&s2);
        let is_double = same_x & same_y;
        let is_inverse = same_x & !same_y;

        let with_double = Self::conditional_select(&generic, &self.double(), is_double);
        let with_inverse =
            Self::conditional_select(&with_double, &Self::IDENTITY, is_inverse & !is_double);

        let lhs_identity = self.is_identity();
        let rhs_identity = other.is_identity();
        let result = Self::conditional_select(&with_inverse, other, lhs_identity);
        Self::conditional_select(&result, self, rhs_identity & !lhs_identity)
    }

    /// Variable-base scalar multiplication via left-to-right double-and-add
    /// over the 256 bits of `scalar`, with the accumulator updated through
    /// a constant-time select every iteration so the bit pattern of
    /// `scalar` does not influence the sequence of field operations.
    ///
    /// [`crate::precompute`] builds a windowed table on top of this for
    /// the fixed base point `G`, where repeated multiplication makes the
    /// up-front table cost worth paying.
    pub fn mul(&self, scalar: &Scalar) -> Self {
        let mut acc = Self::IDENTITY;
        for i in (0..256).rev() {
            acc = acc.double();
            let added = acc.add(self);
            acc = Self::conditional_select(&acc, &added, scalar.bit(i));
        }
        acc
    }

    /// `[scalar] * G`. Goes through [`crate::precompute`]'s cached windowed
    /// table when one is available (`std`, or an explicitly built `alloc`
    /// table), falling back to the generic [`Self::mul`] otherwise.
    #[cfg(feature = "std")]
    pub fn mul_generator(scalar: &Scalar) -> Self {
        crate::precompute::generator_table().mul(scalar)
    }

    /// `[scalar] * G`, without a cached table (no `std`).
    #[cfg(not(feature = "std"))]
    pub fn mul_generator(scalar: &Scalar) -> Self {
        Self::GENERATOR.mul(scalar)
    }

    /// SEC1 compressed encoding: `0x02`/`0x03` (by `y` parity) followed by
    /// the 32-byte big-endian `x`-coordinate. Errors for the identity,
    /// which SEC1 has no byte representation for.
    pub fn to_sec1_compressed(&self) -> Result<[u8; 33], Error> {
        let (x, y) = Option::from(self.to_affine()).ok_or(Error::InvalidPublicKey)?;
        let mut out = [0u8; 33];
        out[0] = 0x02 | (bool::from(y.is_odd()) as u8);
        out[1..].copy_from_slice(&x.to_bytes());
        Ok(out)
    }

    /// SEC1 uncompressed encoding: `0x04` followed by the 32-byte `x` then
    /// the 32-byte `y`, both big-endian.
    pub fn to_sec1_uncompressed(&self) -> Result<[u8; 65], Error> {
        let (x, y) = Option::from(self.to_affine()).ok_or(Error::InvalidPublicKey)?;
        let mut out = [0u8; 65];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&x.to_bytes());
        out[33..].copy_from_slice(&y.to_bytes());
        Ok(out)
    }

    /// Decode a SEC1 compressed or uncompressed public key.
    pub fn from_sec1(bytes: &[u8]) -> Result<Self, Error> {
        match bytes.first() {
            Some(0x02) | Some(0x03) if bytes.len() == 33 => {
                let want_odd = bytes[0] == 0x03;
                let mut x_bytes = [0u8; 32];
                x_bytes.copy_from_slice(&bytes[1..33]);
                let x = Option::<FieldElement>::from(FieldElement::from_bytes(&x_bytes))
                    .ok_or(Error::InvalidPublicKey)?;
                let y = recover_y(&x, want_odd).ok_or(Error::InvalidPublicKey)?;
                Ok(Self::from_affine_unchecked(x, y))
            }
            Some(0x04) if bytes.len() == 65 => {
                let mut x_bytes = [0u8; 32];
                let mut y_bytes = [0u8; 32];
                x_bytes.copy_from_slice(&bytes[1..33]);
                y_bytes.copy_from_slice(&bytes[33..65]);
                let x = Option::<FieldElement>::from(FieldElement::from_bytes(&x_bytes))
                    .ok_or(Error::InvalidPublicKey)?;
                let y = Option::<FieldElement>::from(FieldElement::from_bytes(&y_bytes))
                    .ok_or(Error::InvalidPublicKey)?;
                if !bool::from(Self::is_on_curve(&x, &y)) {
                    return Err(Error::InvalidPublicKey);
                }
                Ok(Self::from_affine_unchecked(x, y))
            }
            _ => Err(Error::InvalidPublicKey),
        }
    }

    /// BIP-340 x-only encoding: the 32-byte big-endian `x`-coordinate of
    /// the point with even `y` in `{self, -self}`.
    pub fn to_xonly(&self) -> Result<[u8; 32], Error> {
        let (x, _y) = Option::from(self.to_affine()).ok_or(Error::InvalidPublicKey)?;
        Ok(x.to_bytes())
    }

    /// BIP-340 x-only decoding: lift an `x`-coordinate to the point with
    /// even `y`. Fails if `x >= p` or `x` is not on the curve.
    pub fn lift_x(x_bytes: &[u8; 32]) -> Result<Self, Error> {
        let x =
            Option::<FieldElement>::from(FieldElement::from_bytes(x_bytes)).ok_or(Error::InvalidPublicKey)?;
        let y = recover_y(&x, false).ok_or(Error::InvalidPublicKey)?;
        Ok(Self::from_affine_unchecked(x, y))
    }
}

/// Recover `y` for a given `x` on `y^2 = x^3 + 7`, selecting the root with
/// the requested parity. Returns `None` if `x` is not on the curve.
///
/// Shared with [`crate::ecdsa::recover_public_key`], which needs the same
/// decompression step for the ephemeral point `R`.
pub(crate) fn recover_y(x: &FieldElement, want_odd: bool) -> Option<FieldElement> {
    let rhs = x.square().mul(x).add(&FieldElement::CURVE_B);
    let y = Option::<FieldElement>::from(rhs.sqrt())?;
    let y_odd = y.is_odd();
    let y = FieldElement::conditional_select(&y, &y.negate(), y_odd ^ Choice::from(want_odd as u8));
    Some(y)
}

impl ConditionallySelectable for Point {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for Point {
    /// Affine equality: equal iff both are the identity, or both are
    /// finite with the same affine coordinates.
    fn ct_eq(&self, other: &Self) -> Choice {
        let both_identity = self.is_identity() & other.is_identity();
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let same_x = self.x.mul(&z2z2).ct_eq(&other.x.mul(&z1z1));
        let same_y = self
            .y
            .mul(&z2z2)
            .mul(&other.z)
            .ct_eq(&other.y.mul(&z1z1).mul(&self.z));
        let both_finite_equal =
            !self.is_identity() & !other.is_identity() & same_x & same_y;
        both_identity | both_finite_equal
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}
impl Eq for Point {}

impl Default for Point {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Option::<(FieldElement, FieldElement)>::from(self.to_affine()) {
            Some((x, _)) => write!(f, "Point({x:?}, ..)"),
            None => write!(f, "Point(identity)"),
        }
    }
}

impl core::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Point::add(&self, &rhs)
    }
}
impl core::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Point::add(&self, &rhs.negate())
    }
}
impl core::ops::Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Point::negate(&self)
    }
}
impl core::ops::AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl core::ops::SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(bool::from(Point::is_on_curve(
            &Point::GENERATOR.x,
            &Point::GENERATOR.y
        )));
    }

    #[test]
    fn double_matches_add_to_self() {
        let g = Point::GENERATOR;
        assert_eq!(g.double(), g.add(&g));
    }

    #[test]
    fn add_identity_is_noop() {
        let g = Point::GENERATOR;
        assert_eq!(g.add(&Point::IDENTITY), g);
        assert_eq!(Point::IDENTITY.add(&g), g);
    }

    #[test]
    fn point_plus_its_negation_is_identity() {
        let g = Point::GENERATOR;
        assert!(bool::from(g.add(&g.negate()).is_identity()));
    }

    #[test]
    fn scalar_one_times_generator_is_generator() {
        let g = Point::GENERATOR;
        assert_eq!(g.mul(&Scalar::from_u64(1)), g);
    }

    #[test]
    fn scalar_two_times_generator_is_double() {
        let g = Point::GENERATOR;
        assert_eq!(g.mul(&Scalar::from_u64(2)), g.double());
    }

    #[test]
    fn scalar_mult_distributes_over_addition() {
        let g = Point::GENERATOR;
        let a = Scalar::from_u64(7);
        let b = Scalar::from_u64(11);
        let lhs = g.mul(&a.add(&b));
        let rhs = g.mul(&a).add(&g.mul(&b));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn zero_times_generator_is_identity() {
        let g = Point::GENERATOR;
        assert!(bool::from(g.mul(&Scalar::ZERO).is_identity()));
    }

    #[test]
    fn sec1_compressed_roundtrip() {
        let g = Point::GENERATOR;
        let p = g.mul(&Scalar::from_u64(12345));
        let bytes = p.to_sec1_compressed().unwrap();
        assert!(bytes[0] == 0x02 || bytes[0] == 0x03);
        let decoded = Point::from_sec1(&bytes).unwrap();
        assert_eq!(p, decoded);
    }

    #[test]
    fn sec1_uncompressed_roundtrip() {
        let g = Point::GENERATOR;
        let p = g.mul(&Scalar::from_u64(54321));
        let bytes = p.to_sec1_uncompressed().unwrap();
        assert_eq!(bytes[0], 0x04);
        let decoded = Point::from_sec1(&bytes).unwrap();
        assert_eq!(p, decoded);
    }

    #[test]
    fn sec1_rejects_bad_prefix() {
        let mut bytes = Point::GENERATOR.to_sec1_uncompressed().unwrap();
        bytes[0] = 0x07;
        assert!(Point::from_sec1(&bytes).is_err());
    }

    #[test]
    fn xonly_lift_roundtrip_picks_even_y() {
        let g = Point::GENERATOR;
        let p = g.mul(&Scalar::from_u64(999));
        let x = p.to_xonly().unwrap();
        let lifted = Point::lift_x(&x).unwrap();
        let (_, y) = Option::from(lifted.to_affine()).unwrap();
        assert!(!bool::from(y.is_odd()));
    }

    #[test]
    fn lift_x_rejects_field_modulus() {
        // `x == p` (the field modulus) is never a canonical field element,
        // so it must be rejected before the quadratic-residue check runs.
        let p_bytes: [u8; 32] = [
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
            0xff, 0xff, 0xfc, 0x2f,
        ];
        assert!(Point::lift_x(&p_bytes).is_err());
    }
}
