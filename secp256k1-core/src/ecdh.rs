//! ECDH key agreement: `getSharedSecret(d, Q) = [d]Q`, returned as a
//! 33-byte SEC1 compressed point.

use crate::error::{Error, Result};
use crate::point::Point;
use crate::scalar::Scalar;

/// Compute the shared secret `[d]Q`, SEC1 compressed. Rejects a zero or
/// identity result, which can only arise from a degenerate `(d, Q)` pair
/// (e.g. `Q` is `d`'s negation composed with itself) and would otherwise
/// leak no entropy to both parties.
pub fn get_shared_secret(d: &Scalar, q: &Point) -> Result<[u8; 33]> {
    if bool::from(d.is_zero()) {
        return Err(Error::InvalidPrivateKey);
    }
    if bool::from(q.is_identity()) {
        return Err(Error::InvalidPublicKey);
    }
    let shared = q.mul(d);
    if bool::from(shared.is_identity()) {
        return Err(Error::NoSolution);
    }
    shared.to_sec1_compressed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_from_byte(b: u8) -> Scalar {
        let mut bytes = [0u8; 32];
        bytes[31] = b;
        Option::from(Scalar::from_bytes(&bytes)).unwrap()
    }

    #[test]
    fn symmetric_shared_secret() {
        let da = scalar_from_byte(0x01);
        let db = scalar_from_byte(0x02);
        let qa = Point::mul_generator(&da);
        let qb = Point::mul_generator(&db);

        let shared_ab = get_shared_secret(&da, &qb).unwrap();
        let shared_ba = get_shared_secret(&db, &qa).unwrap();
        assert_eq!(shared_ab, shared_ba);

        let expected = Point::mul_generator(&da.mul(&db)).to_sec1_compressed().unwrap();
        assert_eq!(shared_ab, expected);
    }

    #[test]
    fn rejects_zero_private_key() {
        let q = Point::mul_generator(&scalar_from_byte(0x01));
        assert!(get_shared_secret(&Scalar::ZERO, &q).is_err());
    }

    #[test]
    fn rejects_identity_public_key() {
        let d = scalar_from_byte(0x01);
        assert!(get_shared_secret(&d, &Point::IDENTITY).is_err());
    }
}
