//! Validation probes and convenience helpers: private-key/point validity
//! checks, random private key generation, and a thin wrapper over
//! [`crate::precompute`] for warming a table ahead of repeated scalar
//! multiplication against a fixed base.

use crate::point::Point;
use crate::scalar::Scalar;

/// `true` iff `bytes` is a valid private key: exactly 32 bytes, big-endian,
/// encoding a scalar in `[1, n)`.
pub fn is_valid_private_key(bytes: &[u8; 32]) -> bool {
    bool::from(Scalar::from_bytes(bytes).is_some())
}

/// `true` iff `bytes` decodes to a point on the curve, in SEC1 compressed
/// or uncompressed form.
pub fn is_valid_point(bytes: &[u8]) -> bool {
    Point::from_sec1(bytes).is_ok()
}

/// Draw a uniformly random private key, rejection-sampled into `[1, n-1]`,
/// using the operating system RNG.
#[cfg(feature = "std")]
pub fn random_private_key() -> zeroize::Zeroizing<[u8; 32]> {
    use rand_core::OsRng;
    let mut rng = OsRng;
    zeroize::Zeroizing::new(Scalar::random(&mut rng).to_bytes())
}

/// Draw a uniformly random private key, rejection-sampled into `[1, n-1]`,
/// using a caller-supplied RNG. For use without `std` (no OS RNG access).
pub fn random_private_key_with_rng(
    rng: &mut impl rand_core::RngCore,
) -> zeroize::Zeroizing<[u8; 32]> {
    zeroize::Zeroizing::new(Scalar::random(rng).to_bytes())
}

/// Build (and, under `std`, publish into the process-wide cache) the
/// windowed multiplication table for `point`. Passing [`Point::GENERATOR`]
/// warms the same cache [`Point::mul_generator`] reads from; any other
/// base builds a private, uncached table the caller holds onto
/// for its own repeated use.
///
/// The window width is fixed at 8 bits (see [`crate::precompute`]'s module
/// docs); there is no runtime-configurable window size to pass.
#[cfg(feature = "alloc")]
pub fn precompute(point: &Point) -> crate::precompute::Table {
    if *point == Point::GENERATOR {
        crate::precompute::precompute_g();
    }
    crate::precompute::Table::build(point)
}
