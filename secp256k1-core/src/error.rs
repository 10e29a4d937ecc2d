//! The error type shared by every fallible operation in this crate.
//!
//! Kept as a hand-rolled, non-exhaustive `enum` rather than an opaque
//! `signature::Error`: callers here need to tell a malformed private key
//! apart from a malformed signature, which an opaque error can't express.
//! `core::fmt::Display` is implemented by hand for the same reason the
//! `der`/`ecdsa` crates do — pulling in a derive-macro crate for six
//! variants isn't worth the dependency.

use core::fmt;

/// Everything that can go wrong constructing or verifying secp256k1
/// key material or signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A private key / signing scalar was zero, `>= n`, or the wrong length.
    InvalidPrivateKey,
    /// A public key did not decode to a point on the curve (bad length,
    /// bad prefix byte, non-canonical coordinate, or the decoded `(x, y)`
    /// does not satisfy `y^2 = x^3 + 7`).
    InvalidPublicKey,
    /// A signature was malformed: bad DER, `r`/`s` out of `[1, n)`, or (for
    /// Schnorr) a bad length or a verification-equation mismatch.
    InvalidSignature,
    /// A message hash/digest had an unexpected length (e.g. BIP-340
    /// requires exactly 32 bytes).
    InvalidHash,
    /// Recovery was attempted but no candidate public key satisfied the
    /// signature equation.
    NoSolution,
    /// An operation with a bounded retry loop (RFC 6979 nonce generation,
    /// hash-to-curve) exhausted its retry budget. Does not happen for any
    /// real input; surfaced as an error rather than panicking or looping
    /// forever.
    ProbabilityExhausted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidPrivateKey => "invalid private key",
            Self::InvalidPublicKey => "invalid public key",
            Self::InvalidSignature => "invalid signature",
            Self::InvalidHash => "invalid message hash length",
            Self::NoSolution => "no recovery candidate satisfies the signature",
            Self::ProbabilityExhausted => "retry budget exhausted",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Convenience alias used throughout this crate's public API.
pub type Result<T> = core::result::Result<T, Error>;
