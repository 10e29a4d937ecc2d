#![no_std]
#![forbid(unsafe_code, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![allow(clippy::needless_range_loop)]

//! Pure Rust secp256k1: constant-time field and scalar arithmetic, ECDSA
//! (RFC 6979 deterministic nonces, ASN.1 DER and compact codecs, public
//! key recovery), BIP-340 Schnorr signatures, and ECDH, built without a
//! dependency on an external libsecp256k1.
//!
//! The curve layer ([`field`], [`scalar`], [`point`]) is `no_std`-only and
//! allocation-free; [`precompute`] needs `alloc` for its windowed tables,
//! and [`utils::random_private_key`] needs `std` for an OS RNG.

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod ecdh;
pub mod ecdsa;
pub mod encoding;
mod error;
mod field;
pub mod nonce;
#[cfg(feature = "alloc")]
pub mod precompute;
pub mod schnorr;
mod scalar;
mod point;
pub mod utils;
mod util;

pub use error::{Error, Result};
pub use field::FieldElement;
pub use point::Point;
pub use scalar::Scalar;
