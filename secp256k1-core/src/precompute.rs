//! Windowed scalar multiplication against a fixed base point.
//!
//! [`Point::mul`] is a constant-time 256-step double-and-add that works for
//! any base; it is also the only multiplication strategy available in a
//! `no_std` build without `alloc`. When repeated multiplication of the same
//! base (almost always the generator `G`) makes an up-front table worth the
//! cost, [`Table`] precomputes, for each of 32 eight-bit windows, every
//! point `d * 2^(8j) * G` for `d` in `1..=128`, plus the single extra point
//! needed for the rare carry out of the top window. Multiplying then costs
//! 32 table reads and additions instead of 256 doublings.
//!
//! The per-window table read scans every entry and selects with
//! [`subtle::ConditionallySelectable`], so which entry was used is not
//! visible through memory-access pattern. The signed-digit recoding that
//! picks *which* entry to ask for uses ordinary (non-constant-time)
//! arithmetic on digit values derived from the scalar: this mitigates, but
//! does not eliminate, timing leakage from that recoding step. The
//! unconditional guarantee lives in [`Point::mul`]; this module is a speed
//! layer on top of it.

use alloc::boxed::Box;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::point::Point;
use crate::scalar::Scalar;

const WINDOW_BITS: u32 = 8;
const NUM_WINDOWS: usize = 256 / WINDOW_BITS as usize;
const HALF: usize = 1 << (WINDOW_BITS - 1);

/// A precomputed table of multiples of a fixed base point, indexed by
/// signed 8-bit window digit.
pub struct Table {
    /// `windows[j][d - 1] = d * 2^(8*j) * base`, for `d` in `1..=128`.
    windows: Box<[[Point; HALF]; NUM_WINDOWS]>,
    /// `2^256 * base`, added on the rare carry out of the top window.
    overflow: Point,
}

impl Table {
    /// Build the table for `base`. `O(2^(W-1) * 256/W)` point doublings and
    /// additions; meant to run once per base point.
    pub fn build(base: &Point) -> Self {
        let mut windows: Box<[[Point; HALF]; NUM_WINDOWS]> =
            Box::new([[Point::IDENTITY; HALF]; NUM_WINDOWS]);

        let mut window_base = *base;
        for window in windows.iter_mut() {
            let mut acc = window_base;
            window[0] = acc;
            for slot in window.iter_mut().skip(1) {
                acc = acc.add(&window_base);
                *slot = acc;
            }
            for _ in 0..WINDOW_BITS {
                window_base = window_base.double();
            }
        }

        // `window_base` is now `2^256 * base`, having been doubled
        // `NUM_WINDOWS * WINDOW_BITS == 256` times above.
        let overflow = window_base;

        Self { windows, overflow }
    }

    /// `[scalar] * base`, where `base` is the point this table was built
    /// from.
    pub fn mul(&self, scalar: &Scalar) -> Point {
        let limbs = scalar.to_canonical_limbs();
        let mut acc = Point::IDENTITY;
        let mut carry: i32 = 0;

        for j in 0..NUM_WINDOWS {
            let limb = limbs[j / 8];
            let byte = ((limb >> ((j % 8) * 8)) & 0xff) as i32;
            let mut digit = byte + carry;
            if digit > HALF as i32 {
                digit -= 1 << WINDOW_BITS;
                carry = 1;
            } else {
                carry = 0;
            }

            let entry = ct_lookup(&self.windows[j], digit.unsigned_abs() as u8);
            let negated = entry.negate();
            let signed_entry =
                Point::conditional_select(&entry, &negated, Choice::from((digit < 0) as u8));
            acc = acc.add(&signed_entry);
        }

        let with_overflow = acc.add(&self.overflow);
        Point::conditional_select(&acc, &with_overflow, Choice::from(carry as u8))
    }
}

/// Scan every entry of a window and select the one matching `idx` (`1..=128`;
/// `0` selects the identity, matching a zero digit), without branching on
/// `idx`.
fn ct_lookup(window: &[Point; HALF], idx: u8) -> Point {
    let mut result = Point::IDENTITY;
    for (d, candidate) in window.iter().enumerate() {
        let choice = ((d + 1) as u8).ct_eq(&idx);
        result = Point::conditional_select(&result, candidate, choice);
    }
    result
}

#[cfg(feature = "std")]
mod cache {
    use std::sync::OnceLock;

    use super::Table;
    use crate::point::Point;

    static GENERATOR_TABLE: OnceLock<Table> = OnceLock::new();

    /// The lazily-built, process-wide table for the generator `G`. First
    /// call pays the build cost; every later call (from any thread) reads
    /// the same published table.
    pub fn generator_table() -> &'static Table {
        GENERATOR_TABLE.get_or_init(|| Table::build(&Point::GENERATOR))
    }

    /// Force the generator table to be built now, rather than on first use.
    /// A no-op on every call after the first.
    pub fn precompute_g() {
        let _ = generator_table();
    }
}

#[cfg(feature = "std")]
pub use cache::{generator_table, precompute_g};

/// Without `std`, [`std::sync::OnceLock`] isn't available, so there is
/// nowhere process-wide to publish the table. Every call rebuilds it: still
/// correct, just without the caching win. Callers on `no_std` who multiply
/// the generator by many scalars should build and hold their own
/// [`Table`] instead of going through this function repeatedly.
#[cfg(all(feature = "alloc", not(feature = "std")))]
pub fn precompute_g() {
    let _ = Table::build(&Point::GENERATOR);
}
