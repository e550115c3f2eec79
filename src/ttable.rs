//! 256-bit truth tables and their bitwise algebra.
//!
//! A [`Ttable`] represents a boolean function of eight inputs: bit `i` is the
//! function's value on the input assignment `i`. All decisions made by the
//! synthesizer reduce to bitwise operations and (masked) equality on these
//! vectors, so everything here is pure and total.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// Number of input assignments a truth table covers.
pub const TTABLE_BITS: usize = 256;

const WORDS: usize = TTABLE_BITS / 64;

/// A boolean function of eight inputs, one bit per input assignment.
///
/// Bit `i` lives at bit `i % 64` of word `i / 64`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ttable([u64; WORDS]);

impl Ttable {
    /// The constant-false function.
    pub const ZERO: Ttable = Ttable([0; WORDS]);

    /// The constant-true function. Used as the full don't-care-free mask.
    pub const ONES: Ttable = Ttable([u64::MAX; WORDS]);

    /// Builds a table from a predicate over input assignments.
    pub fn from_fn(f: impl Fn(usize) -> bool) -> Ttable {
        let mut words = [0u64; WORDS];
        for i in 0..TTABLE_BITS {
            if f(i) {
                words[i / 64] |= 1 << (i % 64);
            }
        }
        Ttable(words)
    }

    pub fn from_words(words: [u64; WORDS]) -> Ttable {
        Ttable(words)
    }

    pub fn words(&self) -> [u64; WORDS] {
        self.0
    }

    /// The function's value on input assignment `i`.
    pub fn bit(&self, i: usize) -> bool {
        assert!(i < TTABLE_BITS);
        (self.0[i / 64] >> (i % 64)) & 1 != 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; WORDS]
    }

    /// Equality on the assignments selected by `mask`; `mask` zeros are
    /// don't-cares.
    pub fn equals_mask(&self, other: Ttable, mask: Ttable) -> bool {
        ((*self ^ other) & mask).is_zero()
    }
}

impl Not for Ttable {
    type Output = Ttable;

    fn not(self) -> Ttable {
        Ttable(std::array::from_fn(|w| !self.0[w]))
    }
}

impl BitAnd for Ttable {
    type Output = Ttable;

    fn bitand(self, rhs: Ttable) -> Ttable {
        Ttable(std::array::from_fn(|w| self.0[w] & rhs.0[w]))
    }
}

impl BitOr for Ttable {
    type Output = Ttable;

    fn bitor(self, rhs: Ttable) -> Ttable {
        Ttable(std::array::from_fn(|w| self.0[w] | rhs.0[w]))
    }
}

impl BitXor for Ttable {
    type Output = Ttable;

    fn bitxor(self, rhs: Ttable) -> Ttable {
        Ttable(std::array::from_fn(|w| self.0[w] ^ rhs.0[w]))
    }
}

/// Renders the table as a 16x16 bit grid, one row per 16 assignments.
impl fmt::Display for Ttable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..TTABLE_BITS {
            if i != 0 && i % 16 == 0 {
                writeln!(f)?;
            }
            write!(f, "{}", u8::from(self.bit(i)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn random_ttable(rng: &mut ChaCha20Rng) -> Ttable {
        Ttable::from_words([rng.gen(), rng.gen(), rng.gen(), rng.gen()])
    }

    #[test]
    fn test_from_fn_matches_bit() {
        let t = Ttable::from_fn(|i| i % 3 == 0);
        for i in 0..TTABLE_BITS {
            assert_eq!(t.bit(i), i % 3 == 0);
        }
    }

    #[test]
    fn test_bitwise_ops_match_per_bit_reference() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..16 {
            let a = random_ttable(&mut rng);
            let b = random_ttable(&mut rng);
            for i in 0..TTABLE_BITS {
                assert_eq!((a & b).bit(i), a.bit(i) & b.bit(i));
                assert_eq!((a | b).bit(i), a.bit(i) | b.bit(i));
                assert_eq!((a ^ b).bit(i), a.bit(i) ^ b.bit(i));
                assert_eq!((!a).bit(i), !a.bit(i));
            }
        }
    }

    #[test]
    fn test_equals_mask_identity() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        for _ in 0..32 {
            let a = random_ttable(&mut rng);
            let m = random_ttable(&mut rng);
            assert!(a.equals_mask(a, m));
        }
    }

    #[test]
    fn test_equals_mask_ignores_dont_cares() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let a = random_ttable(&mut rng);
        let m = random_ttable(&mut rng);
        // Flip every bit outside the mask; masked equality must still hold.
        let b = a ^ !m;
        assert!(a.equals_mask(b, m));
        // A single flip inside the mask must be seen, unless the mask is empty.
        if !m.is_zero() {
            let i = (0..TTABLE_BITS).find(|&i| m.bit(i)).unwrap();
            let flip = Ttable::from_fn(|j| j == i);
            assert!(!a.equals_mask(b ^ flip, m));
        }
    }

    #[test]
    fn test_full_mask_equality_is_plain_equality() {
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let a = random_ttable(&mut rng);
        let b = random_ttable(&mut rng);
        assert_eq!(a.equals_mask(b, Ttable::ONES), a == b);
        assert!(a.equals_mask(b, Ttable::ZERO));
    }

    #[test]
    fn test_shannon_expansion_law() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..16 {
            let a = random_ttable(&mut rng);
            let s = random_ttable(&mut rng);
            // f = (f & !s) | (f & s)
            assert_eq!(a, (a & !s) | (a & s));
            // AND-mux identity: fb agrees with f where s=0, fc repairs s=1.
            let fb = a & !s;
            let fc = a ^ fb;
            assert_eq!(a, fb ^ (fc & s));
        }
    }

    #[test]
    fn test_display_grid() {
        let t = Ttable::from_fn(|i| i == 0 || i == 255);
        let grid = t.to_string();
        let rows: Vec<&str> = grid.lines().collect();
        assert_eq!(rows.len(), 16);
        assert!(rows[0].starts_with('1'));
        assert!(rows[15].ends_with('1'));
        assert_eq!(grid.matches('1').count(), 2);
    }
}
