//! Bitset - fixed-length bit vectors over packed bytes
//!
//! Design: bit `i` lives in byte `i / 8` under mask `1 << (i % 8)`, the same
//! packing the serialized FIRST sets in grammar tables use. Storage is always
//! a whole number of bytes.
//!
//! `cmp` and `merge` take the bit count from the caller and only look at that
//! many bytes; keeping operand lengths consistent is the caller's job.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes needed to hold `nbits` bits
#[inline]
pub const fn nbytes(nbits: usize) -> usize {
    (nbits + 7) / 8
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<u8>", into = "Vec<u8>")]
pub struct Bitset {
    bits: BitVec<u8, Lsb0>,
}

impl Bitset {
    /// All-zero set with room for `nbits` bits (rounded up to whole bytes)
    pub fn new(nbits: usize) -> Self {
        Self {
            bits: BitVec::from_vec(vec![0u8; nbytes(nbits)]),
        }
    }

    /// Adopt packed bytes, e.g. a precomputed FIRST set
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bits: BitVec::from_slice(bytes),
        }
    }

    /// Set `bit`, returning whether it was previously clear
    ///
    /// # Panics
    /// If `bit` lies beyond the allocated bytes.
    #[inline]
    pub fn add(&mut self, bit: usize) -> bool {
        !self.bits.replace(bit, true)
    }

    /// Whether `bit` is set; bits beyond the storage read as clear
    #[inline]
    pub fn test(&self, bit: usize) -> bool {
        self.bits.get(bit).map_or(false, |b| *b)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.bits.as_raw_mut_slice()
    }

    /// Capacity in bits (a multiple of 8)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Indices of set bits in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// OR `other` into `self` over `nbits` bits
    pub fn merge_from(&mut self, other: &Bitset, nbits: usize) {
        merge(self, other, nbits);
    }
}

/// Whether `a` and `b` agree on every byte covering `nbits` bits
pub fn cmp(a: &Bitset, b: &Bitset, nbits: usize) -> bool {
    let n = nbytes(nbits);
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .take(n)
        .all(|(x, y)| x == y)
}

/// In-place byte-wise OR of `src` into `dst` over `nbits` bits
pub fn merge(dst: &mut Bitset, src: &Bitset, nbits: usize) {
    let n = nbytes(nbits);
    for (d, s) in dst.as_bytes_mut().iter_mut().zip(src.as_bytes()).take(n) {
        *d |= *s;
    }
}

impl From<Vec<u8>> for Bitset {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bits: BitVec::from_vec(bytes),
        }
    }
}

impl From<Bitset> for Vec<u8> {
    fn from(set: Bitset) -> Self {
        set.bits.into_vec()
    }
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rounds_up_to_bytes() {
        assert_eq!(Bitset::new(0).as_bytes().len(), 0);
        assert_eq!(Bitset::new(1).as_bytes().len(), 1);
        assert_eq!(Bitset::new(8).as_bytes().len(), 1);
        assert_eq!(Bitset::new(19).as_bytes(), &[0, 0, 0]);
    }

    #[test]
    fn test_add_reports_new_bits() {
        let mut set = Bitset::new(19);
        assert!(set.add(3));
        assert!(!set.add(3));
        assert!(set.add(18));
        assert!(set.test(3));
        assert!(!set.test(4));
        assert!(!set.test(1000));
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn test_byte_layout() {
        let mut set = Bitset::new(19);
        set.add(0);
        set.add(9);
        set.add(18);
        assert_eq!(set.as_bytes(), &[0b0000_0001, 0b0000_0010, 0b0000_0100]);
        assert_eq!(Bitset::from_bytes(set.as_bytes()), set);
    }

    #[test]
    fn test_cmp_and_merge() {
        let a = Bitset::from_bytes(&[0x01, 0x10]);
        let b = Bitset::from_bytes(&[0x02, 0x10]);
        assert!(!cmp(&a, &b, 16));
        assert!(cmp(&a, &b, 0));

        let mut c = a.clone();
        merge(&mut c, &b, 16);
        assert_eq!(c.as_bytes(), &[0x03, 0x10]);
        assert_eq!(c.iter().collect::<Vec<_>>(), vec![0, 1, 12]);
    }

    #[test]
    fn test_merge_respects_nbits() {
        let mut dst = Bitset::new(16);
        let src = Bitset::from_bytes(&[0xff, 0xff]);
        merge(&mut dst, &src, 8);
        assert_eq!(dst.as_bytes(), &[0xff, 0x00]);
    }

    #[test]
    fn test_serde_as_bytes() {
        let set = Bitset::from_bytes(&[0o070, 0, 0]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[56,0,0]");
        let back: Bitset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
