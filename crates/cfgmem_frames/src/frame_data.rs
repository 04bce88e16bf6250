//! Raw word storage for one configuration frame.
//!
//! A frame is a fixed number of 32-bit words. Bits are addressed with the
//! vendor's MSB-first convention: bit 0 is the most significant bit of word
//! 0, bit 31 its least significant bit, bit 32 the MSB of word 1, and so on.
//! The middle word of every frame carries 12 ECC bits in its low bits.

use crate::error::{FrameError, FrameResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mask of the ECC bits inside the middle word.
const ECC_MASK: u32 = 0x0000_0FFF;

/// Words printed per line by the `Display` impl.
const WORDS_PER_LINE: usize = 8;

/// The word contents of one configuration frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameData {
    words: Vec<u32>,
}

impl FrameData {
    /// Creates a zero-filled frame of `size` words.
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size],
        }
    }

    /// Wraps an existing word vector.
    pub fn from_words(words: Vec<u32>) -> Self {
        Self { words }
    }

    /// Builds a frame from big-endian bytes. A trailing partial word is ignored.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let words = bytes
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Self { words }
    }

    /// Number of 32-bit words in the frame.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Number of addressable bits in the frame.
    pub fn bit_count(&self) -> usize {
        self.words.len() * 32
    }

    /// All words, in frame order.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Sets every word to zero.
    pub fn zero(&mut self) {
        self.words.fill(0);
    }

    /// Overwrites the leading words with `words` and leaves the rest as they
    /// were. Words past the end of the frame are dropped.
    pub fn load_prefix(&mut self, words: &[u32]) {
        let n = words.len().min(self.words.len());
        self.words[..n].copy_from_slice(&words[..n]);
    }

    /// Overwrites this frame with `other`'s words.
    pub fn copy_from(&mut self, other: &FrameData) -> FrameResult<()> {
        self.check_size(other)?;
        self.words.copy_from_slice(&other.words);
        Ok(())
    }

    /// `self ^= other`, word by word.
    pub fn xor_with(&mut self, other: &FrameData) -> FrameResult<()> {
        self.combine(other, |a, b| a ^ b)
    }

    /// `self &= other`, word by word.
    pub fn and_with(&mut self, other: &FrameData) -> FrameResult<()> {
        self.combine(other, |a, b| a & b)
    }

    /// `self |= other`, word by word.
    pub fn or_with(&mut self, other: &FrameData) -> FrameResult<()> {
        self.combine(other, |a, b| a | b)
    }

    /// Clears every bit of `self` that is set in `other` (`self &= !other`).
    pub fn mask_with(&mut self, other: &FrameData) -> FrameResult<()> {
        self.combine(other, |a, b| a & !b)
    }

    /// Inverts every word.
    pub fn invert(&mut self) {
        for w in &mut self.words {
            *w = !*w;
        }
    }

    fn check_size(&self, other: &FrameData) -> FrameResult<()> {
        if self.words.len() != other.words.len() {
            return Err(FrameError::SizeMismatch {
                left: self.words.len(),
                right: other.words.len(),
            });
        }
        Ok(())
    }

    fn combine(&mut self, other: &FrameData, op: impl Fn(u32, u32) -> u32) -> FrameResult<()> {
        self.check_size(other)?;
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            *a = op(*a, b);
        }
        Ok(())
    }

    /// Returns the word at `index`.
    pub fn word(&self, index: usize) -> Option<u32> {
        self.words.get(index).copied()
    }

    /// Sets the word at `index`.
    pub fn set_word(&mut self, index: usize, value: u32) -> FrameResult<()> {
        let len = self.words.len();
        let slot = self
            .words
            .get_mut(index)
            .ok_or(FrameError::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Returns bit `index` in MSB-first order: bit `31 - index % 32` of word `index / 32`.
    pub fn bit(&self, index: usize) -> Option<bool> {
        self.word(index / 32)
            .map(|w| (w >> (31 - index % 32)) & 1 == 1)
    }

    /// Returns bit `index % 32` of word `index / 32`, without reflection.
    ///
    /// This is the ordering used when indexing ECC syndromes, and differs from
    /// [`FrameData::bit`] on purpose.
    pub fn bit_reverse_order(&self, index: usize) -> Option<bool> {
        self.word(index / 32).map(|w| (w >> (index % 32)) & 1 == 1)
    }

    /// Sets or clears bit `index` in MSB-first order.
    pub fn set_bit(&mut self, index: usize, value: bool) -> FrameResult<()> {
        let mask = 1u32 << (31 - index % 32);
        let word = self.bit_word_mut(index)?;
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
        Ok(())
    }

    /// Flips bit `index` in MSB-first order.
    pub fn flip_bit(&mut self, index: usize) -> FrameResult<()> {
        let mask = 1u32 << (31 - index % 32);
        *self.bit_word_mut(index)? ^= mask;
        Ok(())
    }

    fn bit_word_mut(&mut self, index: usize) -> FrameResult<&mut u32> {
        let len = self.bit_count();
        self.words
            .get_mut(index / 32)
            .ok_or(FrameError::IndexOutOfRange { index, len })
    }

    /// The 12 ECC bits stored in the low bits of the middle word.
    pub fn ecc_bits(&self) -> u32 {
        self.words
            .get(self.words.len() / 2)
            .map_or(0, |w| w & ECC_MASK)
    }

    /// Number of set bits, excluding the ECC bits of the middle word.
    pub fn population_count(&self) -> u32 {
        let middle = self.words.len() / 2;
        self.words
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                if i == middle {
                    (w & !ECC_MASK).count_ones()
                } else {
                    w.count_ones()
                }
            })
            .sum()
    }

    /// True if every word is zero.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
}

impl fmt::Display for FrameData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return writeln!(f, "Frame is empty");
        }
        for line in self.words.chunks(WORDS_PER_LINE) {
            for w in line {
                write!(f, "{w:08X} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const SIZE: usize = 41;

    fn arb_frame() -> impl Strategy<Value = FrameData> {
        prop::collection::vec(any::<u32>(), SIZE).prop_map(FrameData::from_words)
    }

    fn all_ones() -> FrameData {
        FrameData::from_words(vec![u32::MAX; SIZE])
    }

    proptest! {
        #[test]
        fn xor_with_self_is_zero(x in arb_frame()) {
            let mut d = x.clone();
            d.xor_with(&x).unwrap();
            prop_assert!(d.is_zero());
        }

        #[test]
        fn and_with_all_ones_is_identity(x in arb_frame()) {
            let mut d = x.clone();
            d.and_with(&all_ones()).unwrap();
            prop_assert_eq!(d, x);
        }

        #[test]
        fn or_with_zero_is_identity(x in arb_frame()) {
            let mut d = x.clone();
            d.or_with(&FrameData::new(SIZE)).unwrap();
            prop_assert_eq!(d, x);
        }

        #[test]
        fn double_invert_is_identity(x in arb_frame()) {
            let mut d = x.clone();
            d.invert();
            d.invert();
            prop_assert_eq!(d, x);
        }

        #[test]
        fn mask_with_all_ones_is_zero(x in arb_frame()) {
            let mut d = x;
            d.mask_with(&all_ones()).unwrap();
            prop_assert!(d.is_zero());
        }

        #[test]
        fn msb_first_bit_matches_word(x in arb_frame(), i in 0usize..SIZE * 32) {
            let expected = (x.words()[i / 32] >> (31 - i % 32)) & 1 == 1;
            prop_assert_eq!(x.bit(i), Some(expected));
        }
    }
}
