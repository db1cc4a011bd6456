//! Bit strings, the common currency of every encoder.

use crate::arch::BitSource;
use std::iter::FromIterator;
use std::{fmt, str};

/// An ordered, finite sequence of bits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    pub fn new() -> Self {
        BitString { bits: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Append the lowest `width` bits of `value`, most significant first.
    ///
    /// Callers are responsible for making sure `value` fits; any higher bits
    /// are silently ignored.
    pub fn push_uint(&mut self, value: u128, width: u32) {
        for shift in (0..width).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
    }

    pub fn append(&mut self, other: &BitString) {
        self.bits.extend_from_slice(&other.bits);
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    pub fn reader(&self) -> BitReader<'_> {
        BitReader {
            bits: self,
            pos: 0,
        }
    }

    /// Pack into bytes, most significant bit first, zero-padding the last
    /// byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |byte, (i, bit)| byte | ((*bit as u8) << (7 - i)))
            })
            .collect()
    }

    /// Unpack bytes, most significant bit first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        bytes
            .iter()
            .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
            .collect()
    }
}

impl FromIterator<bool> for BitString {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        BitString {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter() {
            write!(f, "{}", *bit as u8)?;
        }

        Ok(())
    }
}

impl str::FromStr for BitString {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .filter(|c| *c != '_' && !c.is_whitespace())
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(()),
            })
            .collect()
    }
}

/// A cursor over a `BitString`.
pub struct BitReader<'a> {
    bits: &'a BitString,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// How many bits have been consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }

    /// Move forward `count` bits, stopping at the end of the string.
    pub fn skip(&mut self, count: usize) {
        self.pos = self.bits.len().min(self.pos.saturating_add(count));
    }
}

impl<'a> BitSource for BitReader<'a> {
    fn read_bit(&mut self) -> Option<bool> {
        let bit = self.bits.get(self.pos)?;
        self.pos += 1;

        Some(bit)
    }
}
