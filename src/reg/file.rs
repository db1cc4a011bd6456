//! A model of register state.

use crate::arch::ArchParams;

/// Represents the registers of a jaw machine.
///
/// There are `2^r` registers of `2^m` bits each. Bits are indexed from the
/// most significant end, so bit 0 is the high bit of the register's numeric
/// value and bit `2^m - 1` is the low bit.
///
/// Register and bit indices come from fixed-width instruction fields and are
/// therefore always in range; an out of range index is a programming error
/// and panics.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    params: ArchParams,
    values: Vec<u128>,
}

impl RegisterFile {
    pub fn new(params: ArchParams) -> Self {
        RegisterFile {
            params,
            values: vec![0; params.register_count()],
        }
    }

    fn shift(&self, i: u32) -> u32 {
        let width = self.params.register_width();
        assert!(i < width, "bit index {} outside of {}-bit register", i, width);

        width - 1 - i
    }

    pub fn read_bit(&self, n: usize, i: u32) -> bool {
        (self.values[n] >> self.shift(i)) & 1 == 1
    }

    pub fn write_bit(&mut self, n: usize, i: u32, value: bool) {
        let mask = 1u128 << self.shift(i);

        if value {
            self.values[n] |= mask;
        } else {
            self.values[n] &= !mask;
        }
    }

    /// The numeric value of register `n`.
    pub fn value(&self, n: usize) -> u128 {
        self.values[n]
    }

    /// Overwrite register `n`, discarding any bits that do not fit.
    pub fn set_value(&mut self, n: usize, value: u128) {
        self.values[n] = value & self.params.address_mask();
    }

    pub fn iter(&self) -> impl Iterator<Item = u128> + '_ {
        self.values.iter().copied()
    }
}
