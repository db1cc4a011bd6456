//! Architecture parameters

use crate::arch::{ArchError, Result};
use std::{fmt, str};

/// Largest supported register index width.
const MAX_R: u32 = 16;

/// Largest supported register width exponent. Registers are held in a `u128`.
const MAX_M: u32 = 7;

/// Produce a mask covering the lowest `width` bits of a `u128`.
pub fn width_mask(width: u32) -> u128 {
    if width >= 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

/// The two numbers that define a jaw machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArchParams {
    r: u32,
    m: u32,
}

impl ArchParams {
    pub fn new(r: u32, m: u32) -> Result<Self> {
        if r < 1 || r > MAX_R || m < 1 || m > MAX_M {
            return Err(ArchError::UnsupportedParams { r, m });
        }

        Ok(ArchParams { r, m })
    }

    /// Width of a register index field.
    pub fn r(self) -> u32 {
        self.r
    }

    /// Width of a register bit index field.
    pub fn m(self) -> u32 {
        self.m
    }

    /// Number of bits in a register, `2^m`.
    pub fn register_width(self) -> u32 {
        1 << self.m
    }

    /// Number of registers, `2^r`.
    pub fn register_count(self) -> usize {
        1 << self.r
    }

    /// Mask selecting the valid bits of an address or register value.
    ///
    /// Memory holds `2^register_width` bits, which for `m = 7` is one more
    /// than `u128::MAX`, so the size itself is never materialized.
    pub fn address_mask(self) -> u128 {
        width_mask(self.register_width())
    }

    /// Reduce an address modulo the size of memory.
    pub fn wrap(self, addr: u128) -> u128 {
        addr & self.address_mask()
    }
}

impl fmt::Display for ArchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "jaw-{}x{}", self.r, self.m)
    }
}

impl str::FromStr for ArchParams {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ArchError::InvalidName(s.to_string());
        let lower = s.to_ascii_lowercase();
        let dims = lower.strip_prefix("jaw-").ok_or_else(invalid)?;
        let mut split = dims.split('x');

        match (split.next(), split.next(), split.next()) {
            (Some(r), Some(m), None) => {
                let r = r.parse().map_err(|_| invalid())?;
                let m = m.parse().map_err(|_| invalid())?;

                ArchParams::new(r, m)
            }
            _ => Err(invalid()),
        }
    }
}

derive_deserialize_from_str!(ArchParams, "valid architecture name");
derive_serialize_from_display!(ArchParams);
