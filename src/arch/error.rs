//! Error type for architecture-level encoding

use std::result;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArchError {
    /// A numeric instruction field does not fit its bit width.
    ///
    /// Values are never truncated to fit; the offending value and the width of
    /// the field it was meant for are reported instead.
    #[error("value {value} cannot fit into {width} bits")]
    ValueOutOfRange { value: u128, width: u32 },

    /// A `goto` would load its jump distance into the register its condition
    /// reads.
    #[error("reg{register} holds both the goto condition and the jump distance")]
    ClobberedCondition { register: u128 },

    /// Architecture parameters outside of what we can represent.
    #[error("unsupported architecture parameters r={r}, m={m} (need 1 <= r <= 16 and 1 <= m <= 7)")]
    UnsupportedParams { r: u32, m: u32 },

    /// A string that does not name an architecture.
    #[error("{0:?} is not an architecture name, expected jaw-<r>x<m>")]
    InvalidName(String),
}

pub type Result<T> = result::Result<T, ArchError>;
