//! Bit-level storage: encoded bit strings, machine memory, and program
//! images.

mod bits;
mod image;
mod store;

pub use bits::BitString;
pub use image::{ProgramImage, IMAGE_BASE};
pub use store::Memory;

/// Writing 1 here halts the machine.
pub const HALT_ADDR: u128 = 0;

/// The bit that gets sent to the output buffer when output is triggered.
pub const OUTPUT_BIT_ADDR: u128 = 1;

/// Writing 1 here forwards the output bit to the output buffer.
pub const OUTPUT_TRIGGER_ADDR: u128 = 2;
