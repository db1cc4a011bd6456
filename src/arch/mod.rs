//! The jaw machine architecture.
//!
//! A jaw machine is parametrized by two integers, `r` and `m`, and is named
//! `jaw-{r}x{m}` after them:
//!
//!  * There are `2^r` registers, so a register index is an `r`-bit field.
//!  * Each register is `2^m` bits wide, so a bit index into a register is an
//!    `m`-bit field.
//!  * Memory holds `2^(2^m)` individually addressable bits, so any register
//!    value is a valid memory address. Addresses wrap around the end of
//!    memory.
//!
//! There are exactly four instructions, selected by a 2-bit opcode. The
//! first bit of the opcode picks the operand domain (memory bit or register
//! bit) and the second bit picks the operation (write or conditional jump):
//!
//! ```text
//! 00 n:r b:1        mem[reg{n}] = {b}
//! 01 n:r k:r        mem[reg{n}] ? pp += reg{k}
//! 10 n:r i:m b:1    reg{n}[{i}] = {b}
//! 11 n:r i:m k:r    reg{n}[{i}] ? pp += reg{k}
//! ```
//!
//! Everything else, such as loading a whole register with a constant, is
//! built out of these four by the composite encoders in this module.

mod compose;
mod error;
mod instr;
mod params;

pub use compose::*;
pub use error::{ArchError, Result};
pub use instr::{BitSource, Instruction, Opcode};
pub use params::{width_mask, ArchParams};
