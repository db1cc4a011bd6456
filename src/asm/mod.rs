//! The jaw assembler
//!
//! Source is line oriented: every non-blank line matches one template from
//! the pattern table and encodes to zero or more bits. The four base
//! instructions are written the way `Instruction` displays them. On top of
//! those there are register loads (`reg1: any = const 0x41`), conditional
//! `goto`s, labels, and text directives.
//!
//! Labels are written `@.name` where they are placed and `.name` where they
//! are used. A label's value is the image offset of the bit it marks; add
//! `IMAGE_BASE` to get a memory address.

mod error;
mod label;
mod line;
mod operand;
mod pattern;
mod program;

pub use error::{AsmError, Result};
pub use line::{analyze_line, evaluate_line};
pub use operand::parse_literal;
pub use program::assemble;

use crate::arch::ArchParams;
use crate::platform::Environment;

/// Everything about the machine a program is assembled for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub arch: ArchParams,
    pub env: Environment,
}

impl Target {
    pub fn new(arch: ArchParams, env: Environment) -> Self {
        Target { arch, env }
    }
}

#[cfg(test)]
mod tests;
