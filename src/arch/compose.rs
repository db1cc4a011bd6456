//! Composite encoders built out of the four base instructions.

use crate::arch::instr::field;
use crate::arch::{ArchError, ArchParams, Instruction, Opcode, Result};
use crate::memory::BitString;

/// Read bit `i` (MSB-first) of a register-wide value.
fn register_bit(params: ArchParams, value: u128, i: u32) -> bool {
    let width = params.register_width();

    (value >> (width - 1 - i)) & 1 == 1
}

/// Set register `n` to `value`, assuming it currently holds `init`.
///
/// Only the bits that differ between `init` and `value` are written, so the
/// result may be empty if the register already holds the value.
pub fn set_register_from_known(
    params: ArchParams,
    n: u128,
    init: u128,
    value: u128,
) -> Result<BitString> {
    let width = params.register_width();
    let init = field(init, width)?;
    let value = field(value, width)?;
    let mut out = BitString::new();

    for i in 0..width {
        let need = register_bit(params, value, i);

        if register_bit(params, init, i) != need {
            Instruction::set_reg_bit(params, n, i as u128, need as u128)?
                .encode_into(params, &mut out);
        }
    }

    Ok(out)
}

/// Set register `n` to `value` without knowing what it holds.
///
/// Always writes every bit of the register.
pub fn set_register_from_any(params: ArchParams, n: u128, value: u128) -> Result<BitString> {
    let width = params.register_width();
    let value = field(value, width)?;
    let mut out = BitString::new();

    for i in 0..width {
        Instruction::set_reg_bit(params, n, i as u128, register_bit(params, value, i) as u128)?
            .encode_into(params, &mut out);
    }

    Ok(out)
}

/// Compute `(a - b) mod 2^register_width`.
pub fn wrapping_difference(params: ArchParams, a: u128, b: u128) -> u128 {
    a.wrapping_sub(b) & params.address_mask()
}

/// Number of bits `set_register_from_known` emits for a given pair of
/// values.
pub fn set_register_len(params: ArchParams, init: u128, value: u128) -> usize {
    let differing = (init ^ value) & params.address_mask();

    differing.count_ones() as usize * Opcode::RegWrite.len(params)
}

/// The largest possible encoding of any whole-register load.
pub fn set_register_bound(params: ArchParams) -> usize {
    params.register_width() as usize * Opcode::RegWrite.len(params)
}

/// The bit a `goto` tests before jumping.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// `mem[reg{n}]`
    MemBit { n: u128 },

    /// `reg{n}[{i}]`
    RegBit { n: u128, i: u128 },
}

impl Condition {
    fn jump(self, params: ArchParams, k: u128) -> Result<Instruction> {
        match self {
            Condition::MemBit { n } => Instruction::jump_if_mem(params, n, k),
            Condition::RegBit { n, i } => Instruction::jump_if_reg_bit(params, n, i, k),
        }
    }

    /// The register the condition reads.
    pub fn register(self) -> u128 {
        match self {
            Condition::MemBit { n } | Condition::RegBit { n, .. } => n,
        }
    }

    /// Make sure register `k` can hold a jump distance without changing
    /// what the condition reads.
    pub fn check_via(self, k: u128) -> Result<()> {
        if self.register() == k {
            return Err(ArchError::ClobberedCondition { register: k });
        }

        Ok(())
    }

    fn opcode(self) -> Opcode {
        match self {
            Condition::MemBit { .. } => Opcode::MemJump,
            Condition::RegBit { .. } => Opcode::RegJump,
        }
    }
}

/// Length of a `goto` with the given condition. It does not depend on the
/// target.
pub fn goto_len(params: ArchParams, cond: Condition) -> usize {
    set_register_bound(params) + cond.opcode().len(params)
}

/// Conditionally jump to the absolute image offset `target`, using register
/// `k` to hold the jump distance.
///
/// `origin` is the offset this sequence will be placed at. The distance is
/// measured from the end of the jump, which is where the program counter
/// sits when the jump executes. Register `k` is clobbered, so it must not be
/// the register the condition reads.
pub fn goto(
    params: ArchParams,
    cond: Condition,
    k: u128,
    origin: u128,
    target: u128,
) -> Result<BitString> {
    cond.check_via(k)?;

    let end = origin.wrapping_add(goto_len(params, cond) as u128);
    let distance = wrapping_difference(params, target, end);
    let jump = cond.jump(params, k)?;
    let mut out = set_register_from_any(params, k, distance)?;

    jump.encode_into(params, &mut out);

    Ok(out)
}
