//! Instruction enumeration

use crate::arch::{width_mask, ArchError, ArchParams, Result};
use crate::memory::BitString;
use std::fmt;

/// Anything instructions can be fetched from, one bit at a time.
///
/// Sources that run dry yield `None`; machine memory never does.
pub trait BitSource {
    fn read_bit(&mut self) -> Option<bool>;

    /// Read a `width`-bit unsigned field, most significant bit first.
    fn read_uint(&mut self, width: u32) -> Option<u128> {
        let mut value = 0u128;

        for _ in 0..width {
            value = (value << 1) | self.read_bit()? as u128;
        }

        Some(value)
    }
}

/// The 2-bit tag at the start of every instruction.
///
/// The high bit selects the operand domain (set for register bits), the low
/// bit selects the operation (set for conditional jumps).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Opcode {
    MemWrite = 0b00,
    MemJump = 0b01,
    RegWrite = 0b10,
    RegJump = 0b11,
}

impl Opcode {
    pub fn from_flags(register_domain: bool, jump: bool) -> Self {
        match (register_domain, jump) {
            (false, false) => Opcode::MemWrite,
            (false, true) => Opcode::MemJump,
            (true, false) => Opcode::RegWrite,
            (true, true) => Opcode::RegJump,
        }
    }

    /// Encoded length in bits of an instruction with this opcode.
    pub fn len(self, params: ArchParams) -> usize {
        let (r, m) = (params.r() as usize, params.m() as usize);

        match self {
            Opcode::MemWrite => 2 + r + 1,
            Opcode::MemJump => 2 + 2 * r,
            Opcode::RegWrite => 2 + r + m + 1,
            Opcode::RegJump => 2 + 2 * r + m,
        }
    }
}

/// Check that `value` fits into a field `width` bits wide.
pub(crate) fn field(value: u128, width: u32) -> Result<u128> {
    if value & !width_mask(width) != 0 {
        return Err(ArchError::ValueOutOfRange { value, width });
    }

    Ok(value)
}

/// A decoded jaw instruction.
///
/// Instructions can only be constructed through the checked constructors,
/// so every field is known to fit the architecture it was built for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `mem[reg{n}] = {b}`
    SetMemBit { n: usize, b: bool },

    /// `mem[reg{n}] ? pp += reg{k}`
    JumpIfMem { n: usize, k: usize },

    /// `reg{n}[{i}] = {b}`
    SetRegBit { n: usize, i: u32, b: bool },

    /// `reg{n}[{i}] ? pp += reg{k}`
    JumpIfRegBit { n: usize, i: u32, k: usize },
}

impl Instruction {
    pub fn set_mem_bit(params: ArchParams, n: u128, b: u128) -> Result<Self> {
        Ok(Instruction::SetMemBit {
            n: field(n, params.r())? as usize,
            b: field(b, 1)? == 1,
        })
    }

    pub fn jump_if_mem(params: ArchParams, n: u128, k: u128) -> Result<Self> {
        Ok(Instruction::JumpIfMem {
            n: field(n, params.r())? as usize,
            k: field(k, params.r())? as usize,
        })
    }

    pub fn set_reg_bit(params: ArchParams, n: u128, i: u128, b: u128) -> Result<Self> {
        Ok(Instruction::SetRegBit {
            n: field(n, params.r())? as usize,
            i: field(i, params.m())? as u32,
            b: field(b, 1)? == 1,
        })
    }

    pub fn jump_if_reg_bit(params: ArchParams, n: u128, i: u128, k: u128) -> Result<Self> {
        Ok(Instruction::JumpIfRegBit {
            n: field(n, params.r())? as usize,
            i: field(i, params.m())? as u32,
            k: field(k, params.r())? as usize,
        })
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::SetMemBit { .. } => Opcode::MemWrite,
            Instruction::JumpIfMem { .. } => Opcode::MemJump,
            Instruction::SetRegBit { .. } => Opcode::RegWrite,
            Instruction::JumpIfRegBit { .. } => Opcode::RegJump,
        }
    }

    pub fn len(&self, params: ArchParams) -> usize {
        self.opcode().len(params)
    }

    /// Append the encoding of this instruction to `out`.
    pub fn encode_into(&self, params: ArchParams, out: &mut BitString) {
        let (r, m) = (params.r(), params.m());

        out.push_uint(self.opcode() as u128, 2);

        match *self {
            Instruction::SetMemBit { n, b } => {
                out.push_uint(n as u128, r);
                out.push(b);
            }
            Instruction::JumpIfMem { n, k } => {
                out.push_uint(n as u128, r);
                out.push_uint(k as u128, r);
            }
            Instruction::SetRegBit { n, i, b } => {
                out.push_uint(n as u128, r);
                out.push_uint(i as u128, m);
                out.push(b);
            }
            Instruction::JumpIfRegBit { n, i, k } => {
                out.push_uint(n as u128, r);
                out.push_uint(i as u128, m);
                out.push_uint(k as u128, r);
            }
        }
    }

    pub fn encode(&self, params: ArchParams) -> BitString {
        let mut out = BitString::new();
        self.encode_into(params, &mut out);
        out
    }

    /// Decode the next instruction from `src`.
    ///
    /// Every bit pattern is a valid instruction, so this only fails if the
    /// source runs out of bits partway through.
    pub fn decode<B>(params: ArchParams, src: &mut B) -> Option<Self>
    where
        B: BitSource + ?Sized,
    {
        let register_domain = src.read_bit()?;
        let jump = src.read_bit()?;
        let n = src.read_uint(params.r())? as usize;

        Some(match Opcode::from_flags(register_domain, jump) {
            Opcode::MemWrite => Instruction::SetMemBit {
                n,
                b: src.read_bit()?,
            },
            Opcode::MemJump => Instruction::JumpIfMem {
                n,
                k: src.read_uint(params.r())? as usize,
            },
            Opcode::RegWrite => Instruction::SetRegBit {
                n,
                i: src.read_uint(params.m())? as u32,
                b: src.read_bit()?,
            },
            Opcode::RegJump => Instruction::JumpIfRegBit {
                n,
                i: src.read_uint(params.m())? as u32,
                k: src.read_uint(params.r())? as usize,
            },
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::SetMemBit { n, b } => write!(f, "mem[reg{}] = {}", n, *b as u8),
            Instruction::JumpIfMem { n, k } => write!(f, "mem[reg{}] ? pp += reg{}", n, k),
            Instruction::SetRegBit { n, i, b } => write!(f, "reg{}[{}] = {}", n, i, *b as u8),
            Instruction::JumpIfRegBit { n, i, k } => {
                write!(f, "reg{}[{}] ? pp += reg{}", n, i, k)
            }
        }
    }
}
