//! The fetch-decode-execute loop

use crate::arch::{ArchParams, BitSource, Instruction};
use crate::memory::{BitString, Memory, HALT_ADDR, IMAGE_BASE, OUTPUT_BIT_ADDR, OUTPUT_TRIGGER_ADDR};
use crate::platform::{CharOutput, Environment};
use crate::reg::RegisterFile;
use std::io;
use tracing::{debug, trace};

/// Why `Machine::run` returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The program wrote a 1 to the halt address.
    Halted,

    /// The step budget ran out first.
    Exhausted,
}

/// Reads instruction bits from memory, moving the program counter along one
/// bit at a time.
struct Fetch<'a> {
    params: ArchParams,
    memory: &'a Memory,
    pc: &'a mut u128,
}

impl<'a> BitSource for Fetch<'a> {
    fn read_bit(&mut self) -> Option<bool> {
        let bit = self.memory.read_bit(*self.pc);
        *self.pc = self.params.wrap(self.pc.wrapping_add(1));

        Some(bit)
    }
}

/// A complete jaw machine.
pub struct Machine<W> {
    params: ArchParams,
    memory: Memory,
    registers: RegisterFile,
    pc: u128,
    output: CharOutput<W>,
    halted: bool,
    steps: u64,
}

impl<W> Machine<W>
where
    W: io::Write,
{
    /// Create a machine with cleared memory and registers, writing its output
    /// characters to `sink`.
    pub fn new(params: ArchParams, env: Environment, sink: W) -> Self {
        Machine {
            params,
            memory: Memory::new(params),
            registers: RegisterFile::new(params),
            pc: IMAGE_BASE,
            output: CharOutput::new(env, sink),
            halted: false,
            steps: 0,
        }
    }

    /// Copy a program into memory at the image base.
    pub fn load(&mut self, program: &BitString) {
        self.memory.load(program, IMAGE_BASE);
    }

    pub fn params(&self) -> ArchParams {
        self.params
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    /// Address of the next instruction bit.
    pub fn pc(&self) -> u128 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u128) {
        self.pc = self.params.wrap(pc);
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn output(&self) -> &CharOutput<W> {
        &self.output
    }

    pub fn into_output(self) -> CharOutput<W> {
        self.output
    }

    /// Advance the program counter by the value of register `k`.
    fn jump(&mut self, k: usize) {
        self.pc = self
            .params
            .wrap(self.pc.wrapping_add(self.registers.value(k)));
    }

    /// Execute a single instruction, returning it.
    ///
    /// Stepping a halted machine executes the next instruction anyway; it is
    /// up to the caller to stop.
    pub fn step(&mut self) -> io::Result<Instruction> {
        let at = self.pc;
        let instr = {
            let mut fetch = Fetch {
                params: self.params,
                memory: &self.memory,
                pc: &mut self.pc,
            };

            Instruction::decode(self.params, &mut fetch)
                .expect("machine memory never runs out of bits")
        };

        trace!(pc = at, %instr, "step");
        self.steps += 1;

        match instr {
            Instruction::SetMemBit { n, b } => {
                let addr = self.registers.value(n);
                self.memory.write_bit(addr, b);

                if b && addr == HALT_ADDR {
                    debug!(steps = self.steps, "machine halted");
                    self.halted = true;
                } else if b && addr == OUTPUT_TRIGGER_ADDR {
                    let bit = self.memory.read_bit(OUTPUT_BIT_ADDR);

                    if let Some(c) = self.output.forward(bit)? {
                        trace!(?c, "output");
                    }
                }
            }
            Instruction::JumpIfMem { n, k } => {
                if self.memory.read_bit(self.registers.value(n)) {
                    self.jump(k);
                }
            }
            Instruction::SetRegBit { n, i, b } => self.registers.write_bit(n, i, b),
            Instruction::JumpIfRegBit { n, i, k } => {
                if self.registers.read_bit(n, i) {
                    self.jump(k);
                }
            }
        }

        Ok(instr)
    }

    /// Run until the program halts, or until `max_steps` more instructions
    /// have executed.
    pub fn run(&mut self, max_steps: Option<u64>) -> io::Result<Outcome> {
        let mut budget = max_steps;

        while !self.halted {
            match budget.as_mut() {
                Some(0) => {
                    debug!(steps = self.steps, "step budget exhausted");
                    self.output.flush()?;
                    return Ok(Outcome::Exhausted);
                }
                Some(left) => *left -= 1,
                None => {}
            }

            self.step()?;
        }

        self.output.flush()?;

        Ok(Outcome::Halted)
    }
}
