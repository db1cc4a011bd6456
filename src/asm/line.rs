//! Single-line assembly
//!
//! A line can be handled in two ways. *Analysis* needs no label offsets at
//! all and reports how long the line might be and which labels it declares
//! and uses. *Evaluation* takes the line's own offset and the offsets of
//! every label it references, in order, and produces its bits.

use crate::arch::{
    goto, goto_len, set_register_bound, set_register_from_any, set_register_from_known,
    set_register_len, wrapping_difference, width_mask, Condition, Instruction, Opcode,
};
use crate::asm::label::{LabelSource, LabelToken, OffsetQueue, Unresolved};
use crate::asm::operand::{parse_literal, unescape};
use crate::asm::pattern::{find_pattern, ParamKind, Pattern, Shape};
use crate::asm::{AsmError, Result, Target};
use crate::memory::BitString;
use std::fmt;

/// Bounds on the encoded length of a line, in bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SizeRange {
    pub min: usize,

    /// `None` if the line has no upper bound.
    pub max: Option<usize>,
}

impl SizeRange {
    pub fn exact(len: usize) -> Self {
        SizeRange {
            min: len,
            max: Some(len),
        }
    }

    pub fn up_to(max: usize) -> Self {
        SizeRange {
            min: 0,
            max: Some(max),
        }
    }
}

impl fmt::Display for SizeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{:#x}-{:#x}", self.min, max),
            None => write!(f, "{:#x}-inf", self.min),
        }
    }
}

/// A placeholder after operand resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Arg {
    Int(u128),

    /// A reference to a label whose offset is not known yet.
    Unknown(String),
    Text(String),
    Token(String),
    Declared(String),
}

/// A source line matched against the pattern table, with its operands
/// resolved as far as the label source allowed.
#[derive(Debug)]
pub struct Line<'a> {
    pattern: &'static Pattern,
    text: &'a str,
    tokens: Vec<&'a str>,
    args: Vec<Arg>,
    declared: Vec<String>,
    referenced: Vec<String>,
}

impl<'a> Line<'a> {
    pub fn parse<S>(text: &'a str, labels: &mut S) -> Result<Self>
    where
        S: LabelSource + ?Sized,
    {
        let text = text.trim();
        let (pattern, tokens) =
            find_pattern(text).ok_or_else(|| AsmError::NoMatchingPattern(text.to_string()))?;
        let mut line = Line {
            pattern,
            text,
            tokens: Vec::with_capacity(tokens.len()),
            args: Vec::with_capacity(tokens.len()),
            declared: Vec::new(),
            referenced: Vec::new(),
        };

        for (token, kinds) in tokens.into_iter().zip(pattern.params()) {
            let arg = line.resolve(token, kinds, labels)?;

            line.tokens.push(token);
            line.args.push(arg);
        }

        Ok(line)
    }

    /// Try each kind a placeholder accepts until one fits.
    fn resolve<S>(&mut self, token: &str, kinds: &[ParamKind], labels: &mut S) -> Result<Arg>
    where
        S: LabelSource + ?Sized,
    {
        let trimmed = token.trim();

        for kind in kinds {
            let label = trimmed.parse::<LabelToken>().ok();

            match (kind, label) {
                (ParamKind::Number, _) => {
                    if let Some(value) = parse_literal(trimmed) {
                        return Ok(Arg::Int(value));
                    }
                }
                (ParamKind::Text, _) => return Ok(Arg::Text(token.to_string())),
                (ParamKind::Exact(tok), _) => {
                    if trimmed == tok.as_str() {
                        return Ok(Arg::Token(tok.clone()));
                    }
                }
                (ParamKind::Label, Some(LabelToken::Declaration(name))) => {
                    self.declared.push(name.clone());
                    return Ok(Arg::Declared(name));
                }
                (ParamKind::Label, Some(LabelToken::Reference(name)))
                | (ParamKind::Value, Some(LabelToken::Reference(name))) => {
                    let value = labels.resolve(&name)?;
                    self.referenced.push(name.clone());

                    return Ok(match value {
                        Some(offset) => Arg::Int(offset),
                        None => Arg::Unknown(name),
                    });
                }
                (ParamKind::Value, _) => {
                    if let Some(value) = parse_literal(trimmed) {
                        return Ok(Arg::Int(value));
                    }
                }
                (ParamKind::Label, _) => {}
            }
        }

        Err(self.invalid(token))
    }

    fn invalid(&self, token: &str) -> AsmError {
        AsmError::InvalidOperand {
            token: token.trim().to_string(),
            line: self.text.to_string(),
        }
    }

    pub fn shape(&self) -> Shape {
        self.pattern.shape()
    }

    /// Labels placed by this line.
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    /// Labels used by this line, in the order their offsets are consumed.
    pub fn referenced(&self) -> &[String] {
        &self.referenced
    }

    /// The value of a numeric operand, if it is known.
    fn known(&self, index: usize) -> Option<u128> {
        match self.args.get(index) {
            Some(Arg::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// The value of a numeric operand, which must be known.
    fn int(&self, index: usize) -> Result<u128> {
        match &self.args[index] {
            Arg::Int(value) => Ok(*value),
            Arg::Unknown(name) => Err(AsmError::UnresolvedLabelReference(name.clone())),
            _ => Err(self.invalid(self.tokens[index])),
        }
    }

    fn is_any(&self, index: usize) -> bool {
        matches!(&self.args[index], Arg::Token(tok) if tok == "any")
    }

    fn text_operand(&self, index: usize) -> Result<String> {
        match &self.args[index] {
            Arg::Text(raw) => unescape(raw).ok_or_else(|| self.invalid(raw)),
            _ => Err(self.invalid(self.tokens[index])),
        }
    }

    /// Make sure the label operand of a declaring shape places a label
    /// rather than referencing one.
    fn check_declaration(&self) -> Result<()> {
        let index = match self.shape() {
            Shape::LabelDecl => 0,
            Shape::JumpIfMemDecl => 2,
            Shape::JumpIfRegBitDecl => 3,
            _ => return Ok(()),
        };

        match &self.args[index] {
            Arg::Declared(_) => Ok(()),
            _ => Err(self.invalid(self.tokens[index])),
        }
    }

    /// The condition of a `goto` line, and the operand indices of its target
    /// and of the register that carries the jump distance.
    fn goto_operands(&self) -> Result<(Condition, usize, usize)> {
        let (cond, target_arg, via_arg) = match self.shape() {
            Shape::GotoIfMem => (Condition::MemBit { n: self.int(0)? }, 1, 2),
            _ => (
                Condition::RegBit {
                    n: self.int(0)?,
                    i: self.int(1)?,
                },
                2,
                3,
            ),
        };

        cond.check_via(self.int(via_arg)?)
            .map_err(|_| self.invalid(self.tokens[via_arg]))?;

        Ok((cond, target_arg, via_arg))
    }

    /// The constant a register load would write, if it is known yet.
    fn register_constant(&self, target: Target) -> Option<u128> {
        match self.shape() {
            Shape::SetRegisterDiff => Some(wrapping_difference(
                target.arch,
                self.known(2)?,
                self.known(3)?,
            )),
            _ => self.known(2),
        }
    }

    /// Offset, relative to the start of the line, of the labels it places.
    pub fn declaration_offset(&self, target: Target) -> usize {
        match self.shape() {
            Shape::JumpIfMemDecl => Opcode::MemJump.len(target.arch),
            Shape::JumpIfRegBitDecl => Opcode::RegJump.len(target.arch),
            _ => 0,
        }
    }

    /// How long this line could be, given what is known so far.
    pub fn size_range(&self, target: Target) -> Result<SizeRange> {
        let params = target.arch;
        let char_width = target.env.char_width() as usize;

        self.check_declaration()?;

        Ok(match self.shape() {
            Shape::LabelDecl => SizeRange::exact(0),
            Shape::SetMemBit => SizeRange::exact(Opcode::MemWrite.len(params)),
            Shape::JumpIfMem | Shape::JumpIfMemDecl => {
                SizeRange::exact(Opcode::MemJump.len(params))
            }
            Shape::SetRegBit => SizeRange::exact(Opcode::RegWrite.len(params)),
            Shape::JumpIfRegBit | Shape::JumpIfRegBitDecl => {
                SizeRange::exact(Opcode::RegJump.len(params))
            }
            Shape::GotoIfMem | Shape::GotoIfRegBit => {
                let (cond, target_arg, _) = self.goto_operands()?;
                let len = goto_len(params, cond);

                match self.known(target_arg) {
                    Some(_) => SizeRange::exact(len),
                    None => SizeRange::up_to(len),
                }
            }
            Shape::SetRegister | Shape::SetRegisterDiff => {
                match (self.is_any(1), self.known(1), self.register_constant(target)) {
                    (true, _, Some(_)) => SizeRange::exact(set_register_bound(params)),
                    (false, Some(init), Some(value)) => {
                        SizeRange::exact(set_register_len(params, init, value))
                    }
                    _ => SizeRange::up_to(set_register_bound(params)),
                }
            }
            Shape::Store => {
                SizeRange::exact(self.text_operand(0)?.chars().count() * char_width)
            }
            Shape::Print => {
                let per_bit = 2 * Opcode::MemWrite.len(params);

                SizeRange::exact(self.text_operand(0)?.chars().count() * char_width * per_bit)
            }
        })
    }

    /// Encode this line, assuming it starts at image offset `origin`.
    ///
    /// Every label reference must have been resolved.
    pub fn encode(&self, target: Target, origin: u128) -> Result<Evaluation> {
        let params = target.arch;
        let mut bits = BitString::new();

        self.check_declaration()?;

        match self.shape() {
            Shape::LabelDecl => {}
            Shape::SetMemBit => {
                Instruction::set_mem_bit(params, self.int(0)?, self.int(1)?)?
                    .encode_into(params, &mut bits);
            }
            Shape::JumpIfMem | Shape::JumpIfMemDecl => {
                Instruction::jump_if_mem(params, self.int(0)?, self.int(1)?)?
                    .encode_into(params, &mut bits);
            }
            Shape::SetRegBit => {
                Instruction::set_reg_bit(params, self.int(0)?, self.int(1)?, self.int(2)?)?
                    .encode_into(params, &mut bits);
            }
            Shape::JumpIfRegBit | Shape::JumpIfRegBitDecl => {
                Instruction::jump_if_reg_bit(params, self.int(0)?, self.int(1)?, self.int(2)?)?
                    .encode_into(params, &mut bits);
            }
            Shape::GotoIfMem | Shape::GotoIfRegBit => {
                let (cond, target_arg, via_arg) = self.goto_operands()?;

                bits = goto(params, cond, self.int(via_arg)?, origin, self.int(target_arg)?)?;
            }
            Shape::SetRegister | Shape::SetRegisterDiff => {
                let n = self.int(0)?;
                let value = match self.shape() {
                    Shape::SetRegisterDiff => {
                        wrapping_difference(params, self.int(2)?, self.int(3)?)
                    }
                    _ => self.int(2)?,
                };

                bits = if self.is_any(1) {
                    set_register_from_any(params, n, value)?
                } else {
                    set_register_from_known(params, n, self.int(1)?, value)?
                };
            }
            Shape::Store => {
                let width = target.env.char_width();

                for c in self.text_operand(0)?.chars() {
                    let code = c as u128;
                    if code & !width_mask(width) != 0 {
                        return Err(AsmError::ValueOutOfRange { value: code, width });
                    }

                    bits.push_uint(code, width);
                }
            }
            Shape::Print => {
                let width = target.env.char_width();
                let trigger = Instruction::set_mem_bit(params, 2, 1)?;

                for c in self.text_operand(0)?.chars() {
                    let code = c as u128;
                    if code & !width_mask(width) != 0 {
                        return Err(AsmError::ValueOutOfRange { value: code, width });
                    }

                    for shift in (0..width).rev() {
                        Instruction::set_mem_bit(params, 1, (code >> shift) & 1)?
                            .encode_into(params, &mut bits);
                        trigger.encode_into(params, &mut bits);
                    }
                }
            }
        }

        let at = origin + self.declaration_offset(target) as u128;

        Ok(Evaluation {
            bits,
            declared: self
                .declared
                .iter()
                .map(|name| (name.clone(), at))
                .collect(),
        })
    }
}

/// What analysis mode reports about a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Analysis {
    pub size: SizeRange,
    pub declared: Vec<String>,
    pub referenced: Vec<String>,
}

/// What evaluation mode produces for a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub bits: BitString,

    /// Offsets of the labels the line places.
    pub declared: Vec<(String, u128)>,
}

/// Size up a line without knowing any label offsets.
pub fn analyze_line(target: Target, text: &str) -> Result<Analysis> {
    let line = Line::parse(text, &mut Unresolved)?;

    Ok(Analysis {
        size: line.size_range(target)?,
        declared: line.declared,
        referenced: line.referenced,
    })
}

/// Encode a line at `origin`, given the offsets of the labels it references
/// in the order they appear.
pub fn evaluate_line<I>(target: Target, text: &str, origin: u128, offsets: I) -> Result<Evaluation>
where
    I: IntoIterator<Item = u128>,
{
    let mut queue = OffsetQueue::new(offsets);
    let line = Line::parse(text, &mut queue)?;

    if queue.remaining() > 0 {
        return Err(AsmError::ExcessLabelOffsets {
            count: queue.remaining(),
            line: line.text.to_string(),
        });
    }

    line.encode(target, origin)
}
