//! Label tokens, and the places their offsets come from

use crate::asm::{AsmError, Result};
use std::collections::{HashMap, VecDeque};
use std::{fmt, str};

/// Check that `name` is usable as a label name.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A label as written in an operand.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum LabelToken {
    /// `@.name`, which places a label.
    Declaration(String),

    /// `.name`, which stands for the offset of a label placed elsewhere.
    Reference(String),
}

impl str::FromStr for LabelToken {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(name) = s.strip_prefix("@.") {
            if is_valid_name(name) {
                return Ok(LabelToken::Declaration(name.to_string()));
            }
        } else if let Some(name) = s.strip_prefix('.') {
            if is_valid_name(name) {
                return Ok(LabelToken::Reference(name.to_string()));
            }
        }

        Err(())
    }
}

impl fmt::Display for LabelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelToken::Declaration(name) => write!(f, "@.{}", name),
            LabelToken::Reference(name) => write!(f, ".{}", name),
        }
    }
}

/// Supplies offsets for label references, in the order they are written.
///
/// `Ok(None)` means the offset is not known yet; the line can still be sized
/// but not encoded.
pub trait LabelSource {
    fn resolve(&mut self, name: &str) -> Result<Option<u128>>;
}

/// Knows no labels at all. Used for analysis.
pub struct Unresolved;

impl LabelSource for Unresolved {
    fn resolve(&mut self, _name: &str) -> Result<Option<u128>> {
        Ok(None)
    }
}

/// Hands out externally resolved offsets one reference at a time.
pub struct OffsetQueue {
    offsets: VecDeque<u128>,
}

impl OffsetQueue {
    pub fn new<I>(offsets: I) -> Self
    where
        I: IntoIterator<Item = u128>,
    {
        OffsetQueue {
            offsets: offsets.into_iter().collect(),
        }
    }

    /// Number of offsets nobody asked for yet.
    pub fn remaining(&self) -> usize {
        self.offsets.len()
    }
}

impl LabelSource for OffsetQueue {
    fn resolve(&mut self, name: &str) -> Result<Option<u128>> {
        match self.offsets.pop_front() {
            Some(offset) => Ok(Some(offset)),
            None => Err(AsmError::UnresolvedLabelReference(name.to_string())),
        }
    }
}

impl LabelSource for HashMap<String, u128> {
    fn resolve(&mut self, name: &str) -> Result<Option<u128>> {
        Ok(self.get(name).copied())
    }
}
