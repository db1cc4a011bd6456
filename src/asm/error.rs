//! Error type for assembly

use crate::arch::ArchError;
use std::{io, result};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// A numeric field does not fit its declared bit width.
    #[error("value {value} cannot fit into {width} bits")]
    ValueOutOfRange { value: u128, width: u32 },

    /// A placeholder's text matched none of the kinds it accepts.
    #[error("invalid operand {token:?} in {line:?}")]
    InvalidOperand { token: String, line: String },

    /// The line does not match any instruction template.
    #[error("no instruction matches {0:?}")]
    NoMatchingPattern(String),

    /// A label reference was encountered after every resolved offset was
    /// used up.
    #[error("no resolved offset was supplied for label .{0}")]
    UnresolvedLabelReference(String),

    /// Resolved offsets were left over after evaluating a line.
    #[error("{count} resolved label offset(s) left unused by {line:?}")]
    ExcessLabelOffsets { count: usize, line: String },

    #[error("label .{0} is declared more than once")]
    DuplicateLabel(String),

    #[error("label .{0} is never declared")]
    UndefinedLabel(String),

    /// Label offsets kept changing as the program layout was refined.
    #[error("label layout did not settle after {0} passes")]
    UnresolvedLayout(usize),

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        source: Box<AsmError>,
    },

    #[error(transparent)]
    Arch(ArchError),
}

impl AsmError {
    /// Attach a source line number to this error.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            AsmError::Line { .. } => self,
            other => AsmError::Line {
                line,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, without any line number attached.
    pub fn root(&self) -> &AsmError {
        match self {
            AsmError::Line { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<ArchError> for AsmError {
    fn from(err: ArchError) -> Self {
        match err {
            ArchError::ValueOutOfRange { value, width } => {
                AsmError::ValueOutOfRange { value, width }
            }
            other => AsmError::Arch(other),
        }
    }
}

impl From<AsmError> for io::Error {
    fn from(err: AsmError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, format!("{}", err))
    }
}

pub type Result<T> = result::Result<T, AsmError>;
