//! Execution environments a jaw machine can run under.
//!
//! The architecture only says that writing to address 2 forwards the bit at
//! address 1 to an output buffer. How many buffered bits make a character is
//! up to the environment the program was written for.

mod output;

pub use output::CharOutput;

use std::{fmt, str};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    /// 8-bit characters.
    Ascii,

    /// 16-bit characters (UCS-2 code points).
    Unicode,
}

impl Environment {
    pub fn iter() -> impl IntoIterator<Item = Self> {
        vec![Self::Ascii, Self::Unicode]
    }

    /// Number of output bits that make up one character.
    pub fn char_width(self) -> u32 {
        match self {
            Self::Ascii => 8,
            Self::Unicode => 16,
        }
    }

    pub fn friendly_name(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Unicode => "unicode",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Ascii
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.friendly_name())
    }
}

impl str::FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "ascii" => Ok(Environment::Ascii),
            "unicode" => Ok(Environment::Unicode),
            "ucs2" => Ok(Environment::Unicode),
            _ => Err(()),
        }
    }
}

derive_deserialize_from_str!(Environment, "valid environment name");
derive_serialize_from_display!(Environment);
