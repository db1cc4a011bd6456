//! Bit-serial character output

use crate::platform::Environment;
use std::io;

/// Collects output bits and writes out a character every time enough of
/// them have arrived.
///
/// Characters are assembled most significant bit first. Code points that are
/// not valid `char`s (such as lone UTF-16 surrogates) are written as U+FFFD.
pub struct CharOutput<W> {
    sink: W,
    width: u32,
    buffer: u32,
    filled: u32,
}

impl<W> CharOutput<W>
where
    W: io::Write,
{
    pub fn new(env: Environment, sink: W) -> Self {
        CharOutput {
            sink,
            width: env.char_width(),
            buffer: 0,
            filled: 0,
        }
    }

    /// Append one bit, returning the character it completed, if any.
    pub fn forward(&mut self, bit: bool) -> io::Result<Option<char>> {
        self.buffer = (self.buffer << 1) | bit as u32;
        self.filled += 1;

        if self.filled < self.width {
            return Ok(None);
        }

        let ch = std::char::from_u32(self.buffer).unwrap_or(std::char::REPLACEMENT_CHARACTER);
        self.buffer = 0;
        self.filled = 0;

        let mut utf8 = [0; 4];
        self.sink.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;

        Ok(Some(ch))
    }

    /// Number of bits waiting for the rest of their character.
    pub fn pending_bits(&self) -> u32 {
        self.filled
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
