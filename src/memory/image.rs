//! Program images, as stored on disk.

use crate::memory::BitString;
use std::io;

/// The address at which the first bit of a program image is loaded.
///
/// The three addresses below it are reserved for memory-mapped I/O.
pub const IMAGE_BASE: u128 = 3;

/// A packed program image.
///
/// Bit `i` of the program lives in byte `i / 8`, most significant bit first,
/// and the last byte is padded with zeroes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramImage {
    data: Vec<u8>,
}

impl ProgramImage {
    pub fn from_bits(bits: &BitString) -> Self {
        ProgramImage {
            data: bits.to_bytes(),
        }
    }

    pub fn read_bytes<F>(file: &mut F) -> io::Result<Self>
    where
        F: io::Read,
    {
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        Ok(ProgramImage { data })
    }

    pub fn write_bytes<F>(&self, file: &mut F) -> io::Result<()>
    where
        F: io::Write,
    {
        file.write_all(&self.data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Unpack the image, including any padding bits.
    pub fn bits(&self) -> BitString {
        BitString::from_bytes(&self.data)
    }

    pub fn image_size(&self) -> usize {
        self.data.len()
    }
}
