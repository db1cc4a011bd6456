//! The register file of a jaw machine.

mod file;

pub use file::RegisterFile;
