//! The jaw interpreter
//!
//! A machine starts with every memory bit and register cleared and the
//! program counter at `IMAGE_BASE`. Instructions are read straight out of
//! memory one bit at a time, so programs are free to rewrite themselves.
//! Jump distances are added to the program counter after the whole jump has
//! been read, and wrap around the end of memory.

mod machine;

pub use machine::{Machine, Outcome};
