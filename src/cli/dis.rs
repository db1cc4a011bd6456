//! Disassembly listings

use crate::arch::Instruction;
use crate::cli::common::{load_program, parse_number};
use crate::project::Program;
use clap::ArgMatches;
use std::convert::TryFrom;
use std::io;

/// List the instructions of a program, starting from an image offset.
///
/// Decoding is linear: jump targets are not followed, and data placed in the
/// image by `#store` is listed as whatever instructions it happens to encode.
pub fn dis(prog: &Program, argv: &ArgMatches) -> io::Result<()> {
    let target = prog.target()?;
    let program = load_program(prog, target)?;

    let start = match argv.value_of("start") {
        Some(start) => parse_number(start, "start offset")?,
        None => 0,
    };
    let count = match argv.value_of("count") {
        Some(count) => Some(parse_number(count, "instruction count")?),
        None => None,
    };

    let mut reader = program.reader();
    reader.skip(usize::try_from(start).unwrap_or(usize::MAX));

    let mut listed = 0;
    while count.map_or(true, |count| listed < count) {
        let offset = reader.position();

        match Instruction::decode(target.arch, &mut reader) {
            Some(instr) => println!("{:>8x}  {}", offset, instr),
            None => {
                if reader.position() > offset {
                    println!("{:>8x}  ; {} trailing bits", offset, reader.position() - offset);
                }
                break;
            }
        }

        listed += 1;
    }

    Ok(())
}
