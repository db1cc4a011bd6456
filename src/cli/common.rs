//! Common utilities for command implementations

use crate::asm::{assemble, parse_literal, Target};
use crate::memory::{BitString, ProgramImage};
use crate::project::Program;
use clap::{App, AppSettings, Arg, SubCommand};
use std::str::FromStr;
use std::{fs, io};
use tracing::debug;

/// Enumeration of all CLI commands
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Assemble,
    Run,
    Line,
    Disassemble,
}

impl Command {
    /// Enumerate all commands that jawasm recognizes.
    pub fn enumerate() -> Vec<Self> {
        use Command::*;

        vec![Assemble, Run, Line, Disassemble]
    }

    /// Construct the subcommand object for this particular `Command`.
    pub fn into_clap_subcommand<'a, 'b>(self) -> App<'a, 'b> {
        match self {
            Command::Assemble => SubCommand::with_name("asm")
                .about("Assemble a source file into a program image")
                .arg(
                    Arg::with_name("listing")
                        .long("listing")
                        .help("Print the offset and length of every line"),
                )
                .arg(
                    Arg::with_name("symbols")
                        .long("symbols")
                        .value_name("labels.json")
                        .takes_value(true)
                        .help("Write the label table to a JSON file"),
                ),
            Command::Run => SubCommand::with_name("run")
                .about("Run a program until it halts, printing its output"),
            Command::Line => SubCommand::with_name("line")
                .about("Analyze or encode a single line of assembly")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("analyze")
                        .about("Report the size range and labels of a line")
                        .arg(
                            Arg::with_name("text")
                                .value_name("LINE")
                                .index(1)
                                .required(true)
                                .help("The line of assembly"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("eval")
                        .about("Encode a line, given the offsets of the labels it uses")
                        .arg(
                            Arg::with_name("text")
                                .value_name("LINE")
                                .index(1)
                                .required(true)
                                .help("The line of assembly"),
                        )
                        .arg(
                            Arg::with_name("offsets")
                                .value_name("OFFSET")
                                .index(2)
                                .multiple(true)
                                .help("Offsets of the referenced labels, in order"),
                        )
                        .arg(
                            Arg::with_name("origin")
                                .long("origin")
                                .value_name("OFFSET")
                                .takes_value(true)
                                .help("Image offset the line starts at"),
                        ),
                ),
            Command::Disassemble => SubCommand::with_name("dis")
                .about("List the instructions in a program")
                .arg(
                    Arg::with_name("start")
                        .value_name("OFFSET")
                        .index(1)
                        .help("Image offset to start listing from"),
                )
                .arg(
                    Arg::with_name("count")
                        .long("count")
                        .value_name("N")
                        .takes_value(true)
                        .help("Stop after this many instructions"),
                ),
        }
    }
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "asm" => Ok(Command::Assemble),
            "assemble" => Ok(Command::Assemble),
            "run" => Ok(Command::Run),
            "line" => Ok(Command::Line),
            "dis" => Ok(Command::Disassemble),
            "disassemble" => Ok(Command::Disassemble),
            _ => Err(()),
        }
    }
}

/// Parse a numeric command line argument.
pub fn parse_number(text: &str, what: &str) -> io::Result<u128> {
    parse_literal(text).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} {:?} is not a valid number", what, text),
        )
    })
}

/// Get the bits of a program, from its image if it has one and by
/// assembling its source otherwise.
pub fn load_program(prog: &Program, target: Target) -> io::Result<BitString> {
    if let Some(path) = prog.image() {
        debug!(path, "reading program image");

        let image = ProgramImage::read_bytes(&mut fs::File::open(path)?)?;

        return Ok(image.bits());
    }

    let path = prog.source_path()?;
    debug!(path, "assembling program source");

    let source = fs::read_to_string(path)?;

    Ok(assemble(target, &source)?.bits)
}
