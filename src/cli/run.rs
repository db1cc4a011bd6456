//! Running programs

use crate::cli::common::load_program;
use crate::project::Program;
use crate::vm::{Machine, Outcome};
use clap::ArgMatches;
use std::io;
use tracing::info;

/// Load a program into a fresh machine and run it, printing its output to
/// stdout.
pub fn run(prog: &Program, _argv: &ArgMatches) -> io::Result<()> {
    let target = prog.target()?;
    let program = load_program(prog, target)?;

    let stdout = io::stdout();
    let mut machine = Machine::new(target.arch, target.env, stdout.lock());

    machine.load(&program);

    match machine.run(prog.max_steps())? {
        Outcome::Halted => {
            info!(steps = machine.steps(), "machine halted");
            Ok(())
        }
        Outcome::Exhausted => Err(io::Error::new(
            io::ErrorKind::Other,
            format!(
                "machine did not halt within {} steps (pc = {:#x})",
                machine.steps(),
                machine.pc()
            ),
        )),
    }
}
