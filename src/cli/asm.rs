//! Building program images

use crate::asm::assemble;
use crate::project::Program;
use clap::ArgMatches;
use std::{fs, io};
use tracing::info;

/// Assemble the program's source file and write out its image.
pub fn asm(prog: &Program, argv: &ArgMatches) -> io::Result<()> {
    let target = prog.target()?;
    let source_path = prog.source_path()?;
    let image_path = prog.image_path()?;

    let source = fs::read_to_string(source_path)?;
    let assembly = assemble(target, &source)?;

    assembly
        .image()
        .write_bytes(&mut fs::File::create(image_path)?)?;

    info!(
        source = source_path,
        image = image_path,
        bits = assembly.bits.len(),
        "wrote program image"
    );

    if argv.is_present("listing") {
        for entry in assembly.listing.iter() {
            println!(
                "{:>5} {:>8x} {:>5}  {}",
                entry.line, entry.offset, entry.len, entry.text
            );
        }
    }

    if let Some(symbols_path) = argv.value_of("symbols") {
        let file = fs::File::create(symbols_path)?;

        serde_json::to_writer_pretty(file, &assembly.labels)?;
        info!(path = symbols_path, "wrote label table");
    }

    Ok(())
}
