//! Single-line assembly queries

use crate::asm::{analyze_line, evaluate_line};
use crate::cli::common::parse_number;
use crate::project::Program;
use clap::ArgMatches;
use std::io;

fn line_text<'a>(argv: &'a ArgMatches) -> io::Result<&'a str> {
    argv.value_of("text")
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no line given"))
}

/// Report the size range and labels of a line.
fn analyze(prog: &Program, argv: &ArgMatches) -> io::Result<()> {
    let analysis = analyze_line(prog.target()?, line_text(argv)?)?;

    println!("{}", analysis.size);
    println!("declared: {}", analysis.declared.join(" "));
    println!("referenced: {}", analysis.referenced.join(" "));

    Ok(())
}

/// Encode a line, given the offsets of its label references.
fn eval(prog: &Program, argv: &ArgMatches) -> io::Result<()> {
    let origin = match argv.value_of("origin") {
        Some(origin) => parse_number(origin, "origin")?,
        None => 0,
    };

    let offsets = argv
        .values_of("offsets")
        .into_iter()
        .flatten()
        .map(|offset| parse_number(offset, "label offset"))
        .collect::<io::Result<Vec<_>>>()?;

    let evaluation = evaluate_line(prog.target()?, line_text(argv)?, origin, offsets)?;

    println!("0xb{}", evaluation.bits);
    for (name, offset) in evaluation.declared.iter() {
        println!("{} {:#x}", name, offset);
    }

    Ok(())
}

pub fn line(prog: &Program, argv: &ArgMatches) -> io::Result<()> {
    match argv.subcommand() {
        ("analyze", Some(submatches)) => analyze(prog, submatches),
        ("eval", Some(submatches)) => eval(prog, submatches),
        (other, _) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unknown line mode {:?}", other),
        )),
    }
}
