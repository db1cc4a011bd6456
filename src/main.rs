#[macro_use]
extern crate clap;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_plain;

mod arch;
mod asm;
mod cli;
mod memory;
mod platform;
mod project;
mod reg;
mod vm;

fn main() -> std::io::Result<()> {
    cli::main()
}
