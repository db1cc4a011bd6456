//! CLI commands

mod asm;
mod common;
mod dis;
mod line;
mod main;
mod run;

pub use asm::asm;
pub use common::Command;
pub use dis::dis;
pub use line::line;
pub use main::main;
pub use run::run;
