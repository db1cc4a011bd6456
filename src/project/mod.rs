//! Project file structures

mod error;
mod program;
mod repr;

pub use error::{ProjectError, Result};
pub use program::Program;
pub use repr::Project;
