//! Project configuration errors

use std::{io, result};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("could not read project file: {0}")]
    Io(#[from] io::Error),

    #[error("malformed project file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {option} {value:?}")]
    InvalidOption { option: &'static str, value: String },

    #[error("the project has no program named {0}")]
    NoSuchProgram(String),

    #[error("no {0} was specified")]
    Missing(&'static str),
}

impl From<ProjectError> for io::Error {
    fn from(err: ProjectError) -> io::Error {
        match err {
            ProjectError::Io(e) => e,
            ProjectError::Json(e) => e.into(),
            ProjectError::NoSuchProgram(_) => io::Error::new(io::ErrorKind::NotFound, err),
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}

pub type Result<T> = result::Result<T, ProjectError>;
