//! Project configuration file representation

use crate::project::program::Program;
use crate::project::{ProjectError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, io};
use tracing::debug;

/// In-memory representation of the current project configuration.
///
/// This is typically read from a file named `jaw.json`, which lists the
/// programs in the project by name.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Project {
    #[serde(default)]
    programs: BTreeMap<String, Program>,
}

impl Project {
    pub fn read(filename: &str) -> Result<Self> {
        let project_file = fs::File::open(filename)?;

        Self::from_reader(project_file)
    }

    /// Read a project file, or start an empty project if there isn't one.
    pub fn read_or_default(filename: &str) -> Result<Self> {
        match Self::read(filename) {
            Err(ProjectError::Io(ref e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(filename, "no project file, using an empty project");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn from_reader<R>(reader: R) -> Result<Self>
    where
        R: io::Read,
    {
        let mut project: Self = serde_json::from_reader(reader)?;

        for (name, prog) in project.programs.iter_mut() {
            prog.set_name(name);
        }

        Ok(project)
    }

    /// Get the program with the given name within the project.
    pub fn program(&self, name: &str) -> Option<&Program> {
        self.programs.get(name)
    }

    /// Get the project's default program, which is the first by name.
    pub fn default_program(&self) -> Option<(&str, &Program)> {
        self.iter_programs().next()
    }

    pub fn iter_programs(&self) -> impl Iterator<Item = (&str, &Program)> {
        self.programs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Combine command line settings with the named (or default) program.
    pub fn resolve_program(&self, name: Option<&str>, overrides: Program) -> Result<Program> {
        match name {
            Some(name) => {
                let prog = self
                    .program(name)
                    .ok_or_else(|| ProjectError::NoSuchProgram(name.to_string()))?;

                Ok(prog.apply_override(&overrides))
            }
            None => match self.default_program() {
                Some((_, prog)) => Ok(prog.apply_override(&overrides)),
                None => Ok(overrides),
            },
        }
    }
}
