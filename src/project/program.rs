//! Program configuration

use crate::arch::ArchParams;
use crate::asm::Target;
use crate::platform::Environment;
use crate::project::{ProjectError, Result};
use clap::{App, Arg, ArgMatches, ArgSettings};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Everything needed to build or run one jaw program.
///
/// Every field is optional so that a program from the project file can be
/// overridden piecemeal from the command line.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    #[serde(default)]
    arch: Option<ArchParams>,

    #[serde(default)]
    env: Option<Environment>,

    /// Assembly source file.
    #[serde(default)]
    source: Option<String>,

    /// Packed program image file.
    #[serde(default)]
    image: Option<String>,

    /// Step budget for `run`. Unlimited if absent.
    #[serde(default)]
    max_steps: Option<u64>,

    #[serde(skip)]
    name: Option<String>,
}

fn parse_option<T>(args: &ArgMatches, option: &'static str) -> Result<Option<T>>
where
    T: FromStr,
{
    match args.value_of(option) {
        Some(value) => T::from_str(value)
            .map(Some)
            .map_err(|_| ProjectError::InvalidOption {
                option,
                value: value.to_string(),
            }),
        None => Ok(None),
    }
}

impl Program {
    pub fn configure_app<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
        app.arg(
            Arg::with_name("arch")
                .long("arch")
                .value_name("jaw-3x4")
                .help("The machine to target, as jaw-<r>x<m>.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("env")
                .long("env")
                .value_name("ENV")
                .help("How output bits become characters (ascii or unicode).")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("source")
                .long("source")
                .value_name("program.jaw")
                .help("The assembly source file.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("image")
                .long("image")
                .value_name("program.bin")
                .help("The program image file.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("max_steps")
                .long("max-steps")
                .value_name("N")
                .help("Stop running after this many instructions.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
    }

    /// Construct a Program from clap ArgMatches
    pub fn from_arg_matches(args: &ArgMatches) -> Result<Program> {
        Ok(Program {
            arch: parse_option(args, "arch")?,
            env: parse_option(args, "env")?,
            source: args.value_of("source").map(|s| s.to_string()),
            image: args.value_of("image").map(|s| s.to_string()),
            max_steps: parse_option(args, "max_steps")?,
            name: None,
        })
    }

    pub fn arch(&self) -> Option<ArchParams> {
        self.arch
    }

    pub fn set_arch(&mut self, arch: ArchParams) {
        self.arch = Some(arch);
    }

    /// The output environment, which defaults to ASCII.
    pub fn env(&self) -> Environment {
        self.env.unwrap_or_default()
    }

    pub fn set_env(&mut self, env: Environment) {
        self.env = Some(env);
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn set_image(&mut self, path: &str) {
        self.image = Some(path.to_string());
    }

    pub fn max_steps(&self) -> Option<u64> {
        self.max_steps
    }

    pub fn as_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    /// The machine this program is built for.
    pub fn target(&self) -> Result<Target> {
        let arch = self.arch.ok_or(ProjectError::Missing("architecture"))?;

        Ok(Target::new(arch, self.env()))
    }

    pub fn source_path(&self) -> Result<&str> {
        self.source().ok_or(ProjectError::Missing("source file"))
    }

    pub fn image_path(&self) -> Result<&str> {
        self.image().ok_or(ProjectError::Missing("image file"))
    }

    /// Fill in anything `other` leaves unset with this program's settings.
    pub fn apply_override(&self, other: &Program) -> Program {
        Program {
            arch: other.arch.or(self.arch),
            env: other.env.or(self.env),
            source: other.source.clone().or_else(|| self.source.clone()),
            image: other.image.clone().or_else(|| self.image.clone()),
            max_steps: other.max_steps.or(self.max_steps),
            name: other.name.clone().or_else(|| self.name.clone()),
        }
    }
}
