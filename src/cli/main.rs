//! CLI support for non-command bits

use crate::cli::Command;
use crate::{cli, project};
use clap::{AppSettings, Arg, ArgSettings};
use std::io;
use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log to stderr, filtered by `JAW_LOG` (e.g. `JAW_LOG=jawasm=trace`).
fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("JAW_LOG").unwrap_or_else(|_| EnvFilter::new("jawasm=warn")))
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

pub fn main() -> io::Result<()> {
    init_logging();

    let mut app = app_from_crate!().setting(AppSettings::SubcommandRequiredElseHelp);
    app = app.arg(
        Arg::with_name("program")
            .long("program")
            .value_name("myprog")
            .takes_value(true)
            .help("Which program in the project to use")
            .set(ArgSettings::Global),
    );
    app = project::Program::configure_app(app);
    app = app.arg(
        Arg::with_name("project")
            .long("project")
            .value_name("jaw.json")
            .takes_value(true)
            .help("The project file to load")
            .set(ArgSettings::Global),
    );

    for cmd in Command::enumerate().iter() {
        app = app.subcommand(cmd.into_clap_subcommand());
    }

    let matches = app.get_matches();

    let (command, submatches) = matches.subcommand();
    let command = Command::from_str(command).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unknown command {:?}", command),
        )
    })?;
    let submatches = submatches.unwrap_or(&matches);

    // Global arguments are propagated down to the innermost subcommand.
    let mut innermost = submatches;
    while let (_, Some(next)) = innermost.subcommand() {
        innermost = next;
    }

    let project_filename = innermost.value_of("project").unwrap_or("jaw.json");
    let version = innermost.value_of("program");
    let overrides = project::Program::from_arg_matches(innermost)?;

    let project = project::Project::read_or_default(project_filename)?;
    let prog = project.resolve_program(version, overrides)?;

    debug!(program = ?prog.as_name(), ?command, "resolved program");

    match command {
        Command::Assemble => cli::asm(&prog, submatches)?,
        Command::Run => cli::run(&prog, submatches)?,
        Command::Line => cli::line(&prog, submatches)?,
        Command::Disassemble => cli::dis(&prog, submatches)?,
    };

    Ok(())
}
