// src/bin/gosh.rs

use clap::{Parser, error::ErrorKind};
use gosh::{
    cli::{Cli, Parameters, session::Session},
    constants::ENV_DEBUG_NAME,
    exit::ExitCode,
    logging::LogContext,
    version,
};
use std::env;

/// A fatal outcome of `run`, reported once everything it owned is dropped.
struct Halt {
    code: ExitCode,
    error: anyhow::Error,
    note: &'static str,
}

impl Halt {
    fn new(code: ExitCode, error: impl Into<anyhow::Error>, note: &'static str) -> Self {
        Self {
            code,
            error: error.into(),
            note,
        }
    }
}

/// Parses the flags, loads the configuration and launches the shell.
/// Everything owned by `run` (the rc-file in particular) is dropped before
/// the process exits.
fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(halt) => halt.code.halt_annotated(Some(&halt.error), halt.note),
    }
}

fn run() -> Result<i32, Halt> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return Ok(match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Ok.code(),
                _ => ExitCode::FlagsNotParsed.code(),
            });
        }
    };

    if cli.version {
        println!("{}", version::version_line());
        return Ok(ExitCode::Ok.code());
    }
    if cli.changelog {
        print!("{}", version::changelog_text());
        return Ok(ExitCode::Ok.code());
    }

    let params = Parameters::from_cli(cli, env::var(ENV_DEBUG_NAME).ok())
        .map_err(|e| Halt::new(ExitCode::InvalidFlags, e, "invalid flags"))?;
    let target = params
        .log_sink
        .open()
        .map_err(|e| Halt::new(ExitCode::InvalidFlags, e, "invalid flags"))?;
    let log = LogContext::new(params.log_handler, target, params.debug);

    let session = Session::start(params, &log).map_err(|e| {
        log.with_field("error", format!("{:#}", e)).error("initialization failed");
        Halt::new(ExitCode::CliNotStarted, e, "initialization")
    })?;

    session.create_shell(&log).map_err(|e| {
        log.with_field("error", format!("{:#}", e)).error("shell failed");
        Halt::new(ExitCode::ShellNotCreated, e, "create shell")
    })
}
