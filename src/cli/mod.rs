// src/cli/mod.rs

use crate::{
    constants::{AUTO_SHELL_NAME, ENV_DEBUG_DELIM},
    logging::{LogHandler, LogSink, LogSinkError, ParseLogHandlerError},
    system::shell::LaunchOptions,
};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use thiserror::Error;

pub mod session;

/// gosh: launch a shell with a set of environment profiles activated.
///
/// The selected profiles (plus `auto`, when defined) are merged into a
/// temporary rc-file that the configured shell sources on startup.
/// Arguments after the flags (or after `--`) are passed to the shell as
/// positional parameters.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Configuration file (defaults to $GOSH_CONFIG, then the user config directory).
    #[arg(short = 'f', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Name of the shell definition to launch.
    #[arg(short = 'e', value_name = "SHELL", default_value = AUTO_SHELL_NAME)]
    pub shell: String,

    /// Profile to activate. May be repeated.
    #[arg(short = 'p', value_name = "PROFILE")]
    pub profiles: Vec<String>,

    /// Run a command instead of an interactive session.
    #[arg(short = 'c', value_name = "COMMAND", default_value = "")]
    pub command: String,

    /// Start a login shell.
    #[arg(short = 'l')]
    pub login: bool,

    /// Start an interactive shell (`-i=false` disables it).
    #[arg(
        short = 'i',
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub interactive: bool,

    /// Do not inherit the environment (do not export it with -d).
    #[arg(short = 'u')]
    pub orphan: bool,

    /// Print the generated rc-file instead of launching the shell.
    #[arg(short = 'd')]
    pub generate: bool,

    /// Log format: null, standard, ascii or json.
    #[arg(short = 'o', value_name = "FORMAT")]
    pub log_handler: Option<String>,

    /// Log destination: `-` stdout, `+` stderr, `>path` truncate, `>>path` append.
    #[arg(short = 'w', value_name = "PATH")]
    pub log_path: Option<String>,

    /// Enable debug logging.
    #[arg(short = 'g')]
    pub debug: bool,

    /// Print the version and exit.
    #[arg(short = 'v')]
    pub version: bool,

    /// Print the changelog and exit.
    #[arg(short = 'V')]
    pub changelog: bool,

    /// Positional arguments handed to the shell. Flags end at the first
    /// positional argument or at `--`.
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

/// A log flag that could not be interpreted.
#[derive(Error, Debug)]
pub enum FlagError {
    #[error(transparent)]
    Handler(#[from] ParseLogHandlerError),
    #[error("Invalid log destination: {0}")]
    Sink(#[from] LogSinkError),
}

/// Validated command-line parameters.
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Configuration file given with `-f`.
    pub config: Option<PathBuf>,
    /// What to launch and how.
    pub launch: LaunchOptions,
    /// Log record format.
    pub log_handler: LogHandler,
    /// Log destination.
    pub log_sink: LogSink,
    /// Emit debug records.
    pub debug: bool,
}

impl Parameters {
    /// Resolves the parsed flags. `debug_env` is the value of `GOSH_DEBUG`,
    /// consulted only with `-g` for whichever of `-o` and `-w` is missing.
    pub fn from_cli(cli: Cli, debug_env: Option<String>) -> Result<Self, FlagError> {
        let (env_handler, env_path) = match (cli.debug, debug_env.as_deref()) {
            (true, Some(value)) => match value.split_once(ENV_DEBUG_DELIM) {
                Some((handler, path)) => (non_blank(handler), non_blank(path)),
                None => (non_blank(value), None),
            },
            _ => (None, None),
        };

        let log_handler = match cli.log_handler.as_deref().or(env_handler) {
            Some(name) => name.parse()?,
            None if cli.debug || cli.log_path.is_some() => LogHandler::Standard,
            None => LogHandler::Null,
        };
        let log_sink = match cli.log_path.as_deref().or(env_path) {
            Some(path) => path.parse()?,
            None => LogSink::default(),
        };

        Ok(Self {
            config: cli.config,
            launch: LaunchOptions {
                shell: cli.shell,
                profiles: cli.profiles,
                command: cli.command,
                args: cli.args,
                login: cli.login,
                interactive: cli.interactive,
                orphan: cli.orphan,
                generate: cli.generate,
            },
            log_handler,
            log_sink,
            debug: cli.debug,
        })
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
