// src/system/shell.rs

use crate::{
    constants::AUTO_SHELL_NAME,
    core::{
        arg_expansion::{ArgExpansion, Expansion, ExpansionValues},
        commons::{bracket_list, non_empty},
        paths::{self, PathError},
    },
    logging::LogContext,
    models::{Config, ProfileEnv, ShellSpec},
    system::{
        environ::{self, Environ},
        rcfile::{self, RcWriteError},
    },
};
use std::{
    ffi::OsString,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};
use tempfile::TempPath;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Requested shell '{0}' is not defined in the configuration.")]
    UndefinedShell(String),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    RcWrite(#[from] RcWriteError),
    #[error("Could not start shell '{exec}': {source}")]
    Spawn {
        exec: String,
        #[source]
        source: io::Error,
    },
    #[error("Could not replace this process with '{exec}': {source}")]
    Exec {
        exec: String,
        #[source]
        source: io::Error,
    },
    #[error("Could not write the generated rc-file: {0}")]
    Generate(#[source] io::Error),
}

/// What the user asked the launcher to do.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Name of the shell definition to use.
    pub shell: String,
    /// Profiles requested on the command line, in order.
    pub profiles: Vec<String>,
    /// Command string to run instead of an interactive session.
    pub command: String,
    /// Positional arguments for the shell.
    pub args: Vec<String>,
    /// Use the login-shell template.
    pub login: bool,
    /// Use the interactive template.
    pub interactive: bool,
    /// Start from an empty environment and export nothing when generating.
    pub orphan: bool,
    /// Print the rc-file as a script instead of launching.
    pub generate: bool,
}

/// Finds the shell definition to use. `auto` falls back to the definition
/// named after the basename of `$SHELL` when no shell is literally named `auto`.
pub fn resolve_shell<'a>(
    config: &'a Config,
    name: &str,
    login_shell: Option<OsString>,
) -> Result<&'a ShellSpec, LaunchError> {
    if let Some(spec) = config.shells.get(name) {
        return Ok(spec);
    }
    if name == AUTO_SHELL_NAME {
        let fallback = login_shell
            .as_deref()
            .map(Path::new)
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned());
        if let Some(spec) = fallback.as_deref().and_then(|n| config.shells.get(n)) {
            return Ok(spec);
        }
    }
    Err(LaunchError::UndefinedShell(name.to_string()))
}

/// Everything needed to launch, with the rc-file already on disk.
/// Dropping it removes the rc-file.
#[derive(Debug)]
pub struct Prepared {
    /// Expanded path of the shell executable.
    pub exec: String,
    /// Full argument vector, `argv[0]` included.
    pub argv: Vec<String>,
    /// Environment of the shell process.
    pub environ: Environ,
    /// Working directory of the shell process.
    pub cwd: PathBuf,
    /// Activated profiles, in order.
    pub profiles: Vec<String>,
    /// The rc-file the shell sources.
    pub rcfile: TempPath,
}

/// Writes the rc-file and works out the argv, environment and working directory.
///
/// `inherited` is the environment to start from (ignored in orphan mode) and
/// `current_dir` the directory to use when no profile declares one.
pub fn prepare(
    config: &Config,
    profile_env: &ProfileEnv,
    selection: &[String],
    shell: &ShellSpec,
    options: &LaunchOptions,
    inherited: Environ,
    current_dir: PathBuf,
    log: &LogContext,
) -> Result<Prepared, LaunchError> {
    let exec = paths::expand_path(&shell.exec)?;
    let rc = rcfile::write_rcfile(profile_env, selection, log)?;
    let rcfile_path = rc.path.to_string_lossy().into_owned();

    let base = if options.orphan {
        Environ::empty()
    } else {
        inherited
    };
    let environ = environ::with_bookkeeping(base, &rc.path, &rc.profiles, !options.generate);

    // Tokens see the launch directory; a profile cwd only moves the child.
    let expansion = ArgExpansion::new(ExpansionValues {
        exec: exec.clone(),
        rcfile: rcfile_path,
        cwd: current_dir.to_string_lossy().into_owned(),
        command: options.command.clone(),
        args: options.args.clone(),
    });
    let cwd = profile_cwd(config, &rc.profiles, &expansion, log).unwrap_or(current_dir);

    let template: &[String] = if !options.command.is_empty() {
        shell.flag.command_line.as_slice()
    } else if options.login {
        shell.flag.login_shell.as_slice()
    } else if options.interactive {
        shell.flag.interactive.as_slice()
    } else {
        &[]
    };
    let mut argv = vec![exec.clone()];
    argv.extend(template.iter().cloned());
    let argv = non_empty(expansion.expand_args(&argv));

    Ok(Prepared {
        exec,
        argv,
        environ,
        cwd,
        profiles: rc.profiles,
        rcfile: rc.path,
    })
}

/// The first activated profile declaring a non-empty `cwd` decides the
/// working directory.
fn profile_cwd(
    config: &Config,
    profiles: &[String],
    expansion: &ArgExpansion,
    log: &LogContext,
) -> Option<PathBuf> {
    for name in profiles {
        let Some(template) = config.profiles.get(name).and_then(|p| p.cwd.as_deref()) else {
            continue;
        };
        let Expansion::Single(dir) = expansion.expand(template) else {
            continue;
        };
        if dir.is_empty() {
            continue;
        }
        match paths::expand_path(&dir) {
            Ok(dir) => return Some(PathBuf::from(dir)),
            Err(e) => {
                log.with_field("profile", name)
                    .with_field("error", e)
                    .warn("ignoring cwd");
            }
        }
    }
    None
}

impl Prepared {
    /// Prints the rc-file as a standalone script. The rc-file is removed afterwards.
    pub fn generate(self, out: &mut impl Write, export: bool) -> Result<(), LaunchError> {
        let exports = export.then_some(&self.environ);
        rcfile::copy_rcfile(out, &self.rcfile, &self.exec, exports).map_err(LaunchError::Generate)
    }

    /// Starts the shell. With `replace`, this process becomes the shell and
    /// the call only returns on failure. Otherwise the shell runs as a child
    /// and its exit code is returned once it finishes.
    pub fn run(self, replace: bool, log: &LogContext) -> Result<i32, LaunchError> {
        log.with_field("shell", &self.exec)
            .with_field("args", bracket_list(&self.argv))
            .with_field("env", bracket_list(&self.environ.to_lines()))
            .with_field("dir", self.cwd.display())
            .debug("execute");

        let mut command = Command::new(&self.exec);
        command
            .args(self.argv.iter().skip(1))
            .env_clear()
            .envs(self.environ.iter())
            .current_dir(dunce::simplified(&self.cwd));

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if let Some(arg0) = self.argv.first() {
                command.arg0(arg0);
            }
            if replace {
                let err = command.exec();
                return Err(LaunchError::Exec {
                    exec: self.exec.clone(),
                    source: err,
                });
            }
        }
        #[cfg(not(unix))]
        let _ = replace;

        let status = command.status().map_err(|e| LaunchError::Spawn {
            exec: self.exec.clone(),
            source: e,
        })?;
        if !status.success() {
            log.with_field("status", status).debug("shell exited");
        }
        Ok(exit_code(status))
    }
}

/// Maps a child's exit status to this process's exit code. A child killed by
/// a signal yields `128 + signal`, the way shells report it.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Runs the launcher end to end against the real process environment.
///
/// In generate-only mode the script goes to stdout and no shell is started.
/// Otherwise a `-c` command replaces this process, and any other session runs
/// as a child whose exit code is returned.
pub fn launch(
    config: &Config,
    profile_env: &ProfileEnv,
    selection: &[String],
    options: &LaunchOptions,
    log: &LogContext,
) -> Result<i32, LaunchError> {
    let shell = resolve_shell(config, &options.shell, std::env::var_os("SHELL"))?;
    let current_dir = std::env::current_dir().unwrap_or_else(|_| paths::home_dir());

    let prepared = prepare(
        config,
        profile_env,
        selection,
        shell,
        options,
        Environ::inherited(),
        current_dir,
        log,
    )?;

    if options.generate {
        let stdout = io::stdout();
        prepared.generate(&mut stdout.lock(), !options.orphan)?;
        return Ok(0);
    }

    prepared.run(!options.command.is_empty(), log)
}
