// src/cli/session.rs

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::Parameters;
use crate::{
    core::{config_loader, paths, profile_loader, selection},
    logging::LogContext,
    models::Config,
    system::shell,
};

/// A loaded configuration, ready to launch shells from.
#[derive(Debug)]
pub struct Session {
    /// The flags this session was started with.
    pub params: Parameters,
    /// Where the configuration was read from.
    pub config_path: PathBuf,
    /// The parsed configuration.
    pub config: Config,
}

impl Session {
    /// Locates and parses the configuration file. The directory holding it is
    /// created when missing, so a first run can report where it looked.
    pub fn start(params: Parameters, log: &LogContext) -> Result<Self> {
        let config_path = paths::config_path(params.config.clone());
        Self::start_at(params, config_path, log)
    }

    fn start_at(params: Parameters, config_path: PathBuf, log: &LogContext) -> Result<Self> {
        paths::ensure_parent_dir(&config_path).context("preparing configuration directory")?;
        let config = config_loader::load_config(&config_path).context("loading configuration")?;

        log.with_field("path", config_path.display())
            .with_field("content", config_loader::describe(&config))
            .debug("parsed configuration");

        Ok(Self {
            params,
            config_path,
            config,
        })
    }

    /// Directory holding the profile fragment directories.
    pub fn profile_root(&self) -> &Path {
        self.config_path.parent().unwrap_or(Path::new("."))
    }

    /// Loads the profiles, selects the requested ones and launches the shell.
    /// Returns the exit code to finish with.
    pub fn create_shell(&self, log: &LogContext) -> Result<i32> {
        let options = &self.params.launch;
        let profile_env = profile_loader::load_profiles(&self.config, self.profile_root(), log);
        let selected = selection::select_profiles(&options.profiles, &self.config, log);

        let log = log.with_field("shell", &options.shell);
        if options.command.is_empty() {
            log.info("running shell");
        } else {
            log.with_field("command", &options.command).info("running command");
        }

        shell::launch(&self.config, &profile_env, &selected, options, &log)
            .with_context(|| format!("launching shell '{}'", options.shell))
    }
}
