// src/core/paths.rs

use crate::constants::{CONFIG_FILENAME, ENV_CONFIG_NAME, PACKAGE_NAME, PERM_CONFIG_DIR};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to expand path template '{template}': {reason}")]
    Expansion { template: String, reason: String },
}

/// Returns an absolute path to the user's home directory. Falls back to the
/// current directory, and finally to `.`.
pub fn home_dir() -> PathBuf {
    let path = dirs::home_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    std::path::absolute(&path).unwrap_or(path)
}

/// Returns the gosh configuration directory (`~/.config/gosh` on Linux).
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| home_dir().join(".config"))
        .join(PACKAGE_NAME)
}

/// Decides which configuration file to load: an explicit path wins, then the
/// value of `GOSH_CONFIG`, then `config.yml` in the gosh configuration directory.
pub fn resolve_config_path(explicit: Option<PathBuf>, from_env: Option<OsString>) -> PathBuf {
    explicit
        .or_else(|| from_env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| config_dir().join(CONFIG_FILENAME))
}

/// Same as [`resolve_config_path`], reading `GOSH_CONFIG` from the process environment.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    resolve_config_path(explicit, std::env::var_os(ENV_CONFIG_NAME))
}

/// Makes sure the directory holding `config_file` exists.
pub fn ensure_parent_dir(config_file: &Path) -> Result<(), PathError> {
    let Some(parent) = config_file.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.exists() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(PERM_CONFIG_DIR);
    }
    #[cfg(not(unix))]
    let _ = PERM_CONFIG_DIR;

    builder
        .create(parent)
        .map_err(|e| PathError::ConfigDirCreation {
            path: parent.display().to_string(),
            source: e,
        })
}

/// Expands `~` and `$VAR`/`${VAR}` references in a path taken from the config file.
pub fn expand_path(template: &str) -> Result<String, PathError> {
    shellexpand::full(template)
        .map(|s| s.into_owned())
        .map_err(|e| PathError::Expansion {
            template: template.to_string(),
            reason: e.to_string(),
        })
}

/// Expands a leading `~` only. Everything else, `$` included, is taken literally.
pub fn expand_home(name: &str) -> String {
    shellexpand::tilde(name).into_owned()
}
