// src/constants.rs

/// The package name, used for the config directory and the token prefix.
pub const PACKAGE_NAME: &str = "gosh";

/// The name of the main configuration file (inside the gosh config directory).
pub const CONFIG_FILENAME: &str = "config.yml";

/// Environment variable that overrides the default configuration file path.
pub const ENV_CONFIG_NAME: &str = "GOSH_CONFIG";

/// Environment variable holding `handler:path`, the log defaults used by `-g`.
pub const ENV_DEBUG_NAME: &str = "GOSH_DEBUG";

/// Separator between the handler and path parts of [`ENV_DEBUG_NAME`].
pub const ENV_DEBUG_DELIM: char = ':';

/// Bookkeeping variable carrying the rc-file path into the shell.
pub const ENV_RCFILE_NAME: &str = "GOSH_RCFILE";

/// Bookkeeping variable carrying the comma-joined list of activated profiles.
pub const ENV_PROFILE_NAME: &str = "GOSH_PROFILE";

/// The implicit profile that is always activated first, if defined.
pub const AUTO_PROFILE_NAME: &str = "auto";

/// The shell name selected when `-e` is not given.
pub const AUTO_SHELL_NAME: &str = "auto";

/// Prefix of the temporary rc-file name.
pub const RCFILE_PREFIX: &str = "goshrc-";

/// Permissions of the configuration directory when it must be created.
pub const PERM_CONFIG_DIR: u32 = 0o700;

/// Permissions of a log file created through `-w`.
pub const PERM_LOG_FILE: u32 = 0o600;

/// How deep `inherit` chains are followed before giving up.
pub const MAX_INHERIT_DEPTH: usize = 16;
