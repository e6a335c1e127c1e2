//! # Config Loader
//!
//! Reads `config.yml` into the [`Config`] model. Loading is purely syntactic:
//! references between sections (a shell name requested on the command line,
//! a profile listed under `inherit`) are checked later, when they are used.

use crate::models::Config;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read configuration file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse configuration file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// Reads and parses the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parses configuration text. An empty document yields an empty config.
pub fn parse_config(content: &str) -> Result<Config, serde_yaml_ng::Error> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml_ng::from_str(content)
}

/// A compact one-line rendering of the configuration for debug logs.
pub fn describe(config: &Config) -> String {
    serde_json::to_string(config).unwrap_or_else(|e| format!("<unprintable config: {}>", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileSpec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
shell:
  bash:
    exec: /bin/bash
    flag:
      commandline: [-c, __GOSH_CMD__]
      interactive: [--rcfile, __GOSH_INIT__, -i]
      loginshell: [--rcfile, __GOSH_INIT__, -l]
  zsh:
    exec: /bin/zsh
profile:
  auto:
    env: ["X=1"]
    include: [a.env]
  work:
    cwd: ~/work
    inherit: [auto]
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();

        let bash = config.shells.get("bash").unwrap();
        assert_eq!(bash.exec, "/bin/bash");
        assert_eq!(bash.flag.command_line, vec!["-c", "__GOSH_CMD__"]);
        assert_eq!(bash.flag.login_shell.last().map(String::as_str), Some("-l"));

        let zsh = config.shells.get("zsh").unwrap();
        assert!(zsh.flag.interactive.is_empty());

        let names: Vec<&str> = config.profiles.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["auto", "work"]);

        let work = config.profiles.get("work").unwrap();
        assert_eq!(work.cwd.as_deref(), Some("~/work"));
        assert_eq!(work.inherit, vec!["auto"]);
        assert!(work.include.is_empty());
    }

    #[test]
    fn test_duplicate_profile_names_are_kept_in_order() {
        let config = parse_config(
            "profile:\n  p:\n    env: [\"A=1\"]\n  p:\n    env: [\"A=2\"]\n",
        )
        .unwrap();
        assert_eq!(config.profiles.len(), 2);
        assert_eq!(
            config.profiles.get("p"),
            Some(&ProfileSpec {
                env: vec!["A=1".to_string()],
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_empty_sections() {
        let config = parse_config("shell:\nprofile:\n").unwrap();
        assert!(config.shells.is_empty());
        assert!(config.profiles.is_empty());

        let config = parse_config("").unwrap();
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.shells.len(), 2);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&dir.path().join("nope.yml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_config_malformed() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"shell: [unterminated").unwrap();
        file.flush().unwrap();

        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_describe_is_json() {
        let config = parse_config(SAMPLE).unwrap();
        let text = describe(&config);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["shell"]["bash"]["exec"], "/bin/bash");
    }
}
