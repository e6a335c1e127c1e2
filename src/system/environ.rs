// src/system/environ.rs

use crate::constants::{ENV_PROFILE_NAME, ENV_RCFILE_NAME};
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// An ordered set of environment variables handed to the shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environ {
    vars: Vec<(OsString, OsString)>,
}

impl Environ {
    /// An environment with no variables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A copy of the current process environment.
    pub fn inherited() -> Self {
        std::env::vars_os().collect()
    }

    /// The value of `key`, if set.
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.vars
            .iter()
            .find(|(k, _)| k.as_os_str() == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Overwrites `key` in place, or appends it when absent.
    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        let key = key.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.vars.push((key, value)),
        }
    }

    /// Iterates over the variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when no variable is set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Renders each variable as `KEY=VALUE`, for logging.
    pub fn to_lines(&self) -> Vec<String> {
        self.iter()
            .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()))
            .collect()
    }
}

impl<K: Into<OsString>, V: Into<OsString>> FromIterator<(K, V)> for Environ {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut environ = Self::empty();
        for (k, v) in iter {
            environ.set(k, v);
        }
        environ
    }
}

/// Adds the gosh bookkeeping variables to `base`.
///
/// `GOSH_RCFILE` is always refreshed when already present, but only added
/// when `expose_rcfile` is set (a generated script has no rc-file to point
/// at once it is printed). `GOSH_PROFILE` receives the comma-joined profile
/// names; a previous non-empty value is kept in parentheses after them.
pub fn with_bookkeeping(
    mut base: Environ,
    rcfile: &Path,
    profiles: &[String],
    expose_rcfile: bool,
) -> Environ {
    if expose_rcfile || base.get(ENV_RCFILE_NAME).is_some() {
        base.set(ENV_RCFILE_NAME, rcfile.as_os_str());
    }

    let mut value = OsString::from(profiles.join(","));
    if let Some(previous) = base.get(ENV_PROFILE_NAME).filter(|v| !v.is_empty()) {
        value.push("(");
        value.push(previous);
        value.push(")");
    }
    base.set(ENV_PROFILE_NAME, value);

    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut env: Environ = [("A", "1"), ("B", "2")].into_iter().collect();
        env.set("A", "3");
        env.set("C", "4");
        assert_eq!(env.to_lines(), vec!["A=3", "B=2", "C=4"]);
    }

    #[test]
    fn test_bookkeeping_on_empty_environment() {
        let env = with_bookkeeping(
            Environ::empty(),
            Path::new("/tmp/goshrc-1"),
            &names(&["auto", "foo"]),
            true,
        );
        assert_eq!(
            env.to_lines(),
            vec!["GOSH_RCFILE=/tmp/goshrc-1", "GOSH_PROFILE=auto,foo"]
        );
    }

    #[test]
    fn test_previous_profiles_are_kept() {
        let base: Environ = [("HOME", "/home/me"), ("GOSH_PROFILE", "outer")]
            .into_iter()
            .collect();
        let env = with_bookkeeping(base, Path::new("/tmp/rc"), &names(&["auto"]), true);
        assert_eq!(env.get("GOSH_PROFILE"), Some(OsStr::new("auto(outer)")));
        assert_eq!(env.len(), 3);
    }

    #[test]
    fn test_rcfile_hidden_when_generating() {
        let env = with_bookkeeping(Environ::empty(), Path::new("/tmp/rc"), &names(&["auto"]), false);
        assert!(env.get("GOSH_RCFILE").is_none());
        assert_eq!(env.get("GOSH_PROFILE"), Some(OsStr::new("auto")));

        let base: Environ = [("GOSH_RCFILE", "/old")].into_iter().collect();
        let env = with_bookkeeping(base, Path::new("/tmp/rc"), &names(&["auto"]), false);
        assert_eq!(env.get("GOSH_RCFILE"), Some(OsStr::new("/tmp/rc")));
    }

    #[test]
    fn test_inherited_matches_process() {
        let env = Environ::inherited();
        assert_eq!(env.len(), std::env::vars_os().count());
    }
}
