//! # Argument Expansion
//!
//! A single-pass substitution over the argument templates of a shell
//! definition. An argument that is exactly one of the `__GOSH_*__` tokens is
//! replaced by its value. A list value (the positional arguments) becomes
//! several arguments. An argument that mentions a token without being a
//! mapped token is removed. Anything else passes through untouched.

use crate::constants::PACKAGE_NAME;
use regex::Regex;
use std::collections::HashMap;

/// What a token expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// The argument is removed.
    Nothing,
    /// The argument is replaced by one argument.
    Single(String),
    /// The argument is replaced by zero or more arguments.
    Multiple(Vec<String>),
}

/// The runtime values available to argument templates.
#[derive(Debug, Clone, Default)]
pub struct ExpansionValues {
    /// The shell executable.
    pub exec: String,
    /// Path of the generated rc-file.
    pub rcfile: String,
    /// The shell's working directory.
    pub cwd: String,
    /// The `-c` command string. Left unmapped when empty.
    pub command: String,
    /// Positional arguments passed through to the shell.
    pub args: Vec<String>,
}

/// A compiled set of token rules.
#[derive(Debug, Clone)]
pub struct ArgExpansion {
    matcher: Option<Regex>,
    rules: HashMap<String, Option<Expansion>>,
}

/// Builds the token for `key`, e.g. `__GOSH_INIT__`.
pub fn token(key: &str) -> String {
    format!("__{}_{}__", PACKAGE_NAME.to_uppercase(), key)
}

impl ArgExpansion {
    /// Creates the standard rule set and compiles its matcher.
    pub fn new(values: ExpansionValues) -> Self {
        let command =
            (!values.command.is_empty()).then(|| Expansion::Single(values.command.clone()));
        let rules = HashMap::from([
            (token("EXEC"), Some(Expansion::Single(values.exec))),
            (token("INIT"), Some(Expansion::Single(values.rcfile))),
            (token("CWD"), Some(Expansion::Single(values.cwd.clone()))),
            (token("PWD"), Some(Expansion::Single(values.cwd))),
            (token("CMD"), command),
            (token("ARGS"), Some(Expansion::Multiple(values.args))),
        ]);
        Self::with_rules(rules)
    }

    /// Creates an expansion from arbitrary rules. A rule with no value is
    /// still recognized, and expands to nothing.
    pub fn with_rules(rules: HashMap<String, Option<Expansion>>) -> Self {
        let matcher = compile(rules.keys());
        Self { matcher, rules }
    }

    /// Expands a single argument.
    pub fn expand(&self, arg: &str) -> Expansion {
        let matched = match &self.matcher {
            Some(re) => re.is_match(arg),
            None => self.rules.keys().any(|k| arg.contains(k.as_str())),
        };
        if !matched {
            return Expansion::Single(arg.to_string());
        }
        match self.rules.get(arg) {
            Some(Some(replace)) => replace.clone(),
            _ => Expansion::Nothing,
        }
    }

    /// Expands each argument in turn, flattening list values in place.
    pub fn expand_args<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut expanded = Vec::with_capacity(args.len());
        for arg in args {
            match self.expand(arg.as_ref()) {
                Expansion::Nothing => {}
                Expansion::Single(s) => expanded.push(s),
                Expansion::Multiple(list) => expanded.extend(list),
            }
        }
        expanded
    }
}

/// Builds an alternation of the escaped rule keys. `None` when there are no keys.
fn compile<'a>(keys: impl Iterator<Item = &'a String>) -> Option<Regex> {
    let mut escaped: Vec<String> = keys.map(|k| regex::escape(k)).collect();
    if escaped.is_empty() {
        return None;
    }
    // Longest first, so a token that prefixes another never shadows it.
    escaped.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    Regex::new(&escaped.join("|")).ok()
}
