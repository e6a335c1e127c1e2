// src/models.rs

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

// --- `config.yml` MODELS (What is read from the configuration file) ---

/// Represents the deserialized structure of a `config.yml` file.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default)]
pub struct Config {
    /// Shell definitions, keyed by a user-chosen name.
    #[serde(rename = "shell", default)]
    pub shells: Catalog<ShellSpec>,
    /// Profile definitions, keyed by profile name.
    #[serde(rename = "profile", default)]
    pub profiles: Catalog<ProfileSpec>,
}

/// How to start one kind of shell.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellSpec {
    /// Path to the shell executable.
    pub exec: String,
    /// Argument templates, one per launch mode.
    #[serde(default)]
    pub flag: ShellFlags,
}

/// Argument templates for each launch mode. Tokens are expanded at launch time.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellFlags {
    /// Used when a command string is given with `-c`.
    #[serde(rename = "commandline", default)]
    pub command_line: Vec<String>,
    /// Used for an interactive shell.
    #[serde(default)]
    pub interactive: Vec<String>,
    /// Used for a login shell.
    #[serde(rename = "loginshell", default)]
    pub login_shell: Vec<String>,
}

/// A named bundle of environment declarations and files to source.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSpec {
    /// Working directory for the shell when this profile is the first to declare one.
    #[serde(default)]
    pub cwd: Option<String>,
    /// Lines inserted verbatim ahead of the included files.
    #[serde(default)]
    pub env: Vec<String>,
    /// Profiles activated right before this one.
    #[serde(default)]
    pub inherit: Vec<String>,
    /// Files read from `<config dir>/<profile name>/`, in order.
    #[serde(default)]
    pub include: Vec<String>,
}

/// The raw bytes of every profile in the catalog, keyed by profile name.
pub type ProfileEnv = HashMap<String, Vec<u8>>;

/// An ordered name→value mapping that keeps every entry as written,
/// including repeated names. Lookups return the first entry of a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Catalog<T> {
    /// Appends an entry, even if the name is already present.
    pub fn push(&mut self, name: impl Into<String>, value: T) {
        self.entries.push((name.into(), value));
    }

    /// Returns the first value declared under `name`.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates over all entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of entries, repeated names included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, T> FromIterator<(N, T)> for Catalog<T> {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

struct CatalogVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for CatalogVisitor<T> {
    type Value = Catalog<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of names to definitions")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Catalog::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut catalog = Catalog::default();
        while let Some((name, value)) = access.next_entry::<String, T>()? {
            catalog.push(name, value);
        }
        Ok(catalog)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Catalog<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CatalogVisitor(PhantomData))
    }
}

impl<T: Serialize> Serialize for Catalog<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
