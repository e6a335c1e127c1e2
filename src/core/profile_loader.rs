//! # Profile Loader
//!
//! Builds the [`ProfileEnv`]: the raw bytes of every profile in the catalog.
//! A profile's bytes are its `env` lines followed by the contents of its
//! `include` files. The include files of one profile are read in parallel,
//! each into its own slot, and the slots are joined in declaration order once
//! every read has finished.

use crate::{
    core::{commons::bracket_list, paths},
    logging::LogContext,
    models::{Config, ProfileEnv},
};
use std::{fs, path::Path, sync::OnceLock};

/// Reads `files` (relative to `dir`) concurrently and concatenates their
/// contents in the order given. Unreadable files contribute nothing and are
/// reported as warnings.
pub fn read_fragments(dir: &Path, files: &[String], log: &LogContext) -> Vec<u8> {
    let slots: Vec<OnceLock<Vec<u8>>> = files.iter().map(|_| OnceLock::new()).collect();

    rayon::scope(|s| {
        for (file, slot) in files.iter().zip(&slots) {
            s.spawn(move |_| {
                let bytes = read_fragment(dir, file, log);
                if slot.set(bytes).is_err() {
                    log.with_field("file", file).error("fragment slot filled twice");
                }
            });
        }
    });

    slots
        .into_iter()
        .filter_map(OnceLock::into_inner)
        .flatten()
        .collect()
}

fn read_fragment(dir: &Path, file: &str, log: &LogContext) -> Vec<u8> {
    let path = dir.join(paths::expand_home(file));
    match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log.with_field("path", path.display())
                .with_field("error", e)
                .warn("skipping file");
            Vec::new()
        }
    }
}

/// Loads every profile in the catalog. Include files are resolved against
/// `root/<profile name>/`. A repeated profile name keeps its first definition.
pub fn load_profiles(config: &Config, root: &Path, log: &LogContext) -> ProfileEnv {
    let mut source = ProfileEnv::new();

    for (name, profile) in config.profiles.iter() {
        if source.contains_key(name) {
            log.with_field("profile", name)
                .with_field("reject", "duplicate")
                .warn("skipping profile");
            continue;
        }

        // The profile's own declarations always precede its includes.
        let mut bytes: Vec<u8> = profile.env.iter().flat_map(|e| e.bytes()).collect();
        let dir = root.join(name);
        bytes.extend(read_fragments(&dir, &profile.include, log));

        log.with_field("profile", name)
            .with_field("env", bracket_list(&profile.env))
            .with_field("size", format!("{}B", bytes.len()))
            .with_field("path", dir.display())
            .debug("loaded profile");

        source.insert(name.to_string(), bytes);
    }

    source
}
