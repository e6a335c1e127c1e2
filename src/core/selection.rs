// src/core/selection.rs

use crate::{
    constants::{AUTO_PROFILE_NAME, MAX_INHERIT_DEPTH},
    logging::LogContext,
    models::Config,
};

/// Resolves the ordered list of profiles to activate.
///
/// The `auto` profile comes first when the catalog defines it, followed by the
/// requested profiles in the order given. Each profile is preceded by the
/// profiles it inherits. Every name appears once, at its first position.
/// Names missing from the catalog are reported and left out.
pub fn select_profiles(requested: &[String], config: &Config, log: &LogContext) -> Vec<String> {
    let mut selection = Vec::new();

    if config.profiles.get(AUTO_PROFILE_NAME).is_some() {
        activate(AUTO_PROFILE_NAME, config, &mut selection, &mut Vec::new(), log);
    }
    for name in requested {
        activate(name, config, &mut selection, &mut Vec::new(), log);
    }

    selection
}

fn activate<'a>(
    name: &'a str,
    config: &'a Config,
    selection: &mut Vec<String>,
    chain: &mut Vec<&'a str>,
    log: &LogContext,
) {
    if selection.iter().any(|s| s == name) {
        return;
    }
    let Some(profile) = config.profiles.get(name) else {
        log.with_field("profile", name)
            .with_field("reject", "undefined")
            .warn("skipping profile");
        return;
    };
    if chain.contains(&name) {
        log.with_field("profile", name)
            .with_field("chain", chain.join(" -> "))
            .warn("inheritance cycle");
        return;
    }
    if chain.len() >= MAX_INHERIT_DEPTH {
        log.with_field("profile", name)
            .with_field("depth", chain.len())
            .warn("inheritance too deep");
        return;
    }

    chain.push(name);
    for parent in &profile.inherit {
        activate(parent, config, selection, chain, log);
    }
    chain.pop();

    selection.push(name.to_string());
}
