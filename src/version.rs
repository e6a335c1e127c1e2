// src/version.rs

/// One released version and what it changed.
#[derive(Debug, Clone, Copy)]
pub struct Change {
    pub version: &'static str,
    pub date: &'static str,
    pub description: &'static [&'static str],
}

/// Release history, newest first.
pub static CHANGELOG: &[Change] = &[
    Change {
        version: env!("CARGO_PKG_VERSION"),
        date: "October 16, 2026",
        description: &[
            "profiles may inherit other profiles",
            "log output format and destination selectable with -o and -w",
            "generate-only mode (-d) prints the rc-file as a script",
        ],
    },
    Change {
        version: "0.1.0",
        date: "June 30, 2020",
        description: &["initial commit"],
    },
];

/// The `gosh <version>` line printed by `-v`.
pub fn version_line() -> String {
    format!("{} {}", crate::constants::PACKAGE_NAME, env!("CARGO_PKG_VERSION"))
}

/// The full changelog printed by `-V`.
pub fn changelog_text() -> String {
    let mut text = String::new();
    for change in CHANGELOG {
        text.push_str(&format!("{} ({})\n", change.version, change.date));
        for line in change.description {
            text.push_str(&format!("  - {}\n", line));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_entry_is_current_version() {
        assert_eq!(CHANGELOG.first().map(|c| c.version), Some(env!("CARGO_PKG_VERSION")));
        assert_eq!(version_line(), format!("gosh {}", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_changelog_lists_every_entry() {
        let text = changelog_text();
        assert!(text.contains("0.1.0 (June 30, 2020)\n  - initial commit\n"));
        assert_eq!(text.lines().filter(|l| !l.starts_with(' ')).count(), CHANGELOG.len());
    }
}
