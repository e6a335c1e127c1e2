// src/exit.rs

use colored::Colorize;
use std::fmt;

/// Process exit codes for each way a run can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Finished normally.
    Ok = 0,
    /// Command-line parsing failed.
    FlagsNotParsed = 1,
    /// The configuration could not be loaded.
    CliNotStarted = 2,
    /// The shell could not be prepared or started.
    ShellNotCreated = 3,
    /// A log format or destination was rejected.
    InvalidFlags = 4,
}

impl ExitCode {
    /// The numeric process exit code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Builds the message printed when halting with this code, if any.
    pub fn message(self, err: Option<&anyhow::Error>, note: &str) -> Option<String> {
        let reason = match (self, err) {
            (Self::Ok, _) if note.is_empty() => return None,
            (Self::Ok, _) => note.to_string(),
            (_, Some(e)) if note.is_empty() => format!("{:#}", e),
            (_, Some(e)) => format!("{}: {:#}", note, e),
            (_, None) if note.is_empty() => "unknown error".to_string(),
            (_, None) => note.to_string(),
        };
        Some(format!("halt({}): {}", self.code(), reason))
    }

    /// Prints the annotated message to stderr and returns the numeric code,
    /// leaving the actual exit to the caller.
    fn report(self, err: Option<&anyhow::Error>, note: &str) -> i32 {
        if let Some(message) = self.message(err, note) {
            if self == Self::Ok {
                eprintln!("\n{}", message);
            } else {
                eprintln!("\n{}", message.red().bold());
            }
        }
        self.code()
    }

    /// Terminates the process with this code after printing the annotated message.
    pub fn halt_annotated(self, err: Option<&anyhow::Error>, note: &str) -> ! {
        std::process::exit(self.report(err, note))
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}
