//! # Log Context
//!
//! Logging is configured once from the command line and then handed down
//! explicitly: every component receives a `&LogContext` instead of reaching
//! for a process-wide logger. A context owns an `env_logger::Logger` that is
//! built but never installed globally, plus the structured fields attached
//! through [`LogContext::with_field`].

use crate::{constants::PACKAGE_NAME, core::commons::wrap_value};
use colored::Colorize;
use env_logger::{Target, WriteStyle};
use lazy_static::lazy_static;
use log::{Level, LevelFilter, Log, Record};
use regex::Regex;
use std::{
    fmt,
    fs::OpenOptions,
    io::{self, IsTerminal, Write},
    path::PathBuf,
    str::FromStr,
    sync::Arc,
};
use thiserror::Error;

lazy_static! {
    static ref NULL_RE: Regex = Regex::new(r"^((/?dev/?)?null|no(ne)?)$").unwrap();
    static ref ASCII_RE: Regex = Regex::new(r"^(ascii|(plain-?)?te?xt|plain(-?te?xt)?)$").unwrap();
    static ref JSON_RE: Regex = Regex::new(r"^(js(on)?|jq)$").unwrap();
    static ref STANDARD_RE: Regex =
        Regex::new(r"^(standard|default|graphic.*|ansi|x?term.*|(u?rx)?vt(-?\d+)?)$").unwrap();
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown log handler '{0}' (expected one of: null, standard, ascii, json)")]
pub struct ParseLogHandlerError(pub String);

#[derive(Error, Debug)]
pub enum LogSinkError {
    #[error("log path is empty")]
    EmptyPath,
    #[error("could not open log file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The output formats a log context can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogHandler {
    /// Nothing is written.
    #[default]
    Null,
    /// Colored, human-oriented lines.
    Standard,
    /// Plain `key=value` lines.
    Ascii,
    /// One JSON object per line.
    Json,
}

impl LogHandler {
    /// Every handler, in the order they are listed to the user.
    pub const ALL: [Self; 4] = [Self::Null, Self::Standard, Self::Ascii, Self::Json];

    /// The canonical names of all handlers.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|h| h.as_str()).collect()
    }

    /// The canonical name of this handler.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Standard => "standard",
            Self::Ascii => "ascii",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogHandler {
    type Err = ParseLogHandlerError;

    /// Accepts the canonical names plus a handful of common aliases
    /// (`none`, `/dev/null`, `text`, `plain`, `jq`, `ansi`, `xterm-256color`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        if NULL_RE.is_match(&key) {
            Ok(Self::Null)
        } else if ASCII_RE.is_match(&key) {
            Ok(Self::Ascii)
        } else if JSON_RE.is_match(&key) {
            Ok(Self::Json)
        } else if STANDARD_RE.is_match(&key) {
            Ok(Self::Standard)
        } else {
            Err(ParseLogHandlerError(s.to_string()))
        }
    }
}

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogSink {
    Stdout,
    #[default]
    Stderr,
    /// A regular file, truncated unless `append` is set.
    File { path: PathBuf, append: bool },
}

impl FromStr for LogSink {
    type Err = LogSinkError;

    /// `-` is stdout, `+` is stderr, `>path` truncates and `>>path` appends.
    /// Whitespace between the carets and the path is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim_start();
        let mut carets = 0;
        while carets < 2 {
            match rest.strip_prefix('>') {
                Some(tail) => {
                    rest = tail.trim_start();
                    carets += 1;
                }
                None => break,
            }
        }
        let path = rest.trim_end();
        match path {
            "" => Err(LogSinkError::EmptyPath),
            "-" => Ok(Self::Stdout),
            "+" => Ok(Self::Stderr),
            _ => Ok(Self::File {
                path: PathBuf::from(path),
                append: carets == 2,
            }),
        }
    }
}

impl LogSink {
    /// Opens the sink as an `env_logger` target.
    pub fn open(&self) -> Result<Target, LogSinkError> {
        match self {
            Self::Stdout => Ok(Target::Stdout),
            Self::Stderr => Ok(Target::Stderr),
            Self::File { path, append } => {
                let mut options = OpenOptions::new();
                options.create(true);
                if *append {
                    options.append(true);
                } else {
                    options.write(true).truncate(true);
                }
                #[cfg(unix)]
                {
                    use std::os::unix::fs::OpenOptionsExt;
                    options.mode(crate::constants::PERM_LOG_FILE);
                }
                let file = options.open(path).map_err(|e| LogSinkError::Open {
                    path: path.display().to_string(),
                    source: e,
                })?;
                Ok(Target::Pipe(Box::new(file)))
            }
        }
    }
}

/// An explicitly passed logging handle with structured fields.
#[derive(Clone)]
pub struct LogContext {
    handler: LogHandler,
    logger: Option<Arc<env_logger::Logger>>,
    fields: Vec<(String, String)>,
    /// Standard records are colored only when the sink is a terminal.
    color: bool,
}

impl fmt::Debug for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogContext")
            .field("handler", &self.handler)
            .field("fields", &self.fields)
            .finish()
    }
}

impl LogContext {
    /// Builds a context writing `handler`-formatted records to `target`.
    /// With `debug`, debug records are emitted and every record is tagged
    /// with the process name and id.
    pub fn new(handler: LogHandler, target: Target, debug: bool) -> Self {
        if handler == LogHandler::Null {
            return Self::null();
        }

        let level = if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };

        let color = match &target {
            Target::Stdout => io::stdout().is_terminal(),
            Target::Stderr => io::stderr().is_terminal(),
            _ => false,
        };

        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(level)
            .target(target)
            .write_style(WriteStyle::Never)
            .format(|buf, record| writeln!(buf, "{}", record.args()));

        let mut context = Self {
            handler,
            logger: Some(Arc::new(builder.build())),
            fields: Vec::new(),
            color,
        };
        if debug {
            context = context
                .with_field("proc", PACKAGE_NAME)
                .with_field("pid", format!("0x{:08X}", std::process::id()));
        }
        context
    }

    /// A context that discards everything.
    pub fn null() -> Self {
        Self {
            handler: LogHandler::Null,
            logger: None,
            fields: Vec::new(),
            color: false,
        }
    }

    /// Returns a child context carrying one more field.
    pub fn with_field(&self, key: &str, value: impl fmt::Display) -> Self {
        let mut child = self.clone();
        child.fields.push((key.to_string(), value.to_string()));
        child
    }

    /// Emits a debug record; dropped unless debug logging is on.
    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    fn emit(&self, level: Level, message: &str) {
        let Some(logger) = &self.logger else {
            return;
        };
        if level > logger.filter() {
            return;
        }
        let line = self.render(level, message);
        logger.log(
            &Record::builder()
                .level(level)
                .target(PACKAGE_NAME)
                .args(format_args!("{}", line))
                .build(),
        );
        logger.flush();
    }

    fn render(&self, level: Level, message: &str) -> String {
        match self.handler {
            LogHandler::Null => String::new(),
            LogHandler::Standard => {
                let tag = format!("{:>5}", level);
                if !self.color {
                    let mut line = format!("{} {:<24}", tag, message);
                    for (key, value) in &self.fields {
                        line.push_str(&format!(" {}={}", key, value));
                    }
                    return line;
                }
                let tag = match level {
                    Level::Error => tag.red().bold(),
                    Level::Warn => tag.yellow().bold(),
                    Level::Info => tag.blue().bold(),
                    Level::Debug | Level::Trace => tag.dimmed(),
                };
                let mut line = format!("{} {:<24}", tag, message);
                for (key, value) in &self.fields {
                    line.push_str(&format!(" {}={}", key.cyan(), value));
                }
                line
            }
            LogHandler::Ascii => {
                let mut line = format!(
                    "level={} msg={}",
                    level.as_str().to_lowercase(),
                    wrap_value(message)
                );
                for (key, value) in &self.fields {
                    line.push_str(&format!(" {}={}", key, wrap_value(value)));
                }
                line
            }
            LogHandler::Json => {
                let fields: serde_json::Map<String, serde_json::Value> = self
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                serde_json::json!({
                    "level": level.as_str().to_lowercase(),
                    "message": message,
                    "fields": fields,
                })
                .to_string()
            }
        }
    }
}

/// An in-memory log target, used to inspect what a context wrote.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct MemoryPipe(Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl MemoryPipe {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub(crate) fn context(&self, handler: LogHandler, debug: bool) -> LogContext {
        LogContext::new(handler, Target::Pipe(Box::new(self.clone())), debug)
    }
}

#[cfg(test)]
impl Write for MemoryPipe {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_handler_aliases() {
        assert_eq!("null".parse::<LogHandler>(), Ok(LogHandler::Null));
        assert_eq!("/dev/null".parse::<LogHandler>(), Ok(LogHandler::Null));
        assert_eq!(" None ".parse::<LogHandler>(), Ok(LogHandler::Null));
        assert_eq!("plain-text".parse::<LogHandler>(), Ok(LogHandler::Ascii));
        assert_eq!("txt".parse::<LogHandler>(), Ok(LogHandler::Ascii));
        assert_eq!("JQ".parse::<LogHandler>(), Ok(LogHandler::Json));
        assert_eq!("xterm-256color".parse::<LogHandler>(), Ok(LogHandler::Standard));
        assert_eq!("vt100".parse::<LogHandler>(), Ok(LogHandler::Standard));
    }

    #[test]
    fn test_parse_handler_unknown_is_error() {
        let err = "syslog".parse::<LogHandler>().unwrap_err();
        assert_eq!(err, ParseLogHandlerError("syslog".to_string()));
    }

    #[test]
    fn test_handler_names_round_trip() {
        for name in LogHandler::names() {
            assert_eq!(name.parse::<LogHandler>().unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_parse_sink() {
        assert_eq!("-".parse::<LogSink>().unwrap(), LogSink::Stdout);
        assert_eq!("+".parse::<LogSink>().unwrap(), LogSink::Stderr);
        assert_eq!(
            "> /tmp/gosh.log".parse::<LogSink>().unwrap(),
            LogSink::File {
                path: PathBuf::from("/tmp/gosh.log"),
                append: false
            }
        );
        assert_eq!(
            ">>gosh.log".parse::<LogSink>().unwrap(),
            LogSink::File {
                path: PathBuf::from("gosh.log"),
                append: true
            }
        );
        assert!(matches!(">>".parse::<LogSink>(), Err(LogSinkError::EmptyPath)));
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gosh.log");
        std::fs::write(&path, "first\n").unwrap();

        let sink: LogSink = format!(">>{}", path.display()).parse().unwrap();
        let ctx = LogContext::new(LogHandler::Ascii, sink.open().unwrap(), false);
        ctx.info("second");

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("first\n"));
        assert!(written.contains("msg=\"second\""));
    }

    #[test]
    fn test_ascii_records_carry_fields() {
        let pipe = MemoryPipe::default();
        let ctx = pipe.context(LogHandler::Ascii, false);
        ctx.with_field("profile", "auto").warn("skipping profile");
        assert_eq!(
            pipe.contents(),
            "level=warn msg=\"skipping profile\" profile=\"auto\"\n"
        );
    }

    #[test]
    fn test_json_records_are_objects() {
        let pipe = MemoryPipe::default();
        let ctx = pipe.context(LogHandler::Json, false);
        ctx.with_field("size", "4B").info("loaded profile");

        let line = pipe.contents();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["level"], "info");
        assert_eq!(value["message"], "loaded profile");
        assert_eq!(value["fields"]["size"], "4B");
    }

    #[test]
    fn test_debug_records_filtered_without_debug_flag() {
        let pipe = MemoryPipe::default();
        pipe.context(LogHandler::Ascii, false).debug("hidden");
        assert!(pipe.contents().is_empty());

        let pipe = MemoryPipe::default();
        pipe.context(LogHandler::Ascii, true).debug("shown");
        let out = pipe.contents();
        assert!(out.contains("msg=\"shown\""));
        assert!(out.contains("proc=\"gosh\""));
        assert!(out.contains("pid=\"0x"));
    }

    #[test]
    fn test_standard_records_are_plain_in_files() {
        colored::control::set_override(true);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gosh.log");

        let sink: LogSink = format!(">{}", path.display()).parse().unwrap();
        let ctx = LogContext::new(LogHandler::Standard, sink.open().unwrap(), false);
        ctx.with_field("profile", "auto").warn("skipping profile");

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains('\x1b'));
        assert!(written.starts_with(" WARN skipping profile"));
        assert!(written.trim_end().ends_with("profile=auto"));
    }

    #[test]
    fn test_null_context_writes_nothing() {
        let pipe = MemoryPipe::default();
        pipe.context(LogHandler::Null, true).error("dropped");
        assert!(pipe.contents().is_empty());
    }
}
