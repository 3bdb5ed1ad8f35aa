//! mx Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It is the shared configuration vocabulary of the mx crates: the runtime
//! reads nothing from here on its own, the CLI loads it from JSON and passes
//! the relevant pieces down.

use serde::Deserialize;
use std::path::PathBuf;

/// Verbosity threshold for one log area
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Nothing at all
    Silent,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, colored (development)
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// Newline-delimited JSON (tool integration)
    Json,
}

/// Runtime area, used for per-area log filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Area {
    Stream,
    Format,
    Options,
    Dynlink,
    Cli,
}

impl Area {
    pub const ALL: [Area; 5] = [
        Area::Stream,
        Area::Format,
        Area::Options,
        Area::Dynlink,
        Area::Cli,
    ];

    /// Get the string name of the area
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Stream => "stream",
            Area::Format => "fmt",
            Area::Options => "options",
            Area::Dynlink => "dynlink",
            Area::Cli => "cli",
        }
    }

    /// Log target used by events in this area
    pub const fn target(&self) -> &'static str {
        match self {
            Area::Stream => "mx::stream",
            Area::Format => "mx::fmt",
            Area::Options => "mx::options",
            Area::Dynlink => "mx::dynlink",
            Area::Cli => "mx::cli",
        }
    }
}

/// Log levels, global plus optional per-area overrides
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub global: LogLevel,
    pub stream: Option<LogLevel>,
    pub fmt: Option<LogLevel>,
    pub options: Option<LogLevel>,
    pub dynlink: Option<LogLevel>,
    pub cli: Option<LogLevel>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: LogLevel::Warn,
            stream: None,
            fmt: None,
            options: None,
            dynlink: None,
            cli: None,
        }
    }
}

impl LogConfig {
    /// Effective level for an area
    pub fn level_for(&self, area: Area) -> LogLevel {
        let overridden = match area {
            Area::Stream => self.stream,
            Area::Format => self.fmt,
            Area::Options => self.options,
            Area::Dynlink => self.dynlink,
            Area::Cli => self.cli,
        };
        overridden.unwrap_or(self.global)
    }
}

/// Which option syntaxes the tokenizer recognizes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionStyleConfig {
    /// `-abc`, `--long`, `--key=value`
    Unix,
    /// `/flag`, `/key:value`
    Dos,
    #[default]
    Both,
}

/// Top-level configuration (`mx.json`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MxConfig {
    pub log: LogConfig,
    pub log_format: LogFormat,
    /// Also append log output to this file
    pub log_file: Option<PathBuf>,
    pub option_style: OptionStyleConfig,
    /// Transfer buffer size for stream copies
    pub copy_buffer: usize,
}

impl Default for MxConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            log_format: LogFormat::default(),
            log_file: None,
            option_style: OptionStyleConfig::default(),
            copy_buffer: 4096,
        }
    }
}
