//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现按区域（stream / fmt / options / cli）的日志控制。
//! 控制台输出经由 mx 的标准错误流，stdout 只留给命令本身的输出。

use crate::error::CliError;
use mx_config::{Area, LogConfig, LogFormat, LogLevel};
use mx_core::stream::io::StreamWriter;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

/// Map a configured level onto a tracing filter
pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Silent => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

/// Per-area filter targets
pub fn targets(log_config: &LogConfig) -> Targets {
    Area::ALL.iter().fold(
        Targets::new().with_default(level_filter(log_config.global)),
        |targets, &area| targets.with_target(area.target(), level_filter(log_config.level_for(area))),
    )
}

/// 使用指定格式和日志配置初始化日志系统
pub fn init_with_file(
    log_config: &LogConfig,
    format: LogFormat,
    file: Option<&Path>,
) -> Result<(), CliError> {
    let targets = targets(log_config);

    let ansi = use_ansi(format, io::stderr().is_terminal());
    let console_layer = create_format_layer(format, ansi, || StreamWriter::new(mx_core::stderr()))
        .with_filter(targets.clone());

    // If file specified, output to both console and file
    let file_layer = match file {
        Some(path) => {
            let handle = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| CliError::LogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(handle))
                    .with_filter(targets),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;
    Ok(())
}

/// Colour escapes only for human-readable output on a terminal
fn use_ansi(format: LogFormat, is_terminal: bool) -> bool {
    is_terminal && format != LogFormat::Json
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(
    format: LogFormat,
    ansi: bool,
    make_writer: F,
) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>
where
    W: io::Write + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_ansi(ansi)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_ansi(ansi)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_ansi(ansi)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
    }
}
