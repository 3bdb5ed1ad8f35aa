//! CLI 配置
//!
//! 读取 `mx.json`，叠加命令行参数，并保存为全局单例（供各子命令使用）。

use crate::error::CliError;
use mx_config::{LogFormat, LogLevel, MxConfig};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG: &str = "mx.json";

/// Command-line settings that take precedence over the config file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub log_level: Option<LogLevel>,
    pub verbose: u8,
    pub quiet: bool,
    pub log_format: Option<LogFormat>,
    pub log_file: Option<PathBuf>,
}

/// Read the config file.
///
/// An explicit path must exist. Without one, `mx.json` is used when present
/// and built-in defaults otherwise.
pub fn load(explicit: Option<&Path>) -> Result<MxConfig, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            if !default.exists() {
                return Ok(MxConfig::default());
            }
            default
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| CliError::ConfigRead {
        path: path.clone(),
        source,
    })?;
    parse(&path, &content)
}

/// Parse config JSON; `path` is only used for error messages
pub fn parse(path: &Path, content: &str) -> Result<MxConfig, CliError> {
    serde_json::from_str(content).map_err(|source| CliError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse log level string
pub fn parse_log_level(s: &str) -> Option<LogLevel> {
    match s.to_lowercase().as_str() {
        "silent" | "off" => Some(LogLevel::Silent),
        "error" => Some(LogLevel::Error),
        "warn" => Some(LogLevel::Warn),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        "trace" => Some(LogLevel::Trace),
        _ => None,
    }
}

/// clap value parser for `--log-level`
pub fn parse_log_level_arg(s: &str) -> Result<LogLevel, String> {
    parse_log_level(s).ok_or_else(|| format!("unknown log level '{}'", s))
}

/// Apply command-line overrides. `-q` wins over `-v`, both adjust an
/// explicit `--log-level`.
pub fn apply(config: &mut MxConfig, overrides: &Overrides) {
    if let Some(level) = overrides.log_level {
        config.log.global = level;
    }
    if overrides.quiet {
        config.log.global = LogLevel::Error;
    } else {
        match overrides.verbose {
            0 => {}
            1 => config.log.global = config.log.global.max(LogLevel::Info),
            2 => config.log.global = config.log.global.max(LogLevel::Debug),
            _ => config.log.global = LogLevel::Trace,
        }
    }
    if let Some(format) = overrides.log_format {
        config.log_format = format;
    }
    if let Some(file) = &overrides.log_file {
        config.log_file = Some(file.clone());
    }
}

// Global config singleton for CLI convenience
static GLOBAL_CONFIG: OnceCell<MxConfig> = OnceCell::new();

/// Initialize global configuration (once, before running a command)
pub fn init(config: MxConfig) -> Result<(), CliError> {
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| CliError::ConfigInitialized)
}

/// Get global config reference; built-in defaults if never initialized
pub fn config() -> &'static MxConfig {
    GLOBAL_CONFIG.get_or_init(MxConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mx_cli_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("off"), Some(LogLevel::Silent));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn test_parse_log_level_arg() {
        assert_eq!(parse_log_level_arg("warn"), Ok(LogLevel::Warn));
        assert_eq!(
            parse_log_level_arg("chatty"),
            Err("unknown log level 'chatty'".to_string())
        );
    }

    #[test]
    fn test_load_explicit_file() {
        let path = temp_file("config_ok");
        std::fs::write(&path, r#"{ "copy_buffer": 64, "option_style": "dos" }"#).unwrap();

        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.copy_buffer, 64);
        assert_eq!(cfg.option_style, mx_config::OptionStyleConfig::Dos);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let path = temp_file("config_missing");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(load(Some(&path)), Err(CliError::ConfigRead { .. })));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse(Path::new("broken.json"), "{ not json").unwrap_err();
        assert!(err.to_string().starts_with("cannot parse 'broken.json'"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut cfg = MxConfig::default();
        apply(
            &mut cfg,
            &Overrides {
                verbose: 2,
                log_format: Some(LogFormat::Json),
                ..Overrides::default()
            },
        );
        assert_eq!(cfg.log.global, LogLevel::Debug);
        assert_eq!(cfg.log_format, LogFormat::Json);

        apply(
            &mut cfg,
            &Overrides {
                verbose: 3,
                quiet: true,
                ..Overrides::default()
            },
        );
        assert_eq!(cfg.log.global, LogLevel::Error);
    }

    #[test]
    fn test_verbose_never_lowers_configured_level() {
        let mut cfg = MxConfig::default();
        cfg.log.global = LogLevel::Trace;
        apply(
            &mut cfg,
            &Overrides {
                verbose: 1,
                ..Overrides::default()
            },
        );
        assert_eq!(cfg.log.global, LogLevel::Trace);
    }

    #[test]
    fn test_global_config_falls_back_to_default() {
        // shared process state: only checks what holds in either order
        let cfg = config();
        assert!(GLOBAL_CONFIG.get().is_some());
        assert!(init(cfg.clone()).is_err());
    }
}
