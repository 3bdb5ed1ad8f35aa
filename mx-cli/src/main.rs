//! mx CLI - Command line interface
//!
//! Stream tools built on the mx runtime. Settings come from `mx.json` (or
//! `--config`), overridden by command-line flags.

use clap::Parser;
use mx_config::LogFormat;
use mx_core::{printf, stderr};
use std::path::PathBuf;
use std::process;
use tracing::debug;

mod commands;
mod config;
mod error;
mod logging;

use crate::commands::Command;
use crate::config::Overrides;
use crate::error::CliError;

/// `tracing` target of the command layer
pub(crate) const LOG_TARGET: &str = mx_config::Area::Cli.target();

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<FormatArg> for LogFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pretty => LogFormat::Pretty,
            FormatArg::Compact => LogFormat::Compact,
            FormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "mx", about = "Byte stream tools on the mx runtime", version)]
struct Cli {
    /// Configuration file (default: ./mx.json when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level: silent, error, warn, info, debug, trace
    #[arg(long, value_parser = config::parse_log_level_arg, global = true)]
    log_level: Option<mx_config::LogLevel>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[arg(long, value_enum, global = true)]
    log_format: Option<FormatArg>,

    /// Also append log output to this file
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            log_level: self.log_level,
            verbose: self.verbose,
            quiet: self.quiet,
            log_format: self.log_format.map(LogFormat::from),
            log_file: self.log_file.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        printf!(stderr(), "Error: {}\n", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let mut settings = config::load(cli.config.as_deref())?;
    config::apply(&mut settings, &cli.overrides());

    logging::init_with_file(
        &settings.log,
        settings.log_format,
        settings.log_file.as_deref(),
    )?;

    // Initialize CLI config (global singleton for convenience)
    config::init(settings)?;

    debug!(target: crate::LOG_TARGET, command = ?cli.command, "running");
    cli.command.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mx", "cat", "a.txt", "-vv", "--log-format", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let overrides = cli.overrides();
        assert_eq!(overrides.log_format, Some(LogFormat::Json));
        assert!(matches!(cli.command, Command::Cat(ref args) if args.files == [PathBuf::from("a.txt")]));
    }

    #[test]
    fn test_parse_digest_algorithm() {
        let cli = Cli::try_parse_from(["mx", "digest", "-a", "adler32"]).unwrap();
        match cli.command {
            Command::Digest(args) => {
                assert_eq!(args.algorithm, mx_core::digest::Algorithm::Adler32);
                assert!(args.files.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["mx", "digest", "-a", "md5"]).is_err());
    }

    #[test]
    fn test_parse_tokens_after_double_dash() {
        let cli = Cli::try_parse_from(["mx", "tokens", "--style", "unix", "--", "-x", "--k=v"]).unwrap();
        match cli.command {
            Command::Tokens(args) => assert_eq!(args.args, ["-x", "--k=v"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_lookup() {
        let cli = Cli::try_parse_from(["mx", "lookup", "-l", "libc.so.6", "strlen", "puts"]).unwrap();
        match cli.command {
            Command::Lookup(args) => {
                assert_eq!(args.library, Some(PathBuf::from("libc.so.6")));
                assert_eq!(args.symbols, ["strlen", "puts"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["mx", "lookup"]).is_err());
    }

    #[test]
    fn test_builds_abort_on_panic() {
        // a failed dispatch assertion must end the process, not unwind into callers
        let manifest = include_str!("../../Cargo.toml");
        for profile in ["[profile.dev]", "[profile.release]"] {
            let section = manifest
                .split(profile)
                .nth(1)
                .unwrap_or_else(|| panic!("{} missing", profile));
            let section = section.split("\n[").next().unwrap();
            assert!(section.contains("panic = \"abort\""), "{} must abort", profile);
        }
    }

    #[test]
    fn test_parse_log_level_flag() {
        let cli = Cli::try_parse_from(["mx", "--log-level", "trace", "describe"]).unwrap();
        assert_eq!(cli.log_level, Some(mx_config::LogLevel::Trace));
        assert!(Cli::try_parse_from(["mx", "--log-level", "chatty", "describe"]).is_err());
    }
}
