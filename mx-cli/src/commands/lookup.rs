//! `mx lookup`

use super::report;
use crate::error::CliError;
use clap::Args;
use mx_core::dynlink::Library;
use mx_core::{printf, Fat, Stream};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Shared library to load; the running program when absent
    #[arg(short, long, value_name = "LIB")]
    pub library: Option<PathBuf>,

    /// Symbols to resolve
    #[arg(required = true)]
    pub symbols: Vec<String>,
}

pub fn run(args: &LookupArgs) -> Result<(), CliError> {
    let lib = match &args.library {
        // SAFETY: loading the library named on the command line is the point of the command
        Some(path) => unsafe { Library::try_open(path)? },
        None => Library::this(),
    };
    let result = resolve(&lib, &args.symbols, mx_core::stdout());
    if !lib.is_self() {
        lib.close();
    }
    result
}

/// Print `name<TAB>address` per symbol; unresolved symbols are reported and counted
pub fn resolve(lib: &Library, symbols: &[String], out: Fat<'_, dyn Stream>) -> Result<(), CliError> {
    let mut missing = 0;
    for symbol in symbols {
        match lib.symbol(symbol) {
            Some(address) => {
                printf!(out, "{}\t{:p}\n", symbol, address.as_ptr());
            }
            None => {
                report(&CliError::Symbol(symbol.clone()));
                missing += 1;
            }
        }
    }
    if missing > 0 {
        return Err(CliError::Inputs(missing));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_fails_to_load() {
        let missing = std::env::temp_dir().join(format!("mx_cli_nolib_{}.so", std::process::id()));
        let args = LookupArgs {
            library: Some(missing),
            symbols: vec!["strlen".to_string()],
        };
        assert!(matches!(run(&args), Err(CliError::Load(_))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_resolve_in_running_program() {
        let out = mx_core::MemoryStream::new();
        let symbols = vec!["strlen".to_string(), "mx_no_such_symbol".to_string()];
        let result = resolve(&Library::this(), &symbols, out.as_stream());

        assert!(matches!(result, Err(CliError::Inputs(1))));
        let text = String::from_utf8(out.contents()).unwrap();
        assert!(text.starts_with("strlen\t0x"));
        assert_eq!(text.lines().count(), 1);
    }
}
