//! Subcommands
//!
//! Every command writes its output through the mx standard streams.

pub mod cat;
pub mod describe;
pub mod digest;
pub mod lookup;
pub mod tokens;

use crate::error::CliError;
use clap::Subcommand;
use mx_core::{printf, stdin, FileStream, OpenMode};
use std::path::{Path, PathBuf};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Concatenate files to standard output
    Cat(cat::CatArgs),
    /// Print a 32-bit digest per input
    Digest(digest::DigestArgs),
    /// Open inputs and show what the runtime reports about them
    Describe(describe::DescribeArgs),
    /// Show how the options tokenizer splits an argument list
    Tokens(tokens::TokensArgs),
    /// Resolve symbol addresses in a shared library
    Lookup(lookup::LookupArgs),
}

impl Command {
    pub fn run(&self) -> Result<(), CliError> {
        match self {
            Command::Cat(args) => cat::run(args),
            Command::Digest(args) => digest::run(args),
            Command::Describe(args) => describe::run(args),
            Command::Tokens(args) => tokens::run(args),
            Command::Lookup(args) => lookup::run(args),
        }
    }
}

/// One input operand: a file, or standard input for `-`
pub enum Input {
    Stdin,
    File(FileStream),
}

impl Input {
    pub fn stream(&self) -> mx_core::Fat<'_, dyn mx_core::Stream> {
        match self {
            Input::Stdin => stdin(),
            Input::File(file) => file.as_stream(),
        }
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Operands as given, or `-` when there are none
pub fn operands(paths: &[PathBuf]) -> Vec<PathBuf> {
    if paths.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        paths.to_vec()
    }
}

/// Open an operand for reading
pub fn open_input(path: &Path) -> Result<Input, CliError> {
    if is_stdin(path) {
        return Ok(Input::Stdin);
    }
    Ok(Input::File(FileStream::try_open(path, OpenMode::READ)?))
}

/// Print a per-operand failure without stopping the command
pub fn report(err: &CliError) {
    printf!(mx_core::stderr(), "mx: {}\n", err);
}

/// Run `each` over the operands, reporting failures as they happen
pub fn for_each_input(
    paths: &[PathBuf],
    mut each: impl FnMut(&Path, &Input) -> Result<(), CliError>,
) -> Result<(), CliError> {
    let mut failed = 0;
    for path in operands(paths) {
        let outcome = open_input(&path).and_then(|input| each(&path, &input));
        if let Err(e) = outcome {
            report(&e);
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(CliError::Inputs(failed));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operands_default_to_stdin() {
        assert_eq!(operands(&[]), vec![PathBuf::from("-")]);
        let given = vec![PathBuf::from("a"), PathBuf::from("b")];
        assert_eq!(operands(&given), given);
    }

    #[test]
    fn test_open_input_dash_is_stdin() {
        assert!(matches!(open_input(Path::new("-")), Ok(Input::Stdin)));
    }

    #[test]
    fn test_open_input_missing_file() {
        let path = std::env::temp_dir().join(format!("mx_cli_missing_{}", std::process::id()));
        let err = open_input(&path).err().unwrap();
        assert!(matches!(err, CliError::Open(mx_core::StreamError::NotFound { .. })));
    }

    #[test]
    fn test_for_each_input_counts_failures() {
        let missing = std::env::temp_dir().join(format!("mx_cli_gone_{}", std::process::id()));
        let mut seen = 0;
        let result = for_each_input(&[missing.clone(), missing], |_, _| {
            seen += 1;
            Ok(())
        });
        assert!(matches!(result, Err(CliError::Inputs(2))));
        assert_eq!(seen, 0);
    }

    #[test]
    fn test_for_each_input_counts_output_failures() {
        let path = std::env::temp_dir().join(format!("mx_cli_out_{}", std::process::id()));
        std::fs::write(&path, b"hello\n").unwrap();

        let result = for_each_input(&[path.clone()], |path, _| {
            Err(CliError::Output {
                path: path.to_path_buf(),
                source: mx_core::ShortWrite { copied: 0 },
            })
        });
        assert!(matches!(result, Err(CliError::Inputs(1))));

        std::fs::remove_file(&path).unwrap();
    }
}
