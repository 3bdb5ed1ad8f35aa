//! `mx describe`

use crate::error::CliError;
use clap::Args;
use mx_core::stream::stdio::{standard, Channel};
use mx_core::{printf, Fat, FileStream, OpenMode, Stream, StreamSlot};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Also describe the three standard handles
    #[arg(long)]
    pub standard: bool,

    /// Files to open read-only and describe
    pub files: Vec<PathBuf>,
}

/// One report line for a stream binding
pub fn summary(stream: Fat<'_, dyn Stream>) -> String {
    let object = stream.as_object();
    let slots: Vec<String> = [
        StreamSlot::Read,
        StreamSlot::Write,
        StreamSlot::Seek,
        StreamSlot::Close,
    ]
    .into_iter()
    .filter(|&slot| !stream.is_empty(slot))
    .map(|slot| slot.to_string())
    .collect();

    format!(
        "{} | flags {:?} | {} bytes | ops: {}",
        object.describe_string(),
        stream.flags(),
        object.size(),
        if slots.is_empty() { "none".to_string() } else { slots.join(", ") }
    )
}

pub fn run(args: &DescribeArgs) -> Result<(), CliError> {
    let out = mx_core::stdout();
    if args.standard {
        for channel in [Channel::Input, Channel::Output, Channel::Error] {
            printf!(out, "{}\n", summary(Fat::<dyn Stream>::cast(standard(channel))));
        }
    }
    for path in &args.files {
        // the sentinel is described too, so failures show up as a closed stream
        let file = FileStream::open(path, OpenMode::READ);
        printf!(out, "{}\n", summary(file.as_stream()));
        if let Some(kind) = file.last_error() {
            printf!(out, "  last error: {}\n", std::io::Error::from(kind));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mx_core::MemoryStream;

    #[test]
    fn test_summary_lists_operations() {
        let mem = MemoryStream::read_only(b"abc".to_vec());
        let line = summary(mem.as_stream());
        assert!(line.starts_with("memory stream (3 bytes at 0, open)"));
        assert!(line.ends_with("ops: reader, seeker, closer"));
    }

    #[test]
    fn test_summary_of_sentinel() {
        let path = std::env::temp_dir().join(format!("mx_cli_describe_{}", std::process::id()));
        let file = FileStream::open(&path, OpenMode::READ);
        let line = summary(file.as_stream());
        assert!(line.contains("closed"));
        assert!(line.ends_with("ops: closer"));
    }
}
