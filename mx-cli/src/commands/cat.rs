//! `mx cat`

use super::for_each_input;
use crate::config::config;
use crate::error::CliError;
use clap::Args;
use mx_core::stream::copy;
use mx_core::{Fat, Stream};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct CatArgs {
    /// Files to print; `-` or nothing reads standard input
    pub files: Vec<PathBuf>,
}

pub fn run(args: &CatArgs) -> Result<(), CliError> {
    let mut buf = vec![0u8; config().copy_buffer.max(1)];
    for_each_input(&args.files, |path, input| {
        cat_stream(path, input.stream(), mx_core::stdout(), &mut buf).map(|_| ())
    })
}

/// Copy one input to `out`; output that is not fully accepted fails the operand
pub fn cat_stream(
    path: &Path,
    input: Fat<'_, dyn Stream>,
    out: Fat<'_, dyn Stream>,
    buf: &mut [u8],
) -> Result<u64, CliError> {
    let copied = copy(input, out, buf).map_err(|source| CliError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(target: crate::LOG_TARGET, path = %path.display(), copied, "cat");
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mx_core::{MemoryStream, Object, ShortWrite, StreamFlags, StreamSlots};

    /// Output that refuses every byte, like a full disk
    struct Full;

    impl Object for Full {}

    impl Stream for Full {
        fn stream_slots(&self) -> StreamSlots {
            StreamSlots::WRITE
        }

        fn flags(&self) -> StreamFlags {
            StreamFlags::OPEN
        }

        fn write(&self, _buf: &[u8]) -> usize {
            0
        }
    }

    #[test]
    fn test_cat_copies_everything() {
        let input = MemoryStream::from_bytes(b"hello\n".to_vec());
        let out = MemoryStream::new();
        let mut buf = [0u8; 4];
        let copied = cat_stream(Path::new("in"), input.as_stream(), out.as_stream(), &mut buf).unwrap();
        assert_eq!(copied, 6);
        assert_eq!(out.contents(), b"hello\n");
    }

    #[test]
    fn test_cat_fails_when_output_rejects_bytes() {
        let input = MemoryStream::from_bytes(b"hello\n".to_vec());
        let mut buf = [0u8; 16];
        let err = cat_stream(
            Path::new("in"),
            input.as_stream(),
            Fat::<dyn Stream>::cast(&Full),
            &mut buf,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Output { source: ShortWrite { copied: 0 }, .. }
        ));
        assert_eq!(err.to_string(), "cannot write 'in' to output: short write after 0 bytes");
    }
}
