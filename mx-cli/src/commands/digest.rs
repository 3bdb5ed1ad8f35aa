//! `mx digest`

use super::for_each_input;
use crate::config::config;
use crate::error::CliError;
use clap::Args;
use mx_core::digest::{Algorithm, Hasher};
use mx_core::{printf, Fat, Stream};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DigestArgs {
    /// adler32, fnv0, fnv1 or fnv1a
    #[arg(short, long, default_value = "fnv1a")]
    pub algorithm: Algorithm,

    /// Files to digest; `-` or nothing reads standard input
    pub files: Vec<PathBuf>,
}

/// Feed a whole stream through `hasher`
pub fn digest_stream(stream: Fat<'_, dyn Stream>, hasher: &mut Hasher, buf: &mut [u8]) -> u64 {
    let mut total = 0u64;
    loop {
        let n = stream.read(buf);
        if n == 0 {
            return total;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
}

pub fn run(args: &DigestArgs) -> Result<(), CliError> {
    let mut buf = vec![0u8; config().copy_buffer.max(1)];
    for_each_input(&args.files, |path, input| {
        let mut hasher = args.algorithm.hasher();
        digest_stream(input.stream(), &mut hasher, &mut buf);
        printf!(
            mx_core::stdout(),
            "{}:{:08x}  {}\n",
            args.algorithm,
            hasher.finish(),
            path.display()
        );
        Ok(())
    })
}
