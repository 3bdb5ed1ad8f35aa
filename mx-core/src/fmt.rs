//! Formatted writer
//!
//! Renders `fmt::Arguments` into a fixed stack scratch buffer and forwards the
//! bytes through the stream's write operation. Text that does not fit is
//! rendered a second time into a heap buffer of exactly the measured length.

use crate::binding::Fat;
use crate::stream::Stream;
use std::fmt::{self, Write as _};
use tracing::{trace, warn};

/// Size of the on-stack render buffer
pub const SCRATCH_SIZE: usize = 256;

/// Bounded render target that keeps counting past its capacity
struct Scratch<'b> {
    buf: &'b mut [u8],
    needed: usize,
}

impl fmt::Write for Scratch<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let start = self.needed.min(self.buf.len());
        let take = s.len().min(self.buf.len() - start);
        self.buf[start..start + take].copy_from_slice(&s.as_bytes()[..take]);
        self.needed += s.len();
        Ok(())
    }
}

/// Render `args` into `buf`, truncating at its end.
///
/// Returns the full length of the rendered text, which exceeds `buf.len()`
/// when the output was truncated.
pub fn render_into(buf: &mut [u8], args: fmt::Arguments<'_>) -> usize {
    let mut scratch = Scratch { buf, needed: 0 };
    if scratch.write_fmt(args).is_err() {
        // only a formatting trait impl can fail here
        warn!(target: crate::targets::FMT, "formatting implementation returned an error");
    }
    scratch.needed
}

/// Write formatted text to `stream`.
///
/// Returns whatever the stream's write returned, so a short count surfaces a
/// partial write.
///
/// # Panics
/// If the stream has no writer
#[track_caller]
pub fn vprintf(stream: Fat<'_, dyn Stream>, args: fmt::Arguments<'_>) -> usize {
    if let Some(text) = args.as_str() {
        return stream.write(text.as_bytes());
    }

    let mut scratch = [0u8; SCRATCH_SIZE];
    let needed = render_into(&mut scratch, args);
    if needed <= SCRATCH_SIZE {
        return stream.write(&scratch[..needed]);
    }

    trace!(target: crate::targets::FMT, needed, "text exceeds scratch buffer, rendering on heap");
    let mut heap = vec![0u8; needed];
    // arguments are evaluated again, so the second pass may differ in length
    let rendered = render_into(&mut heap, args).min(needed);
    stream.write(&heap[..rendered])
}

impl<'a> Fat<'a, dyn Stream> {
    /// Method form of [`vprintf`]
    #[track_caller]
    pub fn printf(self, args: fmt::Arguments<'_>) -> usize {
        vprintf(self, args)
    }
}

/// `printf!(stream, "x = {}", x)` writes formatted text to a stream binding
/// and evaluates to the byte count returned by its write.
#[macro_export]
macro_rules! printf {
    ($stream:expr, $($arg:tt)*) => {
        $crate::fmt::vprintf($stream, ::std::format_args!($($arg)*))
    };
}
