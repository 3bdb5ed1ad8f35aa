//! Stream capability
//!
//! Byte-oriented, blocking I/O behind a trait object. Implementations:
//! - [`stdio`]: the three process-wide standard handles
//! - [`file::FileStream`]: an OS file opened with an [`OpenMode`]
//! - [`memory::MemoryStream`]: a growable in-memory buffer
//!
//! Callers go through the gateway methods on `Fat<dyn Stream>`. Each checks
//! that the concrete stream populates the operation before calling it.

pub mod file;
pub mod io;
pub mod memory;
pub mod stdio;

use crate::binding::{Capability, Embeds, Fat};
use crate::error::ShortWrite;
use crate::object::Object;
use bitflags::bitflags;
use std::fmt;
use std::io::SeekFrom;

bitflags! {
    /// Observable stream state. OPEN and EOF are independent.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StreamFlags: u32 {
        /// Backed by a live resource
        const OPEN = 1 << 0;
        /// A read has hit end of input, or there is nothing to read from
        const EOF = 1 << 1;
    }
}

bitflags! {
    /// How to open a file
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct OpenMode: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const APPEND = 1 << 2;
        /// Create the file, truncating an existing one
        const NEW = 1 << 3;
    }
}

impl OpenMode {
    /// Whether a stream opened with this mode accepts writes
    pub fn writes(self) -> bool {
        self.intersects(OpenMode::WRITE | OpenMode::APPEND | OpenMode::NEW)
    }
}

bitflags! {
    /// Set of populated Stream operations
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct StreamSlots: u8 {
        const FLAGS = 1 << 0;
        const READ = 1 << 1;
        const WRITE = 1 << 2;
        const SEEK = 1 << 3;
        const CLOSE = 1 << 4;
    }
}

/// One operation of the Stream capability
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamSlot {
    Flags,
    Read,
    Write,
    Seek,
    Close,
}

impl StreamSlot {
    pub fn bit(self) -> StreamSlots {
        match self {
            StreamSlot::Flags => StreamSlots::FLAGS,
            StreamSlot::Read => StreamSlots::READ,
            StreamSlot::Write => StreamSlots::WRITE,
            StreamSlot::Seek => StreamSlots::SEEK,
            StreamSlot::Close => StreamSlots::CLOSE,
        }
    }
}

impl fmt::Display for StreamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamSlot::Flags => "flags query",
            StreamSlot::Read => "reader",
            StreamSlot::Write => "writer",
            StreamSlot::Seek => "seeker",
            StreamSlot::Close => "closer",
        })
    }
}

/// Reference point for [`Stream::seek`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekOrigin {
    Start,
    Current,
    End,
}

impl SeekOrigin {
    /// The equivalent `SeekFrom`, or `None` for a negative offset from the start
    pub fn with_offset(self, offset: i64) -> Option<SeekFrom> {
        match self {
            SeekOrigin::Start => u64::try_from(offset).ok().map(SeekFrom::Start),
            SeekOrigin::Current => Some(SeekFrom::Current(offset)),
            SeekOrigin::End => Some(SeekFrom::End(offset)),
        }
    }
}

/// View of any `'static` object as `dyn Object`
pub trait AsObject {
    fn as_object(&self) -> &(dyn Object + 'static);
}

impl<T: Object + 'static> AsObject for T {
    fn as_object(&self) -> &(dyn Object + 'static) {
        self
    }
}

/// Stream capability
///
/// Operations take `&self`: bindings are shared views, so implementations keep
/// their mutable state behind interior mutability.
pub trait Stream: Object + AsObject {
    /// Operations this implementation currently provides
    fn stream_slots(&self) -> StreamSlots;

    fn flags(&self) -> StreamFlags;

    /// Read up to `buf.len()` bytes. Blocks; returns 0 only at end of input.
    fn read(&self, buf: &mut [u8]) -> usize {
        let _ = buf;
        unpopulated(StreamSlot::Read)
    }

    /// Write up to `buf.len()` bytes. A short count is a partial write.
    fn write(&self, buf: &[u8]) -> usize {
        let _ = buf;
        unpopulated(StreamSlot::Write)
    }

    /// Reposition and return the new absolute offset
    fn seek(&self, offset: i64, origin: SeekOrigin) -> u64 {
        let _ = (offset, origin);
        unpopulated(StreamSlot::Seek)
    }

    /// Release the backing resource. Closing twice is a no-op.
    fn close(&self) {}
}

fn unpopulated(slot: StreamSlot) -> ! {
    panic!("stream has no {}", slot)
}

impl Capability for dyn Stream {
    type Slot = StreamSlot;
    const NAME: &'static str = "stream";

    fn has_slot(&self, slot: StreamSlot) -> bool {
        self.stream_slots().contains(slot.bit())
    }
}

impl Embeds<dyn Object> for dyn Stream {
    fn embedded(&self) -> &(dyn Object + 'static) {
        self.as_object()
    }
}

impl<'a> Fat<'a, dyn Stream> {
    /// Bind a concrete stream to the Stream table
    pub fn cast<T: Stream + 'static>(stream: &'a T) -> Self {
        Fat::bind(stream)
    }

    /// The Base Object view of this stream
    pub fn as_object(self) -> Fat<'a, dyn Object> {
        self.upcast()
    }

    /// Current flags; the empty set when the stream has no flags query
    pub fn flags(self) -> StreamFlags {
        if self.is_empty(StreamSlot::Flags) {
            return StreamFlags::empty();
        }
        self.invoke(StreamSlot::Flags, |s| s.flags())
    }

    pub fn is_open(self) -> bool {
        self.flags().contains(StreamFlags::OPEN)
    }

    pub fn is_eof(self) -> bool {
        self.flags().contains(StreamFlags::EOF)
    }

    /// # Panics
    /// If the stream has no reader
    #[track_caller]
    pub fn read(self, buf: &mut [u8]) -> usize {
        self.invoke(StreamSlot::Read, |s| s.read(buf))
    }

    /// # Panics
    /// If the stream has no writer
    #[track_caller]
    pub fn write(self, buf: &[u8]) -> usize {
        self.invoke(StreamSlot::Write, |s| s.write(buf))
    }

    /// # Panics
    /// If the stream has no seeker
    #[track_caller]
    pub fn seek(self, offset: i64, origin: SeekOrigin) -> u64 {
        self.invoke(StreamSlot::Seek, |s| s.seek(offset, origin))
    }

    /// Close the stream; a no-op for streams without a closer
    pub fn close(self) {
        if self.is_empty(StreamSlot::Close) {
            return;
        }
        self.invoke(StreamSlot::Close, |s| s.close())
    }
}

/// Copy `from` into `to` until end of input, using `buf` as the transfer
/// buffer. Returns the number of bytes written, or [`ShortWrite`] when `to`
/// accepted less than it was given.
///
/// # Panics
/// If `from` has no reader, `to` has no writer, or `buf` is empty
#[track_caller]
pub fn copy(
    from: Fat<'_, dyn Stream>,
    to: Fat<'_, dyn Stream>,
    buf: &mut [u8],
) -> Result<u64, ShortWrite> {
    assert!(!buf.is_empty(), "copy buffer must not be empty");
    let mut total = 0u64;
    loop {
        let n = from.read(buf);
        if n == 0 {
            return Ok(total);
        }
        let written = to.write(&buf[..n]);
        total += written as u64;
        if written < n {
            tracing::debug!(target: crate::targets::STREAM, written, wanted = n, "short write, stopping copy");
            return Err(ShortWrite { copied: total });
        }
    }
}
