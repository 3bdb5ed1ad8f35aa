//! In-memory stream implementation

use super::{SeekOrigin, Stream, StreamFlags, StreamSlots};
use crate::binding::Fat;
use crate::fmt::render_into;
use crate::object::{Object, TypeTag};
use std::cell::{Cell, RefCell};
use std::io::{self, Cursor, Read, Seek, Write};
use tracing::trace;

/// A growable byte buffer with a cursor.
///
/// Writes overwrite at the cursor and extend the buffer past its end; seeking
/// past the end is allowed and a later write zero-fills the gap. Closing
/// keeps the bytes, they stay available through [`MemoryStream::contents`].
#[derive(Debug)]
pub struct MemoryStream {
    cursor: RefCell<Cursor<Vec<u8>>>,
    writable: bool,
    open: Cell<bool>,
    eof: Cell<bool>,
}

impl MemoryStream {
    /// Empty read/write stream
    pub fn new() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Read/write stream over `bytes`, positioned at the start
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        MemoryStream {
            cursor: RefCell::new(Cursor::new(bytes)),
            writable: true,
            open: Cell::new(true),
            eof: Cell::new(false),
        }
    }

    /// Read-only stream over `bytes`; it has no writer
    pub fn read_only(bytes: Vec<u8>) -> Self {
        MemoryStream {
            writable: false,
            ..Self::from_bytes(bytes)
        }
    }

    pub fn as_stream(&self) -> Fat<'_, dyn Stream> {
        Fat::<dyn Stream>::cast(self)
    }

    /// Copy of the buffer
    pub fn contents(&self) -> Vec<u8> {
        self.cursor.borrow().get_ref().clone()
    }

    pub fn position(&self) -> u64 {
        self.cursor.borrow().position()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner().into_inner()
    }
}

impl Default for MemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for MemoryStream {
    fn type_tag(&self) -> Option<TypeTag> {
        Some(TypeTag::of::<MemoryStream>())
    }

    fn describe(&self, buf: &mut [u8]) -> usize {
        let cursor = self.cursor.borrow();
        render_into(
            buf,
            format_args!(
                "memory stream ({} bytes at {}, {})",
                cursor.get_ref().len(),
                cursor.position(),
                if self.open.get() { "open" } else { "closed" }
            ),
        )
        .min(buf.len())
    }

    fn destruct(&self) {
        self.close();
    }
}

impl Stream for MemoryStream {
    fn stream_slots(&self) -> StreamSlots {
        if !self.open.get() {
            return StreamSlots::FLAGS | StreamSlots::CLOSE;
        }
        let mut slots = StreamSlots::FLAGS | StreamSlots::CLOSE | StreamSlots::READ | StreamSlots::SEEK;
        if self.writable {
            slots |= StreamSlots::WRITE;
        }
        slots
    }

    fn flags(&self) -> StreamFlags {
        if !self.open.get() {
            return StreamFlags::EOF;
        }
        if self.eof.get() {
            StreamFlags::OPEN | StreamFlags::EOF
        } else {
            StreamFlags::OPEN
        }
    }

    fn read(&self, buf: &mut [u8]) -> usize {
        // reading from an in-memory cursor cannot fail
        let n = self.cursor.borrow_mut().read(buf).unwrap_or(0);
        if n == 0 && !buf.is_empty() {
            self.eof.set(true);
        }
        trace!(target: crate::targets::STREAM, n, "memory read");
        n
    }

    fn write(&self, buf: &[u8]) -> usize {
        let n = self.cursor.borrow_mut().write(buf).unwrap_or(0);
        trace!(target: crate::targets::STREAM, n, "memory write");
        n
    }

    fn seek(&self, offset: i64, origin: SeekOrigin) -> u64 {
        let mut cursor = self.cursor.borrow_mut();
        let moved = origin
            .with_offset(offset)
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))
            .and_then(|from| cursor.seek(from));
        match moved {
            Ok(pos) => {
                self.eof.set(false);
                pos
            }
            Err(_) => cursor.position(),
        }
    }

    fn close(&self) {
        if self.open.replace(false) {
            trace!(target: crate::targets::STREAM, "memory stream closed");
        }
    }
}
