//! File streams
//!
//! [`FileStream`] owns one OS file. Transfers are always binary. Dropping the
//! stream, closing it or destructing it releases the file, and only the first
//! of those does anything.

use super::{OpenMode, SeekOrigin, Stream, StreamFlags, StreamSlots};
use crate::binding::Fat;
use crate::error::{StreamError, StreamResult};
use crate::fmt::render_into;
use crate::object::{Object, TypeTag};
use std::cell::{Cell, RefCell};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// A stream over an OS file
#[derive(Debug)]
pub struct FileStream {
    file: RefCell<Option<File>>,
    path: PathBuf,
    mode: OpenMode,
    eof: Cell<bool>,
    last_error: Cell<Option<io::ErrorKind>>,
}

/// Translate an open mode into `OpenOptions`, fopen style
fn open_options(mode: OpenMode) -> Option<OpenOptions> {
    if !mode.contains(OpenMode::READ) && !mode.writes() {
        return None;
    }

    let mut options = OpenOptions::new();
    options.read(mode.contains(OpenMode::READ));
    if mode.contains(OpenMode::APPEND) {
        options.append(true).create(true);
    } else if mode.writes() {
        options.write(true);
        if mode.contains(OpenMode::NEW) || !mode.contains(OpenMode::READ) {
            options.create(true).truncate(true);
        }
    }
    Some(options)
}

impl FileStream {
    /// Open `path`, reporting why it failed
    pub fn try_open(path: impl AsRef<Path>, mode: OpenMode) -> StreamResult<Self> {
        let path = path.as_ref().to_path_buf();
        let options = match open_options(mode) {
            Some(options) => options,
            None => return Err(StreamError::InvalidMode { path, mode }),
        };
        let file = match options.open(&path) {
            Ok(file) => file,
            Err(e) => return Err(StreamError::from_io(path, e)),
        };

        debug!(target: crate::targets::STREAM, path = %path.display(), ?mode, "file stream opened");
        Ok(FileStream {
            file: RefCell::new(Some(file)),
            path,
            mode,
            eof: Cell::new(false),
            last_error: Cell::new(None),
        })
    }

    /// Open `path`. Never fails: on error the result is a detached stream whose
    /// flags are EOF without OPEN, with the cause in [`FileStream::last_error`].
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Self {
        let path = path.as_ref();
        match Self::try_open(path, mode) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(target: crate::targets::STREAM, path = %path.display(), error = %e, "open failed");
                Self::detached(path.to_path_buf(), mode, e.kind())
            }
        }
    }

    fn detached(path: PathBuf, mode: OpenMode, cause: io::ErrorKind) -> Self {
        FileStream {
            file: RefCell::new(None),
            path,
            mode,
            eof: Cell::new(true),
            last_error: Cell::new(Some(cause)),
        }
    }

    pub fn as_stream(&self) -> Fat<'_, dyn Stream> {
        Fat::<dyn Stream>::cast(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.file.borrow().is_some()
    }

    /// Kind of the most recent OS error, including a failed open
    pub fn last_error(&self) -> Option<io::ErrorKind> {
        self.last_error.get()
    }

    fn fail(&self, op: &'static str, e: io::Error) {
        warn!(target: crate::targets::STREAM, path = %self.path.display(), op, error = %e, "file operation failed");
        self.last_error.set(Some(e.kind()));
    }
}

impl Object for FileStream {
    fn type_tag(&self) -> Option<TypeTag> {
        Some(TypeTag::of::<FileStream>())
    }

    fn describe(&self, buf: &mut [u8]) -> usize {
        let state = if self.is_open() { "open" } else { "closed" };
        render_into(
            buf,
            format_args!("file {} ({:?}, {})", self.path.display(), self.mode, state),
        )
        .min(buf.len())
    }

    fn destruct(&self) {
        self.close();
    }
}

impl Stream for FileStream {
    fn stream_slots(&self) -> StreamSlots {
        let mut slots = StreamSlots::FLAGS | StreamSlots::CLOSE;
        if !self.is_open() {
            return slots;
        }
        slots |= StreamSlots::SEEK;
        if self.mode.contains(OpenMode::READ) {
            slots |= StreamSlots::READ;
        }
        if self.mode.writes() {
            slots |= StreamSlots::WRITE;
        }
        slots
    }

    fn flags(&self) -> StreamFlags {
        match (self.is_open(), self.eof.get()) {
            (true, false) => StreamFlags::OPEN,
            (true, true) => StreamFlags::OPEN | StreamFlags::EOF,
            (false, _) => StreamFlags::EOF,
        }
    }

    /// Fills `buf` unless end of file or an error comes first
    fn read(&self, buf: &mut [u8]) -> usize {
        let mut guard = self.file.borrow_mut();
        let Some(file) = guard.as_mut() else {
            return 0;
        };

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.eof.set(true);
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.fail("read", e);
                    break;
                }
            }
        }
        trace!(target: crate::targets::STREAM, path = %self.path.display(), filled, "file read");
        filled
    }

    fn write(&self, buf: &[u8]) -> usize {
        let mut guard = self.file.borrow_mut();
        let Some(file) = guard.as_mut() else {
            return 0;
        };

        loop {
            match file.write(buf) {
                Ok(n) => {
                    trace!(target: crate::targets::STREAM, path = %self.path.display(), n, "file write");
                    return n;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.fail("write", e);
                    return 0;
                }
            }
        }
    }

    fn seek(&self, offset: i64, origin: SeekOrigin) -> u64 {
        let mut guard = self.file.borrow_mut();
        let Some(file) = guard.as_mut() else {
            return 0;
        };

        let moved = origin
            .with_offset(offset)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "negative offset from start"))
            .and_then(|from| file.seek(from));
        match moved {
            Ok(pos) => {
                self.eof.set(false);
                pos
            }
            Err(e) => {
                self.fail("seek", e);
                file.stream_position().unwrap_or(0)
            }
        }
    }

    fn close(&self) {
        if let Some(file) = self.file.borrow_mut().take() {
            drop(file);
            self.eof.set(true);
            debug!(target: crate::targets::STREAM, path = %self.path.display(), "file stream closed");
        }
    }
}
