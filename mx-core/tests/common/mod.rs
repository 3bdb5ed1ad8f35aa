//! Test helpers
//!
//! Temp-file paths and a recording stream shared by the integration tests.

#![allow(dead_code)]

use mx_core::{Object, SeekOrigin, Stream, StreamFlags, StreamSlots, TypeTag};
use std::cell::RefCell;
use std::path::PathBuf;

/// Unique temp path for this test process
pub fn temp_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mx_it_{}_{}", name, std::process::id()))
}

/// Removes the file when dropped, so a failing assertion still cleans up
pub struct TempPath(pub PathBuf);

impl TempPath {
    pub fn new(name: &str) -> Self {
        let path = temp_file(name);
        let _ = std::fs::remove_file(&path);
        TempPath(path)
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// A call observed by [`StubStream`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Read(usize),
    Write(Vec<u8>),
    Seek(i64, SeekOrigin),
    Close,
}

/// Stream stub that records every call and answers with fixed results
pub struct StubStream {
    pub slots: StreamSlots,
    pub calls: RefCell<Vec<Call>>,
    pub read_result: usize,
    pub write_result: Option<usize>,
    pub seek_result: u64,
}

impl StubStream {
    pub fn new(slots: StreamSlots) -> Self {
        StubStream {
            slots,
            calls: RefCell::new(Vec::new()),
            read_result: 0,
            write_result: None,
            seek_result: 0,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl Object for StubStream {
    fn type_tag(&self) -> Option<TypeTag> {
        Some(TypeTag::of::<StubStream>())
    }
}

impl Stream for StubStream {
    fn stream_slots(&self) -> StreamSlots {
        self.slots
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::OPEN
    }

    fn read(&self, buf: &mut [u8]) -> usize {
        self.calls.borrow_mut().push(Call::Read(buf.len()));
        self.read_result
    }

    fn write(&self, buf: &[u8]) -> usize {
        self.calls.borrow_mut().push(Call::Write(buf.to_vec()));
        self.write_result.unwrap_or(buf.len())
    }

    fn seek(&self, offset: i64, origin: SeekOrigin) -> u64 {
        self.calls.borrow_mut().push(Call::Seek(offset, origin));
        self.seek_result
    }

    fn close(&self) {
        self.calls.borrow_mut().push(Call::Close);
    }
}
