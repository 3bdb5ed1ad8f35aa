//! `std::io` adapters over stream bindings

use super::Stream;
use crate::binding::Fat;
use std::io;

/// `io::Write` over a stream binding
#[derive(Debug, Clone, Copy)]
pub struct StreamWriter<'a> {
    stream: Fat<'a, dyn Stream>,
}

impl<'a> StreamWriter<'a> {
    pub fn new(stream: Fat<'a, dyn Stream>) -> Self {
        StreamWriter { stream }
    }
}

impl io::Write for StreamWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.stream.write(buf) {
            0 => Err(io::ErrorKind::WriteZero.into()),
            n => Ok(n),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `io::Read` over a stream binding
#[derive(Debug, Clone, Copy)]
pub struct StreamReader<'a> {
    stream: Fat<'a, dyn Stream>,
}

impl<'a> StreamReader<'a> {
    pub fn new(stream: Fat<'a, dyn Stream>) -> Self {
        StreamReader { stream }
    }
}

impl io::Read for StreamReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.stream.read(buf))
    }
}
