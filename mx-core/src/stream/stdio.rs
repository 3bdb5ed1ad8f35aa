//! Standard handles
//!
//! Three process-wide singletons, constructed on first access and never
//! closed. Input reads, output and error write; none of them seek.

use super::{Stream, StreamFlags, StreamSlots};
use crate::binding::Fat;
use crate::fmt::render_into;
use crate::object::{Object, ObjectSlots, TypeTag};
use once_cell::sync::Lazy;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{trace, warn};

/// Which standard handle a [`StdStream`] wraps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Input,
    Output,
    Error,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Channel::Input => "stdin",
            Channel::Output => "stdout",
            Channel::Error => "stderr",
        }
    }
}

/// A standard handle as a stream
#[derive(Debug)]
pub struct StdStream {
    channel: Channel,
    eof: AtomicBool,
}

static STDIN: Lazy<StdStream> = Lazy::new(|| StdStream::new(Channel::Input));
static STDOUT: Lazy<StdStream> = Lazy::new(|| StdStream::new(Channel::Output));
static STDERR: Lazy<StdStream> = Lazy::new(|| StdStream::new(Channel::Error));

impl StdStream {
    fn new(channel: Channel) -> Self {
        trace!(target: crate::targets::STREAM, channel = channel.name(), "standard handle created");
        StdStream {
            channel,
            eof: AtomicBool::new(false),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }
}

/// The singleton for `channel`
pub fn standard(channel: Channel) -> &'static StdStream {
    match channel {
        Channel::Input => Lazy::force(&STDIN),
        Channel::Output => Lazy::force(&STDOUT),
        Channel::Error => Lazy::force(&STDERR),
    }
}

pub fn stdin() -> Fat<'static, dyn Stream> {
    Fat::<dyn Stream>::cast(standard(Channel::Input))
}

pub fn stdout() -> Fat<'static, dyn Stream> {
    Fat::<dyn Stream>::cast(standard(Channel::Output))
}

pub fn stderr() -> Fat<'static, dyn Stream> {
    Fat::<dyn Stream>::cast(standard(Channel::Error))
}

fn write_to(mut sink: impl Write, buf: &[u8], channel: Channel) -> usize {
    let written = loop {
        match sink.write(buf) {
            Ok(n) => break n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(target: crate::targets::STREAM, channel = channel.name(), error = %e, "write failed");
                break 0;
            }
        }
    };
    if let Err(e) = sink.flush() {
        warn!(target: crate::targets::STREAM, channel = channel.name(), error = %e, "flush failed");
    }
    written
}

impl Object for StdStream {
    fn object_slots(&self) -> ObjectSlots {
        // never destroyed by user code
        ObjectSlots::all() - ObjectSlots::DESTRUCT
    }

    fn type_tag(&self) -> Option<TypeTag> {
        Some(TypeTag::of::<StdStream>())
    }

    fn describe(&self, buf: &mut [u8]) -> usize {
        render_into(buf, format_args!("standard stream {}", self.channel.name())).min(buf.len())
    }
}

impl Stream for StdStream {
    fn stream_slots(&self) -> StreamSlots {
        match self.channel {
            Channel::Input => StreamSlots::FLAGS | StreamSlots::READ,
            Channel::Output | Channel::Error => StreamSlots::FLAGS | StreamSlots::WRITE,
        }
    }

    fn flags(&self) -> StreamFlags {
        if self.eof.load(Ordering::Acquire) {
            StreamFlags::OPEN | StreamFlags::EOF
        } else {
            StreamFlags::OPEN
        }
    }

    fn read(&self, buf: &mut [u8]) -> usize {
        let mut input = io::stdin().lock();
        loop {
            match input.read(buf) {
                Ok(0) if !buf.is_empty() => {
                    self.eof.store(true, Ordering::Release);
                    return 0;
                }
                Ok(n) => return n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(target: crate::targets::STREAM, channel = "stdin", error = %e, "read failed");
                    return 0;
                }
            }
        }
    }

    fn write(&self, buf: &[u8]) -> usize {
        match self.channel {
            Channel::Output => write_to(io::stdout().lock(), buf, self.channel),
            Channel::Error => write_to(io::stderr().lock(), buf, self.channel),
            Channel::Input => 0,
        }
    }
}
