//! mx Core - capability dispatch runtime and byte streams
//!
//! Capabilities are traits used as trait objects. A [`Fat`] reference pairs the
//! data pointer with the capability's table; every call is routed through its
//! dispatch gateway, which checks that the requested operation is populated.
//!
//! The [`Stream`] capability is built on top: standard handles, files and
//! in-memory buffers, with `printf`-style formatted output layered on write.
//!
//! Log events use the `mx::*` targets named by [`Area`]; the embedding
//! application installs the subscriber.

pub mod binding;
pub mod digest;
pub mod dynlink;
pub mod error;
pub mod fmt;
pub mod object;
pub mod options;
pub mod stream;

/// `tracing` targets of the runtime areas
pub(crate) mod targets {
    use mx_config::Area;

    pub const STREAM: &str = Area::Stream.target();
    pub const FMT: &str = Area::Format.target();
    pub const OPTIONS: &str = Area::Options.target();
    pub const DYNLINK: &str = Area::Dynlink.target();
}

// Re-export common types
pub use binding::{Capability, Embeds, Fat};
pub use error::{DynlinkError, ShortWrite, StreamError, StreamResult};
pub use object::{Object, ObjectSlot, ObjectSlots, TypeTag};
pub use stream::file::FileStream;
pub use stream::memory::MemoryStream;
pub use stream::stdio::{stderr, stdin, stdout};
pub use stream::{OpenMode, SeekOrigin, Stream, StreamFlags, StreamSlot, StreamSlots};

// Re-export config types from mx-config
pub use mx_config::{Area, OptionStyleConfig};
