//! Base Object capability
//!
//! Every capability embeds [`Object`]: a size query, a type tag, a bounded
//! textual description and an explicit early-release hook.

use crate::binding::{Capability, Fat};
use crate::fmt::render_into;
use bitflags::bitflags;
use std::any::{type_name, TypeId};
use std::fmt;

/// Runtime identity of a concrete type
#[derive(Clone, Copy, Debug)]
pub struct TypeTag {
    name: &'static str,
    id: TypeId,
}

impl TypeTag {
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeTag {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One operation of the Object capability
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectSlot {
    Size,
    TypeTag,
    Describe,
    Destruct,
}

bitflags! {
    /// Set of populated Object operations
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ObjectSlots: u8 {
        const SIZE = 1 << 0;
        const TYPE_TAG = 1 << 1;
        const DESCRIBE = 1 << 2;
        const DESTRUCT = 1 << 3;
    }
}

impl ObjectSlot {
    pub fn bit(self) -> ObjectSlots {
        match self {
            ObjectSlot::Size => ObjectSlots::SIZE,
            ObjectSlot::TypeTag => ObjectSlots::TYPE_TAG,
            ObjectSlot::Describe => ObjectSlots::DESCRIBE,
            ObjectSlot::Destruct => ObjectSlots::DESTRUCT,
        }
    }
}

impl fmt::Display for ObjectSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectSlot::Size => "size query",
            ObjectSlot::TypeTag => "type tag",
            ObjectSlot::Describe => "describer",
            ObjectSlot::Destruct => "destructor",
        })
    }
}

/// Base Object capability
pub trait Object {
    /// Operations this implementation provides. All of them by default.
    fn object_slots(&self) -> ObjectSlots {
        ObjectSlots::all()
    }

    /// Size of the concrete object in bytes
    fn size(&self) -> usize {
        std::mem::size_of_val(self)
    }

    fn type_tag(&self) -> Option<TypeTag> {
        None
    }

    /// Write a human-readable description into `buf`.
    ///
    /// Never writes past `buf.len()`; truncation is not an error. Returns the
    /// number of bytes written.
    fn describe(&self, buf: &mut [u8]) -> usize {
        let needed = match self.type_tag() {
            Some(tag) => render_into(buf, format_args!("{} ({} bytes)", tag, self.size())),
            None => render_into(buf, format_args!("object ({} bytes)", self.size())),
        };
        needed.min(buf.len())
    }

    /// Release owned resources ahead of drop. Must be idempotent.
    fn destruct(&self) {}
}

impl Capability for dyn Object {
    type Slot = ObjectSlot;
    const NAME: &'static str = "object";

    fn has_slot(&self, slot: ObjectSlot) -> bool {
        self.object_slots().contains(slot.bit())
    }
}

impl<'a> Fat<'a, dyn Object> {
    /// Bind a concrete object to the Object table
    pub fn cast<T: Object + 'static>(object: &'a T) -> Self {
        Fat::bind(object)
    }

    #[track_caller]
    pub fn size(self) -> usize {
        self.invoke(ObjectSlot::Size, |o| o.size())
    }

    #[track_caller]
    pub fn type_tag(self) -> Option<TypeTag> {
        self.invoke(ObjectSlot::TypeTag, |o| o.type_tag())
    }

    #[track_caller]
    pub fn describe(self, buf: &mut [u8]) -> usize {
        self.invoke(ObjectSlot::Describe, |o| o.describe(buf))
    }

    /// Render the full description, growing the buffer until it fits
    #[track_caller]
    pub fn describe_string(self) -> String {
        let mut buf = vec![0u8; 64];
        loop {
            let written = self.describe(&mut buf);
            if written < buf.len() {
                buf.truncate(written);
                return String::from_utf8_lossy(&buf).into_owned();
            }
            let grown = buf.len() * 2;
            buf.resize(grown, 0);
        }
    }

    #[track_caller]
    pub fn destruct(self) {
        self.invoke(ObjectSlot::Destruct, |o| o.destruct())
    }
}
