//! Capability binding and the dispatch gateway
//!
//! A capability is a trait used as a trait object (`dyn Stream`, `dyn Object`).
//! Its implementation table is the vtable the compiler builds for each
//! `(concrete type, trait)` pair, so tables are never assembled at runtime.
//!
//! Each capability also names its operations through a slot type. A concrete
//! type may leave a slot empty (a write-only stream has no reader); the
//! gateway checks the slot before forwarding the call, and calling an empty
//! slot is a fatal precondition violation.

use std::fmt;

/// A trait-object type whose operations can be queried by slot
pub trait Capability {
    /// Names one operation of the capability
    type Slot: Copy + fmt::Debug + fmt::Display;

    /// Capability name used in assertion messages
    const NAME: &'static str;

    /// Whether the bound implementation provides `slot`
    fn has_slot(&self, slot: Self::Slot) -> bool;
}

/// `Self` embeds the capability `B` as its first part, so a reference to
/// `Self` can be reinterpreted as a reference to `B` without moving the data
/// pointer.
pub trait Embeds<B: ?Sized> {
    fn embedded(&self) -> &B;
}

/// Fat reference: a borrowed object paired with the table for capability `D`
///
/// Non-owning and `Copy`. The lifetime ties the binding to the referent, so a
/// binding can never outlive the object it views.
pub struct Fat<'a, D: ?Sized> {
    target: &'a D,
}

impl<D: ?Sized> Clone for Fat<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: ?Sized> Copy for Fat<'_, D> {}

impl<D: ?Sized> fmt::Debug for Fat<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fat").field("data", &self.data_ptr()).finish()
    }
}

impl<'a, D: ?Sized> Fat<'a, D> {
    /// Bind an object to the capability table its type already carries
    pub fn bind(target: &'a D) -> Self {
        Fat { target }
    }

    /// The bound object, viewed through the capability
    pub fn target(self) -> &'a D {
        self.target
    }

    /// Address of the object, without the table
    pub fn data_ptr(self) -> *const () {
        self.target as *const D as *const ()
    }

    /// Whether both bindings view the same object
    pub fn same_object<E: ?Sized>(self, other: Fat<'_, E>) -> bool {
        self.data_ptr() == other.data_ptr()
    }

    /// View the object through an embedded capability.
    ///
    /// Only expressible when `D` embeds `B`; the data pointer is preserved.
    pub fn upcast<B: ?Sized>(self) -> Fat<'a, B>
    where
        D: Embeds<B>,
    {
        Fat::bind(self.target.embedded())
    }
}

impl<'a, D: ?Sized + Capability> Fat<'a, D> {
    /// Whether `slot` is empty for the bound implementation
    pub fn is_empty(self, slot: D::Slot) -> bool {
        !self.target.has_slot(slot)
    }

    /// Dispatch gateway.
    ///
    /// Asserts that `slot` is populated, then hands the receiver to `call`
    /// and returns its result unmodified.
    ///
    /// # Panics
    /// If the bound implementation leaves `slot` empty
    #[track_caller]
    pub fn invoke<R>(self, slot: D::Slot, call: impl FnOnce(&'a D) -> R) -> R {
        assert!(
            self.target.has_slot(slot),
            "{} has no {}",
            D::NAME,
            slot
        );
        call(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    trait Counter {
        fn bump(&self, by: u32) -> u32;
        fn reset(&self) {}
        fn resettable(&self) -> bool;
    }

    #[derive(Clone, Copy, Debug)]
    enum CounterSlot {
        Bump,
        Reset,
    }

    impl fmt::Display for CounterSlot {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                CounterSlot::Bump => "bumper",
                CounterSlot::Reset => "resetter",
            })
        }
    }

    impl Capability for dyn Counter {
        type Slot = CounterSlot;
        const NAME: &'static str = "counter";

        fn has_slot(&self, slot: CounterSlot) -> bool {
            match slot {
                CounterSlot::Bump => true,
                CounterSlot::Reset => self.resettable(),
            }
        }
    }

    struct Tally {
        total: Cell<u32>,
        calls: Cell<u32>,
    }

    impl Tally {
        fn new() -> Self {
            Tally {
                total: Cell::new(0),
                calls: Cell::new(0),
            }
        }
    }

    impl Counter for Tally {
        fn bump(&self, by: u32) -> u32 {
            self.calls.set(self.calls.get() + 1);
            self.total.set(self.total.get() + by);
            self.total.get()
        }

        fn resettable(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_invoke_forwards_arguments_and_result() {
        let tally = Tally::new();
        let fat: Fat<dyn Counter> = Fat::bind(&tally);

        assert_eq!(fat.invoke(CounterSlot::Bump, |c| c.bump(5)), 5);
        assert_eq!(fat.invoke(CounterSlot::Bump, |c| c.bump(7)), 12);
        assert_eq!(tally.calls.get(), 2);
    }

    #[test]
    fn test_is_empty() {
        let tally = Tally::new();
        let fat: Fat<dyn Counter> = Fat::bind(&tally);
        assert!(!fat.is_empty(CounterSlot::Bump));
        assert!(fat.is_empty(CounterSlot::Reset));
    }

    #[test]
    #[should_panic(expected = "counter has no resetter")]
    fn test_invoke_empty_slot_panics() {
        let tally = Tally::new();
        let fat: Fat<dyn Counter> = Fat::bind(&tally);
        fat.invoke(CounterSlot::Reset, |c| c.reset());
    }

    #[test]
    fn test_copies_share_identity() {
        let tally = Tally::new();
        let a: Fat<dyn Counter> = Fat::bind(&tally);
        let b = a;
        assert!(a.same_object(b));
        assert_eq!(a.data_ptr(), &tally as *const Tally as *const ());
    }
}
