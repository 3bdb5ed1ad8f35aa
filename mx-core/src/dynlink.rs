//! Dynamic libraries
//!
//! [`Library`] wraps one loaded shared object, or the running program itself
//! ([`Library::this`]). Like file streams, [`Library::open`] never fails: a
//! library that cannot be loaded yields a closed handle whose symbol lookups
//! are assertion failures, with the loader's message in
//! [`Library::last_error`].
//!
//! Debug builds resolve every symbol when the library is loaded, release
//! builds resolve lazily.

use crate::error::{DynlinkError, DynlinkResult};
use crate::fmt::render_into;
use crate::object::{Object, TypeTag};
use std::cell::RefCell;
use std::ffi::{c_void, OsStr, OsString};
use std::ptr::NonNull;
use tracing::{debug, trace, warn};

const SELF_NAME: &str = "<self>";

/// A loaded shared library
#[derive(Debug)]
pub struct Library {
    lib: RefCell<Option<libloading::Library>>,
    name: OsString,
    is_self: bool,
    last_error: Option<String>,
}

#[cfg(unix)]
unsafe fn load(name: &OsStr) -> Result<libloading::Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_LAZY, RTLD_LOCAL, RTLD_NOW};
    let binding = if cfg!(debug_assertions) { RTLD_NOW } else { RTLD_LAZY };
    UnixLibrary::open(Some(name), binding | RTLD_LOCAL).map(libloading::Library::from)
}

#[cfg(windows)]
unsafe fn load(name: &OsStr) -> Result<libloading::Library, libloading::Error> {
    libloading::Library::new(name)
}

impl Library {
    /// Load `name`, reporting why it failed
    ///
    /// # Safety
    /// Loading runs the library's initialization routines, which may do
    /// anything. The caller vouches for the library.
    pub unsafe fn try_open(name: impl AsRef<OsStr>) -> DynlinkResult<Self> {
        let name = name.as_ref();
        let lib = load(name).map_err(|source| DynlinkError::Open {
            name: name.to_string_lossy().into_owned(),
            source,
        })?;

        debug!(target: crate::targets::DYNLINK, name = %name.to_string_lossy(), "library loaded");
        Ok(Library {
            lib: RefCell::new(Some(lib)),
            name: name.to_os_string(),
            is_self: false,
            last_error: None,
        })
    }

    /// Load `name`. Never fails: on error the result is a closed handle with
    /// the cause in [`Library::last_error`].
    ///
    /// # Safety
    /// Same contract as [`Library::try_open`].
    pub unsafe fn open(name: impl AsRef<OsStr>) -> Self {
        let name = name.as_ref();
        match Self::try_open(name) {
            Ok(lib) => lib,
            Err(e) => {
                warn!(target: crate::targets::DYNLINK, error = %e, "library open failed");
                Library {
                    lib: RefCell::new(None),
                    name: name.to_os_string(),
                    is_self: false,
                    last_error: Some(e.to_string()),
                }
            }
        }
    }

    /// The running program and everything it has loaded. Never closable.
    pub fn this() -> Self {
        #[cfg(unix)]
        let (lib, last_error) = (
            Some(libloading::Library::from(libloading::os::unix::Library::this())),
            None,
        );
        #[cfg(windows)]
        let (lib, last_error) = match libloading::os::windows::Library::this() {
            Ok(lib) => (Some(libloading::Library::from(lib)), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Library {
            lib: RefCell::new(lib),
            name: OsString::from(SELF_NAME),
            is_self: true,
            last_error,
        }
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.lib.borrow().is_some()
    }

    pub fn is_self(&self) -> bool {
        self.is_self
    }

    /// Loader message of a failed open
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Address of the exported symbol `symbol`, `None` when it is not exported.
    ///
    /// # Panics
    /// If the library is not open
    #[track_caller]
    pub fn symbol(&self, symbol: &str) -> Option<NonNull<c_void>> {
        let guard = self.lib.borrow();
        let Some(lib) = guard.as_ref() else {
            panic!("library {} must be open", self.name.to_string_lossy());
        };

        // SAFETY: the symbol is read as an opaque address and never dereferenced here
        match unsafe { lib.get::<*mut c_void>(symbol.as_bytes()) } {
            Ok(address) => {
                trace!(target: crate::targets::DYNLINK, symbol, "symbol resolved");
                NonNull::new(*address)
            }
            Err(e) => {
                debug!(target: crate::targets::DYNLINK, symbol, error = %e, "symbol not found");
                None
            }
        }
    }

    /// Unload the library
    ///
    /// # Panics
    /// If the library is not open, or is the running program
    #[track_caller]
    pub fn close(&self) {
        assert!(!self.is_self, "the running program cannot be closed");
        let Some(lib) = self.lib.borrow_mut().take() else {
            panic!("library {} must be open", self.name.to_string_lossy());
        };
        if let Err(e) = lib.close() {
            warn!(target: crate::targets::DYNLINK, name = %self.name.to_string_lossy(), error = %e, "library close failed");
        }
    }
}

impl Object for Library {
    fn type_tag(&self) -> Option<TypeTag> {
        Some(TypeTag::of::<Library>())
    }

    fn describe(&self, buf: &mut [u8]) -> usize {
        let state = if self.is_open() { "loaded" } else { "not loaded" };
        render_into(
            buf,
            format_args!("library {} ({})", self.name.to_string_lossy(), state),
        )
        .min(buf.len())
    }

    /// Releases a loaded library; the running program is left alone
    fn destruct(&self) {
        if !self.is_self && self.is_open() {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Fat;

    const MISSING: &str = "libmx_no_such_library.so";

    #[test]
    fn test_try_open_missing_library() {
        let err = unsafe { Library::try_open(MISSING) }.unwrap_err();
        assert!(err.to_string().contains(MISSING));
    }

    #[test]
    fn test_open_missing_library_is_closed() {
        let lib = unsafe { Library::open(MISSING) };
        assert!(!lib.is_open());
        assert!(!lib.is_self());
        assert!(lib.last_error().is_some());
        assert_eq!(lib.name(), OsStr::new(MISSING));

        // nothing to release
        Fat::<dyn Object>::cast(&lib).destruct();
    }

    #[test]
    #[should_panic(expected = "must be open")]
    fn test_symbol_on_closed_library_panics() {
        let lib = unsafe { Library::open(MISSING) };
        lib.symbol("anything");
    }

    #[test]
    #[should_panic(expected = "cannot be closed")]
    fn test_close_self_panics() {
        Library::this().close();
    }

    #[test]
    fn test_describe() {
        let lib = unsafe { Library::open(MISSING) };
        let text = Fat::<dyn Object>::cast(&lib).describe_string();
        assert_eq!(text, format!("library {} (not loaded)", MISSING));
    }

    #[cfg(target_os = "linux")]
    mod linux {
        use super::*;
        use std::ffi::c_char;

        type Strlen = unsafe extern "C" fn(*const c_char) -> usize;

        #[test]
        fn test_libc_symbol_lookup() {
            let lib = unsafe { Library::try_open("libc.so.6") }.unwrap();
            assert!(lib.is_open());

            let address = lib.symbol("strlen").unwrap();
            let strlen: Strlen = unsafe { std::mem::transmute(address.as_ptr()) };
            let text = b"hello\0";
            assert_eq!(unsafe { strlen(text.as_ptr().cast::<c_char>()) }, 5);

            assert!(lib.symbol("mx_no_such_symbol").is_none());
            lib.close();
            assert!(!lib.is_open());
        }

        #[test]
        #[should_panic(expected = "must be open")]
        fn test_double_close_panics() {
            let lib = unsafe { Library::try_open("libc.so.6") }.unwrap();
            lib.close();
            lib.close();
        }

        #[test]
        fn test_self_sees_linked_symbols() {
            let this = Library::this();
            assert!(this.is_open());
            assert!(this.symbol("strlen").is_some());
            assert!(this.symbol("mx_no_such_symbol").is_none());

            // the running program survives destruct
            Fat::<dyn Object>::cast(&this).destruct();
            assert!(this.is_open());
        }
    }
}
