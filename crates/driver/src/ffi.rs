//! Real libalpm binding behind the `libalpm` feature
//!
//! Hand-declared bindings for exactly the slice of the native API the
//! driver exercises. Requires the system library at link time, which
//! is why the feature is off by default.

#![allow(unsafe_code)]

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::library::{InitOutcome, PackageLibrary};

// Signature verification level for pkg_load: unknown signatures are
// acceptable; the controller decides what actually gets executed.
const SIG_PACKAGE_UNKNOWN_OK: c_int = 1 << 3;

#[link(name = "alpm")]
extern "C" {
    fn alpm_initialize(root: *const c_char, dbpath: *const c_char, err: *mut c_int)
        -> *mut c_void;
    fn alpm_release(handle: *mut c_void) -> c_int;
    fn alpm_errno(handle: *mut c_void) -> c_int;
    fn alpm_strerror(err: c_int) -> *const c_char;
    fn alpm_trans_init(handle: *mut c_void, flags: c_int) -> c_int;
    fn alpm_trans_release(handle: *mut c_void) -> c_int;
    fn alpm_pkg_load(
        handle: *mut c_void,
        filename: *const c_char,
        full: c_int,
        level: c_int,
        pkg: *mut *mut c_void,
    ) -> c_int;
    fn alpm_add_pkg(handle: *mut c_void, pkg: *mut c_void) -> c_int;
    fn alpm_trans_prepare(handle: *mut c_void, data: *mut *mut c_void) -> c_int;
    fn alpm_trans_commit(handle: *mut c_void, data: *mut *mut c_void) -> c_int;
}

fn c_path(path: &Path) -> Option<CString> {
    CString::new(path.as_os_str().as_bytes()).ok()
}

fn strerror(err: c_int) -> String {
    // alpm_strerror returns a pointer into static message tables
    let message = unsafe { alpm_strerror(err) };
    if message.is_null() {
        format!("unknown error {err}")
    } else {
        unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned()
    }
}

/// Raw library context. Only ever used from the single driver thread.
pub struct Handle(*mut c_void);

/// A package loaded by `alpm_pkg_load`, owned until added to a
/// transaction.
pub struct Package(*mut c_void);

/// [`PackageLibrary`] implementation over the system libalpm.
pub struct Libalpm;

impl PackageLibrary for Libalpm {
    type Handle = Handle;
    type Package = Package;

    fn initialize(&self, root: &Path, db_path: &Path) -> InitOutcome<Handle> {
        let (Some(root), Some(db_path)) = (c_path(root), c_path(db_path)) else {
            return InitOutcome::Failed {
                partial: None,
                message: "path contains an interior NUL byte".to_string(),
            };
        };

        let mut err: c_int = 0;
        let handle = unsafe { alpm_initialize(root.as_ptr(), db_path.as_ptr(), &mut err) };
        if handle.is_null() {
            InitOutcome::Failed {
                partial: None,
                message: strerror(err),
            }
        } else {
            InitOutcome::Ready(Handle(handle))
        }
    }

    fn last_error(&self, handle: &Handle) -> String {
        strerror(unsafe { alpm_errno(handle.0) })
    }

    fn trans_init(&self, handle: &mut Handle) -> i32 {
        unsafe { alpm_trans_init(handle.0, 0) }
    }

    fn load_package(&self, handle: &mut Handle, archive: &Path) -> Option<Package> {
        let archive = c_path(archive)?;
        let mut pkg: *mut c_void = std::ptr::null_mut();
        let rc = unsafe {
            alpm_pkg_load(handle.0, archive.as_ptr(), 1, SIG_PACKAGE_UNKNOWN_OK, &mut pkg)
        };
        if rc == 0 && !pkg.is_null() {
            Some(Package(pkg))
        } else {
            None
        }
    }

    fn add_package(&self, handle: &mut Handle, package: Package) -> i32 {
        // on success the transaction owns the package
        unsafe { alpm_add_pkg(handle.0, package.0) }
    }

    fn trans_prepare(&self, handle: &mut Handle) -> i32 {
        let mut data: *mut c_void = std::ptr::null_mut();
        unsafe { alpm_trans_prepare(handle.0, &mut data) }
    }

    fn trans_commit(&self, handle: &mut Handle) -> i32 {
        let mut data: *mut c_void = std::ptr::null_mut();
        unsafe { alpm_trans_commit(handle.0, &mut data) }
    }

    fn trans_release(&self, handle: &mut Handle) {
        unsafe {
            alpm_trans_release(handle.0);
        }
    }

    fn release(&self, handle: Handle) {
        unsafe {
            alpm_release(handle.0);
        }
    }
}
