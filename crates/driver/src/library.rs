//! Black-box interface to the package-transaction library
//!
//! Shaped after the native library's C surface: integer returns where
//! zero is success, a separate diagnostic accessor, and opaque handle
//! and package values owned by the caller.

use std::path::Path;

/// Result of [`PackageLibrary::initialize`].
pub enum InitOutcome<H> {
    /// A usable handle bound to the install root and database path.
    Ready(H),
    /// Initialization failed. The library may still hand back a
    /// partially-constructed handle, which must be released.
    Failed {
        partial: Option<H>,
        message: String,
    },
}

/// The package-transaction library, as the driver sees it.
///
/// One in-progress transaction exists per handle at most; the
/// transaction operations act on the handle that opened them, as in
/// the native API.
pub trait PackageLibrary {
    /// Opaque library context bound to an install root and database.
    type Handle;
    /// A loaded-but-not-yet-added install archive.
    type Package;

    fn initialize(&self, root: &Path, db_path: &Path) -> InitOutcome<Self::Handle>;

    /// The library's current diagnostic text for this handle.
    fn last_error(&self, handle: &Self::Handle) -> String;

    /// Open a transaction. Zero is success.
    fn trans_init(&self, handle: &mut Self::Handle) -> i32;

    /// Load an install archive from disk. `None` is failure.
    fn load_package(&self, handle: &mut Self::Handle, archive: &Path) -> Option<Self::Package>;

    /// Add a loaded package to the open transaction. Zero is success.
    fn add_package(&self, handle: &mut Self::Handle, package: Self::Package) -> i32;

    /// Resolve dependency and conflict checks. Zero is success.
    fn trans_prepare(&self, handle: &mut Self::Handle) -> i32;

    /// Commit the transaction. The library may invoke the interposed
    /// privileged-command operation any number of times during this
    /// call. Zero is success.
    fn trans_commit(&self, handle: &mut Self::Handle) -> i32;

    /// Close the transaction opened by `trans_init`.
    fn trans_release(&self, handle: &mut Self::Handle);

    /// Release the handle and everything it owns.
    fn release(&self, handle: Self::Handle);
}
