//! Scoped library resources and the linear install sequence

use std::path::Path;

use pacshim_errors::LibraryError;
use tracing::{debug, info};

use crate::library::{InitOutcome, PackageLibrary};

/// Open library context. Released on every exit path when dropped;
/// the failed-initialize case releases any partial handle eagerly.
pub struct LibraryHandle<'l, L: PackageLibrary> {
    lib: &'l L,
    raw: Option<L::Handle>,
}

impl<'l, L: PackageLibrary> LibraryHandle<'l, L> {
    /// Bind a handle to an install root and package database.
    pub fn initialize(lib: &'l L, root: &Path, db_path: &Path) -> Result<Self, LibraryError> {
        match lib.initialize(root, db_path) {
            InitOutcome::Ready(raw) => {
                debug!(root = %root.display(), db = %db_path.display(), "library initialized");
                Ok(Self {
                    lib,
                    raw: Some(raw),
                })
            }
            InitOutcome::Failed { partial, message } => {
                if let Some(raw) = partial {
                    lib.release(raw);
                }
                Err(LibraryError::operation("initialize", message))
            }
        }
    }

    /// Run one library operation, translating a non-zero return into
    /// a [`LibraryError`] carrying the current diagnostic text.
    fn op(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&L, &mut L::Handle) -> i32,
    ) -> Result<(), LibraryError> {
        let lib = self.lib;
        // invariant: raw is Some for as long as a &mut self can
        // exist; it becomes None only inside Drop. The error arm is
        // a non-panicking fallback, not a reachable state.
        let raw = self
            .raw
            .as_mut()
            .ok_or_else(|| LibraryError::operation(operation, "handle already released"))?;
        if f(lib, raw) == 0 {
            Ok(())
        } else {
            Err(LibraryError::operation(operation, lib.last_error(raw)))
        }
    }
}

impl<L: PackageLibrary> Drop for LibraryHandle<'_, L> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            self.lib.release(raw);
        }
    }
}

/// In-progress set of package operations. Borrows its handle, so the
/// borrow checker proves it is released before the handle is.
pub struct Transaction<'h, 'l, L: PackageLibrary> {
    handle: &'h mut LibraryHandle<'l, L>,
}

impl<'h, 'l, L: PackageLibrary> Transaction<'h, 'l, L> {
    /// Open a transaction against an initialized handle.
    pub fn begin(handle: &'h mut LibraryHandle<'l, L>) -> Result<Self, LibraryError> {
        handle.op("begin transaction", |lib, raw| lib.trans_init(raw))?;
        Ok(Self { handle })
    }

    /// Load an install archive and add it to the transaction. Either
    /// failure point aborts the whole run; there is no partial
    /// recovery.
    pub fn load_and_add(&mut self, archive: &Path) -> Result<(), LibraryError> {
        let lib = self.handle.lib;
        // same invariant as LibraryHandle::op: None only inside Drop
        let raw = self
            .handle
            .raw
            .as_mut()
            .ok_or_else(|| LibraryError::operation("load archive", "handle already released"))?;

        let Some(package) = lib.load_package(raw, archive) else {
            return Err(LibraryError::operation("load archive", lib.last_error(raw)));
        };
        debug!(archive = %archive.display(), "archive loaded");

        if lib.add_package(raw, package) == 0 {
            Ok(())
        } else {
            Err(LibraryError::operation(
                "add to transaction",
                lib.last_error(raw),
            ))
        }
    }

    /// Resolve checks, then commit. Hook scripts run during commit
    /// through the interposed privileged-command operation.
    pub fn prepare_and_commit(&mut self) -> Result<(), LibraryError> {
        self.handle.op("prepare", |lib, raw| lib.trans_prepare(raw))?;
        self.handle.op("commit", |lib, raw| lib.trans_commit(raw))
    }
}

impl<L: PackageLibrary> Drop for Transaction<'_, '_, L> {
    fn drop(&mut self) {
        if let Some(raw) = self.handle.raw.as_mut() {
            self.handle.lib.trans_release(raw);
        }
    }
}

/// Install one archive: initialize, begin transaction, load and add,
/// prepare, commit. Linear, no re-entry; the transaction and handle
/// are released in that order on success and on every failure.
pub fn install_archive<L: PackageLibrary>(
    lib: &L,
    root: &Path,
    db_path: &Path,
    archive: &Path,
) -> Result<(), LibraryError> {
    let mut handle = LibraryHandle::initialize(lib, root, db_path)?;
    {
        let mut txn = Transaction::begin(&mut handle)?;
        txn.load_and_add(archive)?;
        txn.prepare_and_commit()?;
    }
    info!(archive = %archive.display(), "transaction committed");
    Ok(())
}
