#![deny(clippy::pedantic)]
#![cfg_attr(not(feature = "libalpm"), deny(unsafe_code))]
#![allow(clippy::module_name_repetitions)]

//! Transaction driver for the package-transaction library
//!
//! Drives the library through its install sequence (initialize, begin
//! transaction, load archive, add to transaction, prepare, commit)
//! and maps every non-success return into a [`LibraryError`] carrying
//! the library's own diagnostic text. The library is a black box
//! behind [`PackageLibrary`]; the real libalpm binding lives behind
//! the `libalpm` cargo feature.

mod driver;
mod library;

#[cfg(feature = "libalpm")]
pub mod ffi;

pub use driver::{install_archive, LibraryHandle, Transaction};
pub use library::{InitOutcome, PackageLibrary};
