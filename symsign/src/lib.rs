//! Identity signatures and source references for symbol files and binaries.
//!
//! This library backs symbol-server indexing workflows: given a set of
//! compiled binaries or debug-symbol files, it derives the durable
//! fingerprints under which matching artifacts are located later, lists the
//! source files a symbol file claims to cover, and rewrites the source-link
//! metadata of Portable PDBs.
//!
//! # Functionality
//!
//! * Classify debug-information containers with [`detect`] / [`peek`].
//! * Derive symbol-file signatures with [`symbol_signature`] and binary
//!   signatures with [`binary_signature`].
//! * Enumerate referenced source files with [`enumerate_sources`].
//! * Dump signatures for many files into an XML report with
//!   [`dump_signatures`].
//! * Replace source-link metadata with [`rewrite_source_links`].
//!
//! ## Example
//!
//! ```no_run
//! use symsign::{symbol_signature, enumerate_sources};
//!
//! let signature = symbol_signature("fixtures/lib.pdb".as_ref())?;
//! println!("{} ({})", signature.full(), signature.core());
//!
//! for source in enumerate_sources("fixtures/lib.pdb".as_ref())? {
//!     println!("{source}");
//! }
//! # Ok::<_, symsign::SymsignError>(())
//! ```
//!
//! # Supported formats
//!
//! Four container variants are recognized, modeled by [`DebugInfoFormat`]:
//! Windows-native (MSF) PDBs, on-disk Portable PDBs, PE images with an
//! embedded Portable PDB, and deterministic-build PE images. The byte-level
//! stream and table parsing is delegated to the `pdb`, `symbolic-ppdb` and
//! `goblin` readers; this crate decides dispatch, composes signatures and
//! merges source lists.
//!
//! All operations are synchronous and self-contained: every call re-opens
//! and re-parses its inputs, holds the file handle only for the duration of
//! the call, and shares no state with other calls.

#![warn(missing_docs)]

mod error;
mod format;
mod report;
mod signature;
mod sources;
mod srclink;

pub mod pe;
pub mod portable;
pub mod windows;

pub use error::{SymsignError, SymsignErrorKind};
pub use format::{detect, peek, DebugInfoFormat};
pub use report::{
    dump_signatures, load_path_list, SignatureKind, SignatureReportEntry,
};
pub use signature::{binary_signature, symbol_signature, BinarySignature, SymbolSignature};
pub use sources::enumerate_sources;
pub use srclink::{
    read_descriptor, rewrite_source_links, PatchTool, SourceLinkDescriptor, SourceLinkPatch,
    BACKUP_SUFFIX,
};
