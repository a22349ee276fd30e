//! Debug-information format classification.
//!
//! Every operation starts by deciding which of the supported container
//! variants a file is. Classification only looks at the header region: the
//! MSF magic for Windows-native PDBs, the ECMA-335 metadata signature for
//! Portable PDBs, and for PE images the debug directory markers that
//! distinguish embedded Portable PDBs and deterministic builds.

use std::fmt;
use std::path::Path;

use symbolic_common::ByteView;

use crate::error::{SymsignError, SymsignErrorKind};
use crate::pe::{PeFile, DEBUG_TYPE_EMBEDDED_PORTABLE_PDB, DEBUG_TYPE_REPRO};
use crate::portable::PortablePdbFile;
use crate::windows::WindowsPdbFile;

/// The debug-information variant of a symbol or binary file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugInfoFormat {
    /// A Windows-native (MSF) PDB file.
    Windows,
    /// An on-disk Portable PDB file.
    Portable,
    /// A PE image with an embedded Portable PDB.
    EmbeddedPortable,
    /// A PE image marked as a deterministic (reproducible) build.
    Deterministic,
    /// A recognized container without any debug-information marker.
    ///
    /// Terminal for signature and source extraction: such files are
    /// reported and skipped, never parsed further.
    Unknown,
}

impl fmt::Display for DebugInfoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DebugInfoFormat::Windows => "windows",
            DebugInfoFormat::Portable => "portable",
            DebugInfoFormat::EmbeddedPortable => "embeddedPortable",
            DebugInfoFormat::Deterministic => "deterministic",
            DebugInfoFormat::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classifies a buffer by its header region.
///
/// Returns `None` when no supported magic matches. PE parsing failures also
/// yield `None`: an `MZ` stub that goblin rejects is not a usable container.
pub fn peek(data: &[u8]) -> Option<DebugInfoFormat> {
    if WindowsPdbFile::test(data) {
        return Some(DebugInfoFormat::Windows);
    }

    if PortablePdbFile::test(data) {
        return Some(DebugInfoFormat::Portable);
    }

    if PeFile::test(data) {
        let pe = PeFile::parse(data).ok()?;
        let entries = pe.debug_entries().ok()?;

        if entries
            .iter()
            .any(|e| e.data_type == DEBUG_TYPE_EMBEDDED_PORTABLE_PDB)
        {
            return Some(DebugInfoFormat::EmbeddedPortable);
        }
        if entries.iter().any(|e| e.data_type == DEBUG_TYPE_REPRO) {
            return Some(DebugInfoFormat::Deterministic);
        }
        return Some(DebugInfoFormat::Unknown);
    }

    None
}

/// Determines the debug-information format of the file at the given path.
///
/// Reads only as much of the file as classification needs and releases the
/// handle before returning. Fails with
/// [`InvalidFormat`](SymsignErrorKind::InvalidFormat) when the file does not
/// begin with any recognized magic.
pub fn detect(path: &Path) -> Result<DebugInfoFormat, SymsignError> {
    let view = ByteView::open(path)?;
    peek(&view).ok_or_else(|| SymsignErrorKind::InvalidFormat.into())
}
