//! Identity signatures for symbol files and binaries.
//!
//! A signature is the key under which a symbol server stores and retrieves
//! an artifact. Symbol files are keyed by GUID plus age, binaries by link
//! timestamp plus image size. The composition rules are shared across all
//! container variants so that downstream consumers stay format-agnostic.

use std::fmt;
use std::fs;
use std::path::Path;

use debugid::DebugId;
use symbolic_common::ByteView;
use uuid::Uuid;

use crate::error::{SymsignError, SymsignErrorKind};
use crate::format::{self, DebugInfoFormat};
use crate::pe::PeFile;
use crate::portable::PortablePdbFile;
use crate::windows::WindowsPdbFile;

/// The identity signature of a symbol file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolSignature {
    core: String,
    full: String,
}

impl SymbolSignature {
    /// Composes a signature from a GUID and an age or timestamp.
    pub fn from_parts(uuid: Uuid, age: u32) -> Self {
        let core = format!("{:X}", uuid.simple());
        let full = format!("{core}{age:X}");
        SymbolSignature { core, full }
    }

    /// The GUID component: 32 uppercase hex digits, no separators.
    ///
    /// Some consumers key on this alone, so it is preserved next to
    /// [`full`](Self::full).
    pub fn core(&self) -> &str {
        &self.core
    }

    /// The GUID concatenated with the uppercase hex age, unpadded.
    pub fn full(&self) -> &str {
        &self.full
    }
}

impl From<DebugId> for SymbolSignature {
    fn from(id: DebugId) -> Self {
        SymbolSignature::from_parts(id.uuid(), id.appendix())
    }
}

impl fmt::Display for SymbolSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// The identity signature of a plain executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinarySignature(String);

impl BinarySignature {
    /// Composes a signature from the link timestamp and the image size.
    ///
    /// Both values are rendered as uppercase hex of the numeric value, with
    /// no separator and no padding, regardless of how the container stored
    /// them.
    pub fn from_parts(timestamp: u32, image_size: u32) -> Self {
        BinarySignature(format!("{timestamp:X}{image_size:X}"))
    }

    /// The signature text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BinarySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opens a target file after checking the extraction preconditions.
///
/// The path must exist as a regular, non-empty file. Violations are
/// [`MissingOrEmptyFile`](SymsignErrorKind::MissingOrEmptyFile), which batch
/// callers treat as "skip this entry".
pub(crate) fn open_target(path: &Path) -> Result<ByteView<'static>, SymsignError> {
    let truly_file = fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false);
    if !truly_file {
        return Err(SymsignErrorKind::MissingOrEmptyFile.into());
    }

    Ok(ByteView::open(path)?)
}

/// Extracts the identity signature of the symbol file at the given path.
///
/// Dispatches on the detected format: Windows-native PDBs combine the root
/// GUID with the DBI age (default 1), Portable PDBs use the `#PDB` stream
/// id, and PE variants fall back to the CodeView debug record. Files of
/// unknown format or without a usable record fail with
/// [`UnsupportedVariant`](SymsignErrorKind::UnsupportedVariant).
pub fn symbol_signature(path: &Path) -> Result<SymbolSignature, SymsignError> {
    let view = open_target(path)?;
    let format = format::peek(&view).ok_or(SymsignErrorKind::InvalidFormat)?;

    match format {
        DebugInfoFormat::Windows => {
            let mut pdb = WindowsPdbFile::parse(&view)?;
            let (uuid, age) = pdb.debug_record()?;
            Ok(SymbolSignature::from_parts(uuid, age))
        }
        DebugInfoFormat::Portable => {
            let ppdb = PortablePdbFile::parse(&view)?;
            Ok(ppdb.debug_record()?.into())
        }
        DebugInfoFormat::EmbeddedPortable | DebugInfoFormat::Deterministic => {
            let pe = PeFile::parse(&view)?;
            let (uuid, age) = pe
                .debug_record()
                .ok_or(SymsignErrorKind::UnsupportedVariant)?;
            Ok(SymbolSignature::from_parts(uuid, age))
        }
        DebugInfoFormat::Unknown => Err(SymsignErrorKind::UnsupportedVariant.into()),
    }
}

/// Extracts the identity signature of the executable at the given path.
///
/// Structural failures such as a truncated or corrupt header are reported
/// as [`InvalidFormat`](SymsignErrorKind::InvalidFormat) and yield no
/// signature.
pub fn binary_signature(path: &Path) -> Result<BinarySignature, SymsignError> {
    let view = open_target(path)?;
    let pe = PeFile::parse(&view)?;
    let image_size = pe.image_size().ok_or(SymsignErrorKind::InvalidFormat)?;
    Ok(BinarySignature::from_parts(pe.timestamp(), image_size))
}
