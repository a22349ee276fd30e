//! Source-link rewriting for Portable PDB files.
//!
//! Source link maps the logical document names recorded in a symbol file to
//! retrievable URLs. The rewrite itself, producing a new container with the
//! updated metadata blob, is delegated to an external patch primitive; this
//! module owns the validation around it and the backup-then-replace file
//! contract: after a successful rewrite both the `.original` backup and the
//! rewritten file exist, and after a failed one the backup is the only
//! valid copy.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::{SymsignError, SymsignErrorKind};
use crate::format::{self, DebugInfoFormat};

/// The suffix appended to the symbol file name for the pre-rewrite backup.
pub const BACKUP_SUFFIX: &str = ".original";

/// An externally supplied mapping from logical document name to URL.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SourceLinkDescriptor {
    /// The document-to-URL mapping embedded into the symbol file.
    pub documents: BTreeMap<String, String>,
}

/// Reads and validates a source-link descriptor document.
///
/// Fails with [`MalformedDescriptor`](SymsignErrorKind::MalformedDescriptor)
/// when the file cannot be parsed or maps no documents.
pub fn read_descriptor(path: &Path) -> Result<SourceLinkDescriptor, SymsignError> {
    let contents = fs::read(path)
        .map_err(|e| SymsignError::new(SymsignErrorKind::MalformedDescriptor, e))?;
    let descriptor: SourceLinkDescriptor = serde_json::from_slice(&contents)?;

    if descriptor.documents.is_empty() {
        return Err(SymsignErrorKind::MalformedDescriptor.into());
    }

    Ok(descriptor)
}

/// The external rewrite primitive.
///
/// Given the renamed original file and a descriptor, it produces a rewritten
/// container at `target` with the descriptor embedded as source-link
/// metadata. Implementations must either complete the target or leave it
/// absent; a reported failure means the target path is not usable.
pub trait SourceLinkPatch {
    /// Rewrites `original` into `target` with the descriptor's documents.
    fn patch(&self, original: &Path, descriptor: &Path, target: &Path)
        -> Result<(), SymsignError>;
}

/// A [`SourceLinkPatch`] that drives an external patch tool.
///
/// The tool is invoked as `<tool> <original> <descriptor> <target>` and must
/// exit with status 0 on success.
#[derive(Clone, Debug)]
pub struct PatchTool {
    tool: PathBuf,
}

impl PatchTool {
    /// Creates a patcher around the tool at the given path.
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        PatchTool { tool: tool.into() }
    }
}

impl SourceLinkPatch for PatchTool {
    fn patch(
        &self,
        original: &Path,
        descriptor: &Path,
        target: &Path,
    ) -> Result<(), SymsignError> {
        let status = Command::new(&self.tool)
            .arg(original)
            .arg(descriptor)
            .arg(target)
            .status()
            .map_err(|e| SymsignError::new(SymsignErrorKind::PatchFailed, e))?;

        if !status.success() {
            return Err(SymsignErrorKind::PatchFailed.into());
        }
        Ok(())
    }
}

fn backup_path(symbols_file: &Path) -> PathBuf {
    let mut os: OsString = symbols_file.as_os_str().to_owned();
    os.push(BACKUP_SUFFIX);
    PathBuf::from(os)
}

/// Replaces the source-link metadata of a Portable PDB file.
///
/// Preconditions: both files exist, the symbol file detects as `Portable`
/// (the embedded-in-binary variant is rejected), and the descriptor maps at
/// least one document. None of these failures modifies the original file.
///
/// On success the original content survives as the `.original` backup (a
/// stale backup of the same name is replaced) and the rewritten file sits
/// at the original path. When the patch primitive fails, the backup remains
/// on disk as the only valid copy, and the error propagates.
pub fn rewrite_source_links(
    symbols_file: &Path,
    descriptor_file: &Path,
    patch: &impl SourceLinkPatch,
) -> Result<(), SymsignError> {
    if !symbols_file.is_file() || !descriptor_file.is_file() {
        return Err(SymsignErrorKind::MissingOrEmptyFile.into());
    }

    let format = format::detect(symbols_file)?;
    if format != DebugInfoFormat::Portable {
        return Err(SymsignErrorKind::UnsupportedVariant.into());
    }

    // Validated for content only; the patch primitive re-reads the file.
    read_descriptor(descriptor_file)?;

    let backup = backup_path(symbols_file);
    if backup.is_file() {
        fs::remove_file(&backup)?;
    }
    fs::rename(symbols_file, &backup)?;

    patch.patch(&backup, descriptor_file, symbols_file)
}
