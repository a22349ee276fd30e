//! Enumeration of the source files a symbol file claims to cover.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{SymsignError, SymsignErrorKind};
use crate::format::{self, DebugInfoFormat};
use crate::pe::PeFile;
use crate::portable::PortablePdbFile;
use crate::signature::open_target;
use crate::windows::WindowsPdbFile;

/// Drops blank entries and deduplicates case-insensitively.
///
/// Symbol files routinely record the same path with differing drive-letter
/// or directory casing; consumers expect one entry per file. First-seen
/// order is preserved, although no consumer depends on ordering.
fn collect_unique<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| !name.trim().is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect()
}

/// Enumerates the source paths referenced by the symbol file at `path`.
///
/// Portable PDBs (on disk or embedded in a PE image) are covered by their
/// document table. Windows-native PDBs need two complementary lists merged:
/// the `/names` string-table values and the line-program file tables, since
/// native files do not carry a direct type-to-file mapping usable for this
/// purpose.
///
/// The result contains no blank entries and no case-insensitive duplicates.
pub fn enumerate_sources(path: &Path) -> Result<Vec<String>, SymsignError> {
    let view = open_target(path)?;
    let format = format::peek(&view).ok_or(SymsignErrorKind::InvalidFormat)?;

    let names = match format {
        DebugInfoFormat::Windows => {
            let mut pdb = WindowsPdbFile::parse(&view)?;
            let mut names = pdb.name_stream_values()?;
            names.extend(pdb.line_program_files()?);
            names
        }
        DebugInfoFormat::Portable => PortablePdbFile::parse(&view)?.document_names()?,
        DebugInfoFormat::EmbeddedPortable => {
            let pe = PeFile::parse(&view)?;
            let blob = pe
                .embedded_portable_pdb()?
                .ok_or(SymsignErrorKind::InvalidFormat)?;
            PortablePdbFile::parse(&blob)?.document_names()?
        }
        DebugInfoFormat::Deterministic | DebugInfoFormat::Unknown => {
            return Err(SymsignErrorKind::UnsupportedVariant.into());
        }
    };

    Ok(collect_unique(names))
}
