//! Support for Portable PDBs, the ECMA-335 based debug format of .NET.
//!
//! Portable PDBs carry their identity (GUID plus timestamp) in the `#PDB`
//! stream and reference source files through the document table, so both
//! pieces are available without touching nested streams. The same reader
//! serves the embedded variant once `PeFile::embedded_portable_pdb` has
//! inflated the blob out of the carrying image.

use debugid::DebugId;
use symbolic_ppdb::PortablePdb;

use crate::error::{SymsignError, SymsignErrorKind};

/// The ECMA-335 metadata signature ("BSJB") that opens a Portable PDB.
pub(crate) const METADATA_MAGIC: &[u8] = b"BSJB";

/// A parsed Portable PDB file.
pub struct PortablePdbFile<'data> {
    ppdb: PortablePdb<'data>,
}

impl<'data> PortablePdbFile<'data> {
    /// Tests whether the buffer could contain a Portable PDB.
    pub fn test(data: &[u8]) -> bool {
        data.starts_with(METADATA_MAGIC)
    }

    /// Tries to parse a Portable PDB from the given slice.
    pub fn parse(data: &'data [u8]) -> Result<Self, SymsignError> {
        let ppdb = PortablePdb::parse(data)?;
        Ok(PortablePdbFile { ppdb })
    }

    /// The identity of this PDB from the `#PDB` stream.
    ///
    /// The appendix of the returned id is the age/timestamp component.
    pub fn debug_record(&self) -> Result<DebugId, SymsignError> {
        self.ppdb
            .pdb_id()
            .ok_or_else(|| SymsignErrorKind::UnsupportedVariant.into())
    }

    /// The names of all documents recorded in the document table.
    pub fn document_names(&self) -> Result<Vec<String>, SymsignError> {
        let count = self.ppdb.get_documents_count()?;
        let mut names = Vec::with_capacity(count);
        // Document rows are 1-based.
        for index in 1..=count {
            names.push(self.ppdb.get_document(index)?.name);
        }
        Ok(names)
    }
}
