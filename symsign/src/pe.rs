//! Support for Portable Executables, the container format of Windows
//! binaries and .NET assemblies.
//!
//! PE files enter the picture twice: plain binaries contribute a
//! [`timestamp`](PeFile::timestamp) / [`image_size`](PeFile::image_size)
//! based identity, and .NET assemblies may carry their debug information
//! inside the image as an embedded Portable PDB referenced from the debug
//! directory.

use std::io::Read;

use goblin::pe;
use goblin::pe::debug::ImageDebugDirectory;
use goblin::pe::section_table::SectionTable;
use scroll::Pread;
use uuid::Uuid;

use crate::error::{SymsignError, SymsignErrorKind};

/// `IMAGE_DEBUG_TYPE_REPRO`, the marker of deterministic builds.
///
/// Not exposed by goblin 0.8, which only surfaces the first debug directory
/// entry.
pub const DEBUG_TYPE_REPRO: u32 = 16;

/// `IMAGE_DEBUG_TYPE_EMBEDDED_PORTABLE_PDB`.
pub const DEBUG_TYPE_EMBEDDED_PORTABLE_PDB: u32 = 17;

/// Magic of the embedded Portable PDB blob ("MPDB").
const EMBEDDED_PPDB_MAGIC: &[u8] = b"MPDB";

const DEBUG_ENTRY_SIZE: usize = 28;

/// Translates a relative virtual address into a file offset.
fn rva_to_offset(rva: usize, sections: &[SectionTable]) -> Option<usize> {
    sections.iter().find_map(|section| {
        let start = section.virtual_address as usize;
        let size = section.size_of_raw_data as usize;
        if rva >= start && rva < start + size {
            Some(rva - start + section.pointer_to_raw_data as usize)
        } else {
            None
        }
    })
}

/// A parsed Portable Executable.
pub struct PeFile<'data> {
    pe: pe::PE<'data>,
    data: &'data [u8],
}

impl<'data> PeFile<'data> {
    /// Tests whether the buffer could contain a PE file.
    pub fn test(data: &[u8]) -> bool {
        matches!(
            data.pread_with::<u16>(0, scroll::LE),
            Ok(pe::header::DOS_MAGIC)
        )
    }

    /// Tries to parse a PE file from the given slice.
    pub fn parse(data: &'data [u8]) -> Result<Self, SymsignError> {
        let pe = pe::PE::parse(data)?;
        Ok(PeFile { pe, data })
    }

    /// The link timestamp from the COFF header.
    pub fn timestamp(&self) -> u32 {
        self.pe.header.coff_header.time_date_stamp
    }

    /// The in-memory image size from the optional header, if present.
    pub fn image_size(&self) -> Option<u32> {
        self.pe
            .header
            .optional_header
            .as_ref()
            .map(|opt| opt.windows_fields.size_of_image)
    }

    /// The GUID and age from the CodeView (PDB 7.0) debug record, if present.
    ///
    /// This record identifies the symbol file matching the image, so it is
    /// also the identity of an embedded Portable PDB.
    pub fn debug_record(&self) -> Option<(Uuid, u32)> {
        self.pe
            .debug_data
            .as_ref()
            .and_then(|debug_data| debug_data.codeview_pdb70_debug_info.as_ref())
            .and_then(|debug_info| {
                // PE stores the signature with little endian UUID fields.
                // Convert to network byte order to obtain the canonical GUID.
                let mut data = debug_info.signature;
                data[0..4].reverse(); // uuid field 1
                data[4..6].reverse(); // uuid field 2
                data[6..8].reverse(); // uuid field 3

                let uuid = Uuid::from_slice(&data).ok()?;
                Some((uuid, debug_info.age))
            })
    }

    /// All entries of the debug data directory.
    ///
    /// goblin only parses the first entry, but format classification needs
    /// the reproducible-build and embedded-PDB markers that follow it.
    pub fn debug_entries(&self) -> Result<Vec<ImageDebugDirectory>, SymsignError> {
        let Some(optional_header) = self.pe.header.optional_header.as_ref() else {
            return Ok(Vec::new());
        };
        let debug_table = optional_header.data_directories.get_debug_table();
        let Some(directory) = debug_table.as_ref() else {
            return Ok(Vec::new());
        };

        let offset = rva_to_offset(directory.virtual_address as usize, &self.pe.sections)
            .ok_or(SymsignErrorKind::InvalidFormat)?;

        let count = directory.size as usize / DEBUG_ENTRY_SIZE;
        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let entry: ImageDebugDirectory = self
                .data
                .pread_with(offset + index * DEBUG_ENTRY_SIZE, scroll::LE)?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Extracts and inflates the embedded Portable PDB blob, if any.
    ///
    /// The blob starts with an `MPDB` magic and the uncompressed size,
    /// followed by a raw deflate stream of the Portable PDB contents.
    pub fn embedded_portable_pdb(&self) -> Result<Option<Vec<u8>>, SymsignError> {
        let entry = match self
            .debug_entries()?
            .into_iter()
            .find(|entry| entry.data_type == DEBUG_TYPE_EMBEDDED_PORTABLE_PDB)
        {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let start = entry.pointer_to_raw_data as usize;
        let end = start + entry.size_of_data as usize;
        let blob = self
            .data
            .get(start..end)
            .ok_or(SymsignErrorKind::InvalidFormat)?;

        if !blob.starts_with(EMBEDDED_PPDB_MAGIC) || blob.len() < 8 {
            return Err(SymsignErrorKind::InvalidFormat.into());
        }

        let uncompressed_size: u32 = blob.pread_with(4, scroll::LE)?;
        let mut inflated = Vec::with_capacity(uncompressed_size as usize);
        flate2::read::DeflateDecoder::new(&blob[8..])
            .read_to_end(&mut inflated)
            .map_err(|e| SymsignError::new(SymsignErrorKind::InvalidFormat, e))?;

        Ok(Some(inflated))
    }
}
