//! Support for Windows-native PDBs, the MSF-based debug companion format.
//!
//! Identity and source information live in separate places inside the
//! container: the GUID comes from the PDB information stream, the
//! authoritative age from the DBI stream header, source references from the
//! per-module line programs and from the `/names` string table.

use std::io::Cursor;

use pdb::FallibleIterator;
use scroll::Pread;
use uuid::Uuid;

use crate::error::{SymsignError, SymsignErrorKind};

/// The magic of MSF 7.00 containers, the only big-variant PDBs in use.
pub(crate) const MAGIC_BIG: &[u8] = b"Microsoft C/C++ MSF 7.00\r\n\x1a\x44\x53\x00\x00\x00";

const NAMES_STREAM_MAGIC: u32 = 0xEFFE_EFFE;

type Pdb<'d> = pdb::PDB<'d, Cursor<&'d [u8]>>;

/// A parsed Windows-native PDB file.
pub struct WindowsPdbFile<'data> {
    pdb: Pdb<'data>,
}

impl<'data> WindowsPdbFile<'data> {
    /// Tests whether the buffer could contain a Windows-native PDB.
    pub fn test(data: &[u8]) -> bool {
        data.starts_with(MAGIC_BIG)
    }

    /// Tries to parse a Windows-native PDB from the given slice.
    pub fn parse(data: &'data [u8]) -> Result<Self, SymsignError> {
        let pdb = Pdb::open(Cursor::new(data))?;
        Ok(WindowsPdbFile { pdb })
    }

    /// The identity of this PDB: root GUID plus DBI age.
    ///
    /// The DBI stream can legitimately be absent or empty, in which case the
    /// age defaults to 1.
    pub fn debug_record(&mut self) -> Result<(Uuid, u32), SymsignError> {
        let age = match self.pdb.debug_information() {
            Ok(dbi) => dbi.age().unwrap_or(1),
            Err(_) => 1,
        };

        let info = self.pdb.pdb_information()?;
        // The pdb crate is still on an older uuid, bridge via raw bytes.
        let uuid = Uuid::from_slice(info.guid.as_bytes())
            .map_err(|e| SymsignError::new(SymsignErrorKind::InvalidFormat, e))?;

        Ok((uuid, age))
    }

    /// The values of the `/names` string table.
    ///
    /// Native PDBs for C++ do not carry a usable type-to-file mapping for
    /// generated files, they reference them through this table instead. An
    /// absent or malformed table yields an empty list.
    pub fn name_stream_values(&mut self) -> Result<Vec<String>, SymsignError> {
        let stream = match self.pdb.named_stream(b"/names") {
            Ok(stream) => stream,
            Err(pdb::Error::StreamNameNotFound) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(parse_names_stream(stream.as_slice()))
    }

    /// The file names referenced by the per-module line programs.
    pub fn line_program_files(&mut self) -> Result<Vec<String>, SymsignError> {
        let string_table = match self.pdb.string_table() {
            Ok(string_table) => Some(string_table),
            Err(pdb::Error::StreamNameNotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let dbi = self.pdb.debug_information()?;
        let mut names = Vec::new();

        let mut modules = dbi.modules()?;
        while let Some(module) = modules.next()? {
            let info = match self.pdb.module_info(&module)? {
                Some(info) => info,
                None => continue,
            };

            let program = info.line_program()?;
            let mut files = program.files();
            while let Some(file) = files.next()? {
                let name = match string_table {
                    Some(ref string_table) => file.name.to_raw_string(string_table)?,
                    None => continue,
                };
                names.push(name.to_string().into_owned());
            }
        }

        Ok(names)
    }
}

/// Extracts the string values from a raw `/names` stream.
///
/// The stream starts with a magic, a hash version and the size of the names
/// buffer; the buffer itself holds NUL-terminated strings. Anything that
/// does not look like that is treated as an empty table.
pub(crate) fn parse_names_stream(data: &[u8]) -> Vec<String> {
    let magic: u32 = match data.pread_with(0, scroll::LE) {
        Ok(magic) => magic,
        Err(_) => return Vec::new(),
    };
    if magic != NAMES_STREAM_MAGIC {
        return Vec::new();
    }

    let size = match data.pread_with::<u32>(8, scroll::LE) {
        Ok(size) => size as usize,
        Err(_) => return Vec::new(),
    };
    let buffer = match data.get(12..12 + size) {
        Some(buffer) => buffer,
        None => return Vec::new(),
    };

    buffer
        .split(|&b| b == 0)
        .filter(|s| !s.is_empty())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}
