//! Synthetic symbol containers for tests.
//!
//! Builds the smallest layouts the collaborator parsers accept: a PE32+
//! image with a caller-provided debug directory, an MSF 7.00 PDB with a PDB
//! information stream, a `/names` string table and an optional DBI stream,
//! and an ECMA-335 Portable PDB with a document table.

#![allow(dead_code)]

/// `IMAGE_DEBUG_TYPE_CODEVIEW`.
pub const DEBUG_TYPE_CODEVIEW: u32 = 2;
/// `IMAGE_DEBUG_TYPE_REPRO`.
pub const DEBUG_TYPE_REPRO: u32 = 16;
/// `IMAGE_DEBUG_TYPE_EMBEDDED_PORTABLE_PDB`.
pub const DEBUG_TYPE_EMBEDDED_PORTABLE_PDB: u32 = 17;

const SECTION_RVA: u32 = 0x1000;
const SECTION_OFFSET: u32 = 0x200;
const DEBUG_ENTRY_SIZE: usize = 28;

/// One debug directory entry plus its raw payload.
pub struct DebugEntrySpec {
    pub data_type: u32,
    pub payload: Vec<u8>,
}

impl DebugEntrySpec {
    pub fn new(data_type: u32, payload: Vec<u8>) -> Self {
        DebugEntrySpec { data_type, payload }
    }
}

/// A CodeView PDB 7.0 record with the GUID in its on-disk (little endian
/// field) layout.
pub fn codeview_payload(guid_le: [u8; 16], age: u32, pdb_name: &str) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(b"RSDS");
    payload.extend_from_slice(&guid_le);
    payload.extend_from_slice(&age.to_le_bytes());
    payload.extend_from_slice(pdb_name.as_bytes());
    payload.push(0);
    payload
}

/// An embedded Portable PDB blob: `MPDB` magic, uncompressed size, raw
/// deflate stream.
pub fn embedded_ppdb_payload(contents: &[u8]) -> Vec<u8> {
    use std::io::Write;

    let mut payload = Vec::new();
    payload.extend_from_slice(b"MPDB");
    payload.extend_from_slice(&(contents.len() as u32).to_le_bytes());

    let mut encoder =
        flate2::write::DeflateEncoder::new(&mut payload, flate2::Compression::default());
    encoder.write_all(contents).unwrap();
    encoder.finish().unwrap();

    payload
}

/// Builds a PE32+ image with the given COFF timestamp, image size and debug
/// directory entries.
pub fn build_pe(timestamp: u32, image_size: u32, debug: &[DebugEntrySpec]) -> Vec<u8> {
    let section_count: u16 = if debug.is_empty() { 0 } else { 1 };

    // DOS header: magic plus the PE header offset at 0x3c.
    let mut pe = vec![0u8; 0x40];
    pe[0..2].copy_from_slice(b"MZ");
    pe[0x3c..0x40].copy_from_slice(&0x40u32.to_le_bytes());

    pe.extend_from_slice(b"PE\0\0");

    // COFF header
    pe.extend_from_slice(&0x8664u16.to_le_bytes()); // machine: amd64
    pe.extend_from_slice(&section_count.to_le_bytes());
    pe.extend_from_slice(&timestamp.to_le_bytes());
    pe.extend_from_slice(&0u32.to_le_bytes()); // symbol table offset
    pe.extend_from_slice(&0u32.to_le_bytes()); // symbol count
    pe.extend_from_slice(&240u16.to_le_bytes()); // optional header size
    pe.extend_from_slice(&0x0022u16.to_le_bytes()); // executable image

    // Optional header, PE32+ standard fields
    pe.extend_from_slice(&0x20bu16.to_le_bytes());
    pe.extend_from_slice(&[14, 0]); // linker version
    pe.extend_from_slice(&0u32.to_le_bytes()); // size of code
    pe.extend_from_slice(&0u32.to_le_bytes()); // size of initialized data
    pe.extend_from_slice(&0u32.to_le_bytes()); // size of uninitialized data
    pe.extend_from_slice(&0u32.to_le_bytes()); // entry point
    pe.extend_from_slice(&0u32.to_le_bytes()); // base of code

    // Windows fields
    pe.extend_from_slice(&0x1_4000_0000u64.to_le_bytes()); // image base
    pe.extend_from_slice(&0x1000u32.to_le_bytes()); // section alignment
    pe.extend_from_slice(&0x200u32.to_le_bytes()); // file alignment
    pe.extend_from_slice(&6u16.to_le_bytes()); // os version major
    pe.extend_from_slice(&0u16.to_le_bytes());
    pe.extend_from_slice(&0u16.to_le_bytes()); // image version
    pe.extend_from_slice(&0u16.to_le_bytes());
    pe.extend_from_slice(&6u16.to_le_bytes()); // subsystem version
    pe.extend_from_slice(&0u16.to_le_bytes());
    pe.extend_from_slice(&0u32.to_le_bytes()); // win32 version
    pe.extend_from_slice(&image_size.to_le_bytes());
    pe.extend_from_slice(&0x200u32.to_le_bytes()); // size of headers
    pe.extend_from_slice(&0u32.to_le_bytes()); // checksum
    pe.extend_from_slice(&3u16.to_le_bytes()); // subsystem: console
    pe.extend_from_slice(&0u16.to_le_bytes()); // dll characteristics
    pe.extend_from_slice(&0x10_0000u64.to_le_bytes()); // stack reserve
    pe.extend_from_slice(&0x1000u64.to_le_bytes()); // stack commit
    pe.extend_from_slice(&0x10_0000u64.to_le_bytes()); // heap reserve
    pe.extend_from_slice(&0x1000u64.to_le_bytes()); // heap commit
    pe.extend_from_slice(&0u32.to_le_bytes()); // loader flags
    pe.extend_from_slice(&16u32.to_le_bytes()); // directory count

    // Data directories; index 6 is the debug directory.
    for index in 0..16u32 {
        if index == 6 && !debug.is_empty() {
            pe.extend_from_slice(&SECTION_RVA.to_le_bytes());
            pe.extend_from_slice(&((debug.len() * DEBUG_ENTRY_SIZE) as u32).to_le_bytes());
        } else {
            pe.extend_from_slice(&0u64.to_le_bytes());
        }
    }

    if section_count == 1 {
        pe.extend_from_slice(b".debug\0\0");
        pe.extend_from_slice(&0x200u32.to_le_bytes()); // virtual size
        pe.extend_from_slice(&SECTION_RVA.to_le_bytes());
        pe.extend_from_slice(&0x200u32.to_le_bytes()); // size of raw data
        pe.extend_from_slice(&SECTION_OFFSET.to_le_bytes());
        pe.extend_from_slice(&[0u8; 12]); // relocations and line numbers
        pe.extend_from_slice(&0x4000_0040u32.to_le_bytes()); // initialized, readable
    }

    pe.resize(SECTION_OFFSET as usize, 0);

    if section_count == 1 {
        let mut payload_offset = SECTION_OFFSET as usize + debug.len() * DEBUG_ENTRY_SIZE;
        let mut payloads = Vec::new();

        for spec in debug {
            let rva = SECTION_RVA as usize + (payload_offset - SECTION_OFFSET as usize);
            pe.extend_from_slice(&0u32.to_le_bytes()); // characteristics
            pe.extend_from_slice(&0u32.to_le_bytes()); // timestamp
            pe.extend_from_slice(&0u16.to_le_bytes()); // major version
            pe.extend_from_slice(&0u16.to_le_bytes()); // minor version
            pe.extend_from_slice(&spec.data_type.to_le_bytes());
            pe.extend_from_slice(&(spec.payload.len() as u32).to_le_bytes());
            pe.extend_from_slice(&(rva as u32).to_le_bytes());
            pe.extend_from_slice(&(payload_offset as u32).to_le_bytes());

            payloads.extend_from_slice(&spec.payload);
            payload_offset += spec.payload.len();
        }

        pe.extend_from_slice(&payloads);
        assert!(pe.len() <= 0x400, "debug payloads exceed the section");
        pe.resize(0x400, 0);
    }

    pe
}

/// The MSF 7.00 big-container magic.
pub const MSF_MAGIC: &[u8] = b"Microsoft C/C++ MSF 7.00\r\n\x1a\x44\x53\x00\x00\x00";

const MSF_PAGE: usize = 0x1000;

fn msf_info_stream(guid_le: [u8; 16]) -> Vec<u8> {
    let mut stream = Vec::new();
    stream.extend_from_slice(&20000404u32.to_le_bytes()); // VC70
    stream.extend_from_slice(&0x5f8c_1234u32.to_le_bytes()); // signature
    stream.extend_from_slice(&1u32.to_le_bytes()); // age
    stream.extend_from_slice(&guid_le);

    // named stream map with a single entry: "/names" in stream 5
    let names = b"/names\0";
    stream.extend_from_slice(&(names.len() as u32).to_le_bytes());
    stream.extend_from_slice(names);
    stream.extend_from_slice(&1u32.to_le_bytes()); // occupied slots
    stream.extend_from_slice(&1u32.to_le_bytes()); // capacity
    stream.extend_from_slice(&1u32.to_le_bytes()); // present bitvector words
    stream.extend_from_slice(&1u32.to_le_bytes()); // slot 0 occupied
    stream.extend_from_slice(&0u32.to_le_bytes()); // deleted bitvector words
    stream.extend_from_slice(&0u32.to_le_bytes()); // name offset of "/names"
    stream.extend_from_slice(&5u32.to_le_bytes()); // stream number
    stream.extend_from_slice(&20140508u32.to_le_bytes()); // VC140 feature code
    stream
}

fn msf_dbi_stream(age: u32) -> Vec<u8> {
    let mut stream = Vec::new();
    stream.extend_from_slice(&0xffff_ffffu32.to_le_bytes()); // new header marker
    stream.extend_from_slice(&19990903u32.to_le_bytes()); // V70
    stream.extend_from_slice(&age.to_le_bytes());
    for _ in 0..3 {
        stream.extend_from_slice(&0xffffu16.to_le_bytes()); // nil symbol stream
        stream.extend_from_slice(&0u16.to_le_bytes()); // version
    }
    stream.extend_from_slice(&[0u8; 32]); // substream sizes, all empty
    stream.extend_from_slice(&0u16.to_le_bytes()); // flags
    stream.extend_from_slice(&0x8664u16.to_le_bytes()); // machine: amd64
    stream.extend_from_slice(&0u32.to_le_bytes()); // reserved
    stream
}

fn msf_string_table_stream(names: &[&str]) -> Vec<u8> {
    let mut buffer = vec![0u8];
    for name in names {
        buffer.extend_from_slice(name.as_bytes());
        buffer.push(0);
    }

    let mut stream = Vec::new();
    stream.extend_from_slice(&0xeffe_effeu32.to_le_bytes());
    stream.extend_from_slice(&1u32.to_le_bytes()); // hash version
    stream.extend_from_slice(&(buffer.len() as u32).to_le_bytes());
    stream.extend_from_slice(&buffer);
    stream.extend_from_slice(&1u32.to_le_bytes()); // hash bucket count
    stream.extend_from_slice(&0u32.to_le_bytes());
    stream.extend_from_slice(&(names.len() as u32).to_le_bytes());
    stream
}

/// Builds a Windows-native (MSF 7.00) PDB.
///
/// The container carries a PDB information stream with the given GUID, a
/// `/names` string table holding `names`, and a DBI stream with the given
/// age. With `dbi_age` of `None` the DBI stream is left empty.
pub fn build_msf_pdb(guid_le: [u8; 16], dbi_age: Option<u32>, names: &[&str]) -> Vec<u8> {
    let info = msf_info_stream(guid_le);
    let strings = msf_string_table_stream(names);
    let dbi = dbi_age.map(msf_dbi_stream);
    let dbi_size = dbi.as_ref().map_or(0, Vec::len);
    assert!(info.len() <= MSF_PAGE && strings.len() <= MSF_PAGE && dbi_size <= MSF_PAGE);

    // Streams 0 (old directory), 2 (TPI) and 4 (IPI) stay empty. The PDB
    // information stream sits on page 5, the string table on page 6 and the
    // DBI stream on page 7.
    let sizes = [0u32, info.len() as u32, 0, dbi_size as u32, 0, strings.len() as u32];
    let mut directory = Vec::new();
    directory.extend_from_slice(&(sizes.len() as u32).to_le_bytes());
    for size in sizes {
        directory.extend_from_slice(&size.to_le_bytes());
    }
    directory.extend_from_slice(&5u32.to_le_bytes());
    if dbi.is_some() {
        directory.extend_from_slice(&7u32.to_le_bytes());
    }
    directory.extend_from_slice(&6u32.to_le_bytes());

    let mut file = vec![0u8; 8 * MSF_PAGE];

    // superblock on page 0
    let mut header = Vec::new();
    header.extend_from_slice(MSF_MAGIC);
    header.extend_from_slice(&(MSF_PAGE as u32).to_le_bytes());
    header.extend_from_slice(&1u32.to_le_bytes()); // free page map
    header.extend_from_slice(&8u32.to_le_bytes()); // page count
    header.extend_from_slice(&(directory.len() as u32).to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes()); // reserved
    header.extend_from_slice(&3u32.to_le_bytes()); // directory page list page
    file[..header.len()].copy_from_slice(&header);

    // free page maps on pages 1 and 2
    for byte in &mut file[MSF_PAGE..3 * MSF_PAGE] {
        *byte = 0xff;
    }

    file[3 * MSF_PAGE..3 * MSF_PAGE + 4].copy_from_slice(&4u32.to_le_bytes());
    file[4 * MSF_PAGE..4 * MSF_PAGE + directory.len()].copy_from_slice(&directory);
    file[5 * MSF_PAGE..5 * MSF_PAGE + info.len()].copy_from_slice(&info);
    file[6 * MSF_PAGE..6 * MSF_PAGE + strings.len()].copy_from_slice(&strings);
    if let Some(dbi) = dbi {
        file[7 * MSF_PAGE..7 * MSF_PAGE + dbi.len()].copy_from_slice(&dbi);
    }

    file
}

/// The id written into the `#Pdb` stream of portable fixtures: a GUID in
/// its on-disk (little endian field) layout plus a timestamp.
pub const PPDB_ID: [u8; 20] = [
    0x11, 0x0b, 0x2a, 0x3f, 0x33, 0x22, 0x55, 0x44, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc,
    0xdd, 0x78, 0x56, 0x34, 0x12,
];

const CSHARP_LANGUAGE_GUID_LE: [u8; 16] = [
    0x3f, 0x51, 0x62, 0xf8, 0x07, 0xc6, 0x11, 0xd3, 0x90, 0x53, 0x00, 0xc0, 0x4f, 0xa3, 0x02,
    0xa1,
];

fn push_blob(heap: &mut Vec<u8>, data: &[u8]) -> u16 {
    let offset = heap.len();
    // single-byte compressed encodings only
    assert!(offset < 0x80 && data.len() < 0x80, "blob heap too large");
    heap.push(data.len() as u8);
    heap.extend_from_slice(data);
    offset as u16
}

fn pad4(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

/// Builds an on-disk Portable PDB with a document table listing the given
/// backslash-separated names.
pub fn build_portable_pdb(documents: &[&str]) -> Vec<u8> {
    // blob heap; offset zero holds the empty blob
    let mut blob_heap = vec![0u8];

    // A document name is stored as a separator character followed by the
    // blob-heap offsets of its parts, offset zero meaning an empty part.
    let mut name_offsets = Vec::new();
    for document in documents {
        let mut name_blob = vec![b'\\'];
        for part in document.split('\\') {
            if part.is_empty() {
                name_blob.push(0);
            } else {
                name_blob.push(push_blob(&mut blob_heap, part.as_bytes()) as u8);
            }
        }
        name_offsets.push(push_blob(&mut blob_heap, &name_blob));
    }

    // #~ stream: header, Document row count, one 8-byte row per document
    let mut tables = Vec::new();
    tables.extend_from_slice(&0u32.to_le_bytes()); // reserved
    tables.push(2); // major version
    tables.push(0); // minor version
    tables.push(0); // heap sizes: 2-byte heap indices
    tables.push(1); // reserved
    tables.extend_from_slice(&(1u64 << 0x30).to_le_bytes()); // Document table
    tables.extend_from_slice(&0u64.to_le_bytes()); // sorted tables
    tables.extend_from_slice(&(documents.len() as u32).to_le_bytes());
    for offset in &name_offsets {
        tables.extend_from_slice(&offset.to_le_bytes()); // name
        tables.extend_from_slice(&1u16.to_le_bytes()); // hash algorithm
        tables.extend_from_slice(&0u16.to_le_bytes()); // hash
        tables.extend_from_slice(&1u16.to_le_bytes()); // language
    }

    let mut pdb_stream = Vec::new();
    pdb_stream.extend_from_slice(&PPDB_ID);
    pdb_stream.extend_from_slice(&0u32.to_le_bytes()); // entry point
    pdb_stream.extend_from_slice(&0u64.to_le_bytes()); // referenced tables

    let mut strings_heap = vec![0u8];
    let guid_heap = CSHARP_LANGUAGE_GUID_LE.to_vec();
    pad4(&mut tables);
    pad4(&mut strings_heap);
    pad4(&mut blob_heap);

    let streams: [(&str, &[u8]); 5] = [
        ("#Pdb", &pdb_stream),
        ("#~", &tables),
        ("#Strings", &strings_heap),
        ("#GUID", &guid_heap),
        ("#Blob", &blob_heap),
    ];

    let rounded_name_len =
        |name: &str| (name.len() + 1 + 3) & !3;
    let root_len: usize = 16
        + 12
        + 4
        + streams
            .iter()
            .map(|(name, _)| 8 + rounded_name_len(name))
            .sum::<usize>();

    let mut out = Vec::new();
    out.extend_from_slice(&0x424a_5342u32.to_le_bytes()); // BSJB
    out.extend_from_slice(&1u16.to_le_bytes()); // major version
    out.extend_from_slice(&1u16.to_le_bytes()); // minor version
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.extend_from_slice(&12u32.to_le_bytes()); // version string length
    out.extend_from_slice(b"PDB v1.0\0\0\0\0");
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&(streams.len() as u16).to_le_bytes());

    let mut offset = root_len;
    for (name, contents) in &streams {
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        out.extend_from_slice(&(contents.len() as u32).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        for _ in name.len()..rounded_name_len(name) {
            out.push(0);
        }
        offset += contents.len();
    }
    assert_eq!(out.len(), root_len);

    for (_, contents) in &streams {
        out.extend_from_slice(contents);
    }

    out
}
