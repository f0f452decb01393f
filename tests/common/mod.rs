//! Shared helpers for integration tests: a structure-level parser for the
//! archives the stream produces.
//!
//! The parser reads the central directory from the end (the way extraction
//! tools do), then locates each entry's local record through its directory
//! offset. It checks signatures and internal consistency eagerly with
//! asserts, so structural breakage fails loudly at the parse site.

#![allow(dead_code)] // not every test binary uses every helper

use std::io::Read;

const LOCAL_SIG: u32 = 0x0403_4B50;
const DESCRIPTOR_SIG: u32 = 0x0807_4B50;
const CENTRAL_SIG: u32 = 0x0201_4B50;
const EOCD_SIG: u32 = 0x0605_4B50;
const EOCD64_SIG: u32 = 0x0606_4B50;
const LOCATOR_SIG: u32 = 0x0706_4B50;

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(bytes[at..at + 2].try_into().unwrap())
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

fn u64_at(bytes: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap())
}

/// One entry's local record, located via its central directory offset.
#[derive(Debug)]
pub struct LocalEntry {
    pub name: String,
    pub dos_time: u16,
    pub dos_date: u16,
    /// Compressed payload between the local header and the descriptor.
    pub payload: Vec<u8>,
    pub descriptor_crc: u32,
    pub descriptor_compressed: u64,
    pub descriptor_size: u64,
    /// Absolute position of the local header.
    pub offset: u64,
    /// Absolute position one past the data descriptor.
    pub end: u64,
}

/// One central directory file header.
#[derive(Debug)]
pub struct CentralEntry {
    pub name: String,
    pub crc: u32,
    pub compressed: u64,
    pub size: u64,
    pub offset: u64,
}

/// A structurally parsed archive.
#[derive(Debug)]
pub struct ParsedArchive {
    /// Local records, in central directory order.
    pub locals: Vec<LocalEntry>,
    /// Central directory records, in emission order.
    pub central: Vec<CentralEntry>,
    pub end_count: u64,
    pub end_size: u64,
    pub end_offset: u64,
    /// Whether the trailer used the Zip64 end record + locator chain.
    pub zip64_end: bool,
}

/// Parses an archive produced by the stream, asserting structural sanity.
pub fn parse_archive(bytes: &[u8]) -> ParsedArchive {
    assert!(bytes.len() >= 22, "archive shorter than an end record");

    // Classic EOCD sits at the very end (the stream writes no comment).
    let eocd = bytes.len() - 22;
    assert_eq!(u32_at(bytes, eocd), EOCD_SIG, "missing end record");
    let classic_count = u16_at(bytes, eocd + 10);
    let classic_size = u32_at(bytes, eocd + 12);
    let classic_offset = u32_at(bytes, eocd + 16);
    assert_eq!(u16_at(bytes, eocd + 20), 0, "unexpected comment");

    let zip64_end = classic_count == u16::MAX
        || classic_size == u32::MAX
        || classic_offset == u32::MAX;

    let (end_count, end_size, end_offset) = if zip64_end {
        let locator = eocd - 20;
        assert_eq!(u32_at(bytes, locator), LOCATOR_SIG, "missing Zip64 locator");
        let eocd64 = u64_at(bytes, locator + 8) as usize;
        assert_eq!(u32_at(bytes, eocd64), EOCD64_SIG, "missing Zip64 end record");
        assert_eq!(u64_at(bytes, eocd64 + 4), 44);
        (
            u64_at(bytes, eocd64 + 32),
            u64_at(bytes, eocd64 + 40),
            u64_at(bytes, eocd64 + 48),
        )
    } else {
        (
            u64::from(classic_count),
            u64::from(classic_size),
            u64::from(classic_offset),
        )
    };

    // Walk the central directory.
    let mut central = Vec::new();
    let mut pos = end_offset as usize;
    let directory_end = pos + end_size as usize;
    while pos < directory_end {
        assert_eq!(u32_at(bytes, pos), CENTRAL_SIG, "bad central header at {pos}");
        let crc = u32_at(bytes, pos + 16);
        let mut compressed = u64::from(u32_at(bytes, pos + 20));
        let mut size = u64::from(u32_at(bytes, pos + 24));
        let name_len = u16_at(bytes, pos + 28) as usize;
        let extra_len = u16_at(bytes, pos + 30) as usize;
        let comment_len = u16_at(bytes, pos + 32) as usize;
        let mut offset = u64::from(u32_at(bytes, pos + 42));
        let name = String::from_utf8(bytes[pos + 46..pos + 46 + name_len].to_vec()).unwrap();

        // Zip64 extra field overrides marked values
        let mut extra = &bytes[pos + 46 + name_len..pos + 46 + name_len + extra_len];
        while extra.len() >= 4 {
            let tag = u16::from_le_bytes(extra[..2].try_into().unwrap());
            let len = u16::from_le_bytes(extra[2..4].try_into().unwrap()) as usize;
            let body = &extra[4..4 + len];
            if tag == 0x0001 {
                let mut at = 0;
                if size == u64::from(u32::MAX) {
                    size = u64::from_le_bytes(body[at..at + 8].try_into().unwrap());
                    at += 8;
                }
                if compressed == u64::from(u32::MAX) {
                    compressed = u64::from_le_bytes(body[at..at + 8].try_into().unwrap());
                    at += 8;
                }
                if offset == u64::from(u32::MAX) {
                    offset = u64::from_le_bytes(body[at..at + 8].try_into().unwrap());
                }
            }
            extra = &extra[4 + len..];
        }

        central.push(CentralEntry {
            name,
            crc,
            compressed,
            size,
            offset,
        });
        pos += 46 + name_len + extra_len + comment_len;
    }
    assert_eq!(pos, directory_end, "central directory size mismatch");
    assert_eq!(central.len() as u64, end_count, "entry count mismatch");

    // Locate each local record through its directory offset.
    let locals = central
        .iter()
        .map(|c| parse_local(bytes, c))
        .collect();

    ParsedArchive {
        locals,
        central,
        end_count,
        end_size,
        end_offset,
        zip64_end,
    }
}

fn parse_local(bytes: &[u8], central: &CentralEntry) -> LocalEntry {
    let pos = central.offset as usize;
    assert_eq!(u32_at(bytes, pos), LOCAL_SIG, "bad local header at {pos}");
    assert_eq!(u16_at(bytes, pos + 6), 0x0808, "expected descriptor + UTF-8 flags");
    assert_eq!(u16_at(bytes, pos + 8), 8, "expected deflate");
    let dos_time = u16_at(bytes, pos + 10);
    let dos_date = u16_at(bytes, pos + 12);
    assert_eq!(u32_at(bytes, pos + 14), 0, "local crc must be deferred");
    let name_len = u16_at(bytes, pos + 26) as usize;
    let extra_len = u16_at(bytes, pos + 28) as usize;
    let name = String::from_utf8(bytes[pos + 30..pos + 30 + name_len].to_vec()).unwrap();
    assert_eq!(name, central.name, "local/central name mismatch");

    let payload_start = pos + 30 + name_len + extra_len;
    let payload_end = payload_start + central.compressed as usize;
    let payload = bytes[payload_start..payload_end].to_vec();

    assert_eq!(
        u32_at(bytes, payload_end),
        DESCRIPTOR_SIG,
        "missing data descriptor for '{}'",
        central.name
    );
    let descriptor_crc = u32_at(bytes, payload_end + 4);
    let descriptor_compressed = u64_at(bytes, payload_end + 8);
    let descriptor_size = u64_at(bytes, payload_end + 16);

    LocalEntry {
        name,
        dos_time,
        dos_date,
        payload,
        descriptor_crc,
        descriptor_compressed,
        descriptor_size,
        offset: central.offset,
        end: (payload_end + 24) as u64,
    }
}

/// Inflates a raw-deflate payload back to the original bytes.
pub fn inflate(payload: &[u8]) -> Vec<u8> {
    let mut decoder = flate2::bufread::DeflateDecoder::new(payload);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .expect("payload must be a valid deflate stream");
    out
}

/// Drains a stream to completion, returning the concatenated output.
pub fn drain(stream: &mut zipflow::ZipStream) -> zipflow::Result<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next_chunk() {
        let chunk = chunk?;
        assert!(!chunk.is_empty(), "next_chunk must not yield empty chunks");
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}
