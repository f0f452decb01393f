//! Binary encoding of ZIP/Zip64 records.
//!
//! Four record kinds frame a streamed archive: a local file header before
//! each entry's payload, a data descriptor after it, one central directory
//! file header per successful entry, and a single end-of-directory record.
//! All fields are little-endian per the ZIP application note.
//!
//! Width selection lives entirely in this module; the state machine hands
//! over 64-bit values and stays agnostic:
//!
//! - Local headers are always Zip64-framed. Sizes are unknowable when the
//!   header is emitted (the payload hasn't been read yet), so the classic
//!   fields carry `0xFFFF_FFFF` markers, a Zip64 extra field is attached,
//!   and general-purpose flag bit 3 defers the real values to the data
//!   descriptor, which consequently always uses 64-bit sizes.
//! - Central file headers use classic 32-bit fields when the sizes and the
//!   local-header offset all fit, and markers plus a Zip64 extra field
//!   otherwise.
//! - The end of the directory is a classic EOCD when counts and offsets
//!   fit its 16/32-bit fields, and a Zip64 EOCD + locator + marker EOCD
//!   chain otherwise.

use crate::codec::method;
use crate::{ArchivePath, Timestamp};

/// Local file header signature (`PK\x03\x04`).
pub const LOCAL_FILE_HEADER_SIG: u32 = 0x0403_4B50;
/// Data descriptor signature (`PK\x07\x08`).
pub const DATA_DESCRIPTOR_SIG: u32 = 0x0807_4B50;
/// Central directory file header signature (`PK\x01\x02`).
pub const CENTRAL_FILE_HEADER_SIG: u32 = 0x0201_4B50;
/// End of central directory signature (`PK\x05\x06`).
pub const END_OF_DIRECTORY_SIG: u32 = 0x0605_4B50;
/// Zip64 end of central directory signature (`PK\x06\x06`).
pub const ZIP64_END_OF_DIRECTORY_SIG: u32 = 0x0606_4B50;
/// Zip64 end of central directory locator signature (`PK\x06\x07`).
pub const ZIP64_LOCATOR_SIG: u32 = 0x0706_4B50;

/// Zip64 extended information extra field tag.
const ZIP64_EXTRA_ID: u16 = 0x0001;

/// Minimum version needed to extract (4.5, Zip64).
const VERSION_ZIP64: u16 = 45;

/// General-purpose flags: bit 3 (sizes in data descriptor) and bit 11
/// (UTF-8 name encoding).
const FLAGS: u16 = 0x0008 | 0x0800;

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Clamps a 64-bit value into a classic 32-bit field, saturating to the
/// Zip64 marker.
fn classic_u32(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

/// Encodes a local file header for a streamed entry.
///
/// CRC and sizes are zeroed/marked; the matching [`data_descriptor`]
/// carries the real values once the entry's source is exhausted.
pub fn local_file_header(path: &ArchivePath, timestamp: Timestamp) -> Vec<u8> {
    let name = path.as_str().as_bytes();
    let (dos_time, dos_date) = timestamp.to_dos();

    let mut out = Vec::with_capacity(30 + name.len() + 20);
    push_u32(&mut out, LOCAL_FILE_HEADER_SIG);
    push_u16(&mut out, VERSION_ZIP64);
    push_u16(&mut out, FLAGS);
    push_u16(&mut out, method::DEFLATE);
    push_u16(&mut out, dos_time);
    push_u16(&mut out, dos_date);
    push_u32(&mut out, 0); // crc-32, deferred to descriptor
    push_u32(&mut out, u32::MAX); // compressed size, Zip64 marker
    push_u32(&mut out, u32::MAX); // uncompressed size, Zip64 marker
    push_u16(&mut out, name.len() as u16);
    push_u16(&mut out, 20); // extra field length
    out.extend_from_slice(name);

    // Zip64 extra field with placeholder sizes
    push_u16(&mut out, ZIP64_EXTRA_ID);
    push_u16(&mut out, 16);
    push_u64(&mut out, 0); // uncompressed size
    push_u64(&mut out, 0); // compressed size

    out
}

/// Encodes a data descriptor closing a streamed entry.
///
/// Sizes are 64-bit: the preceding local header is Zip64-framed, so
/// conforming readers expect the wide form.
pub fn data_descriptor(checksum: u32, size_compressed: u64, size: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(24);
    push_u32(&mut out, DATA_DESCRIPTOR_SIG);
    push_u32(&mut out, checksum);
    push_u64(&mut out, size_compressed);
    push_u64(&mut out, size);
    out
}

/// Encodes a central directory file header for a successful entry.
///
/// Chooses classic or Zip64 field widths by magnitude: if the sizes and
/// the local-header offset all fit in 32 bits the record is classic,
/// otherwise the oversized values move into a Zip64 extra field.
pub fn central_file_header(
    offset: u64,
    path: &ArchivePath,
    checksum: u32,
    size_compressed: u64,
    size: u64,
    timestamp: Timestamp,
) -> Vec<u8> {
    let name = path.as_str().as_bytes();
    let (dos_time, dos_date) = timestamp.to_dos();
    let needs_zip64 =
        size >= u64::from(u32::MAX) || size_compressed >= u64::from(u32::MAX) || offset >= u64::from(u32::MAX);
    let extra_len: u16 = if needs_zip64 { 4 + 24 } else { 0 };

    let mut out = Vec::with_capacity(46 + name.len() + extra_len as usize);
    push_u32(&mut out, CENTRAL_FILE_HEADER_SIG);
    push_u16(&mut out, VERSION_ZIP64); // version made by
    push_u16(&mut out, VERSION_ZIP64); // version needed to extract
    push_u16(&mut out, FLAGS);
    push_u16(&mut out, method::DEFLATE);
    push_u16(&mut out, dos_time);
    push_u16(&mut out, dos_date);
    push_u32(&mut out, checksum);
    if needs_zip64 {
        push_u32(&mut out, u32::MAX);
        push_u32(&mut out, u32::MAX);
    } else {
        push_u32(&mut out, size_compressed as u32);
        push_u32(&mut out, size as u32);
    }
    push_u16(&mut out, name.len() as u16);
    push_u16(&mut out, extra_len);
    push_u16(&mut out, 0); // file comment length
    push_u16(&mut out, 0); // disk number start
    push_u16(&mut out, 0); // internal file attributes
    push_u32(&mut out, 0); // external file attributes
    push_u32(&mut out, classic_u32(offset));
    out.extend_from_slice(name);

    if needs_zip64 {
        push_u16(&mut out, ZIP64_EXTRA_ID);
        push_u16(&mut out, 24);
        push_u64(&mut out, size);
        push_u64(&mut out, size_compressed);
        push_u64(&mut out, offset);
    }

    out
}

/// Encodes the archive's end-of-directory trailer.
///
/// `entries_count` is the number of central file headers, `entries_size`
/// their total byte length, and `entries_offset` the absolute position
/// where the directory begins. Emits the Zip64 end record and locator
/// ahead of the classic EOCD whenever any field overflows its classic
/// width.
pub fn end_of_directory(entries_count: u64, entries_size: u64, entries_offset: u64) -> Vec<u8> {
    let needs_zip64 = entries_count >= u64::from(u16::MAX)
        || entries_size >= u64::from(u32::MAX)
        || entries_offset >= u64::from(u32::MAX);

    let mut out = Vec::with_capacity(if needs_zip64 { 56 + 20 + 22 } else { 22 });

    if needs_zip64 {
        // Zip64 end of central directory record
        push_u32(&mut out, ZIP64_END_OF_DIRECTORY_SIG);
        push_u64(&mut out, 44); // size of remaining record
        push_u16(&mut out, VERSION_ZIP64); // version made by
        push_u16(&mut out, VERSION_ZIP64); // version needed to extract
        push_u32(&mut out, 0); // this disk
        push_u32(&mut out, 0); // directory start disk
        push_u64(&mut out, entries_count); // entries on this disk
        push_u64(&mut out, entries_count); // entries total
        push_u64(&mut out, entries_size);
        push_u64(&mut out, entries_offset);

        // Zip64 end of central directory locator
        push_u32(&mut out, ZIP64_LOCATOR_SIG);
        push_u32(&mut out, 0); // disk with the Zip64 end record
        push_u64(&mut out, entries_offset + entries_size);
        push_u32(&mut out, 1); // total disks
    }

    // Classic end of central directory record
    push_u32(&mut out, END_OF_DIRECTORY_SIG);
    push_u16(&mut out, 0); // this disk
    push_u16(&mut out, 0); // directory start disk
    let classic_count = u16::try_from(entries_count).unwrap_or(u16::MAX);
    push_u16(&mut out, classic_count);
    push_u16(&mut out, classic_count);
    push_u32(&mut out, classic_u32(entries_size));
    push_u32(&mut out, classic_u32(entries_offset));
    push_u16(&mut out, 0); // comment length

    out
}
