//! ZIP format constants and record layouts.
//!
//! This module contains the signatures, flag bits, and version constants
//! defined by the ZIP application note, plus the record structs in
//! [`records`] that serialize them.

pub mod records;

/// Local file header signature (`PK\x03\x04`).
pub const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x04034B50;

/// Data descriptor signature (`PK\x07\x08`).
pub const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x08074B50;

/// Central directory file header signature (`PK\x01\x02`).
pub const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x02014B50;

/// End of central directory record signature (`PK\x05\x06`).
pub const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x06054B50;

/// Zip64 end of central directory record signature (`PK\x06\x06`).
pub const ZIP64_END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x06064B50;

/// Zip64 end of central directory locator signature (`PK\x06\x07`).
pub const ZIP64_LOCATOR_SIGNATURE: u32 = 0x07064B50;

/// Marker written at offset 0 of the first volume of a split archive.
///
/// Shares its value with the data descriptor signature; at the start of
/// the first volume it marks a spanned/split archive.
pub const SPLIT_SIGNATURE: u32 = 0x08074B50;

/// Extra field header id for Zip64 extended information.
pub const ZIP64_EXTRA_FIELD_ID: u16 = 0x0001;

/// Extra field header id for the WinZip AES record.
pub const AES_EXTRA_FIELD_ID: u16 = 0x9901;

/// Compression method id recorded for AES-encrypted entries; the real
/// method lives in the AES extra field.
pub const AES_COMPRESSION_METHOD: u16 = 99;

/// General purpose flag bit 0: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// General purpose flag bit 3: sizes and CRC follow the content in a
/// data descriptor.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// General purpose flag bit 11: name and comment are UTF-8.
pub const FLAG_UTF8: u16 = 0x0800;

/// Version needed to extract a plain entry (2.0: deflate, directories).
pub const VERSION_NEEDED_DEFAULT: u16 = 20;

/// Version needed to extract an entry with Zip64 fields (4.5).
pub const VERSION_NEEDED_ZIP64: u16 = 45;

/// Version needed to extract an AES-encrypted entry (5.1).
pub const VERSION_NEEDED_AES: u16 = 51;

/// Sentinel stored in 32-bit size/offset fields when the real value is
/// in a Zip64 extra field.
pub const ZIP64_MARKER_U32: u32 = 0xFFFF_FFFF;

/// Sentinel stored in 16-bit count/disk fields when the real value is in
/// a Zip64 record.
pub const ZIP64_MARKER_U16: u16 = 0xFFFF;

/// DOS external attribute bit for directory entries.
pub const DOS_ATTRIBUTE_DIRECTORY: u32 = 0x10;
