//! Serialization of ZIP records.
//!
//! All multi-byte fields are little-endian. Each record offers
//! `to_bytes`, and the writer treats every serialized record as an
//! atomic unit that must not straddle a split-volume boundary.

use super::*;

/// Little-endian encode helper.
#[derive(Debug, Default)]
struct RecordBuf {
    bytes: Vec<u8>,
}

impl RecordBuf {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn u64(&mut self, v: u64) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn raw(&mut self, v: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(v);
        self
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Caps a 64-bit value to a 32-bit field, substituting the Zip64 marker.
#[inline]
pub fn cap_u32(v: u64) -> u32 {
    if v >= ZIP64_MARKER_U32 as u64 {
        ZIP64_MARKER_U32
    } else {
        v as u32
    }
}

/// Caps a 32-bit value to a 16-bit field, substituting the Zip64 marker.
#[inline]
pub fn cap_u16(v: u32) -> u16 {
    if v >= ZIP64_MARKER_U16 as u32 {
        ZIP64_MARKER_U16
    } else {
        v as u16
    }
}

/// Local file header.
///
/// Written before the entry content. In streaming mode (flag bit 3) the
/// CRC and size fields are zero and the authoritative values follow in
/// the data descriptor.
#[derive(Debug, Clone)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub method: u16,
    pub dos_time: u16,
    pub dos_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name: Vec<u8>,
    pub extra: Vec<u8>,
}

impl LocalFileHeader {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = RecordBuf::with_capacity(30 + self.name.len() + self.extra.len());
        buf.u32(LOCAL_FILE_HEADER_SIGNATURE)
            .u16(self.version_needed)
            .u16(self.flags)
            .u16(self.method)
            .u16(self.dos_time)
            .u16(self.dos_date)
            .u32(self.crc32)
            .u32(self.compressed_size)
            .u32(self.uncompressed_size)
            .u16(self.name.len() as u16)
            .u16(self.extra.len() as u16)
            .raw(&self.name)
            .raw(&self.extra);
        buf.into_bytes()
    }
}

/// Data descriptor, written after streamed entry content.
///
/// The signature is always emitted; size fields widen to 64 bits when
/// either size overflows a 32-bit field, or when `zip64` is set because
/// the local header already announced Zip64 sizes.
#[derive(Debug, Clone, Copy)]
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub zip64: bool,
}

impl DataDescriptor {
    /// Whether this descriptor needs 64-bit size fields.
    pub fn is_zip64(&self) -> bool {
        self.zip64
            || self.compressed_size >= ZIP64_MARKER_U32 as u64
            || self.uncompressed_size >= ZIP64_MARKER_U32 as u64
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = RecordBuf::with_capacity(24);
        buf.u32(DATA_DESCRIPTOR_SIGNATURE).u32(self.crc32);
        if self.is_zip64() {
            buf.u64(self.compressed_size).u64(self.uncompressed_size);
        } else {
            buf.u32(self.compressed_size as u32)
                .u32(self.uncompressed_size as u32);
        }
        buf.into_bytes()
    }
}

/// WinZip AES extra field (header id 0x9901, AE-2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AesExtraField {
    /// Strength code: 1 = AES-128, 3 = AES-256.
    pub strength: u8,
    /// The real compression method hidden behind method 99.
    pub method: u16,
}

impl AesExtraField {
    /// Serialized length: header (4) + version (2) + vendor (2) +
    /// strength (1) + method (2).
    pub const LENGTH: usize = 11;

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = RecordBuf::with_capacity(Self::LENGTH);
        buf.u16(AES_EXTRA_FIELD_ID)
            .u16(7)
            .u16(2) // AE-2
            .raw(b"AE")
            .raw(&[self.strength])
            .u16(self.method);
        buf.into_bytes()
    }
}

/// Zip64 extended information extra field for a central directory
/// record.
///
/// Only the fields whose 32-bit (or 16-bit) counterparts overflowed are
/// present, in the fixed order: uncompressed size, compressed size,
/// local header offset, disk number.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zip64ExtraField {
    pub uncompressed_size: Option<u64>,
    pub compressed_size: Option<u64>,
    pub local_header_offset: Option<u64>,
    pub disk_number: Option<u32>,
}

impl Zip64ExtraField {
    pub fn is_empty(&self) -> bool {
        self.uncompressed_size.is_none()
            && self.compressed_size.is_none()
            && self.local_header_offset.is_none()
            && self.disk_number.is_none()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let data_len = self.uncompressed_size.map_or(0, |_| 8)
            + self.compressed_size.map_or(0, |_| 8)
            + self.local_header_offset.map_or(0, |_| 8)
            + self.disk_number.map_or(0, |_| 4);
        let mut buf = RecordBuf::with_capacity(4 + data_len);
        buf.u16(ZIP64_EXTRA_FIELD_ID).u16(data_len as u16);
        if let Some(v) = self.uncompressed_size {
            buf.u64(v);
        }
        if let Some(v) = self.compressed_size {
            buf.u64(v);
        }
        if let Some(v) = self.local_header_offset {
            buf.u64(v);
        }
        if let Some(v) = self.disk_number {
            buf.u32(v);
        }
        buf.into_bytes()
    }
}

/// Central directory file header.
#[derive(Debug, Clone)]
pub struct CentralDirectoryHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub method: u16,
    pub dos_time: u16,
    pub dos_date: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub disk_number_start: u32,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    pub local_header_offset: u64,
    pub name: Vec<u8>,
    pub extra: Vec<u8>,
    pub comment: Vec<u8>,
}

impl CentralDirectoryHeader {
    /// Builds the Zip64 extra field required by this header's values.
    ///
    /// Returns an empty field when everything fits the classic record.
    pub fn zip64_field(&self) -> Zip64ExtraField {
        Zip64ExtraField {
            uncompressed_size: (self.uncompressed_size >= ZIP64_MARKER_U32 as u64)
                .then_some(self.uncompressed_size),
            compressed_size: (self.compressed_size >= ZIP64_MARKER_U32 as u64)
                .then_some(self.compressed_size),
            local_header_offset: (self.local_header_offset >= ZIP64_MARKER_U32 as u64)
                .then_some(self.local_header_offset),
            disk_number: (self.disk_number_start >= ZIP64_MARKER_U16 as u32)
                .then_some(self.disk_number_start),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let zip64 = self.zip64_field();
        let mut extra = self.extra.clone();
        if !zip64.is_empty() {
            extra.extend_from_slice(&zip64.to_bytes());
        }

        let mut buf =
            RecordBuf::with_capacity(46 + self.name.len() + extra.len() + self.comment.len());
        buf.u32(CENTRAL_DIRECTORY_SIGNATURE)
            .u16(self.version_made_by)
            .u16(self.version_needed)
            .u16(self.flags)
            .u16(self.method)
            .u16(self.dos_time)
            .u16(self.dos_date)
            .u32(self.crc32)
            .u32(cap_u32(self.compressed_size))
            .u32(cap_u32(self.uncompressed_size))
            .u16(self.name.len() as u16)
            .u16(extra.len() as u16)
            .u16(self.comment.len() as u16)
            .u16(cap_u16(self.disk_number_start))
            .u16(self.internal_attributes)
            .u32(self.external_attributes)
            .u32(cap_u32(self.local_header_offset))
            .raw(&self.name)
            .raw(&extra)
            .raw(&self.comment);
        buf.into_bytes()
    }
}

/// End of central directory record.
#[derive(Debug, Clone)]
pub struct EndOfCentralDirectory {
    pub disk_number: u32,
    pub central_directory_disk: u32,
    pub entries_on_this_disk: u64,
    pub total_entries: u64,
    pub central_directory_size: u64,
    pub central_directory_offset: u64,
    pub comment: Vec<u8>,
}

impl EndOfCentralDirectory {
    /// Whether any field overflows the classic record and requires the
    /// Zip64 EOCD + locator pair before it.
    pub fn needs_zip64(&self) -> bool {
        self.total_entries >= ZIP64_MARKER_U16 as u64
            || self.central_directory_size >= ZIP64_MARKER_U32 as u64
            || self.central_directory_offset >= ZIP64_MARKER_U32 as u64
            || self.disk_number >= ZIP64_MARKER_U16 as u32
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = RecordBuf::with_capacity(22 + self.comment.len());
        buf.u32(END_OF_CENTRAL_DIRECTORY_SIGNATURE)
            .u16(cap_u16(self.disk_number))
            .u16(cap_u16(self.central_directory_disk))
            .u16(if self.entries_on_this_disk >= ZIP64_MARKER_U16 as u64 {
                ZIP64_MARKER_U16
            } else {
                self.entries_on_this_disk as u16
            })
            .u16(if self.total_entries >= ZIP64_MARKER_U16 as u64 {
                ZIP64_MARKER_U16
            } else {
                self.total_entries as u16
            })
            .u32(cap_u32(self.central_directory_size))
            .u32(cap_u32(self.central_directory_offset))
            .u16(self.comment.len() as u16)
            .raw(&self.comment);
        buf.into_bytes()
    }
}

/// Zip64 end of central directory record.
#[derive(Debug, Clone, Copy)]
pub struct Zip64EndOfCentralDirectory {
    pub disk_number: u32,
    pub central_directory_disk: u32,
    pub entries_on_this_disk: u64,
    pub total_entries: u64,
    pub central_directory_size: u64,
    pub central_directory_offset: u64,
}

impl Zip64EndOfCentralDirectory {
    /// Size of the fixed fields after the `record_size` field.
    const RECORD_SIZE: u64 = 44;

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = RecordBuf::with_capacity(56);
        buf.u32(ZIP64_END_OF_CENTRAL_DIRECTORY_SIGNATURE)
            .u64(Self::RECORD_SIZE)
            .u16(VERSION_NEEDED_ZIP64)
            .u16(VERSION_NEEDED_ZIP64)
            .u32(self.disk_number)
            .u32(self.central_directory_disk)
            .u64(self.entries_on_this_disk)
            .u64(self.total_entries)
            .u64(self.central_directory_size)
            .u64(self.central_directory_offset);
        buf.into_bytes()
    }
}

/// Zip64 end of central directory locator.
#[derive(Debug, Clone, Copy)]
pub struct Zip64Locator {
    /// Disk holding the Zip64 EOCD record.
    pub zip64_eocd_disk: u32,
    /// Absolute offset of the Zip64 EOCD record on that disk.
    pub zip64_eocd_offset: u64,
    /// Total number of disks.
    pub total_disks: u32,
}

impl Zip64Locator {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = RecordBuf::with_capacity(20);
        buf.u32(ZIP64_LOCATOR_SIGNATURE)
            .u32(self.zip64_eocd_disk)
            .u64(self.zip64_eocd_offset)
            .u32(self.total_disks);
        buf.into_bytes()
    }
}
