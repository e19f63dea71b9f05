//! In-memory model of the archive being written.
//!
//! The model is the authoritative source for central directory values:
//! local headers are written with provisional fields (streaming mode),
//! and finalize reads sizes, CRCs, and offsets from here.

use crate::archive_path::ArchivePath;
use crate::charset::Charset;
use crate::codec::CompressionMethod;
use crate::crypto::{AesStrength, EncryptionMethod};
use crate::timestamp::Timestamp;

/// Everything recorded about one written entry.
///
/// Produced by the entry encoder after the content stream completes;
/// consumed by the central directory writer at finalize.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    /// Normalized archive path. A trailing slash marks a directory.
    pub name: ArchivePath,
    /// Compression method applied to the content.
    pub compression: CompressionMethod,
    /// Encryption method applied to the content.
    pub encryption: EncryptionMethod,
    /// Key strength; meaningful only when `encryption` is AES.
    pub aes_strength: AesStrength,
    /// CRC-32 of the uncompressed content. Zero for AES entries (AE-2).
    pub crc32: u32,
    /// Content size before compression.
    pub uncompressed_size: u64,
    /// Size on disk: compressed content plus any cipher overhead.
    pub compressed_size: u64,
    /// Zero-based volume index holding the local file header.
    pub disk_number_start: u32,
    /// Offset of the local file header within that volume.
    pub local_header_offset: u64,
    /// Entry comment; `None` writes no comment bytes at all.
    pub comment: Option<String>,
    /// Host external attributes, passed through opaquely.
    pub external_attributes: u32,
    /// Charset the name and comment were encoded with at add time.
    ///
    /// The central directory re-encodes from this, so a later
    /// charset switch on the writer never desynchronizes the two
    /// copies of the name.
    pub charset: Charset,
    /// Whether name and comment were encoded as UTF-8 (flag bit 11).
    pub utf8: bool,
    /// DOS last-modified timestamp.
    pub last_modified: Timestamp,
}

impl EntryRecord {
    /// Whether this record describes a directory entry.
    pub fn is_directory(&self) -> bool {
        self.name.is_directory()
    }
}

/// The set of entries written so far, in archive order.
///
/// Names are unique: re-adding an existing name replaces the old record
/// and moves the entry to the end of the order, so the central
/// directory only ever indexes the most recent content. Content bytes
/// of a replaced entry stay in the archive as unreferenced dead space.
#[derive(Debug, Default)]
pub struct ArchiveModel {
    entries: Vec<EntryRecord>,
}

impl ArchiveModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry, replacing any previous record with the same
    /// name. Returns a reference to the stored record.
    pub fn insert(&mut self, record: EntryRecord) -> &EntryRecord {
        if let Some(index) = self.position(&record.name) {
            log::debug!("replacing duplicate entry '{}'", record.name);
            self.entries.remove(index);
        }
        self.entries.push(record);
        self.entries.last().expect("just pushed")
    }

    /// Entries in archive order, most recent add per name.
    pub fn entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by its normalized name.
    pub fn get(&self, name: &ArchivePath) -> Option<&EntryRecord> {
        self.position(name).map(|i| &self.entries[i])
    }

    fn position(&self, name: &ArchivePath) -> Option<usize> {
        self.entries.iter().position(|e| &e.name == name)
    }
}
