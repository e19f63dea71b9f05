//! Per-entry options and finalize statistics.

use crate::codec::CompressionMethod;
use crate::crypto::{AesStrength, EncryptionMethod};
use crate::timestamp::Timestamp;

/// Options applied to a single entry.
///
/// Built with chained setters; the default is deflate compression, no
/// encryption, no comment, and the current time as the modification
/// time.
///
/// # Example
///
/// ```rust
/// use splitzip::write::EntryOptions;
/// use splitzip::codec::CompressionMethod;
/// use splitzip::crypto::AesStrength;
///
/// let options = EntryOptions::new()
///     .compression(CompressionMethod::Store)
///     .aes(AesStrength::Aes256)
///     .comment("release notes");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntryOptions {
    pub(crate) compression: CompressionMethod,
    pub(crate) encryption: EncryptionMethod,
    pub(crate) aes_strength: AesStrength,
    pub(crate) comment: Option<String>,
    pub(crate) external_attributes: Option<u32>,
    pub(crate) last_modified: Option<Timestamp>,
    pub(crate) large_file: bool,
}

impl EntryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression method.
    pub fn compression(mut self, method: CompressionMethod) -> Self {
        self.compression = method;
        self
    }

    /// Sets the encryption method.
    ///
    /// The writer must have been given a password, otherwise adding the
    /// entry fails with
    /// [`Error::PasswordRequired`](crate::Error::PasswordRequired).
    pub fn encryption(mut self, method: EncryptionMethod) -> Self {
        self.encryption = method;
        self
    }

    /// Shorthand for legacy ZipCrypto encryption.
    pub fn zip_crypto(self) -> Self {
        self.encryption(EncryptionMethod::ZipCrypto)
    }

    /// Shorthand for WinZip AES encryption at the given strength.
    pub fn aes(mut self, strength: AesStrength) -> Self {
        self.aes_strength = strength;
        self.encryption(EncryptionMethod::Aes)
    }

    /// Sets the AES key strength (only meaningful with AES encryption).
    pub fn aes_strength(mut self, strength: AesStrength) -> Self {
        self.aes_strength = strength;
        self
    }

    /// Sets the entry comment.
    ///
    /// An unset comment writes no comment bytes at all; an empty string
    /// is a present, zero-length comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets host external attributes, stored opaquely in the central
    /// directory. Unset directories get the DOS directory bit.
    pub fn external_attributes(mut self, attributes: u32) -> Self {
        self.external_attributes = Some(attributes);
        self
    }

    /// Sets the last-modified timestamp; defaults to the current time.
    pub fn last_modified(mut self, timestamp: Timestamp) -> Self {
        self.last_modified = Some(timestamp);
        self
    }

    /// Declares that the entry may exceed 4 GiB.
    ///
    /// The sizes are only known after streaming, but readers decide the
    /// width of the trailing size fields from the local header. With
    /// this hint the header carries a Zip64 extra field with placeholder
    /// sizes and the data descriptor uses 64-bit fields, whatever the
    /// actual sizes turn out to be.
    pub fn large_file(mut self, large: bool) -> Self {
        self.large_file = large;
        self
    }
}

/// Statistics returned by [`ZipWriter::finish`].
///
/// [`ZipWriter::finish`]: crate::write::ZipWriter::finish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// Number of file entries written.
    pub entries_written: usize,
    /// Number of directory entries written.
    pub directories_written: usize,
    /// Total uncompressed bytes.
    pub total_size: u64,
    /// Total bytes after compression and encryption overhead.
    pub compressed_size: u64,
    /// Number of volumes written (1 for single-file archives).
    pub volume_count: u32,
    /// Size of each volume in bytes.
    pub volume_sizes: Vec<u64>,
}

impl WriteResult {
    /// Returns the compression ratio (compressed / uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.total_size as f64
        }
    }

    /// Returns the space savings as a fraction (0.0 to 1.0).
    pub fn space_savings(&self) -> f64 {
        (1.0 - self.compression_ratio()).max(0.0)
    }
}
