//! # splitzip
//!
//! A pure-Rust library for writing ZIP archives, with split-volume
//! output, store/deflate compression, and ZipCrypto or WinZip AES
//! encryption.
//!
//! Entries are streamed to disk as they are added; nothing is buffered
//! whole. The central directory is generated when the archive is
//! finished and indexes every entry across volume boundaries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use splitzip::write::{EntryOptions, ZipWriter};
//! use splitzip::Result;
//!
//! fn main() -> Result<()> {
//!     let mut writer = ZipWriter::create_path("archive.zip")?;
//!
//!     // Add data from memory
//!     writer.add_bytes("hello.txt", b"Hello, World!", &EntryOptions::new())?;
//!
//!     // Stream a file from disk
//!     let file = std::fs::File::open("large.bin")?;
//!     writer.add_entry("data/large.bin", file, &EntryOptions::new())?;
//!
//!     // Finish and get statistics
//!     let result = writer.finish()?;
//!     println!(
//!         "wrote {} entries ({:.1}% saved)",
//!         result.entries_written,
//!         result.space_savings() * 100.0
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Split Archives
//!
//! ```rust,no_run
//! use splitzip::write::{EntryOptions, ZipWriter};
//! use splitzip::Result;
//!
//! fn main() -> Result<()> {
//!     // Volumes of at most 10 MB: archive.z01, archive.z02, ...,
//!     // with the final volume keeping the name archive.zip
//!     let mut writer = ZipWriter::create_split_path("archive.zip", 10 * 1024 * 1024)?;
//!     writer.add_bytes("a.txt", b"spread me", &EntryOptions::new())?;
//!     writer.finish()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Encryption
//!
//! ```rust,no_run
//! use splitzip::crypto::AesStrength;
//! use splitzip::write::{EntryOptions, ZipWriter};
//! use splitzip::Result;
//!
//! fn main() -> Result<()> {
//!     let mut writer = ZipWriter::create_path("sealed.zip")?.with_password("secret");
//!
//!     // Legacy ZipCrypto for compatibility with old extractors
//!     writer.add_bytes("legacy.txt", b"weakly protected", &EntryOptions::new().zip_crypto())?;
//!
//!     // WinZip AES-256 for everything else
//!     writer.add_bytes(
//!         "modern.txt",
//!         b"properly protected",
//!         &EntryOptions::new().aes(AesStrength::Aes256),
//!     )?;
//!
//!     writer.finish()?;
//!     Ok(())
//! }
//! ```

pub mod archive_path;
pub mod charset;
pub mod checksum;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod format;
pub mod model;
pub mod timestamp;
pub mod volume;
pub mod write;

pub use archive_path::ArchivePath;
pub use charset::Charset;
pub use codec::CompressionMethod;
pub use crypto::{AesStrength, EncryptionMethod, Password};
pub use error::{Error, PasswordDetectionMethod, Result};
pub use model::EntryRecord;
pub use timestamp::Timestamp;
pub use volume::{MIN_SPLIT_LENGTH, SplitConfig};
pub use write::{EntryOptions, WriteResult, ZipWriter};
