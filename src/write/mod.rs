//! Archive writing API.
//!
//! This module provides the public API for creating ZIP archives,
//! including adding files, directories, and streams with per-entry
//! compression and encryption options.
//!
//! # Example
//!
//! ```rust,ignore
//! use splitzip::write::{EntryOptions, ZipWriter};
//!
//! let mut writer = ZipWriter::create_path("archive.zip")?.with_password("secret");
//!
//! writer.add_bytes("notes.txt", b"hello", &EntryOptions::new())?;
//! writer.add_bytes("sealed.bin", b"secret data", &EntryOptions::new().zip_crypto())?;
//!
//! let result = writer.finish()?;
//! println!("wrote {} entries", result.entries_written);
//! ```

mod directory;
mod entry;
mod options;

pub use options::{EntryOptions, WriteResult};

use std::io::Read;
use std::path::Path;

use crate::archive_path::ArchivePath;
use crate::charset::Charset;
use crate::codec::DeflateEncoderOptions;
use crate::crypto::Password;
use crate::model::{ArchiveModel, EntryRecord};
use crate::volume::{SplitConfig, SplitWriter};
use crate::{Error, Result};

/// State of the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// Accepting new entries.
    AcceptingEntries,
    /// Archive is finished; adds are rejected.
    Finished,
}

/// Sequential ZIP archive writer.
///
/// Entries are streamed to the output as they are added; the central
/// directory is generated at [`finish`]. One writer owns one archive;
/// writes are strictly sequential because each entry's offsets depend
/// on everything written before it.
///
/// [`finish`]: ZipWriter::finish
#[derive(Debug)]
pub struct ZipWriter {
    sink: SplitWriter,
    model: ArchiveModel,
    charset: Charset,
    password: Option<Password>,
    deflate: DeflateEncoderOptions,
    state: WriterState,
}

impl ZipWriter {
    /// Creates a writer producing a single archive file at `path`.
    pub fn create_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(SplitConfig::single(path))
    }

    /// Creates a writer producing a split archive with volumes no
    /// larger than `split_length` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SplitSizeTooSmall`] when `split_length` is below
    /// [`MIN_SPLIT_LENGTH`](crate::volume::MIN_SPLIT_LENGTH); nothing is
    /// written in that case.
    pub fn create_split_path(path: impl AsRef<Path>, split_length: u64) -> Result<Self> {
        Self::from_config(SplitConfig::split(path, split_length)?)
    }

    fn from_config(config: SplitConfig) -> Result<Self> {
        Ok(Self {
            sink: SplitWriter::create(config)?,
            model: ArchiveModel::new(),
            charset: Charset::utf8(),
            password: None,
            deflate: DeflateEncoderOptions::default(),
            state: WriterState::AcceptingEntries,
        })
    }

    /// Sets the password used for encrypted entries.
    ///
    /// The password is held only while the archive is being written and
    /// dropped (zeroized) when [`finish`](ZipWriter::finish) succeeds.
    pub fn with_password(mut self, password: impl Into<Password>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the deflate compression level (0-9).
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.deflate = DeflateEncoderOptions::with_level(level);
        self
    }

    /// Switches the charset used to encode names and comments.
    ///
    /// Affects entries added afterwards; already-added entries keep the
    /// charset that was active when they were written.
    pub fn set_charset(&mut self, charset: Charset) {
        self.charset = charset;
    }

    /// The charset currently used for names and comments.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Adds a file entry, streaming `reader` to the archive.
    ///
    /// Re-adding an existing name replaces the previous entry in the
    /// directory; the superseded content stays in the output as dead
    /// space.
    pub fn add_entry<R: Read>(
        &mut self,
        name: &str,
        reader: R,
        options: &EntryOptions,
    ) -> Result<&EntryRecord> {
        self.check_accepting()?;
        let path = ArchivePath::new(name)?;
        let record = entry::write_file_entry(self.entry_context(), path, reader, options)?;
        Ok(self.model.insert(record))
    }

    /// Adds a file entry from an in-memory buffer.
    pub fn add_bytes(
        &mut self,
        name: &str,
        bytes: &[u8],
        options: &EntryOptions,
    ) -> Result<&EntryRecord> {
        self.add_entry(name, bytes, options)
    }

    /// Adds a directory entry (no content, trailing slash in the name).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFeature`] when the options request
    /// encryption; directory entries are never encrypted.
    pub fn add_directory(&mut self, name: &str, options: &EntryOptions) -> Result<&EntryRecord> {
        self.check_accepting()?;
        let path = ArchivePath::new_directory(name)?;
        let record = entry::write_directory_entry(self.entry_context(), path, options)?;
        Ok(self.model.insert(record))
    }

    /// Entries written so far, in archive order, one per name.
    pub fn entries(&self) -> &[EntryRecord] {
        self.model.entries()
    }

    /// Writes the central directory and end records, completing the
    /// archive.
    ///
    /// On failure the writer and its model are left intact and `finish`
    /// may be called again; the retry appends a fresh, complete
    /// directory after the abandoned bytes. After success the writer
    /// only serves [`entries`](ZipWriter::entries); adds and further
    /// finishes fail with [`Error::ArchiveFinished`].
    pub fn finish(&mut self) -> Result<WriteResult> {
        if self.state == WriterState::Finished {
            return Err(Error::ArchiveFinished);
        }

        directory::write_central_directory(&mut self.sink, &self.model)?;
        let volume_sizes = self.sink.finish()?;

        self.state = WriterState::Finished;
        self.password = None;

        let entries = self.model.entries();
        let result = WriteResult {
            entries_written: entries.iter().filter(|e| !e.is_directory()).count(),
            directories_written: entries.iter().filter(|e| e.is_directory()).count(),
            total_size: entries.iter().map(|e| e.uncompressed_size).sum(),
            compressed_size: entries.iter().map(|e| e.compressed_size).sum(),
            volume_count: volume_sizes.len() as u32,
            volume_sizes,
        };
        log::debug!(
            "finished archive: {} entries, {} volumes",
            entries.len(),
            result.volume_count
        );
        Ok(result)
    }

    fn check_accepting(&self) -> Result<()> {
        match self.state {
            WriterState::AcceptingEntries => Ok(()),
            WriterState::Finished => Err(Error::ArchiveFinished),
        }
    }

    fn entry_context(&mut self) -> entry::EntryContext<'_> {
        entry::EntryContext {
            sink: &mut self.sink,
            charset: self.charset,
            password: self.password.as_ref(),
            deflate: &self.deflate,
        }
    }
}
