//! Per-entry encoding pipeline.
//!
//! One entry is written as: local file header (atomic unit, provisional
//! sizes, streaming flag set) → cipher prefix (ZipCrypto header, or AES
//! salt + verifier) → compressed and encrypted content → AES auth code →
//! data descriptor (atomic unit). The returned [`EntryRecord`] carries
//! the authoritative sizes and CRC for the central directory.

use std::io::{self, Read, Write};

use crate::archive_path::ArchivePath;
use crate::charset::Charset;
use crate::checksum::Crc32Reader;
use crate::codec::{Compressor, DeflateEncoderOptions};
use crate::crypto::aes::AesEncryptor;
use crate::crypto::zipcrypto::LegacyEncryptor;
use crate::crypto::{EncryptionMethod, Password};
use crate::format::records::{AesExtraField, DataDescriptor, LocalFileHeader, Zip64ExtraField};
use crate::format::{
    DOS_ATTRIBUTE_DIRECTORY, FLAG_DATA_DESCRIPTOR, FLAG_ENCRYPTED, FLAG_UTF8,
    AES_COMPRESSION_METHOD, VERSION_NEEDED_AES, VERSION_NEEDED_DEFAULT, VERSION_NEEDED_ZIP64,
    ZIP64_MARKER_U32,
};
use crate::model::EntryRecord;
use crate::timestamp::Timestamp;
use crate::volume::SplitWriter;
use crate::write::EntryOptions;
use crate::{Error, Result};

const READ_CHUNK: usize = 64 * 1024;

/// Shared writer state the pipeline needs for one entry.
pub(crate) struct EntryContext<'a> {
    pub sink: &'a mut SplitWriter,
    pub charset: Charset,
    pub password: Option<&'a Password>,
    pub deflate: &'a DeflateEncoderOptions,
}

/// The stream cipher applied to compressed content bytes.
enum EntryCipher {
    None,
    Legacy(LegacyEncryptor),
    Aes(AesEncryptor),
}

impl EntryCipher {
    fn apply(&mut self, data: &mut [u8]) {
        match self {
            Self::None => {}
            Self::Legacy(cipher) => cipher.encrypt_in_place(data),
            Self::Aes(cipher) => cipher.encrypt_in_place(data),
        }
    }
}

/// Write adapter that encrypts compressed bytes on their way to the
/// sink, counting what it passes through.
struct EncryptingSink<'a> {
    sink: &'a mut SplitWriter,
    cipher: EntryCipher,
    scratch: Vec<u8>,
    written: u64,
}

impl<'a> EncryptingSink<'a> {
    fn new(sink: &'a mut SplitWriter, cipher: EntryCipher) -> Self {
        Self {
            sink,
            cipher,
            scratch: Vec::new(),
            written: 0,
        }
    }

    fn into_parts(self) -> (&'a mut SplitWriter, EntryCipher, u64) {
        (self.sink, self.cipher, self.written)
    }
}

impl Write for EncryptingSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if matches!(self.cipher, EntryCipher::None) {
            let n = self.sink.write(buf)?;
            self.written += n as u64;
            return Ok(n);
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(buf);
        self.cipher.apply(&mut self.scratch);
        self.sink.write_all(&self.scratch)?;
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

/// Streams one file entry through the full pipeline.
pub(crate) fn write_file_entry<R: Read>(
    ctx: EntryContext<'_>,
    path: ArchivePath,
    mut reader: R,
    options: &EntryOptions,
) -> Result<EntryRecord> {
    let encryption = options.encryption;
    if encryption.is_encrypted() && ctx.password.is_none() {
        return Err(Error::PasswordRequired);
    }

    let last_modified = options.last_modified.unwrap_or_else(Timestamp::now);
    let name_bytes = ctx.charset.encode(path.as_str()).into_owned();
    let utf8 = ctx.charset.is_utf8();
    let is_aes = encryption == EncryptionMethod::Aes;

    let mut flags = FLAG_DATA_DESCRIPTOR;
    if utf8 {
        flags |= FLAG_UTF8;
    }
    if encryption.is_encrypted() {
        flags |= FLAG_ENCRYPTED;
    }

    let mut extra = if is_aes {
        AesExtraField {
            strength: options.aes_strength.code(),
            method: options.compression.id(),
        }
        .to_bytes()
    } else {
        Vec::new()
    };

    // Readers pick the descriptor's field width from the local header,
    // so an entry that may grow past 4 GiB announces Zip64 up front:
    // placeholder sizes in the extra field, markers in the 32-bit ones.
    if options.large_file {
        extra.extend_from_slice(
            &Zip64ExtraField {
                uncompressed_size: Some(0),
                compressed_size: Some(0),
                ..Default::default()
            }
            .to_bytes(),
        );
    }

    let header = LocalFileHeader {
        version_needed: if is_aes {
            VERSION_NEEDED_AES
        } else if options.large_file {
            VERSION_NEEDED_ZIP64
        } else {
            VERSION_NEEDED_DEFAULT
        },
        flags,
        method: if is_aes {
            AES_COMPRESSION_METHOD
        } else {
            options.compression.id()
        },
        dos_time: last_modified.dos_time(),
        dos_date: last_modified.dos_date(),
        crc32: 0,
        compressed_size: if options.large_file { ZIP64_MARKER_U32 } else { 0 },
        uncompressed_size: if options.large_file { ZIP64_MARKER_U32 } else { 0 },
        name: name_bytes,
        extra,
    };

    ctx.sink.begin_unit();
    ctx.sink.write_all(&header.to_bytes())?;
    let (disk_number_start, local_header_offset) = ctx.sink.end_unit()?;

    // Cipher prefix bytes count toward the compressed size and may
    // split across a volume boundary like any content byte.
    let mut cipher_overhead = 0u64;
    let cipher = match encryption {
        EncryptionMethod::None => EntryCipher::None,
        EncryptionMethod::ZipCrypto => {
            let password = ctx.password.ok_or(Error::PasswordRequired)?;
            let mut cipher = LegacyEncryptor::new(password);
            // Streaming mode: the check byte comes from the DOS time
            let check_byte = (last_modified.dos_time() >> 8) as u8;
            let crypto_header = cipher.generate_header(check_byte)?;
            ctx.sink.write_all(&crypto_header)?;
            cipher_overhead += crypto_header.len() as u64;
            EntryCipher::Legacy(cipher)
        }
        EncryptionMethod::Aes => {
            let password = ctx.password.ok_or(Error::PasswordRequired)?;
            let cipher = AesEncryptor::new(password, options.aes_strength)?;
            ctx.sink.write_all(cipher.salt())?;
            ctx.sink.write_all(&cipher.verifier())?;
            cipher_overhead += cipher.salt().len() as u64 + cipher.verifier().len() as u64;
            EntryCipher::Aes(cipher)
        }
    };

    let mut source = Crc32Reader::new(&mut reader);
    let encrypting = EncryptingSink::new(ctx.sink, cipher);
    let mut compressor = Compressor::new(options.compression, encrypting, ctx.deflate);

    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = source.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        compressor.write_all(&chunk[..n])?;
    }

    let encrypting = compressor.finish()?;
    let (sink, cipher, content_written) = encrypting.into_parts();

    if let EntryCipher::Aes(cipher) = cipher {
        let auth_code = cipher.finalize();
        sink.write_all(&auth_code)?;
        cipher_overhead += auth_code.len() as u64;
    }

    let uncompressed_size = source.bytes_read();
    let compressed_size = cipher_overhead + content_written;
    // AE-2 stores no CRC; the auth code covers integrity
    let crc32 = if is_aes { 0 } else { source.crc() };

    sink.begin_unit();
    sink.write_all(
        &DataDescriptor {
            crc32,
            compressed_size,
            uncompressed_size,
            zip64: options.large_file,
        }
        .to_bytes(),
    )?;
    sink.end_unit()?;

    log::debug!(
        "wrote entry '{}': {} -> {} bytes on disk {}",
        path,
        uncompressed_size,
        compressed_size,
        disk_number_start
    );

    Ok(EntryRecord {
        name: path,
        compression: options.compression,
        encryption,
        aes_strength: options.aes_strength,
        crc32,
        uncompressed_size,
        compressed_size,
        disk_number_start,
        local_header_offset,
        comment: options.comment.clone(),
        external_attributes: options.external_attributes.unwrap_or(0),
        charset: ctx.charset,
        utf8,
        last_modified,
    })
}

/// Writes a directory entry: header only, no content, no descriptor.
pub(crate) fn write_directory_entry(
    ctx: EntryContext<'_>,
    path: ArchivePath,
    options: &EntryOptions,
) -> Result<EntryRecord> {
    if options.encryption.is_encrypted() {
        return Err(Error::UnsupportedFeature {
            feature: "encrypted directory entry",
        });
    }

    let last_modified = options.last_modified.unwrap_or_else(Timestamp::now);
    let name_bytes = ctx.charset.encode(path.as_str()).into_owned();
    let utf8 = ctx.charset.is_utf8();

    let header = LocalFileHeader {
        version_needed: VERSION_NEEDED_DEFAULT,
        flags: if utf8 { FLAG_UTF8 } else { 0 },
        method: 0,
        dos_time: last_modified.dos_time(),
        dos_date: last_modified.dos_date(),
        crc32: 0,
        compressed_size: 0,
        uncompressed_size: 0,
        name: name_bytes,
        extra: Vec::new(),
    };

    ctx.sink.begin_unit();
    ctx.sink.write_all(&header.to_bytes())?;
    let (disk_number_start, local_header_offset) = ctx.sink.end_unit()?;

    Ok(EntryRecord {
        name: path,
        compression: crate::codec::CompressionMethod::Store,
        encryption: EncryptionMethod::None,
        aes_strength: options.aes_strength,
        crc32: 0,
        uncompressed_size: 0,
        compressed_size: 0,
        disk_number_start,
        local_header_offset,
        comment: options.comment.clone(),
        external_attributes: options
            .external_attributes
            .unwrap_or(DOS_ATTRIBUTE_DIRECTORY),
        charset: ctx.charset,
        utf8,
        last_modified,
    })
}
