//! Central directory and end-record generation.
//!
//! Runs at finalize: one central directory header per model record, in
//! archive order, followed by the end-of-central-directory record. When
//! any count, size, or offset overflows its classic field the Zip64
//! end record and locator are emitted before the classic one. Every
//! record here is an atomic unit, so the directory never straddles a
//! volume boundary mid-record.
//!
//! All values come from the model; the provisional local headers are
//! never read back. The whole pass appends only, which is what makes a
//! failed finalize retryable: a second pass writes a fresh, complete
//! directory after the abandoned one.

use std::io::Write;

use crate::format::records::{
    AesExtraField, CentralDirectoryHeader, EndOfCentralDirectory, Zip64EndOfCentralDirectory,
    Zip64Locator,
};
use crate::format::{
    AES_COMPRESSION_METHOD, FLAG_DATA_DESCRIPTOR, FLAG_ENCRYPTED, FLAG_UTF8, VERSION_NEEDED_AES,
    VERSION_NEEDED_DEFAULT, VERSION_NEEDED_ZIP64,
};
use crate::crypto::EncryptionMethod;
use crate::model::{ArchiveModel, EntryRecord};
use crate::volume::SplitWriter;
use crate::Result;

/// Builds the central directory header for one record.
fn central_header(record: &EntryRecord) -> CentralDirectoryHeader {
    let is_aes = record.encryption == EncryptionMethod::Aes;

    let mut flags = 0u16;
    if !record.is_directory() {
        flags |= FLAG_DATA_DESCRIPTOR;
    }
    if record.encryption.is_encrypted() {
        flags |= FLAG_ENCRYPTED;
    }
    if record.utf8 {
        flags |= FLAG_UTF8;
    }

    let extra = if is_aes {
        AesExtraField {
            strength: record.aes_strength.code(),
            method: record.compression.id(),
        }
        .to_bytes()
    } else {
        Vec::new()
    };

    let comment = record
        .comment
        .as_deref()
        .map(|c| record.charset.encode(c).into_owned())
        .unwrap_or_default();

    let mut header = CentralDirectoryHeader {
        version_made_by: VERSION_NEEDED_DEFAULT,
        version_needed: VERSION_NEEDED_DEFAULT,
        flags,
        method: if is_aes {
            AES_COMPRESSION_METHOD
        } else {
            record.compression.id()
        },
        dos_time: record.last_modified.dos_time(),
        dos_date: record.last_modified.dos_date(),
        crc32: record.crc32,
        compressed_size: record.compressed_size,
        uncompressed_size: record.uncompressed_size,
        disk_number_start: record.disk_number_start,
        internal_attributes: 0,
        external_attributes: record.external_attributes,
        local_header_offset: record.local_header_offset,
        name: record.charset.encode(record.name.as_str()).into_owned(),
        extra,
        comment,
    };

    header.version_needed = if is_aes {
        VERSION_NEEDED_AES
    } else if !header.zip64_field().is_empty() {
        VERSION_NEEDED_ZIP64
    } else {
        VERSION_NEEDED_DEFAULT
    };
    header.version_made_by = header.version_needed;
    header
}

/// Appends the central directory and end records for every model entry.
pub(crate) fn write_central_directory(sink: &mut SplitWriter, model: &ArchiveModel) -> Result<()> {
    let (directory_disk, directory_offset) = sink.position();

    let mut directory_size = 0u64;
    let mut record_disks = Vec::with_capacity(model.len());
    for record in model.entries() {
        let bytes = central_header(record).to_bytes();
        directory_size += bytes.len() as u64;

        sink.begin_unit();
        sink.write_all(&bytes)?;
        let (disk, _) = sink.end_unit()?;
        record_disks.push(disk);
    }

    let mut end_record = EndOfCentralDirectory {
        disk_number: sink.current_disk(),
        central_directory_disk: directory_disk,
        entries_on_this_disk: 0,
        total_entries: model.len() as u64,
        central_directory_size: directory_size,
        central_directory_offset: directory_offset,
        comment: Vec::new(),
    };

    // The end records carry the number of the disk they land on, so the
    // rollover decision has to happen before they are serialized. The
    // whole trailer is reserved as one piece: 22-byte EOCD, preceded in
    // the Zip64 case by the 56-byte Zip64 EOCD and 20-byte locator.
    let trailer_length = if end_record.needs_zip64() {
        56 + 20 + 22
    } else {
        22
    };
    sink.reserve(trailer_length)?;

    let end_disk = sink.current_disk();
    end_record.disk_number = end_disk;
    end_record.entries_on_this_disk =
        record_disks.iter().filter(|&&d| d == end_disk).count() as u64;

    if end_record.needs_zip64() {
        let zip64_end = Zip64EndOfCentralDirectory {
            disk_number: end_disk,
            central_directory_disk: directory_disk,
            entries_on_this_disk: end_record.entries_on_this_disk,
            total_entries: model.len() as u64,
            central_directory_size: directory_size,
            central_directory_offset: directory_offset,
        };
        sink.begin_unit();
        sink.write_all(&zip64_end.to_bytes())?;
        let (zip64_disk, zip64_offset) = sink.end_unit()?;

        let locator = Zip64Locator {
            zip64_eocd_disk: zip64_disk,
            zip64_eocd_offset: zip64_offset,
            total_disks: sink.disk_count(),
        };
        sink.begin_unit();
        sink.write_all(&locator.to_bytes())?;
        sink.end_unit()?;
    }

    sink.begin_unit();
    sink.write_all(&end_record.to_bytes())?;
    sink.end_unit()?;

    log::debug!(
        "central directory: {} entries, {} bytes, starts on disk {} at {}",
        model.len(),
        directory_size,
        directory_disk,
        directory_offset
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive_path::ArchivePath;
    use crate::charset::Charset;
    use crate::codec::CompressionMethod;
    use crate::crypto::AesStrength;
    use crate::format::END_OF_CENTRAL_DIRECTORY_SIGNATURE;
    use crate::timestamp::Timestamp;
    use crate::volume::SplitConfig;
    use std::fs;
    use tempfile::TempDir;

    fn record(name: &str) -> EntryRecord {
        EntryRecord {
            name: ArchivePath::new(name).unwrap(),
            compression: CompressionMethod::Store,
            encryption: EncryptionMethod::None,
            aes_strength: AesStrength::default(),
            crc32: 0x11223344,
            uncompressed_size: 5,
            compressed_size: 5,
            disk_number_start: 0,
            local_header_offset: 0,
            comment: None,
            external_attributes: 0,
            charset: Charset::utf8(),
            utf8: true,
            last_modified: Timestamp::default(),
        }
    }

    #[test]
    fn test_end_record_terminates_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cd.zip");
        let mut sink = SplitWriter::create(SplitConfig::single(&path)).unwrap();

        let mut model = ArchiveModel::new();
        model.insert(record("a.txt"));
        model.insert(record("b.txt"));

        write_central_directory(&mut sink, &model).unwrap();
        sink.finish().unwrap();
        drop(sink);

        let bytes = fs::read(&path).unwrap();
        let eocd = &bytes[bytes.len() - 22..];
        assert_eq!(
            u32::from_le_bytes(eocd[0..4].try_into().unwrap()),
            END_OF_CENTRAL_DIRECTORY_SIGNATURE
        );
        // total entries
        assert_eq!(u16::from_le_bytes([eocd[10], eocd[11]]), 2);
        // directory size covers everything before the EOCD
        let cd_size = u32::from_le_bytes(eocd[12..16].try_into().unwrap()) as usize;
        assert_eq!(cd_size, bytes.len() - 22);
    }

    #[test]
    fn test_aes_record_gets_extra_field() {
        let mut rec = record("enc.bin");
        rec.encryption = EncryptionMethod::Aes;
        rec.crc32 = 0;
        let header = central_header(&rec);
        assert_eq!(header.method, AES_COMPRESSION_METHOD);
        assert_eq!(header.version_needed, VERSION_NEEDED_AES);
        assert_eq!(header.extra.len(), AesExtraField::LENGTH);
    }

    #[test]
    fn test_zip64_offset_promotes_version() {
        let mut rec = record("big.bin");
        rec.local_header_offset = 0x1_0000_0000;
        let header = central_header(&rec);
        assert_eq!(header.version_needed, VERSION_NEEDED_ZIP64);
    }

    #[test]
    fn test_directory_flags() {
        let mut rec = record("docs");
        rec.name = ArchivePath::new_directory("docs").unwrap();
        let header = central_header(&rec);
        // No data descriptor for directory entries
        assert_eq!(header.flags & FLAG_DATA_DESCRIPTOR, 0);
        assert_ne!(header.flags & FLAG_UTF8, 0);
    }

    #[test]
    fn test_comment_encoded_in_header() {
        let mut rec = record("c.txt");
        rec.comment = Some("a note".to_string());
        let header = central_header(&rec);
        assert_eq!(header.comment, b"a note");

        rec.comment = None;
        assert!(central_header(&rec).comment.is_empty());
    }
}
