//! Test support: a minimal archive reader used to verify writer output.
//!
//! Reassembles split volumes, parses the central directory, and
//! extracts entries with decryption and decompression so round-trip
//! tests can compare against the original input.

#![allow(dead_code)]

use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use splitzip::checksum::Crc32;
use splitzip::codec::{DeflateDecoder, StoreDecoder};
use splitzip::crypto::aes::{AesDecryptor, AUTH_CODE_LENGTH, VERIFIER_LENGTH};
use splitzip::crypto::zipcrypto::{LegacyDecryptor, LEGACY_HEADER_SIZE};
use splitzip::crypto::{AesStrength, Password};
use splitzip::{Error, Result};

const EOCD_SIGNATURE: u32 = 0x06054B50;
const ZIP64_EOCD_SIGNATURE: u32 = 0x06064B50;
const ZIP64_LOCATOR_SIGNATURE: u32 = 0x07064B50;
const CENTRAL_SIGNATURE: u32 = 0x02014B50;
const LOCAL_SIGNATURE: u32 = 0x04034B50;

fn le16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn le32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(data[at..at + 4].try_into().unwrap())
}

fn le64(data: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(data[at..at + 8].try_into().unwrap())
}

/// One parsed central directory entry.
#[derive(Debug, Clone)]
pub struct TestEntry {
    pub name_bytes: Vec<u8>,
    pub name: String,
    pub flags: u16,
    pub method: u16,
    pub dos_time: u16,
    pub dos_date: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub disk_number_start: u32,
    pub local_header_offset: u64,
    pub external_attributes: u32,
    pub comment_bytes: Vec<u8>,
    /// (strength code, real compression method) from the AES extra field.
    pub aes: Option<(u8, u16)>,
}

impl TestEntry {
    pub fn is_encrypted(&self) -> bool {
        self.flags & 0x0001 != 0
    }

    pub fn is_utf8(&self) -> bool {
        self.flags & 0x0800 != 0
    }
}

/// A written archive, reassembled and indexed for verification.
pub struct TestArchive {
    data: Vec<u8>,
    disk_base: Vec<u64>,
    pub volume_sizes: Vec<u64>,
    pub entries: Vec<TestEntry>,
}

impl TestArchive {
    /// Loads an archive, collecting `.z01`, `.z02`, ... volumes before
    /// the final `.zip` file.
    pub fn open(path: &Path) -> Self {
        let mut volumes = Vec::new();
        for n in 1.. {
            let volume = path.with_extension(format!("z{:02}", n));
            if !volume.exists() {
                break;
            }
            volumes.push(std::fs::read(&volume).unwrap());
        }
        volumes.push(std::fs::read(path).unwrap());

        let mut disk_base = Vec::with_capacity(volumes.len());
        let mut volume_sizes = Vec::with_capacity(volumes.len());
        let mut data = Vec::new();
        for volume in &volumes {
            disk_base.push(data.len() as u64);
            volume_sizes.push(volume.len() as u64);
            data.extend_from_slice(volume);
        }

        let entries = parse_central_directory(&data, &disk_base);
        Self {
            data,
            disk_base,
            volume_sizes,
            entries,
        }
    }

    pub fn entry(&self, name: &str) -> &TestEntry {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("entry '{name}' not in central directory"))
    }

    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Extracts and verifies one entry, returning its content.
    pub fn extract(&self, entry: &TestEntry, password: Option<&str>) -> Result<Vec<u8>> {
        let base = self.disk_base[entry.disk_number_start as usize];
        let header_at = (base + entry.local_header_offset) as usize;
        assert_eq!(le32(&self.data, header_at), LOCAL_SIGNATURE);

        let name_len = le16(&self.data, header_at + 26) as usize;
        let extra_len = le16(&self.data, header_at + 28) as usize;
        let data_at = header_at + 30 + name_len + extra_len;
        let raw = &self.data[data_at..data_at + entry.compressed_size as usize];

        if let Some((strength_code, real_method)) = entry.aes {
            let password = Password::new(password.ok_or(Error::PasswordRequired)?);
            let strength = AesStrength::from_code(strength_code)?;
            let salt_len = strength.salt_length();

            let salt = &raw[..salt_len];
            let verifier: [u8; VERIFIER_LENGTH] =
                raw[salt_len..salt_len + VERIFIER_LENGTH].try_into().unwrap();
            let ciphertext_end = raw.len() - AUTH_CODE_LENGTH;
            let auth_code = &raw[ciphertext_end..];

            let mut decryptor = AesDecryptor::new(
                &password,
                strength,
                salt,
                verifier,
                Some(entry.name.as_str()),
            )?;
            let mut content = raw[salt_len + VERIFIER_LENGTH..ciphertext_end].to_vec();
            decryptor.decrypt_in_place(&mut content);
            decryptor.verify(auth_code)?;

            // AE-2: no CRC to check, the auth code covers integrity
            return decompress(real_method, &content, entry.uncompressed_size);
        }

        let content = if entry.is_encrypted() {
            let password = Password::new(password.ok_or(Error::PasswordRequired)?);
            let mut decryptor = LegacyDecryptor::new(&password);
            let header: [u8; LEGACY_HEADER_SIZE] = raw[..LEGACY_HEADER_SIZE].try_into().unwrap();
            // Streaming entries carry the high byte of the DOS time
            let check_byte = (entry.dos_time >> 8) as u8;
            decryptor.verify_header(&header, check_byte, Some(entry.name.as_str()))?;

            let mut content = raw[LEGACY_HEADER_SIZE..].to_vec();
            decryptor.decrypt_in_place(&mut content);
            content
        } else {
            raw.to_vec()
        };

        let output = decompress(entry.method, &content, entry.uncompressed_size)?;
        if Crc32::compute(&output) != entry.crc32 {
            return Err(Error::InvalidFormat(format!(
                "CRC mismatch for entry '{}'",
                entry.name
            )));
        }
        Ok(output)
    }
}

fn decompress(method: u16, content: &[u8], expected_size: u64) -> Result<Vec<u8>> {
    let output = match method {
        0 => {
            let mut decoder = StoreDecoder::new(Cursor::new(content), expected_size);
            let mut output = Vec::new();
            decoder
                .read_to_end(&mut output)
                .map_err(|e| Error::InvalidFormat(format!("store read failed: {e}")))?;
            output
        }
        8 => {
            let mut decoder = DeflateDecoder::new(BufReader::new(Cursor::new(content)));
            let mut output = Vec::new();
            decoder
                .read_to_end(&mut output)
                .map_err(|e| Error::InvalidFormat(format!("inflate failed: {e}")))?;
            output
        }
        other => {
            return Err(Error::InvalidFormat(format!(
                "unexpected compression method {other}"
            )));
        }
    };
    if output.len() as u64 != expected_size {
        return Err(Error::InvalidFormat(format!(
            "size mismatch: {} != {}",
            output.len(),
            expected_size
        )));
    }
    Ok(output)
}

fn parse_central_directory(data: &[u8], disk_base: &[u64]) -> Vec<TestEntry> {
    // No archive comment is ever written, so the EOCD sits at the end
    let eocd_at = data.len() - 22;
    assert_eq!(le32(data, eocd_at), EOCD_SIGNATURE, "EOCD not at end");

    let mut total_entries = le16(data, eocd_at + 10) as u64;
    let mut cd_disk = le16(data, eocd_at + 6) as u32;
    let mut cd_offset = le32(data, eocd_at + 16) as u64;

    // Zip64: a locator directly precedes the EOCD
    if eocd_at >= 20 && le32(data, eocd_at - 20) == ZIP64_LOCATOR_SIGNATURE {
        let locator_at = eocd_at - 20;
        let zip64_disk = le32(data, locator_at + 4) as usize;
        let zip64_offset = le64(data, locator_at + 8);
        let zip64_at = (disk_base[zip64_disk] + zip64_offset) as usize;
        assert_eq!(le32(data, zip64_at), ZIP64_EOCD_SIGNATURE);

        total_entries = le64(data, zip64_at + 32);
        cd_disk = le32(data, zip64_at + 20);
        cd_offset = le64(data, zip64_at + 48);
    }

    let mut at = (disk_base[cd_disk as usize] + cd_offset) as usize;
    let mut entries = Vec::with_capacity(total_entries as usize);
    for _ in 0..total_entries {
        assert_eq!(le32(data, at), CENTRAL_SIGNATURE, "bad central header");

        let flags = le16(data, at + 8);
        let method = le16(data, at + 10);
        let dos_time = le16(data, at + 12);
        let dos_date = le16(data, at + 14);
        let crc32 = le32(data, at + 16);
        let mut compressed_size = le32(data, at + 20) as u64;
        let mut uncompressed_size = le32(data, at + 24) as u64;
        let name_len = le16(data, at + 28) as usize;
        let extra_len = le16(data, at + 30) as usize;
        let comment_len = le16(data, at + 32) as usize;
        let mut disk_number_start = le16(data, at + 34) as u32;
        let external_attributes = le32(data, at + 38);
        let mut local_header_offset = le32(data, at + 42) as u64;

        let name_bytes = data[at + 46..at + 46 + name_len].to_vec();
        let extra = &data[at + 46 + name_len..at + 46 + name_len + extra_len];
        let comment_start = at + 46 + name_len + extra_len;
        let comment_bytes = data[comment_start..comment_start + comment_len].to_vec();

        let mut aes = None;
        let mut field_at = 0usize;
        while field_at + 4 <= extra.len() {
            let id = le16(extra, field_at);
            let size = le16(extra, field_at + 2) as usize;
            let body = &extra[field_at + 4..field_at + 4 + size];
            match id {
                0x0001 => {
                    // Only overflowed fields are present, in fixed order
                    let mut body_at = 0;
                    if uncompressed_size == 0xFFFF_FFFF {
                        uncompressed_size = le64(body, body_at);
                        body_at += 8;
                    }
                    if compressed_size == 0xFFFF_FFFF {
                        compressed_size = le64(body, body_at);
                        body_at += 8;
                    }
                    if local_header_offset == 0xFFFF_FFFF {
                        local_header_offset = le64(body, body_at);
                        body_at += 8;
                    }
                    if disk_number_start == 0xFFFF {
                        disk_number_start = le32(body, body_at);
                    }
                }
                0x9901 => {
                    assert_eq!(le16(body, 0), 2, "expected AE-2");
                    assert_eq!(&body[2..4], b"AE");
                    aes = Some((body[4], le16(body, 5)));
                }
                _ => {}
            }
            field_at += 4 + size;
        }

        entries.push(TestEntry {
            name: String::from_utf8_lossy(&name_bytes).into_owned(),
            name_bytes,
            flags,
            method,
            dos_time,
            dos_date,
            crc32,
            compressed_size,
            uncompressed_size,
            disk_number_start,
            local_header_offset,
            external_attributes,
            comment_bytes,
            aes,
        });

        at = comment_start + comment_len;
    }
    entries
}
