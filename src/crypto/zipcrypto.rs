//! Legacy PKWARE stream cipher ("ZipCrypto").
//!
//! The traditional ZIP cipher keeps three 32-bit keys that evolve with
//! every plaintext byte. Each entry starts with a 12-byte encrypted
//! header: 11 random bytes plus a check byte that lets a reader reject
//! most wrong passwords without decrypting any content.
//!
//! Because this writer always streams entries with data descriptors
//! (general purpose bit 3), the CRC is unknown when the header is
//! emitted, so the check byte is the high byte of the DOS modification
//! time. That is what interoperating extractors verify against for
//! bit-3 streams.
//!
//! This cipher is weak by modern standards and is provided for
//! compatibility only; prefer AES for new archives.

use crate::crypto::Password;
use crate::error::PasswordDetectionMethod;
use crate::{Error, Result};

/// CRC-32 lookup table (polynomial 0xEDB88320, reflected).
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

#[inline]
fn crc32_update(crc: u32, byte: u8) -> u32 {
    CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
}

/// Size of the encrypted header prefix in bytes.
pub const LEGACY_HEADER_SIZE: usize = 12;

/// The evolving three-key cipher state.
#[derive(Clone)]
struct Keys {
    key0: u32,
    key1: u32,
    key2: u32,
}

impl Keys {
    fn new(password: &Password) -> Self {
        let mut keys = Self {
            key0: 0x12345678,
            key1: 0x23456789,
            key2: 0x34567890,
        };
        for &b in password.as_bytes() {
            keys.update(b);
        }
        keys
    }

    /// Advances the key state with a plaintext byte.
    #[inline]
    fn update(&mut self, byte: u8) {
        self.key0 = crc32_update(self.key0, byte);
        self.key1 = self
            .key1
            .wrapping_add(self.key0 & 0xFF)
            .wrapping_mul(134775813)
            .wrapping_add(1);
        self.key2 = crc32_update(self.key2, (self.key1 >> 24) as u8);
    }

    /// Produces the next keystream byte without advancing the state.
    #[inline]
    fn stream_byte(&self) -> u8 {
        let temp = (self.key2 | 2) as u16;
        (temp.wrapping_mul(temp ^ 1) >> 8) as u8
    }

    #[inline]
    fn encrypt_byte(&mut self, plain: u8) -> u8 {
        let cipher = plain ^ self.stream_byte();
        self.update(plain);
        cipher
    }

    #[inline]
    fn decrypt_byte(&mut self, cipher: u8) -> u8 {
        let plain = cipher ^ self.stream_byte();
        self.update(plain);
        plain
    }
}

/// Encrypting half of the legacy cipher.
pub struct LegacyEncryptor {
    keys: Keys,
}

impl LegacyEncryptor {
    /// Initializes the cipher state from a password.
    pub fn new(password: &Password) -> Self {
        Self {
            keys: Keys::new(password),
        }
    }

    /// Produces the 12-byte encrypted entry header.
    ///
    /// `check_byte` is the value a reader verifies after decrypting the
    /// header; for bit-3 streams this is the high byte of the DOS time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CryptoError`] if the system random source fails.
    pub fn generate_header(&mut self, check_byte: u8) -> Result<[u8; LEGACY_HEADER_SIZE]> {
        let mut header = [0u8; LEGACY_HEADER_SIZE];
        getrandom::getrandom(&mut header[..LEGACY_HEADER_SIZE - 1])
            .map_err(|e| Error::CryptoError(format!("random source unavailable: {}", e)))?;
        header[LEGACY_HEADER_SIZE - 1] = check_byte;

        for byte in header.iter_mut() {
            *byte = self.keys.encrypt_byte(*byte);
        }
        Ok(header)
    }

    /// Encrypts a buffer in place.
    pub fn encrypt_in_place(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte = self.keys.encrypt_byte(*byte);
        }
    }
}

impl std::fmt::Debug for LegacyEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyEncryptor").finish_non_exhaustive()
    }
}

/// Decrypting half of the legacy cipher, used by the verification path.
pub struct LegacyDecryptor {
    keys: Keys,
}

impl LegacyDecryptor {
    /// Initializes the cipher state from a password.
    pub fn new(password: &Password) -> Self {
        Self {
            keys: Keys::new(password),
        }
    }

    /// Decrypts the 12-byte entry header and verifies the check byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongPassword`] if the decrypted check byte does
    /// not match.
    pub fn verify_header(
        &mut self,
        header: &[u8; LEGACY_HEADER_SIZE],
        check_byte: u8,
        entry_name: Option<&str>,
    ) -> Result<()> {
        let mut decrypted = *header;
        for byte in decrypted.iter_mut() {
            *byte = self.keys.decrypt_byte(*byte);
        }

        if decrypted[LEGACY_HEADER_SIZE - 1] != check_byte {
            return Err(Error::wrong_password(
                entry_name.map(String::from),
                PasswordDetectionMethod::HeaderCheckByte,
            ));
        }
        Ok(())
    }

    /// Decrypts a buffer in place.
    pub fn decrypt_in_place(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte = self.keys.decrypt_byte(*byte);
        }
    }
}

impl std::fmt::Debug for LegacyDecryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyDecryptor").finish_non_exhaustive()
    }
}
