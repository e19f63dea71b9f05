//! Encryption support for ZIP archives.
//!
//! Two schemes are implemented:
//!
//! - The legacy PKWARE stream cipher ([`zipcrypto`]), kept for
//!   compatibility with old extractors.
//! - WinZip AES (AE-2) in CTR mode with PBKDF2-HMAC-SHA1 key derivation
//!   and an HMAC-SHA1 authentication code ([`aes`]).
//!
//! Both consume a [`Password`] whose backing storage is zeroized on drop.

pub mod aes;
mod password;
pub mod zipcrypto;

pub use aes::AesStrength;
pub use password::Password;

/// The encryption scheme applied to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionMethod {
    /// No encryption.
    #[default]
    None,
    /// Legacy PKWARE stream cipher.
    ZipCrypto,
    /// WinZip AES (AE-2).
    Aes,
}

impl EncryptionMethod {
    /// Returns `true` for any scheme other than [`EncryptionMethod::None`].
    pub fn is_encrypted(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_encrypted() {
        assert!(!EncryptionMethod::None.is_encrypted());
        assert!(EncryptionMethod::ZipCrypto.is_encrypted());
        assert!(EncryptionMethod::Aes.is_encrypted());
    }

    #[test]
    fn test_default() {
        assert_eq!(EncryptionMethod::default(), EncryptionMethod::None);
        assert_eq!(AesStrength::default(), AesStrength::Aes256);
    }
}
