//! WinZip AES encryption (AE-2).
//!
//! The WinZip scheme replaces the legacy stream cipher with AES in CTR
//! mode. Keys are derived with PBKDF2-HMAC-SHA1 (1000 iterations) from
//! the password and a random salt. The derived material is
//! `key_len * 2 + 2` bytes: the AES key, an HMAC-SHA1 key, and a 2-byte
//! password verification value a reader checks before decrypting
//! anything. The ciphertext is authenticated with HMAC-SHA1 truncated to
//! 10 bytes.
//!
//! AE-2 (vendor version 2) is emitted unconditionally: the CRC field of
//! an AES entry is zero and integrity comes from the authentication code.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::crypto::Password;
use crate::error::PasswordDetectionMethod;
use crate::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// PBKDF2 iteration count fixed by the WinZip AES specification.
const PBKDF2_ITERATIONS: u32 = 1000;

/// Length of the password verification value.
pub const VERIFIER_LENGTH: usize = 2;

/// Length of the truncated HMAC-SHA1 authentication code.
pub const AUTH_CODE_LENGTH: usize = 10;

/// AES key strength for WinZip encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AesStrength {
    /// AES-128: 8-byte salt, 16-byte key.
    Aes128,
    /// AES-256: 16-byte salt, 32-byte key.
    #[default]
    Aes256,
}

impl AesStrength {
    /// The strength code stored in the AES extra field.
    pub fn code(&self) -> u8 {
        match self {
            Self::Aes128 => 1,
            Self::Aes256 => 3,
        }
    }

    /// Resolves a strength code from an AES extra field.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Self::Aes128),
            3 => Ok(Self::Aes256),
            _ => Err(Error::UnsupportedFeature {
                feature: "AES key strength",
            }),
        }
    }

    /// Salt length in bytes (half the key length).
    pub fn salt_length(&self) -> usize {
        self.key_length() / 2
    }

    /// AES key length in bytes.
    pub fn key_length(&self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes256 => 32,
        }
    }

    /// Bytes of cipher metadata added around the compressed stream:
    /// salt + verifier before, authentication code after.
    pub fn overhead(&self) -> u64 {
        (self.salt_length() + VERIFIER_LENGTH + AUTH_CODE_LENGTH) as u64
    }
}

/// AES-CTR keystream generator with the WinZip counter layout.
///
/// The counter is a 16-byte little-endian integer starting at 1; there is
/// no nonce. Each block of keystream is the AES encryption of the counter.
struct AesCtr {
    cipher: CipherVariant,
    counter: u128,
    keystream: [u8; 16],
    used: usize,
}

enum CipherVariant {
    Aes128(Box<Aes128>),
    Aes256(Box<Aes256>),
}

impl AesCtr {
    fn new(strength: AesStrength, key: &[u8]) -> Result<Self> {
        let cipher = match strength {
            AesStrength::Aes128 => Aes128::new_from_slice(key)
                .map(|c| CipherVariant::Aes128(Box::new(c)))
                .map_err(|_| Error::CryptoError("invalid AES-128 key length".into()))?,
            AesStrength::Aes256 => Aes256::new_from_slice(key)
                .map(|c| CipherVariant::Aes256(Box::new(c)))
                .map_err(|_| Error::CryptoError("invalid AES-256 key length".into()))?,
        };
        Ok(Self {
            cipher,
            counter: 1,
            keystream: [0u8; 16],
            used: 16,
        })
    }

    fn refill(&mut self) {
        self.keystream = self.counter.to_le_bytes();
        let block = aes::Block::from_mut_slice(&mut self.keystream);
        match &self.cipher {
            CipherVariant::Aes128(c) => c.encrypt_block(block),
            CipherVariant::Aes256(c) => c.encrypt_block(block),
        }
        self.counter = self.counter.wrapping_add(1);
        self.used = 0;
    }

    /// XORs the keystream into a buffer, advancing the stream position.
    fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.used == 16 {
                self.refill();
            }
            *byte ^= self.keystream[self.used];
            self.used += 1;
        }
    }
}

/// Derived key material for one entry.
struct DerivedKeys {
    aes_key: Zeroizing<Vec<u8>>,
    hmac_key: Zeroizing<Vec<u8>>,
    verifier: [u8; VERIFIER_LENGTH],
}

fn derive_keys(password: &Password, salt: &[u8], strength: AesStrength) -> DerivedKeys {
    let key_len = strength.key_length();
    let mut material = Zeroizing::new(vec![0u8; key_len * 2 + VERIFIER_LENGTH]);
    pbkdf2::pbkdf2_hmac::<Sha1>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut material);

    let mut verifier = [0u8; VERIFIER_LENGTH];
    verifier.copy_from_slice(&material[key_len * 2..]);

    DerivedKeys {
        aes_key: Zeroizing::new(material[..key_len].to_vec()),
        hmac_key: Zeroizing::new(material[key_len..key_len * 2].to_vec()),
        verifier,
    }
}

/// Encrypting engine for one AES entry.
///
/// The cipher prefix (salt followed by the password verifier) goes to the
/// sink before the content, and [`finalize`](Self::finalize) yields the
/// trailing authentication code.
pub struct AesEncryptor {
    ctr: AesCtr,
    hmac: HmacSha1,
    salt: Vec<u8>,
    verifier: [u8; VERIFIER_LENGTH],
}

impl AesEncryptor {
    /// Derives keys from the password and a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CryptoError`] if the system random source fails.
    pub fn new(password: &Password, strength: AesStrength) -> Result<Self> {
        let mut salt = vec![0u8; strength.salt_length()];
        getrandom::getrandom(&mut salt)
            .map_err(|e| Error::CryptoError(format!("random source unavailable: {}", e)))?;
        Self::with_salt(password, strength, salt)
    }

    /// Derives keys from the password and a caller-provided salt.
    pub fn with_salt(password: &Password, strength: AesStrength, salt: Vec<u8>) -> Result<Self> {
        let keys = derive_keys(password, &salt, strength);
        let hmac = <HmacSha1 as Mac>::new_from_slice(&keys.hmac_key)
            .map_err(|_| Error::CryptoError("invalid HMAC key length".into()))?;
        Ok(Self {
            ctr: AesCtr::new(strength, &keys.aes_key)?,
            hmac,
            salt,
            verifier: keys.verifier,
        })
    }

    /// Returns the salt written before the entry content.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Returns the 2-byte password verification value written after the
    /// salt.
    pub fn verifier(&self) -> [u8; VERIFIER_LENGTH] {
        self.verifier
    }

    /// Encrypts a buffer in place and feeds the ciphertext to the
    /// authentication code.
    pub fn encrypt_in_place(&mut self, data: &mut [u8]) {
        self.ctr.apply(data);
        self.hmac.update(data);
    }

    /// Finishes the entry and returns the 10-byte authentication code.
    pub fn finalize(self) -> [u8; AUTH_CODE_LENGTH] {
        let tag = self.hmac.finalize().into_bytes();
        let mut code = [0u8; AUTH_CODE_LENGTH];
        code.copy_from_slice(&tag[..AUTH_CODE_LENGTH]);
        code
    }
}

impl std::fmt::Debug for AesEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesEncryptor").finish_non_exhaustive()
    }
}

/// Decrypting engine for the verification path.
pub struct AesDecryptor {
    ctr: AesCtr,
    hmac: HmacSha1,
}

impl AesDecryptor {
    /// Derives keys from the password and the entry's salt, checking the
    /// password verification value first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongPassword`] before any content is touched if
    /// the verifier does not match.
    pub fn new(
        password: &Password,
        strength: AesStrength,
        salt: &[u8],
        verifier: [u8; VERIFIER_LENGTH],
        entry_name: Option<&str>,
    ) -> Result<Self> {
        let keys = derive_keys(password, salt, strength);
        if keys.verifier != verifier {
            return Err(Error::wrong_password(
                entry_name.map(String::from),
                PasswordDetectionMethod::AesVerifier,
            ));
        }
        let hmac = <HmacSha1 as Mac>::new_from_slice(&keys.hmac_key)
            .map_err(|_| Error::CryptoError("invalid HMAC key length".into()))?;
        Ok(Self {
            ctr: AesCtr::new(strength, &keys.aes_key)?,
            hmac,
        })
    }

    /// Decrypts a buffer in place, feeding the ciphertext to the
    /// authentication code first.
    pub fn decrypt_in_place(&mut self, data: &mut [u8]) {
        self.hmac.update(data);
        self.ctr.apply(data);
    }

    /// Verifies the trailing authentication code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] on a mismatch, which indicates
    /// ciphertext corruption (the password was already verified).
    pub fn verify(self, auth_code: &[u8]) -> Result<()> {
        let tag = self.hmac.finalize().into_bytes();
        if &tag[..AUTH_CODE_LENGTH] != auth_code {
            return Err(Error::InvalidFormat(
                "AES authentication code mismatch".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AesDecryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesDecryptor").finish_non_exhaustive()
    }
}
