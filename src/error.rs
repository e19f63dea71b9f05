//! Error types for ZIP archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when building or verifying ZIP archives, along with a
//! convenient [`Result<T>`] type alias.
//!
//! All fallible operations in this crate return `Result<T, Error>`:
//!
//! ```rust,no_run
//! use splitzip::{Result, write::ZipWriter};
//!
//! fn build(path: &str) -> Result<()> {
//!     let mut writer = ZipWriter::create_path(path)?;
//!     writer.add_bytes("hello.txt", b"hello", &Default::default())?;
//!     writer.finish()?;
//!     Ok(())
//! }
//! ```

use std::io;

/// How a wrong password was detected.
///
/// Use [`Error::PasswordRequired`] instead when no password was provided
/// at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PasswordDetectionMethod {
    /// The AES password verification value did not match.
    ///
    /// WinZip AES stores a 2-byte verifier derived from the password, so a
    /// wrong password is detected before any content is decrypted.
    AesVerifier,

    /// The legacy cipher header check byte did not match.
    ///
    /// The last byte of the decrypted 12-byte header is compared against
    /// the expected check byte. A mismatch catches roughly 255 of 256
    /// wrong passwords before any content is decrypted.
    HeaderCheckByte,

    /// Detected after decompression via CRC-32 mismatch.
    CrcMismatch,

    /// The decrypted data caused the decompressor to fail, which typically
    /// indicates garbage data from a wrong password.
    DecompressionFailure,
}

impl std::fmt::Display for PasswordDetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AesVerifier => write!(f, "AES password verifier mismatch"),
            Self::HeaderCheckByte => write!(f, "cipher header check byte mismatch"),
            Self::CrcMismatch => write!(f, "CRC mismatch after decompression"),
            Self::DecompressionFailure => write!(f, "decompression failure"),
        }
    }
}

/// Helper struct for formatting WrongPassword error messages.
struct WrongPasswordDisplay<'a> {
    entry_name: Option<&'a str>,
}

impl std::fmt::Display for WrongPasswordDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Wrong password")?;
        match self.entry_name {
            Some(name) => write!(f, " for entry '{}'", name),
            None => Ok(()),
        }
    }
}

/// The main error type for ZIP archive operations.
///
/// Each variant includes relevant context to help diagnose the issue.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    ///
    /// This wraps [`std::io::Error`] and is returned when reading an entry
    /// source or writing to a volume fails. Common causes include
    /// permission problems and full disks.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive data is invalid or not recognized.
    ///
    /// Returned by the verification path when a signature, record length,
    /// or field value does not match the ZIP format.
    #[error("Invalid ZIP format: {0}")]
    InvalidFormat(String),

    /// The password is incorrect.
    ///
    /// **Note:** if no password was provided at all,
    /// [`Error::PasswordRequired`] is returned instead.
    #[error("{}", WrongPasswordDisplay { entry_name: entry_name.as_deref() })]
    WrongPassword {
        /// The entry name where the wrong password was detected (if known).
        entry_name: Option<String>,
        /// How the wrong password was detected.
        detection_method: PasswordDetectionMethod,
    },

    /// A password is required but none was provided.
    ///
    /// Returned when an entry requests encryption and the writer holds no
    /// password, or when verifying an encrypted entry without one.
    #[error("password required for encrypted entry")]
    PasswordRequired,

    /// A cryptographic operation failed.
    ///
    /// This indicates an internal error in the encryption process (for
    /// example, the system random source being unavailable), which should
    /// not occur under normal circumstances.
    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    /// The configured split length is below the minimum.
    ///
    /// Split archives require each volume to hold at least the largest
    /// atomic record, so the split length must be at least
    /// [`MIN_SPLIT_LENGTH`](crate::volume::MIN_SPLIT_LENGTH) bytes.
    #[error("split length less than minimum allowed split length of {minimum} Bytes")]
    SplitSizeTooSmall {
        /// The smallest permitted split length in bytes.
        minimum: u64,
    },

    /// A single archive record does not fit in one volume.
    ///
    /// Headers, data descriptors and central directory records never
    /// straddle a volume boundary. If one of them (typically a header
    /// with a very long name or comment) is at least as large as the
    /// split length, the archive cannot be written with that split
    /// configuration.
    #[error("record of {size} bytes does not fit in a split volume of {split_length} bytes")]
    SplitUnitTooLarge {
        /// The size of the record that did not fit.
        size: u64,
        /// The configured split length.
        split_length: u64,
    },

    /// A requested feature is not supported.
    ///
    /// For example, requesting encryption for a directory entry.
    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature {
        /// The name of the unsupported feature.
        feature: &'static str,
    },

    /// An entry name is invalid.
    ///
    /// Entry names must not contain NUL bytes, must not be empty, must not
    /// be absolute, and must use forward slashes as separators.
    #[error("Invalid archive path: {0}")]
    InvalidArchivePath(String),

    /// The writer has already been finished.
    ///
    /// Entries cannot be added after [`finish`] has succeeded.
    ///
    /// [`finish`]: crate::write::ZipWriter::finish
    #[error("archive already finished")]
    ArchiveFinished,
}

impl Error {
    /// Returns `true` if this error might be recoverable.
    ///
    /// Recoverable errors are those where the operation could potentially
    /// succeed if tried again or with different parameters:
    ///
    /// - `WrongPassword` / `PasswordRequired`: retry with a password
    /// - `Io` (transient kinds only): `WouldBlock`, `Interrupted`, `TimedOut`
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::WrongPassword { .. } => true,
            Error::PasswordRequired => true,
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// Returns `true` if this is an encryption-related error.
    pub fn is_encryption_error(&self) -> bool {
        matches!(
            self,
            Error::WrongPassword { .. } | Error::CryptoError(_) | Error::PasswordRequired
        )
    }

    /// Returns `true` if this error is caused by the split configuration.
    pub fn is_split_error(&self) -> bool {
        matches!(
            self,
            Error::SplitSizeTooSmall { .. } | Error::SplitUnitTooLarge { .. }
        )
    }

    /// Returns the entry name associated with this error, if any.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Error::WrongPassword { entry_name, .. } => entry_name.as_deref(),
            _ => None,
        }
    }

    /// Creates a WrongPassword error with full context.
    pub fn wrong_password(
        entry_name: Option<String>,
        detection_method: PasswordDetectionMethod,
    ) -> Self {
        Error::WrongPassword {
            entry_name,
            detection_method,
        }
    }
}

/// A specialized Result type for ZIP operations.
///
/// This is defined as `std::result::Result<T, Error>` for convenience.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_invalid_format() {
        let err = Error::InvalidFormat("missing end of central directory".into());
        assert_eq!(
            err.to_string(),
            "Invalid ZIP format: missing end of central directory"
        );
    }

    #[test]
    fn test_wrong_password() {
        let err = Error::WrongPassword {
            entry_name: None,
            detection_method: PasswordDetectionMethod::HeaderCheckByte,
        };
        assert!(err.to_string().contains("Wrong password"));

        let err = Error::WrongPassword {
            entry_name: Some("file.txt".into()),
            detection_method: PasswordDetectionMethod::AesVerifier,
        };
        assert!(err.to_string().contains("file.txt"));
        assert_eq!(err.entry_name(), Some("file.txt"));
    }

    #[test]
    fn test_split_size_too_small_message() {
        let err = Error::SplitSizeTooSmall { minimum: 65536 };
        assert_eq!(
            err.to_string(),
            "split length less than minimum allowed split length of 65536 Bytes"
        );
        assert!(err.is_split_error());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_split_unit_too_large() {
        let err = Error::SplitUnitTooLarge {
            size: 70000,
            split_length: 65536,
        };
        let msg = err.to_string();
        assert!(msg.contains("70000"));
        assert!(msg.contains("65536"));
        assert!(err.is_split_error());
    }

    #[test]
    fn test_unsupported_feature() {
        let err = Error::UnsupportedFeature {
            feature: "encrypted directory entries",
        };
        assert!(err.to_string().contains("encrypted directory entries"));
    }

    #[test]
    fn test_invalid_archive_path() {
        let err = Error::InvalidArchivePath("contains NUL byte".into());
        assert!(err.to_string().contains("contains NUL byte"));
    }

    #[test]
    fn test_archive_finished() {
        let err = Error::ArchiveFinished;
        assert!(err.to_string().contains("finished"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_is_encryption_error() {
        let err = Error::WrongPassword {
            entry_name: None,
            detection_method: PasswordDetectionMethod::CrcMismatch,
        };
        assert!(err.is_encryption_error());

        let err = Error::PasswordRequired;
        assert!(err.is_encryption_error());
        assert!(err.is_recoverable());

        let err = Error::CryptoError("random source unavailable".into());
        assert!(err.is_encryption_error());

        let err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "test"));
        assert!(!err.is_encryption_error());
    }

    #[test]
    fn test_is_recoverable_transient_io() {
        let err = Error::Io(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
        assert!(err.is_recoverable());

        let err = Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_password_detection_method_display() {
        assert!(
            PasswordDetectionMethod::AesVerifier
                .to_string()
                .contains("verifier")
        );
        assert!(
            PasswordDetectionMethod::HeaderCheckByte
                .to_string()
                .contains("check byte")
        );
        assert!(
            PasswordDetectionMethod::CrcMismatch
                .to_string()
                .contains("CRC")
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
