//! Password handling for ZIP encryption.

use zeroize::Zeroizing;

/// A password for archive encryption.
///
/// This type stores the password securely and provides the raw byte view
/// that both ZIP key schedules (legacy and WinZip AES) operate on. The
/// backing storage is wiped when the password is dropped, and the writer
/// drops it as part of finalization.
#[derive(Clone)]
pub struct Password {
    inner: Zeroizing<String>,
}

impl Password {
    /// Creates a new password from a string.
    pub fn new<S: Into<String>>(password: S) -> Self {
        Self {
            inner: Zeroizing::new(password.into()),
        }
    }

    /// Returns the password bytes for key derivation.
    ///
    /// Both the legacy key schedule and PBKDF2 consume the password as raw
    /// UTF-8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Returns true if the password is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the length of the password in bytes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose the actual password in debug output
        f.debug_struct("Password")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Password {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_bytes() {
        let password = Password::new("test");
        assert_eq!(password.as_bytes(), b"test");
    }

    #[test]
    fn test_password_unicode_bytes() {
        let password = Password::new("пароль");
        // Each Cyrillic character uses 2 bytes in UTF-8
        assert_eq!(password.as_bytes().len(), 12);
    }

    #[test]
    fn test_password_empty() {
        let password = Password::new("");
        assert!(password.is_empty());
        assert_eq!(password.len(), 0);
    }

    #[test]
    fn test_password_debug() {
        let password = Password::new("secret");
        let debug = format!("{:?}", password);
        // Debug output should not contain the actual password
        assert!(!debug.contains("secret"));
        assert!(debug.contains("len"));
    }

    #[test]
    fn test_password_from() {
        let password: Password = "test".into();
        assert_eq!(password.as_bytes(), b"test");

        let password: Password = String::from("test").into();
        assert_eq!(password.as_bytes(), b"test");
    }
}
