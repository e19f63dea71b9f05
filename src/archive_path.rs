//! Archive path type with validation and normalization for entry names.

use crate::{Error, Result};
use std::fmt;

/// Maximum length for archive paths (in bytes).
///
/// The ZIP name field is a 16-bit length, and 32KB is well above any
/// reasonable file system path limit (e.g., Linux PATH_MAX is 4KB,
/// Windows MAX_PATH is ~260).
const MAX_PATH_LENGTH: usize = 32768;

/// A validated, normalized archive entry name.
///
/// `ArchivePath` normalizes paths to use forward slashes and validates that:
/// - No NUL bytes are present
/// - The path is not absolute (does not start with `/`)
/// - No empty segments exist (no `//`)
/// - No `.` or `..` segments are present (prevents path traversal)
///
/// A single trailing slash is allowed and marks a directory entry.
///
/// # Examples
///
/// ```
/// use splitzip::ArchivePath;
///
/// // Valid paths
/// let path = ArchivePath::new("dir/file.txt").unwrap();
/// assert_eq!(path.as_str(), "dir/file.txt");
/// assert!(!path.is_directory());
///
/// // Backslashes are normalized
/// let path = ArchivePath::new("dir\\file.txt").unwrap();
/// assert_eq!(path.as_str(), "dir/file.txt");
///
/// // A trailing slash marks a directory
/// let dir = ArchivePath::new("dir/").unwrap();
/// assert!(dir.is_directory());
///
/// // Invalid paths are rejected
/// assert!(ArchivePath::new("../secret").is_err());
/// assert!(ArchivePath::new("/absolute/path").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Creates a new `ArchivePath` from a string, normalizing and
    /// validating it.
    ///
    /// Backslashes are replaced with forward slashes before validation, so
    /// Windows-style paths are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path:
    /// - Contains NUL bytes
    /// - Is an absolute path (starts with `/`)
    /// - Contains empty segments (e.g., `a//b`)
    /// - Contains `.` or `..` segments
    /// - Is empty
    pub fn new(s: &str) -> Result<Self> {
        let normalized = if s.contains('\\') {
            s.replace('\\', "/")
        } else {
            s.to_string()
        };
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    /// Creates a directory entry name, appending the trailing slash if
    /// missing.
    pub fn new_directory(s: &str) -> Result<Self> {
        let path = Self::new(s)?;
        if path.is_directory() {
            Ok(path)
        } else {
            Ok(Self(format!("{}/", path.0)))
        }
    }

    /// Validates a normalized archive path string.
    fn validate(s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(Error::InvalidArchivePath("contains NUL byte".into()));
        }

        if s.is_empty() || s == "/" {
            return Err(Error::InvalidArchivePath("empty path".into()));
        }

        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidArchivePath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }

        if s.starts_with('/') {
            return Err(Error::InvalidArchivePath(
                "absolute path not allowed".into(),
            ));
        }

        // One trailing slash marks a directory and is not a segment.
        let segments = s.strip_suffix('/').unwrap_or(s);

        for segment in segments.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidArchivePath(
                    "empty segment (consecutive slashes)".into(),
                ));
            }
            if segment == "." {
                return Err(Error::InvalidArchivePath("'.' segment not allowed".into()));
            }
            if segment == ".." {
                return Err(Error::InvalidArchivePath(
                    "'..' segment not allowed (path traversal)".into(),
                ));
            }
        }

        Ok(())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this path names a directory entry (ends with `/`).
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        let trimmed = self.0.strip_suffix('/').unwrap_or(&self.0);
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Returns the parent directory of this path, if any.
    ///
    /// Returns `None` if this path has no parent (i.e., is a single segment).
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.0.strip_suffix('/').unwrap_or(&self.0);
        trimmed.rfind('/').map(|idx| {
            // Validated during construction, so parent is also valid
            Self(format!("{}/", &trimmed[..idx]))
        })
    }

    /// Returns an iterator over the path components (segments).
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0
            .strip_suffix('/')
            .unwrap_or(&self.0)
            .split('/')
    }
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArchivePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}
