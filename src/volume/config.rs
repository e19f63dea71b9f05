//! Configuration for split archive output.

use std::path::{Path, PathBuf};

use super::MIN_SPLIT_LENGTH;
use crate::{Error, Result};

/// Output configuration: where the archive lives and whether it splits.
///
/// # Example
///
/// ```rust
/// use splitzip::volume::SplitConfig;
///
/// let config = SplitConfig::split("archive.zip", 10 * 1024 * 1024)?;
/// assert_eq!(config.volume_path(1).to_str().unwrap(), "archive.z01");
/// assert_eq!(config.volume_path(10).to_str().unwrap(), "archive.z10");
/// # Ok::<(), splitzip::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Final archive path; also the path the active volume is written at.
    archive_path: PathBuf,
    /// Maximum volume size in bytes, `None` for a single unbounded file.
    split_length: Option<u64>,
}

impl SplitConfig {
    /// Configuration for a single, unbounded archive file.
    pub fn single(archive_path: impl AsRef<Path>) -> Self {
        Self {
            archive_path: archive_path.as_ref().to_path_buf(),
            split_length: None,
        }
    }

    /// Configuration for a split archive with the given maximum volume
    /// size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SplitSizeTooSmall`] when `split_length` is below
    /// [`MIN_SPLIT_LENGTH`]. The check happens here, before any output
    /// file is created.
    pub fn split(archive_path: impl AsRef<Path>, split_length: u64) -> Result<Self> {
        if split_length < MIN_SPLIT_LENGTH {
            return Err(Error::SplitSizeTooSmall {
                minimum: MIN_SPLIT_LENGTH,
            });
        }
        Ok(Self {
            archive_path: archive_path.as_ref().to_path_buf(),
            split_length: Some(split_length),
        })
    }

    /// The final archive path (the last volume keeps this name).
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn is_split(&self) -> bool {
        self.split_length.is_some()
    }

    /// Maximum volume size, when splitting is enabled.
    pub fn split_length(&self) -> Option<u64> {
        self.split_length
    }

    /// Path of a completed (non-final) volume.
    ///
    /// Volume numbers are 1-indexed; the archive extension is replaced
    /// with `.z01` through `.z09`, then `.z10` and so on. The final
    /// volume is not renamed and keeps [`archive_path`].
    ///
    /// [`archive_path`]: SplitConfig::archive_path
    pub fn volume_path(&self, volume_number: u32) -> PathBuf {
        self.archive_path
            .with_extension(format!("z{:02}", volume_number))
    }
}
