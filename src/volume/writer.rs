//! Split-volume output sink.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use super::SplitConfig;
use crate::format::SPLIT_SIGNATURE;
use crate::{Error, Result};

/// A writer that splits output across numbered volume files.
///
/// The active volume is always written at the archive's final path; when
/// it fills up it is renamed to its split name (`.z01`, `.z02`, ...) and
/// a fresh file is opened at the archive path. The last volume therefore
/// keeps the `.zip` name without a final rename pass. Exactly one file
/// handle is open at any time.
///
/// Record-sized writes that must not straddle a volume boundary are
/// bracketed with [`begin_unit`]/[`end_unit`]; everything written in
/// between is buffered and flushed as one piece, rolling over to a fresh
/// volume first when it would not fit. Plain [`Write`] calls outside a
/// unit are content bytes and may split anywhere.
///
/// [`begin_unit`]: SplitWriter::begin_unit
/// [`end_unit`]: SplitWriter::end_unit
pub struct SplitWriter {
    config: SplitConfig,
    /// Active volume, always at the archive path. Closed only while the
    /// rollover rename is in flight.
    file: Option<BufWriter<File>>,
    /// Zero-based index of the active volume.
    current_disk: u32,
    /// Bytes written to the active volume.
    current_written: u64,
    /// Bytes written across all volumes.
    total_written: u64,
    /// Sizes of volumes already rolled over.
    completed_sizes: Vec<u64>,
    /// Pending atomic unit, when one is open.
    unit: Option<Vec<u8>>,
}

impl SplitWriter {
    /// Creates the sink and opens the first volume.
    ///
    /// In split mode the 4-byte split marker (`PK\x07\x08`) is written
    /// at offset 0 of the first volume before anything else.
    pub fn create(config: SplitConfig) -> Result<Self> {
        let file = Self::create_volume_file(config.archive_path())?;

        let mut writer = Self {
            config,
            file: Some(BufWriter::new(file)),
            current_disk: 0,
            current_written: 0,
            total_written: 0,
            completed_sizes: Vec::new(),
            unit: None,
        };

        if writer.config.is_split() {
            writer.write_all(&SPLIT_SIGNATURE.to_le_bytes())?;
        }

        Ok(writer)
    }

    fn create_volume_file(path: &std::path::Path) -> Result<File> {
        File::create(path).map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("failed to create {}: {}", path.display(), e),
            ))
        })
    }

    /// Opens an atomic unit; subsequent writes are buffered until
    /// [`end_unit`](SplitWriter::end_unit).
    pub fn begin_unit(&mut self) {
        debug_assert!(self.unit.is_none(), "atomic unit already open");
        self.unit = Some(Vec::new());
    }

    /// Flushes the open unit to the active volume as one piece.
    ///
    /// Rolls over to a fresh volume first when the unit would not fit in
    /// the remaining space. Returns the disk and offset where the unit
    /// starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SplitUnitTooLarge`] when the unit exceeds the
    /// split length and could never fit a volume on its own.
    pub fn end_unit(&mut self) -> Result<(u32, u64)> {
        let unit = self.unit.take().unwrap_or_default();

        if let Some(split_length) = self.config.split_length() {
            let size = unit.len() as u64;
            if size > split_length {
                return Err(Error::SplitUnitTooLarge { size, split_length });
            }
            if self.current_written + size > split_length {
                self.roll_over()?;
            }
        }

        let start = self.position();
        self.write_all(&unit)?;
        Ok(start)
    }

    /// Rolls over to a fresh volume when fewer than `size` bytes remain
    /// in the active one.
    ///
    /// Called before serializing records whose fields describe the disk
    /// they land on (the end records), so the rollover decision is made
    /// first and [`position`](SplitWriter::position) already points at
    /// the final location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SplitUnitTooLarge`] when `size` exceeds the
    /// split length outright.
    pub fn reserve(&mut self, size: u64) -> Result<()> {
        if let Some(split_length) = self.config.split_length() {
            if size > split_length {
                return Err(Error::SplitUnitTooLarge { size, split_length });
            }
            if self.current_written + size > split_length {
                self.roll_over()?;
            }
        }
        Ok(())
    }

    /// Current write position as (disk index, offset within disk).
    pub fn position(&self) -> (u32, u64) {
        (self.current_disk, self.current_written)
    }

    /// Zero-based index of the active volume.
    pub fn current_disk(&self) -> u32 {
        self.current_disk
    }

    /// Number of volumes opened so far.
    pub fn disk_count(&self) -> u32 {
        self.current_disk + 1
    }

    /// Total bytes written across all volumes.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    fn remaining_in_volume(&self) -> u64 {
        match self.config.split_length() {
            Some(limit) => limit.saturating_sub(self.current_written),
            None => u64::MAX,
        }
    }

    /// Closes the active volume under its split name and opens the next.
    fn roll_over(&mut self) -> Result<()> {
        // Close the handle before the rename
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }

        let volume_number = self.current_disk + 1;
        let split_path = self.config.volume_path(volume_number);
        log::debug!(
            "volume {} full at {} bytes, renaming to {}",
            volume_number,
            self.current_written,
            split_path.display()
        );

        let path = self.config.archive_path();
        fs::rename(path, &split_path)?;
        let fresh = Self::create_volume_file(path)?;

        self.completed_sizes.push(self.current_written);
        self.file = Some(BufWriter::new(fresh));
        self.current_disk += 1;
        self.current_written = 0;
        Ok(())
    }

    /// Flushes the active volume and returns the size of every volume.
    ///
    /// The sink stays usable afterwards so a failed finalize can be
    /// retried; the last volume is closed when the sink is dropped.
    pub fn finish(&mut self) -> Result<Vec<u64>> {
        debug_assert!(self.unit.is_none(), "atomic unit still open");
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }

        let mut sizes = self.completed_sizes.clone();
        sizes.push(self.current_written);
        Ok(sizes)
    }
}

impl Write for SplitWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if let Some(unit) = self.unit.as_mut() {
            unit.extend_from_slice(buf);
            return Ok(buf.len());
        }

        if self.remaining_in_volume() == 0 {
            self.roll_over().map_err(io::Error::other)?;
        }

        let to_write = buf.len().min(self.remaining_in_volume() as usize);
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("volume file not open"))?;
        let n = file.write(&buf[..to_write])?;
        self.current_written += n as u64;
        self.total_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SplitWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitWriter")
            .field("config", &self.config)
            .field("current_disk", &self.current_disk)
            .field("current_written", &self.current_written)
            .field("total_written", &self.total_written)
            .field("completed_volumes", &self.completed_sizes.len())
            .finish()
    }
}
