//! MS-DOS timestamp handling.
//!
//! ZIP records store entry modification times in the MS-DOS packed format:
//! two 16-bit little-endian fields, one for the time of day and one for the
//! date.
//!
//! # Precision
//!
//! The DOS format has 2-second precision (the seconds field counts
//! two-second units) and can only represent years 1980 through 2107.
//! Values outside that range are clamped to the nearest representable
//! date.
//!
//! # Example
//!
//! ```rust
//! use splitzip::Timestamp;
//!
//! let ts = Timestamp::from_parts(2024, 3, 15, 12, 30, 44);
//! assert_eq!(ts.dos_date() >> 9, 2024 - 1980); // year bits
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

/// First year representable in a DOS date.
const DOS_EPOCH_YEAR: u16 = 1980;

/// Last year representable in a DOS date.
const DOS_MAX_YEAR: u16 = 2107;

/// An entry modification time in MS-DOS packed format.
///
/// The date field packs `(year - 1980) << 9 | month << 5 | day`, and the
/// time field packs `hour << 11 | minute << 5 | second / 2`.
///
/// # Example
///
/// ```rust
/// use splitzip::Timestamp;
///
/// let ts = Timestamp::from_parts(1980, 1, 1, 0, 0, 0);
/// assert_eq!(ts.dos_date(), 0x0021);
/// assert_eq!(ts.dos_time(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    date: u16,
    time: u16,
}

impl Timestamp {
    /// Creates a timestamp from raw DOS date and time fields.
    #[inline]
    pub const fn from_dos(date: u16, time: u16) -> Self {
        Self { date, time }
    }

    /// Creates a timestamp from calendar components.
    ///
    /// Out-of-range components are clamped to the DOS-representable range
    /// (years 1980-2107); seconds lose their low bit.
    pub fn from_parts(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        let year = year.clamp(DOS_EPOCH_YEAR, DOS_MAX_YEAR);
        let month = month.clamp(1, 12) as u16;
        let day = day.clamp(1, 31) as u16;
        let hour = hour.min(23) as u16;
        let minute = minute.min(59) as u16;
        let second = second.min(59) as u16;

        Self {
            date: ((year - DOS_EPOCH_YEAR) << 9) | (month << 5) | day,
            time: (hour << 11) | (minute << 5) | (second / 2),
        }
    }

    /// Creates a timestamp from a [`SystemTime`].
    ///
    /// Times before 1980 collapse to the DOS epoch.
    pub fn from_system_time(time: SystemTime) -> Self {
        let secs = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        };
        Self::from_unix_secs(secs)
    }

    /// Creates a timestamp for the current time.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Creates a timestamp from Unix seconds (since January 1, 1970, UTC).
    pub fn from_unix_secs(secs: i64) -> Self {
        let days = secs.div_euclid(86_400);
        let secs_of_day = secs.rem_euclid(86_400) as u32;

        let (year, month, day) = civil_from_days(days);
        let year = year.clamp(DOS_EPOCH_YEAR as i64, DOS_MAX_YEAR as i64) as u16;

        Self::from_parts(
            year,
            month,
            day,
            (secs_of_day / 3600) as u8,
            ((secs_of_day / 60) % 60) as u8,
            (secs_of_day % 60) as u8,
        )
    }

    /// Returns the packed DOS date field.
    #[inline]
    pub const fn dos_date(&self) -> u16 {
        self.date
    }

    /// Returns the packed DOS time field.
    #[inline]
    pub const fn dos_time(&self) -> u16 {
        self.time
    }

    /// Returns both fields packed as the 32-bit value stored in ZIP
    /// headers (time in the low half, date in the high half).
    #[inline]
    pub const fn as_dos_u32(&self) -> u32 {
        ((self.date as u32) << 16) | self.time as u32
    }
}

impl Default for Timestamp {
    /// The DOS epoch, 1980-01-01 00:00:00.
    fn default() -> Self {
        Self::from_parts(1980, 1, 1, 0, 0, 0)
    }
}

/// Converts days since the Unix epoch to a (year, month, day) civil date.
///
/// Days-to-civil conversion from Howard Hinnant's date algorithms.
fn civil_from_days(z: i64) -> (i64, u8, u8) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    (if m <= 2 { y + 1 } else { y }, m as u8, d as u8)
}
