//! Entry timestamp handling.
//!
//! ZIP records store modification times in MS-DOS format: a 16-bit date
//! (year since 1980, month, day) and a 16-bit time (hour, minute, seconds
//! halved). The representable range is 1980-01-01 through 2107-12-31 with
//! 2-second resolution.
//!
//! [`Timestamp`] keeps the original Unix seconds and converts to the DOS
//! pair only at record-encoding time, clamping values outside the DOS
//! range to its nearest bound.
//!
//! # Example
//!
//! ```rust
//! use zipflow::Timestamp;
//!
//! let ts = Timestamp::from_unix_secs(946_684_800); // 2000-01-01 00:00:00 UTC
//! let (dos_time, dos_date) = ts.to_dos();
//! assert_eq!(dos_time, 0);
//! assert_eq!(dos_date, (20 << 9) | (1 << 5) | 1);
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

/// Unix seconds of the DOS epoch, 1980-01-01 00:00:00 UTC.
const DOS_EPOCH_UNIX: i64 = 315_532_800;

/// Unix seconds of the last representable DOS instant, 2107-12-31 23:59:58 UTC.
const DOS_MAX_UNIX: i64 = 4_354_819_198;

/// A modification timestamp for a manifest entry.
///
/// Stored as Unix seconds (UTC). Sub-second precision is not representable
/// in the DOS fields ZIP uses, so none is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    unix_secs: i64,
}

impl Timestamp {
    /// Creates a timestamp from Unix seconds (since January 1, 1970, UTC).
    #[inline]
    pub const fn from_unix_secs(unix_secs: i64) -> Self {
        Self { unix_secs }
    }

    /// Returns the current time.
    pub fn now() -> Self {
        let unix_secs = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        };
        Self { unix_secs }
    }

    /// Creates a timestamp from a [`SystemTime`].
    pub fn from_system_time(time: SystemTime) -> Self {
        let unix_secs = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        };
        Self { unix_secs }
    }

    /// Returns the timestamp as Unix seconds.
    #[inline]
    pub const fn as_unix_secs(&self) -> i64 {
        self.unix_secs
    }

    /// Converts to the DOS `(time, date)` pair used in ZIP records.
    ///
    /// Times before the DOS epoch clamp to 1980-01-01 00:00:00; times past
    /// 2107-12-31 23:59:58 clamp to that instant. Seconds round down to
    /// 2-second resolution.
    pub fn to_dos(&self) -> (u16, u16) {
        let secs = self.unix_secs.clamp(DOS_EPOCH_UNIX, DOS_MAX_UNIX);

        let days = secs.div_euclid(86_400);
        let tod = secs.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);

        let hour = (tod / 3600) as u16;
        let minute = ((tod % 3600) / 60) as u16;
        let second = (tod % 60) as u16;

        let dos_time = (hour << 11) | (minute << 5) | (second / 2);
        let dos_date = (((year - 1980) as u16) << 9) | ((month as u16) << 5) | day as u16;
        (dos_time, dos_date)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Self::from_system_time(time)
    }
}

/// Converts days since the Unix epoch to a civil (year, month, day) date.
///
/// Proleptic Gregorian calendar, valid for the full DOS range.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32; // [1, 31]
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32; // [1, 12]
    (if month <= 2 { year + 1 } else { year }, month, day)
}
