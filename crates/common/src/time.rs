//! Wall clock in the protocol's native unit.
//!
//! Clients expect Win32 FILETIME values: 100-nanosecond intervals since
//! 1601-01-01 UTC.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// FILETIME value of the Unix epoch.
pub const UNIX_EPOCH_AS_FILETIME: u64 = 116_444_736_000_000_000;

/// FILETIME ticks per second.
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Convert a duration since the Unix epoch into FILETIME ticks.
pub fn filetime_from_unix(since_epoch: Duration) -> u64 {
    let ticks =
        since_epoch.as_secs() * TICKS_PER_SECOND + u64::from(since_epoch.subsec_nanos()) / 100;
    UNIX_EPOCH_AS_FILETIME + ticks
}

/// Current wall-clock time as a FILETIME value.
///
/// A clock set before 1970 reads as the Unix epoch.
pub fn win32_time_now() -> u64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO);
    filetime_from_unix(since_epoch)
}
