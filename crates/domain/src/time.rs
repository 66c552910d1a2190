//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for report times.
pub type Timestamp = DateTime<Utc>;

/// Convert a vendor millisecond epoch into a [`Timestamp`].
///
/// Returns `None` when the value is out of chrono's representable range.
#[must_use]
pub fn from_epoch_millis(millis: i64) -> Option<Timestamp> {
    DateTime::from_timestamp_millis(millis)
}
