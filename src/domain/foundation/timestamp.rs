//! UTC timestamps for stored workshop records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last-modified time of a record. Serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

/// Records missing `updatedAt` are treated as modified now.
impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_as_rfc3339_string() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap());
        let json = serde_json::to_value(ts).unwrap();
        assert_eq!(json, "2026-03-01T09:30:00Z");

        let back: Timestamp = serde_json::from_value(json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn later_timestamps_sort_after() {
        let earlier = Timestamp::from(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert!(earlier < Timestamp::now());
    }
}
