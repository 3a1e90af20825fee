use std::fmt;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// `MMDD-HHMMSS`, local time.
pub const SUFFIX_FORMAT: &str = "%m%d-%H%M%S";

/// Run-scoped token attached to every artifact written by one orchestration run.
///
/// Two runs started within the same second share a suffix; that collision is
/// not detected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunSuffix(String);

impl RunSuffix {
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz>(dt: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self(dt.format(SUFFIX_FORMAT).to_string())
    }

    /// Accept an existing suffix if it has the `MMDD-HHMMSS` shape.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        let shaped = bytes.len() == 11
            && bytes[4] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || b.is_ascii_digit());
        shaped.then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn formats_month_day_and_time() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 7, 9, 4, 5).unwrap();
        assert_eq!(RunSuffix::from_datetime(&dt).as_str(), "0307-090405");
    }

    #[test]
    fn distinct_seconds_give_distinct_suffixes() {
        let a = Utc.with_ymd_and_hms(2026, 3, 7, 9, 4, 5).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 3, 7, 9, 4, 6).unwrap();
        assert_ne!(RunSuffix::from_datetime(&a), RunSuffix::from_datetime(&b));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(RunSuffix::parse("0307-090405").is_some());
        assert!(RunSuffix::parse("0307-0904").is_none());
        assert!(RunSuffix::parse("03a7-090405").is_none());
        assert!(RunSuffix::parse("0307_090405").is_none());
    }

    #[test]
    fn now_is_parseable() {
        let suffix = RunSuffix::now();
        assert_eq!(RunSuffix::parse(suffix.as_str()), Some(suffix));
    }
}
