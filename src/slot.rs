use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::snapshot::{NewsItem, Snapshot};

/// Which daily edition a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Am,
    Pm,
}

impl Slot {
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            Slot::Am
        } else {
            Slot::Pm
        }
    }

    /// The slot for `now` as seen on the wall clock of `tz`.
    pub fn at(now: DateTime<Utc>, tz: Tz) -> Self {
        Self::from_hour(now.with_timezone(&tz).hour())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Am => write!(f, "AM"),
            Slot::Pm => write!(f, "PM"),
        }
    }
}

/// Replace one bucket of `previous`, keep the other, and stamp the result with `now`.
pub fn merge(previous: Snapshot, bucket: Vec<NewsItem>, slot: Slot, now: DateTime<Utc>) -> Snapshot {
    match slot {
        Slot::Am => Snapshot {
            updated_at: now,
            am: bucket,
            pm: previous.pm,
        },
        Slot::Pm => Snapshot {
            updated_at: now,
            am: previous.am,
            pm: bucket,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn item(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            source: "Test".to_string(),
            summary: Some("Summary.".to_string()),
            description: None,
            link: format!("https://example.com/{}", title),
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        }
    }

    mod slot_tests {
        use super::*;

        #[test]
        fn test_from_hour_boundaries() {
            assert_eq!(Slot::from_hour(0), Slot::Am);
            assert_eq!(Slot::from_hour(11), Slot::Am);
            assert_eq!(Slot::from_hour(12), Slot::Pm);
            assert_eq!(Slot::from_hour(23), Slot::Pm);
        }

        #[test]
        fn test_uses_reference_zone_not_utc() {
            // 09:00 in New York, 14:00 UTC
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap();
            assert_eq!(Slot::at(now, New_York), Slot::Am);
            assert_eq!(Slot::at(now, Tz::UTC), Slot::Pm);
        }

        #[test]
        fn test_follows_daylight_saving() {
            // 11:30 UTC is 07:30 EDT in July and 06:30 EST in January
            let summer = Utc.with_ymd_and_hms(2024, 7, 1, 11, 30, 0).unwrap();
            assert_eq!(Slot::at(summer, New_York), Slot::Am);
            // 16:30 UTC is 12:30 EDT but 11:30 EST
            let summer_noon = Utc.with_ymd_and_hms(2024, 7, 1, 16, 30, 0).unwrap();
            let winter_noon = Utc.with_ymd_and_hms(2024, 1, 2, 16, 30, 0).unwrap();
            assert_eq!(Slot::at(summer_noon, New_York), Slot::Pm);
            assert_eq!(Slot::at(winter_noon, New_York), Slot::Am);
        }

        #[test]
        fn test_display() {
            assert_eq!(Slot::Am.to_string(), "AM");
            assert_eq!(Slot::Pm.to_string(), "PM");
        }
    }

    mod merge_tests {
        use super::*;

        fn previous() -> Snapshot {
            Snapshot {
                updated_at: Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap(),
                am: vec![item("old-am")],
                pm: vec![item("old-pm")],
            }
        }

        #[test]
        fn test_morning_run_keeps_evening() {
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap();
            let merged = merge(previous(), vec![item("new")], Slot::Am, now);

            assert_eq!(merged.updated_at, now);
            assert_eq!(merged.am, vec![item("new")]);
            assert_eq!(merged.pm, previous().pm);
        }

        #[test]
        fn test_evening_run_keeps_morning() {
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap();
            let merged = merge(previous(), vec![item("new")], Slot::Pm, now);

            assert_eq!(merged.updated_at, now);
            assert_eq!(merged.am, previous().am);
            assert_eq!(merged.pm, vec![item("new")]);
        }

        #[test]
        fn test_empty_previous_carries_empty_bucket() {
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap();
            let merged = merge(Snapshot::empty(now), vec![item("new")], Slot::Am, now);

            assert!(merged.pm.is_empty());
            assert_eq!(merged.am.len(), 1);
        }

        #[test]
        fn test_empty_bucket_still_replaces() {
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap();
            let merged = merge(previous(), Vec::new(), Slot::Pm, now);

            assert!(merged.pm.is_empty());
            assert_eq!(merged.am, previous().am);
        }
    }
}
