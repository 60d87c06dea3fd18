use super::domain::{non_blank, PolicyStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResolution {
    pub status: PolicyStatus,
    pub is_overdue: bool,
}

impl StatusResolution {
    fn from_status(status: PolicyStatus) -> Self {
        let is_overdue = status == PolicyStatus::Overdue;
        Self { status, is_overdue }
    }
}

/// Resolves the lifecycle state of a policy against `today`.
///
/// A reported status always wins. Without one, an end date strictly before today is
/// overdue and anything else, including an unreadable date, is due.
pub fn resolve_status(
    reported: Option<&str>,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> StatusResolution {
    if let Some(reported) = non_blank(reported) {
        return StatusResolution::from_status(PolicyStatus::from_reported(reported));
    }

    let status = match end_date {
        Some(end) if end < today => PolicyStatus::Overdue,
        _ => PolicyStatus::Due,
    };
    StatusResolution::from_status(status)
}

/// Same as [`resolve_status`] for callers holding a timestamp; the time of day is dropped.
pub fn resolve_status_at(
    reported: Option<&str>,
    end_date: Option<NaiveDate>,
    now: NaiveDateTime,
) -> StatusResolution {
    resolve_status(reported, end_date, now.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid today")
    }

    #[test]
    fn same_day_is_due() {
        let resolution = resolve_status(None, Some(today()), today());
        assert_eq!(resolution.status, PolicyStatus::Due);
        assert!(!resolution.is_overdue);
    }

    #[test]
    fn late_evening_clock_does_not_flip_same_day() {
        let now = today().and_hms_opt(23, 59, 59).expect("valid time");
        let resolution = resolve_status_at(None, Some(today()), now);
        assert_eq!(resolution.status, PolicyStatus::Due);
    }

    #[test]
    fn yesterday_is_overdue() {
        let resolution = resolve_status(None, Some(today() - Duration::days(1)), today());
        assert_eq!(resolution.status, PolicyStatus::Overdue);
        assert!(resolution.is_overdue);
    }

    #[test]
    fn unreadable_date_fails_open() {
        let resolution = resolve_status(None, None, today());
        assert_eq!(resolution.status, PolicyStatus::Due);
        assert!(!resolution.is_overdue);
    }

    #[test]
    fn reported_status_overrides_dates() {
        let past = Some(today() - Duration::days(30));
        let paid = resolve_status(Some("Paid"), past, today());
        assert_eq!(paid.status, PolicyStatus::Paid);
        assert!(!paid.is_overdue);

        let future = Some(today() + Duration::days(30));
        let overdue = resolve_status(Some("Overdue"), future, today());
        assert!(overdue.is_overdue);

        let lapsed = resolve_status(Some("Lapsed"), past, today());
        assert_eq!(lapsed.status.label(), "Lapsed");
        assert!(!lapsed.is_overdue);
    }

    #[test]
    fn blank_reported_status_is_ignored() {
        let past = Some(today() - Duration::days(3));
        let resolution = resolve_status(Some("  "), past, today());
        assert_eq!(resolution.status, PolicyStatus::Overdue);
    }

    proptest! {
        #[test]
        fn derived_status_tracks_the_boundary(offset in -3650i64..=3650) {
            let end = today() + Duration::days(offset);
            let resolution = resolve_status(None, Some(end), today());
            prop_assert_eq!(resolution.is_overdue, offset < 0);
            prop_assert_eq!(resolution.is_overdue, resolution.status == PolicyStatus::Overdue);
            prop_assert_ne!(resolution.status, PolicyStatus::Paid);
        }
    }
}
