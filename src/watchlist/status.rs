//! Air-date gating: whether a title must wait for its next episode.

use chrono::NaiveDate;

use crate::api::MediaKind;
use crate::watchlist::WatchStatus;

/// Decide the status of a title whose upcoming episode airs on `candidate_air_date`.
///
/// An episode airing today counts as aired. An unknown date counts as not aired,
/// since the catalog usually has no date for episodes that are not scheduled yet.
/// Movies never gate.
pub fn resolve_status(
    candidate_air_date: Option<NaiveDate>,
    today: NaiveDate,
    kind: MediaKind,
    fallback: WatchStatus,
) -> WatchStatus {
    if kind == MediaKind::Movie {
        return fallback;
    }

    match candidate_air_date {
        Some(air_date) if air_date <= today => fallback,
        _ => WatchStatus::WaitingForNextEp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()
    }

    #[test]
    fn test_same_day_counts_as_aired() {
        assert_eq!(
            resolve_status(Some(today()), today(), MediaKind::Tv, WatchStatus::Watching),
            WatchStatus::Watching
        );
    }

    #[test]
    fn test_tomorrow_waits() {
        let tomorrow = today().checked_add_days(Days::new(1));
        assert_eq!(
            resolve_status(tomorrow, today(), MediaKind::Tv, WatchStatus::Watching),
            WatchStatus::WaitingForNextEp
        );
    }

    #[test]
    fn test_past_date_keeps_fallback() {
        let yesterday = today().checked_sub_days(Days::new(1));
        assert_eq!(
            resolve_status(yesterday, today(), MediaKind::Anime, WatchStatus::OnHold),
            WatchStatus::OnHold
        );
    }

    #[test]
    fn test_unknown_date_waits() {
        assert_eq!(
            resolve_status(None, today(), MediaKind::Tv, WatchStatus::Watching),
            WatchStatus::WaitingForNextEp
        );
        assert_eq!(
            resolve_status(None, today(), MediaKind::Anime, WatchStatus::Watching),
            WatchStatus::WaitingForNextEp
        );
    }

    #[test]
    fn test_movies_never_gate() {
        let future = today().checked_add_days(Days::new(30));
        for date in [None, Some(today()), future] {
            assert_eq!(
                resolve_status(date, today(), MediaKind::Movie, WatchStatus::Watching),
                WatchStatus::Watching
            );
        }
    }

    #[test]
    fn test_repeatable() {
        let future = today().checked_add_days(Days::new(6));
        let first = resolve_status(future, today(), MediaKind::Tv, WatchStatus::Watching);
        let second = resolve_status(future, today(), MediaKind::Tv, WatchStatus::Watching);
        assert_eq!(first, second);
    }
}
