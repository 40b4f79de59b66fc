//! Episode progression engine
//!
//! Works on entry snapshots: every operation takes an entry (or a slice of
//! them) and hands back new values. Callers persist the results.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::api::Season;
use crate::error::ApiError;
use crate::watchlist::{
    resolve_status, EpisodeAirInfo, NextEpisodeInfo, WatchStatus, WatchlistEntry,
};

/// Source of scheduled episode air dates (the TMDB client in production)
#[allow(async_fn_in_trait)]
pub trait AirDateLookup {
    /// `Ok(None)` means the catalog has no date for this episode
    async fn air_date(
        &self,
        tmdb_id: u32,
        season: u32,
        episode: u32,
    ) -> Result<Option<NaiveDate>, ApiError>;
}

/// What a "mark watched" did to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved one episode forward within the season
    Advanced,
    /// Finished a season and moved to episode 1 of the next one
    SeasonRollover,
    /// No further season exists; the title is complete
    Completed,
    /// The current season is not in the season list, nothing changed
    Unchanged,
}

/// Result of marking the current episode watched
#[derive(Debug, Clone)]
pub struct Advance {
    pub entry: WatchlistEntry,
    pub outcome: AdvanceOutcome,
}

impl Advance {
    /// Whether the entry now waits for an unaired episode
    pub fn is_waiting(&self) -> bool {
        self.entry.status == WatchStatus::WaitingForNextEp
    }
}

/// Outcome of rechecking every waiting title
#[derive(Debug, Clone, Default)]
pub struct RecheckReport {
    /// Titles still waiting, soonest air date first, unknown dates last
    pub still_waiting: Vec<EpisodeAirInfo>,
    /// Titles whose pending episode has aired, already switched back to watching
    pub reverted: Vec<WatchlistEntry>,
}

/// The season numbered right after `current`, if the title has one
fn next_season(entry: &WatchlistEntry, current: u32) -> Option<&Season> {
    entry.season(current.checked_add(1)?)
}

/// Compute the next episode to watch.
///
/// `None` when the current season is unknown or the last known season is finished.
pub fn describe_next_episode(entry: &WatchlistEntry) -> Option<NextEpisodeInfo> {
    let current_season = entry.current_season();
    let season = entry.season(current_season)?;
    let current_episode = entry.current_episode();

    if current_episode < season.episode_count {
        let episode = current_episode + 1;
        return Some(NextEpisodeInfo {
            season: current_season,
            episode,
            is_season_finale: episode == season.episode_count,
            is_series_continuation: false,
        });
    }

    next_season(entry, current_season).map(|next| NextEpisodeInfo {
        season: next.number,
        episode: 1,
        is_season_finale: false,
        is_series_continuation: true,
    })
}

/// Mark the next episode watched and decide the resulting status.
///
/// The air date checked is that of the episode the user will want after this
/// one, so a title only stays "watching" while there is something aired to
/// play. At most one lookup is made; a failed lookup counts as an unknown date.
pub async fn advance_on_watched<L>(
    entry: &WatchlistEntry,
    lookup: &L,
    today: NaiveDate,
) -> Advance
where
    L: AirDateLookup,
{
    let current_season = entry.current_season();
    let Some(season) = entry.season(current_season).copied() else {
        tracing::debug!(
            "{}: season {} is not in the season list, leaving unchanged",
            entry.id,
            current_season
        );
        return Advance {
            entry: entry.clone(),
            outcome: AdvanceOutcome::Unchanged,
        };
    };

    let mut updated = entry.clone();
    let current_episode = entry.current_episode();

    let (outcome, to_check) = if current_episode < season.episode_count {
        let watched = current_episode + 1;
        updated.current_season = Some(current_season);
        updated.current_episode = Some(watched);

        let to_check = match watched.checked_add(1) {
            Some(following) if season.contains(following) => Some((current_season, following)),
            _ => next_season(entry, current_season).map(|next| (next.number, 1)),
        };
        (AdvanceOutcome::Advanced, to_check)
    } else if let Some(next) = next_season(entry, current_season) {
        updated.current_season = Some(next.number);
        updated.current_episode = Some(1);
        (AdvanceOutcome::SeasonRollover, Some((next.number, 1)))
    } else {
        tracing::info!("{}: finished the last season, marking completed", entry.id);
        updated.status = WatchStatus::Completed;
        return Advance {
            entry: updated,
            outcome: AdvanceOutcome::Completed,
        };
    };

    if let Some((season, episode)) = to_check {
        let air_date = lookup_air_date(lookup, entry, season, episode).await;
        updated.status = resolve_status(air_date, today, entry.media_type, entry.status);
    }

    Advance {
        entry: updated,
        outcome,
    }
}

/// Recheck every waiting title against the calendar.
///
/// A title whose pending episode aired before `today` goes back to watching.
/// Lookups run one after another; each entry is independent of the others.
pub async fn recheck_waiting_entries<L>(
    entries: &[WatchlistEntry],
    lookup: &L,
    today: NaiveDate,
) -> RecheckReport
where
    L: AirDateLookup,
{
    let mut report = RecheckReport::default();

    for entry in entries {
        if entry.status != WatchStatus::WaitingForNextEp || entry.seasons.is_empty() {
            continue;
        }

        let Some(pending) = describe_next_episode(entry) else {
            continue;
        };

        let air_date = lookup_air_date(lookup, entry, pending.season, pending.episode).await;

        match air_date {
            Some(date) if date < today => {
                tracing::info!(
                    "{}: S{:02}E{:02} aired on {}, back to watching",
                    entry.id,
                    pending.season,
                    pending.episode,
                    date
                );
                let mut reverted = entry.clone();
                reverted.status = WatchStatus::Watching;
                report.reverted.push(reverted);
            }
            _ => report.still_waiting.push(EpisodeAirInfo {
                entry_id: entry.id.clone(),
                season: pending.season,
                episode: pending.episode,
                air_date,
                title: entry.title.clone(),
                poster_path: entry.poster_path.clone(),
            }),
        }
    }

    report.still_waiting.sort_by(|a, b| compare_air_dates(a.air_date, b.air_date));
    report
}

/// Known dates ascending, unknown dates after all of them
fn compare_air_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

async fn lookup_air_date<L>(
    lookup: &L,
    entry: &WatchlistEntry,
    season: u32,
    episode: u32,
) -> Option<NaiveDate>
where
    L: AirDateLookup,
{
    match lookup.air_date(entry.tmdb_id, season, episode).await {
        Ok(date) => date,
        Err(e) => {
            tracing::warn!(
                "Air date lookup for {} S{:02}E{:02} failed, treating as unknown: {}",
                entry.id,
                season,
                episode,
                e
            );
            None
        }
    }
}
