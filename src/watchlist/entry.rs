use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{MediaKind, SearchResult, Season};

/// Watch status of a tracked title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatchStatus {
    PlanToWatch,
    Watching,
    WaitingForNextEp,
    OnHold,
    Dropped,
    Completed,
}

impl WatchStatus {
    /// All statuses in display order
    pub const ALL: [WatchStatus; 6] = [
        WatchStatus::PlanToWatch,
        WatchStatus::Watching,
        WatchStatus::WaitingForNextEp,
        WatchStatus::OnHold,
        WatchStatus::Dropped,
        WatchStatus::Completed,
    ];

    /// Get a display label for the status
    pub fn label(&self) -> &'static str {
        match self {
            WatchStatus::PlanToWatch => "Plan to Watch",
            WatchStatus::Watching => "Watching",
            WatchStatus::WaitingForNextEp => "Waiting for Next Episode",
            WatchStatus::OnHold => "On Hold",
            WatchStatus::Dropped => "Dropped",
            WatchStatus::Completed => "Completed",
        }
    }

    /// Kebab-case key used on disk and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::PlanToWatch => "plan-to-watch",
            WatchStatus::Watching => "watching",
            WatchStatus::WaitingForNextEp => "waiting-for-next-ep",
            WatchStatus::OnHold => "on-hold",
            WatchStatus::Dropped => "dropped",
            WatchStatus::Completed => "completed",
        }
    }

    /// Movies have no next episode to wait for
    pub fn allowed_for(&self, kind: MediaKind) -> bool {
        !(kind == MediaKind::Movie && *self == WatchStatus::WaitingForNextEp)
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        WatchStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or_else(|| format!("unknown status '{}'", s.trim()))
    }
}

/// Build the stable entry id for a catalog title
pub fn entry_id(kind: MediaKind, tmdb_id: u32) -> String {
    format!("{}-{}", kind.as_str(), tmdb_id)
}

/// One tracked title.
///
/// Field names follow the `watchlist.json` layout so exported files stay
/// interchangeable with older data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub id: String,
    pub tmdb_id: u32,
    pub media_type: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub rating: f32,
    pub status: WatchStatus,
    /// Milliseconds since the Unix epoch
    pub added_date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<Season>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_episode: Option<u32>,
}

impl WatchlistEntry {
    /// Create an entry from a catalog search hit.
    ///
    /// Season data is only kept for tv/anime; a status the kind cannot hold
    /// falls back to plan-to-watch.
    pub fn from_search(
        kind: MediaKind,
        result: &SearchResult,
        status: WatchStatus,
        seasons: Vec<Season>,
        added_date: i64,
    ) -> Self {
        let seasons = if kind.is_episodic() { seasons } else { Vec::new() };
        let has_seasons = !seasons.is_empty();

        Self {
            id: entry_id(kind, result.tmdb_id),
            tmdb_id: result.tmdb_id,
            media_type: kind,
            title: result.title.clone(),
            poster_path: result.poster_path.clone(),
            overview: result.overview.clone(),
            release_date: result.release_date.clone(),
            rating: result.rating,
            status: if status.allowed_for(kind) {
                status
            } else {
                WatchStatus::PlanToWatch
            },
            added_date,
            notes: None,
            seasons,
            current_season: has_seasons.then_some(1),
            current_episode: has_seasons.then_some(0),
        }
    }

    /// Bring an entry from outside the app (e.g. an imported file) back within
    /// the watchlist rules
    pub fn normalize(&mut self) {
        if !self.status.allowed_for(self.media_type) {
            self.status = WatchStatus::PlanToWatch;
        }
        self.seasons.retain(Season::is_regular);
        if let (Some(season), Some(episode)) =
            (self.current_season_data().copied(), self.current_episode)
        {
            self.current_episode = Some(episode.min(season.episode_count));
        }
    }

    /// Current season number, 1 when never set
    pub fn current_season(&self) -> u32 {
        self.current_season.unwrap_or(1)
    }

    /// Episodes watched in the current season, 0 when never set
    pub fn current_episode(&self) -> u32 {
        self.current_episode.unwrap_or(0)
    }

    /// Look up a season by number
    pub fn season(&self, number: u32) -> Option<&Season> {
        self.seasons.iter().find(|s| s.number == number)
    }

    /// Season data for the current position
    pub fn current_season_data(&self) -> Option<&Season> {
        self.season(self.current_season())
    }

    /// Whether episode progression applies to this entry
    pub fn tracks_episodes(&self) -> bool {
        self.media_type.is_episodic() && !self.seasons.is_empty()
    }

    /// Change status, refusing targets the media kind cannot hold.
    ///
    /// Returns whether the status was applied.
    pub fn set_status(&mut self, status: WatchStatus) -> bool {
        if !status.allowed_for(self.media_type) {
            return false;
        }
        self.status = status;
        true
    }

    /// Jump to another known season, keeping the episode within its bounds
    pub fn set_current_season(&mut self, number: u32) -> bool {
        let Some(season) = self.season(number).copied() else {
            return false;
        };
        self.current_season = Some(number);
        self.current_episode = Some(self.current_episode().min(season.episode_count));
        true
    }

    /// Set the watched-episode counter within the current season, clamped to its size
    pub fn set_current_episode(&mut self, episode: u32) -> bool {
        let Some(season) = self.current_season_data().copied() else {
            return false;
        };
        self.current_season = Some(season.number);
        self.current_episode = Some(episode.min(season.episode_count));
        true
    }

    pub fn set_notes(&mut self, notes: &str) {
        let trimmed = notes.trim();
        self.notes = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    /// Percentage of the current season watched
    pub fn progress_percent(&self) -> u32 {
        let Some(season) = self.current_season_data() else {
            return 0;
        };
        if season.episode_count == 0 {
            return 0;
        }
        let ratio = self.current_episode() as f64 / season.episode_count as f64;
        (ratio * 100.0).round().clamp(0.0, 100.0) as u32
    }

    /// Display string for the current position (e.g. "S01E05")
    pub fn position_display(&self) -> String {
        if !self.tracks_episodes() {
            return String::new();
        }
        format!(
            "S{:02}E{:02}",
            self.current_season(),
            self.current_episode()
        )
    }
}

/// The next episode a tracked title should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextEpisodeInfo {
    pub season: u32,
    pub episode: u32,
    /// Last episode of its season
    pub is_season_finale: bool,
    /// First episode of the following season
    pub is_series_continuation: bool,
}

/// The episode a waiting title is pending on, with its scheduled air date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeAirInfo {
    pub entry_id: String,
    pub season: u32,
    pub episode: u32,
    pub air_date: Option<NaiveDate>,
    pub title: String,
    pub poster_path: Option<String>,
}

impl EpisodeAirInfo {
    /// Whole days until the air date, negative once it has passed
    pub fn days_until(&self, today: NaiveDate) -> Option<i64> {
        self.air_date.map(|date| (date - today).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(seasons: Vec<Season>) -> WatchlistEntry {
        let result = SearchResult {
            tmdb_id: 42,
            title: "Test Show".to_string(),
            poster_path: Some("/p.jpg".to_string()),
            overview: String::new(),
            release_date: "2020-01-01".to_string(),
            rating: 8.0,
        };
        WatchlistEntry::from_search(MediaKind::Tv, &result, WatchStatus::Watching, seasons, 0)
    }

    #[test]
    fn test_status_round_trip_names() {
        for status in WatchStatus::ALL {
            assert_eq!(status.as_str().parse::<WatchStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("invalid-status".parse::<WatchStatus>().is_err());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(WatchStatus::PlanToWatch.label(), "Plan to Watch");
        assert_eq!(
            WatchStatus::WaitingForNextEp.label(),
            "Waiting for Next Episode"
        );
        assert_eq!(WatchStatus::OnHold.label(), "On Hold");
    }

    #[test]
    fn test_movie_cannot_wait() {
        assert!(!WatchStatus::WaitingForNextEp.allowed_for(MediaKind::Movie));
        assert!(WatchStatus::WaitingForNextEp.allowed_for(MediaKind::Tv));
        assert!(WatchStatus::WaitingForNextEp.allowed_for(MediaKind::Anime));
        assert!(WatchStatus::Dropped.allowed_for(MediaKind::Movie));
    }

    #[test]
    fn test_from_search_starts_at_season_one() {
        let entry = show(vec![Season::new(1, 10), Season::new(2, 8)]);
        assert_eq!(entry.id, "tv-42");
        assert_eq!(entry.current_season, Some(1));
        assert_eq!(entry.current_episode, Some(0));
        assert!(entry.tracks_episodes());
    }

    #[test]
    fn test_from_search_movie_drops_seasons_and_waiting() {
        let result = SearchResult {
            tmdb_id: 7,
            title: "Film".to_string(),
            poster_path: None,
            overview: String::new(),
            release_date: String::new(),
            rating: 6.0,
        };
        let entry = WatchlistEntry::from_search(
            MediaKind::Movie,
            &result,
            WatchStatus::WaitingForNextEp,
            vec![Season::new(1, 3)],
            0,
        );
        assert_eq!(entry.id, "movie-7");
        assert_eq!(entry.status, WatchStatus::PlanToWatch);
        assert!(entry.seasons.is_empty());
        assert_eq!(entry.current_season, None);
    }

    #[test]
    fn test_set_status_refuses_waiting_for_movie() {
        let mut entry = show(vec![]);
        entry.media_type = MediaKind::Movie;
        assert!(!entry.set_status(WatchStatus::WaitingForNextEp));
        assert_eq!(entry.status, WatchStatus::Watching);
        assert!(entry.set_status(WatchStatus::Completed));
        assert_eq!(entry.status, WatchStatus::Completed);
    }

    #[test]
    fn test_set_current_season_clamps_episode() {
        let mut entry = show(vec![Season::new(1, 10), Season::new(2, 4)]);
        entry.current_episode = Some(9);
        assert!(entry.set_current_season(2));
        assert_eq!(entry.current_season, Some(2));
        assert_eq!(entry.current_episode, Some(4));
        assert!(!entry.set_current_season(5));
        assert_eq!(entry.current_season, Some(2));
    }

    #[test]
    fn test_set_current_episode_clamps() {
        let mut entry = show(vec![Season::new(1, 10)]);
        assert!(entry.set_current_episode(25));
        assert_eq!(entry.current_episode, Some(10));
        entry.seasons.clear();
        assert!(!entry.set_current_episode(1));
    }

    #[test]
    fn test_normalize_fixes_outside_data() {
        let mut entry = show(vec![Season::new(0, 3), Season::new(1, 6)]);
        entry.current_episode = Some(8);
        entry.normalize();
        assert_eq!(entry.seasons, vec![Season::new(1, 6)]);
        assert_eq!(entry.current_episode, Some(6));

        entry.media_type = MediaKind::Movie;
        entry.status = WatchStatus::WaitingForNextEp;
        entry.normalize();
        assert_eq!(entry.status, WatchStatus::PlanToWatch);

        let before = show(vec![Season::new(1, 6)]);
        let mut after = before.clone();
        after.normalize();
        assert_eq!(after, before);
    }

    #[test]
    fn test_progress_percent() {
        let mut entry = show(vec![Season::new(1, 10)]);
        entry.current_episode = Some(5);
        assert_eq!(entry.progress_percent(), 50);
        entry.current_episode = Some(10);
        assert_eq!(entry.progress_percent(), 100);

        let mut thirds = show(vec![Season::new(1, 3)]);
        thirds.current_episode = Some(1);
        assert_eq!(thirds.progress_percent(), 33);

        assert_eq!(show(vec![]).progress_percent(), 0);
    }

    #[test]
    fn test_set_notes_trims_and_clears() {
        let mut entry = show(vec![]);
        entry.set_notes("  rewatch s1 first ");
        assert_eq!(entry.notes.as_deref(), Some("rewatch s1 first"));
        entry.set_notes("   ");
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn test_deserialize_original_layout() {
        let raw = r#"{
            "id": "anime-31910",
            "tmdbId": 31910,
            "mediaType": "anime",
            "title": "Naruto Shippuden",
            "posterPath": null,
            "overview": "",
            "releaseDate": "2007-02-15",
            "rating": 8.5,
            "status": "waiting-for-next-ep",
            "addedDate": 1736860000000,
            "seasons": [{"season": 1, "episodes": 32}],
            "currentSeason": 1,
            "currentEpisode": 12
        }"#;
        let entry: WatchlistEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.media_type, MediaKind::Anime);
        assert_eq!(entry.status, WatchStatus::WaitingForNextEp);
        assert_eq!(entry.seasons, vec![Season::new(1, 32)]);
        assert_eq!(entry.position_display(), "S01E12");
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn test_days_until() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
        let info = EpisodeAirInfo {
            entry_id: "tv-1".to_string(),
            season: 1,
            episode: 2,
            air_date: NaiveDate::from_ymd_opt(2026, 1, 20),
            title: "Show".to_string(),
            poster_path: None,
        };
        assert_eq!(info.days_until(today), Some(6));
    }
}
