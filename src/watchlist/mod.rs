//! Watchlist tracking
//!
//! Entry model, air-date gating, episode progression, and persistence.

mod entry;
mod progress;
mod status;
mod store;

pub use entry::{entry_id, EpisodeAirInfo, NextEpisodeInfo, WatchStatus, WatchlistEntry};
pub use progress::{
    advance_on_watched, describe_next_episode, recheck_waiting_entries, Advance, AdvanceOutcome,
    AirDateLookup, RecheckReport,
};
pub use status::resolve_status;
pub use store::{db_path, export_json, import_json, SqliteStore, WatchlistRepository};
