use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use chrono::{Local, NaiveDate, Utc};

use crate::api::{poster_url, MediaKind, SearchResult, TmdbClient};
use crate::config::{
    config_path, data_dir, load_config, load_config_or_default, save_config, Config,
};
use crate::error::{Result, StoreError};
use crate::watchlist::{
    advance_on_watched, db_path, describe_next_episode, entry_id, export_json, import_json,
    recheck_waiting_entries, Advance, AdvanceOutcome, RecheckReport, SqliteStore, WatchStatus,
    WatchlistEntry, WatchlistRepository,
};

/// Today's calendar date on the local clock
fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    let path = db_path(&data_dir(config));
    SqliteStore::open(&path)
        .with_context(|| format!("failed to open watchlist at {}", path.display()))
}

fn require_entry<R: WatchlistRepository>(store: &R, id: &str) -> Result<WatchlistEntry> {
    store
        .get(id)?
        .ok_or_else(|| StoreError::UnknownEntry(id.to_string()).into())
}

/// First characters of a secret, for display
fn key_preview(key: &str) -> String {
    key.chars().take(8).collect()
}

fn prompt(question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Persist `updated` only if the stored entry still equals the snapshot it was derived from.
///
/// A lookup can take a while; if the entry was edited meanwhile the newer edit wins.
fn save_if_unchanged<R: WatchlistRepository>(
    store: &R,
    snapshot: &WatchlistEntry,
    updated: &WatchlistEntry,
) -> Result<bool> {
    match store.get(&snapshot.id)? {
        Some(current) if current == *snapshot => {
            store.save_one(updated)?;
            Ok(true)
        }
        _ => {
            tracing::warn!(
                "{} changed while its air date was fetched, dropping stale update",
                snapshot.id
            );
            Ok(false)
        }
    }
}

/// Handle the config command
pub async fn config(show: bool, set: Option<String>, reset: bool) -> Result<()> {
    if reset {
        if config_path().exists() {
            std::fs::remove_file(config_path())?;
            println!("Configuration reset.");
        } else {
            println!("No configuration file found.");
        }
        return Ok(());
    }

    if let Some(key_value) = set {
        let Some((key, value)) = key_value.split_once('=') else {
            println!("Invalid format. Use: --set key=value");
            println!("Available keys: tmdb_api_key, data_dir");
            return Ok(());
        };

        let mut config = load_config_or_default();

        match key.trim() {
            "tmdb_api_key" => {
                config.tmdb.api_key = value.trim().to_string();
            }
            "data_dir" => {
                let value = value.trim();
                config.storage.data_dir = (!value.is_empty()).then(|| value.into());
            }
            other => {
                println!("Unknown key: {}", other);
                println!("Available keys: tmdb_api_key, data_dir");
                return Ok(());
            }
        }

        save_config(&config)?;
        println!("Configuration updated.");
        return Ok(());
    }

    if show {
        let config = load_config_or_default();
        println!("Configuration file: {}\n", config_path().display());
        println!("[tmdb]");
        if config.has_api_key() {
            println!("api_key = \"{}...\"", key_preview(&config.tmdb.api_key));
        } else {
            println!("api_key = (not configured)");
        }
        println!("\n[storage]");
        println!("data_dir = \"{}\"", data_dir(&config).display());
        return Ok(());
    }

    // Default: show help
    println!("Usage: nextup config [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --show         Show current configuration");
    println!("  --set KEY=VAL  Set a configuration value");
    println!("  --reset        Reset configuration to defaults");
    println!();
    println!("Available keys for --set:");
    println!("  tmdb_api_key    TMDB API key");
    println!("  data_dir        Directory for the watchlist database");

    Ok(())
}

/// Search the catalog and add the chosen title
pub async fn add(
    kind: MediaKind,
    query: String,
    status: WatchStatus,
    pick: Option<usize>,
    page: u32,
) -> Result<()> {
    let config = load_config()?;
    let tmdb = TmdbClient::new(config.tmdb.api_key.clone());
    let store = open_store(&config)?;

    let results = tmdb.search(kind, &query, page).await?;
    if results.is_empty() {
        println!("No results for \"{}\".", query);
        return Ok(());
    }

    let choice = match pick {
        Some(n) => n,
        None => {
            print_search_results(&results);
            let answer = prompt("\nAdd which title? [1]: ")?;
            if answer.is_empty() {
                1
            } else {
                match answer.parse() {
                    Ok(n) => n,
                    Err(_) => {
                        println!("Not a number, nothing added.");
                        return Ok(());
                    }
                }
            }
        }
    };

    let Some(result) = choice.checked_sub(1).and_then(|i| results.get(i)) else {
        println!("There is no result #{}.", choice);
        return Ok(());
    };

    let id = entry_id(kind, result.tmdb_id);
    if store.get(&id)?.is_some() {
        return Err(StoreError::Duplicate(result.title.clone()).into());
    }

    // Season structure is fetched once; a failure leaves the title untracked by episode
    let seasons = if kind.is_episodic() {
        match tmdb.get_season_structure(result.tmdb_id).await {
            Ok(seasons) => seasons,
            Err(e) => {
                tracing::warn!("Failed to fetch seasons for {}: {}", id, e);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let entry = WatchlistEntry::from_search(
        kind,
        result,
        status,
        seasons,
        Utc::now().timestamp_millis(),
    );
    store.save_one(&entry)?;

    if entry.status != status {
        println!(
            "{} cannot be \"{}\", using \"{}\" instead.",
            kind.label(),
            status.label(),
            entry.status.label()
        );
    }
    println!(
        "\"{}\" added to your watchlist as {} ({}).",
        entry.title,
        entry.status.label(),
        entry.id
    );
    if !entry.seasons.is_empty() {
        println!("Tracking {} season(s).", entry.seasons.len());
    }

    Ok(())
}

fn print_search_results(results: &[SearchResult]) {
    for (i, result) in results.iter().enumerate() {
        let year = result
            .year()
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();
        println!(
            "{:>3}. {}{}  ★ {:.1}",
            i + 1,
            result.title,
            year,
            result.rating
        );
    }
}

/// List the watchlist grouped by status
pub async fn list(kind: Option<MediaKind>, status: Option<WatchStatus>) -> Result<()> {
    let config = load_config_or_default();
    let store = open_store(&config)?;

    let entries: Vec<_> = store
        .load_all()?
        .into_iter()
        .filter(|e| kind.map_or(true, |k| e.media_type == k))
        .filter(|e| status.map_or(true, |s| e.status == s))
        .collect();

    if entries.is_empty() {
        println!("Your watchlist is empty.");
        return Ok(());
    }

    for (status, group) in group_by_status(&entries) {
        println!("\n{} ({})", status.label(), group.len());
        for entry in group {
            let position = entry.position_display();
            let position = if position.is_empty() {
                String::new()
            } else {
                format!("  {} ({}%)", position, entry.progress_percent())
            };
            println!(
                "  [{}] {:<6} {}{}",
                entry.id,
                entry.media_type.label(),
                entry.title,
                position
            );
        }
    }

    Ok(())
}

/// Entries bucketed by status in display order, empty buckets skipped
fn group_by_status(entries: &[WatchlistEntry]) -> Vec<(WatchStatus, Vec<&WatchlistEntry>)> {
    WatchStatus::ALL
        .into_iter()
        .map(|status| {
            let group: Vec<_> = entries.iter().filter(|e| e.status == status).collect();
            (status, group)
        })
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

/// Show the "up next" dashboard
pub async fn up_next() -> Result<()> {
    let config = load_config()?;
    let tmdb = TmdbClient::new(config.tmdb.api_key.clone());
    let store = open_store(&config)?;
    let today = today();

    let entries = store.load_all()?;
    let report = recheck_waiting_entries(&entries, &tmdb, today).await;
    let reverted = persist_reverted(&store, &entries, &report)?;

    let watching: Vec<_> = store
        .load_all()?
        .into_iter()
        .filter(|e| e.status == WatchStatus::Watching && e.tracks_episodes())
        .collect();

    println!("Up Next");
    if watching.is_empty() {
        println!("  Nothing to watch right now.");
        println!("  Mark a TV show or anime as watching to see it here.");
    }
    for entry in &watching {
        match describe_next_episode(entry) {
            Some(next) => {
                let mut tags = Vec::new();
                if next.is_season_finale {
                    tags.push("season finale");
                }
                if next.is_series_continuation {
                    tags.push("new season");
                }
                let tags = if tags.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", tags.join(", "))
                };
                println!(
                    "  [{}] {}  S{:02}E{:02}{}",
                    entry.id, entry.title, next.season, next.episode, tags
                );
            }
            None => println!("  [{}] {}  all caught up", entry.id, entry.title),
        }
    }

    for title in &reverted {
        println!("  \"{}\" has a new episode out and is back in Watching.", title);
    }

    if !report.still_waiting.is_empty() {
        println!("\nAiring Next");
        for info in &report.still_waiting {
            let when = match (info.air_date, info.days_until(today)) {
                (Some(date), Some(0)) => format!("{} (today)", date),
                (Some(date), Some(1)) => format!("{} (tomorrow)", date),
                (Some(date), Some(days)) => format!("{} (in {} days)", date, days),
                _ => "date not announced".to_string(),
            };
            let poster = info
                .poster_path
                .as_deref()
                .and_then(|p| poster_url(p, 185))
                .map(|url| format!("\n      {}", url))
                .unwrap_or_default();
            println!(
                "  [{}] {}  S{:02}E{:02}  {}{}",
                info.entry_id, info.title, info.season, info.episode, when, poster
            );
        }
    }

    Ok(())
}

/// Save reverted entries, returning the titles that were written
fn persist_reverted<R: WatchlistRepository>(
    store: &R,
    snapshots: &[WatchlistEntry],
    report: &RecheckReport,
) -> Result<Vec<String>> {
    let mut titles = Vec::new();
    for updated in &report.reverted {
        let Some(snapshot) = snapshots.iter().find(|e| e.id == updated.id) else {
            continue;
        };
        if save_if_unchanged(store, snapshot, updated)? {
            titles.push(updated.title.clone());
        }
    }
    Ok(titles)
}

/// Mark the next episode of a title watched
pub async fn watched(id: String) -> Result<()> {
    let config = load_config()?;
    let tmdb = TmdbClient::new(config.tmdb.api_key.clone());
    let store = open_store(&config)?;

    let entry = require_entry(&store, &id)?;
    if !entry.tracks_episodes() {
        println!(
            "\"{}\" has no episode data. Use 'nextup status {} completed' instead.",
            entry.title, entry.id
        );
        return Ok(());
    }

    let advance = advance_on_watched(&entry, &tmdb, today()).await;
    if advance.outcome != AdvanceOutcome::Unchanged
        && !save_if_unchanged(&store, &entry, &advance.entry)?
    {
        println!("\"{}\" was changed elsewhere; nothing saved.", entry.title);
        return Ok(());
    }

    println!("{}", outcome_message(&advance));
    Ok(())
}

/// User-facing summary of a "mark watched"
fn outcome_message(advance: &Advance) -> String {
    let entry = &advance.entry;
    let waiting = if advance.is_waiting() {
        " Status: waiting for the next episode."
    } else {
        ""
    };

    match advance.outcome {
        AdvanceOutcome::Advanced => format!(
            "\"{}\": watched S{:02}E{:02}.{}",
            entry.title,
            entry.current_season(),
            entry.current_episode(),
            waiting
        ),
        AdvanceOutcome::SeasonRollover => format!(
            "\"{}\": on to season {}, episode 1.{}",
            entry.title,
            entry.current_season(),
            waiting
        ),
        AdvanceOutcome::Completed => format!("\"{}\" is complete. 🎉", entry.title),
        AdvanceOutcome::Unchanged => format!(
            "\"{}\": season {} is not in the season list; progress left unchanged.",
            entry.title,
            entry.current_season()
        ),
    }
}

/// Change the status of a title
pub async fn status(id: String, status: WatchStatus) -> Result<()> {
    let config = load_config_or_default();
    let store = open_store(&config)?;

    let mut entry = require_entry(&store, &id)?;
    if !entry.set_status(status) {
        println!(
            "{} titles cannot be \"{}\"; status left as {}.",
            entry.media_type.label(),
            status.label(),
            entry.status.label()
        );
        return Ok(());
    }

    store.save_one(&entry)?;
    println!("\"{}\" is now {}.", entry.title, entry.status.label());
    Ok(())
}

/// Set the current season and/or episode of a title
pub async fn progress(id: String, season: Option<u32>, episode: Option<u32>) -> Result<()> {
    let config = load_config_or_default();
    let store = open_store(&config)?;

    let mut entry = require_entry(&store, &id)?;
    if !entry.tracks_episodes() {
        println!("\"{}\" has no episode data.", entry.title);
        return Ok(());
    }

    if let Some(season) = season {
        if !entry.set_current_season(season) {
            let known: Vec<_> = entry.seasons.iter().map(|s| s.number.to_string()).collect();
            println!(
                "\"{}\" has no season {} (known: {}).",
                entry.title,
                season,
                known.join(", ")
            );
            return Ok(());
        }
    }

    if let Some(episode) = episode {
        entry.set_current_episode(episode);
    }

    store.save_one(&entry)?;
    println!("\"{}\" is at {}.", entry.title, entry.position_display());
    Ok(())
}

/// Set or clear notes
pub async fn notes(id: String, text: String) -> Result<()> {
    let config = load_config_or_default();
    let store = open_store(&config)?;

    let mut entry = require_entry(&store, &id)?;
    entry.set_notes(&text);
    store.save_one(&entry)?;

    if entry.notes.is_some() {
        println!("Notes saved for \"{}\".", entry.title);
    } else {
        println!("Notes cleared for \"{}\".", entry.title);
    }
    Ok(())
}

/// Remove a title
pub async fn remove(id: String, yes: bool) -> Result<()> {
    let config = load_config_or_default();
    let store = open_store(&config)?;

    let entry = require_entry(&store, &id)?;
    if !yes {
        let answer = prompt(&format!("Remove \"{}\" from your watchlist? [y/N]: ", entry.title))?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Nothing removed.");
            return Ok(());
        }
    }

    store.remove_one(&entry.id)?;
    println!("\"{}\" removed.", entry.title);
    Ok(())
}

/// Export to a JSON file
pub async fn export(path: &Path) -> Result<()> {
    let config = load_config_or_default();
    let store = open_store(&config)?;

    let count = export_json(&store, path)?;
    println!("Exported {} entries to {}.", count, path.display());
    Ok(())
}

/// Import from a JSON file
pub async fn import(path: &Path) -> Result<()> {
    let config = load_config_or_default();
    let store = open_store(&config)?;

    let count = import_json(&store, path)
        .with_context(|| format!("failed to import {}", path.display()))?;
    println!("Imported {} entries from {}.", count, path.display());
    Ok(())
}
