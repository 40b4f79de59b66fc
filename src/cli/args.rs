use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::MediaKind;
use crate::watchlist::WatchStatus;

/// nextup - Track what you are watching and what airs next
#[derive(Parser)]
#[command(name = "nextup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set a config value (format: key=value)
        #[arg(long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },

    /// Search the catalog and add a title to the watchlist
    #[command(alias = "a")]
    Add {
        /// movie, tv or anime
        kind: MediaKind,

        /// Search query
        query: String,

        /// Initial status
        #[arg(long, short, default_value = "plan-to-watch")]
        status: WatchStatus,

        /// Pick the Nth search result without prompting
        #[arg(long)]
        pick: Option<usize>,

        /// Page of search results to show
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// List the watchlist grouped by status
    #[command(alias = "ls")]
    List {
        /// Only show one media kind
        #[arg(long, short)]
        kind: Option<MediaKind>,

        /// Only show one status
        #[arg(long, short)]
        status: Option<WatchStatus>,
    },

    /// Show what to watch next and recheck titles waiting for new episodes
    #[command(alias = "up")]
    UpNext,

    /// Mark the next episode of a title as watched
    #[command(alias = "w")]
    Watched {
        /// Entry id (e.g. tv-1399)
        id: String,
    },

    /// Change the status of a title
    Status {
        /// Entry id
        id: String,

        /// New status
        status: WatchStatus,
    },

    /// Set the current season and/or episode of a title
    Progress {
        /// Entry id
        id: String,

        #[arg(long)]
        season: Option<u32>,

        /// Episodes watched in the season (0 for none)
        #[arg(long)]
        episode: Option<u32>,
    },

    /// Set or clear the notes of a title
    Notes {
        /// Entry id
        id: String,

        /// Note text (empty to clear)
        text: String,
    },

    /// Remove a title from the watchlist
    #[command(alias = "rm")]
    Remove {
        /// Entry id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Write the watchlist to a JSON file
    Export {
        /// Output path
        path: PathBuf,
    },

    /// Merge a JSON watchlist file into the watchlist
    Import {
        /// Input path
        path: PathBuf,
    },
}
