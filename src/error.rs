use thiserror::Error;

/// Application-wide result type
pub type Result<T> = anyhow::Result<T>;

/// Catalog API errors with typed variants for matching
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("TMDB API error: {0}")]
    Tmdb(String),

    #[error("TMDB API key is not configured. Run 'nextup config --set tmdb_api_key=<key>'.")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found. Run 'nextup config --set tmdb_api_key=<key>' to set up.")]
    NotFound,

    #[error("Invalid config file: {0}")]
    Invalid(String),

    #[error("TMDB API key is required. Run 'nextup config --set tmdb_api_key=<key>'.")]
    MissingApiKey,

    #[error("Failed to save config: {0}")]
    SaveFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Watchlist storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid stored data: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No watchlist entry with id '{0}'")]
    UnknownEntry(String),

    #[error("'{0}' is already on the watchlist")]
    Duplicate(String),
}
