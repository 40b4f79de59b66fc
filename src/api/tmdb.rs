use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::api::media::{MediaKind, SearchResult, Season};
use crate::error::ApiError;
use crate::watchlist::AirDateLookup;

const TMDB_API_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Build a poster URL for a TMDB image path at the given width
pub fn poster_url(path: &str, width: u32) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    Some(format!("{}/w{}{}", TMDB_IMAGE_BASE, width, path))
}

/// TMDB API client
pub struct TmdbClient {
    client: Client,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    /// Check if the client is configured (has API key)
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &str,
    ) -> Result<Option<T>, ApiError> {
        if !self.is_configured() {
            return Err(ApiError::MissingApiKey);
        }

        let url = format!("{}{}?api_key={}{}", TMDB_API_URL, path, self.api_key, query);
        tracing::debug!("Fetching {}{}", path, query);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(ApiError::Tmdb(format!("HTTP {}", response.status())));
        }

        let data = response
            .json()
            .await
            .map_err(|e| ApiError::Tmdb(format!("Failed to parse response: {}", e)))?;

        Ok(Some(data))
    }

    /// Search for movies, one page (20 results) at a time
    pub async fn search_movies(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<SearchResult>, ApiError> {
        let query = search_query(query, page);
        let data: Option<SearchResponse<MovieResult>> =
            self.get_json("/search/movie", &query).await?;

        Ok(data
            .map(|d| d.results.into_iter().map(SearchResult::from).collect())
            .unwrap_or_default())
    }

    /// Search for TV shows (anime is listed under TV on TMDB)
    pub async fn search_tv(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<SearchResult>, ApiError> {
        let query = search_query(query, page);
        let data: Option<SearchResponse<TvResult>> = self.get_json("/search/tv", &query).await?;

        Ok(data
            .map(|d| d.results.into_iter().map(SearchResult::from).collect())
            .unwrap_or_default())
    }

    /// Search the endpoint matching a media kind
    pub async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        page: u32,
    ) -> Result<Vec<SearchResult>, ApiError> {
        match kind {
            MediaKind::Movie => self.search_movies(query, page).await,
            MediaKind::Tv | MediaKind::Anime => self.search_tv(query, page).await,
        }
    }

    /// Get the season structure of a TV show (fetched once when a title is added)
    pub async fn get_season_structure(&self, tv_id: u32) -> Result<Vec<Season>, ApiError> {
        let data: Option<TvDetailsResponse> =
            self.get_json(&format!("/tv/{}", tv_id), "").await?;

        Ok(data.map(seasons_from_details).unwrap_or_default())
    }

    /// Get the scheduled air date of one episode; `None` when the catalog has no date
    pub async fn get_episode_air_date(
        &self,
        tv_id: u32,
        season: u32,
        episode: u32,
    ) -> Result<Option<NaiveDate>, ApiError> {
        let data: Option<EpisodeDetailsResponse> = self
            .get_json(
                &format!("/tv/{}/season/{}/episode/{}", tv_id, season, episode),
                "",
            )
            .await?;

        Ok(data.and_then(|d| parse_air_date(d.air_date.as_deref())))
    }
}

impl Default for TmdbClient {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl AirDateLookup for TmdbClient {
    async fn air_date(
        &self,
        tmdb_id: u32,
        season: u32,
        episode: u32,
    ) -> Result<Option<NaiveDate>, ApiError> {
        self.get_episode_air_date(tmdb_id, season, episode).await
    }
}

fn search_query(query: &str, page: u32) -> String {
    format!(
        "&query={}&page={}&include_adult=false",
        urlencoding::encode(query),
        page.max(1)
    )
}

/// Parse TMDB's "YYYY-MM-DD" air date; blank or malformed dates count as unknown
fn parse_air_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    // Some listings carry a full timestamp
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn seasons_from_details(details: TvDetailsResponse) -> Vec<Season> {
    details
        .seasons
        .into_iter()
        .map(|s| Season::new(s.season_number, s.episode_count))
        .filter(Season::is_regular)
        .collect()
}

// Response types for TMDB API

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MovieResult {
    id: u32,
    title: String,
    release_date: Option<String>,
    vote_average: Option<f32>,
    poster_path: Option<String>,
    overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvResult {
    id: u32,
    name: String,
    first_air_date: Option<String>,
    vote_average: Option<f32>,
    poster_path: Option<String>,
    overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvDetailsResponse {
    #[serde(default)]
    seasons: Vec<SeasonInfo>,
}

#[derive(Debug, Deserialize)]
struct SeasonInfo {
    season_number: u32,
    #[serde(default)]
    episode_count: u32,
}

#[derive(Debug, Deserialize)]
struct EpisodeDetailsResponse {
    air_date: Option<String>,
}

// Conversion implementations

impl From<MovieResult> for SearchResult {
    fn from(movie: MovieResult) -> Self {
        Self {
            tmdb_id: movie.id,
            title: movie.title,
            poster_path: movie.poster_path,
            overview: movie.overview.unwrap_or_default(),
            release_date: movie.release_date.unwrap_or_default(),
            rating: movie.vote_average.unwrap_or(0.0),
        }
    }
}

impl From<TvResult> for SearchResult {
    fn from(tv: TvResult) -> Self {
        Self {
            tmdb_id: tv.id,
            title: tv.name,
            poster_path: tv.poster_path,
            overview: tv.overview.unwrap_or_default(),
            release_date: tv.first_air_date.unwrap_or_default(),
            rating: tv.vote_average.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_air_date() {
        assert_eq!(
            parse_air_date(Some("2026-01-20")),
            NaiveDate::from_ymd_opt(2026, 1, 20)
        );
        assert_eq!(
            parse_air_date(Some("2026-01-20T18:00:00Z")),
            NaiveDate::from_ymd_opt(2026, 1, 20)
        );
        assert_eq!(parse_air_date(Some("")), None);
        assert_eq!(parse_air_date(Some("soon")), None);
        assert_eq!(parse_air_date(None), None);
    }

    #[test]
    fn test_seasons_skip_specials_and_empty() {
        let raw = r#"{
            "number_of_seasons": 3,
            "seasons": [
                {"season_number": 0, "episode_count": 4},
                {"season_number": 1, "episode_count": 10},
                {"season_number": 2, "episode_count": 8},
                {"season_number": 3, "episode_count": 0}
            ]
        }"#;
        let details: TvDetailsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            seasons_from_details(details),
            vec![Season::new(1, 10), Season::new(2, 8)]
        );
    }

    #[test]
    fn test_tv_result_conversion() {
        let raw = r#"{
            "id": 1399,
            "name": "Game of Thrones",
            "first_air_date": "2011-04-17",
            "vote_average": 8.4,
            "poster_path": "/poster.jpg",
            "overview": "Seven noble families fight for control."
        }"#;
        let tv: TvResult = serde_json::from_str(raw).unwrap();
        let result = SearchResult::from(tv);
        assert_eq!(result.tmdb_id, 1399);
        assert_eq!(result.title, "Game of Thrones");
        assert_eq!(result.year(), Some(2011));
    }

    #[test]
    fn test_movie_result_missing_fields() {
        let raw = r#"{"id": 7, "title": "Untitled"}"#;
        let movie: MovieResult = serde_json::from_str(raw).unwrap();
        let result = SearchResult::from(movie);
        assert_eq!(result.release_date, "");
        assert_eq!(result.rating, 0.0);
    }

    #[test]
    fn test_search_query_pages() {
        assert_eq!(
            search_query("the office", 2),
            "&query=the%20office&page=2&include_adult=false"
        );
        assert_eq!(search_query("x", 0), "&query=x&page=1&include_adult=false");
    }

    #[test]
    fn test_poster_url() {
        assert_eq!(
            poster_url("/abc.jpg", 300).as_deref(),
            Some("https://image.tmdb.org/t/p/w300/abc.jpg")
        );
        assert_eq!(poster_url("", 300), None);
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses() {
        let client = TmdbClient::default();
        let result = client.get_episode_air_date(1, 1, 1).await;
        assert!(matches!(result, Err(ApiError::MissingApiKey)));
    }
}
