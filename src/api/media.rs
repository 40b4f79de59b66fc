use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of tracked title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
    Anime,
}

impl MediaKind {
    /// Get a display label for the media kind
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Movie => "Movie",
            MediaKind::Tv => "TV",
            MediaKind::Anime => "Anime",
        }
    }

    /// Stable lowercase key, used in entry ids and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
            MediaKind::Anime => "anime",
        }
    }

    /// TV shows and anime track seasons and episodes
    pub fn is_episodic(&self) -> bool {
        !matches!(self, MediaKind::Movie)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(MediaKind::Movie),
            "tv" => Ok(MediaKind::Tv),
            "anime" => Ok(MediaKind::Anime),
            other => Err(format!("unknown media kind '{}'", other)),
        }
    }
}

/// One search hit from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// TMDB ID of the title
    pub tmdb_id: u32,
    /// Primary display title
    pub title: String,
    /// Poster path as returned by TMDB (e.g. "/abc.jpg")
    pub poster_path: Option<String>,
    /// Description/synopsis
    pub overview: String,
    /// Release or first air date as given by the catalog
    pub release_date: String,
    /// Score (0.0-10.0)
    pub rating: f32,
}

impl SearchResult {
    /// Release year, when the date is present
    pub fn year(&self) -> Option<i32> {
        self.release_date
            .split('-')
            .next()
            .and_then(|y| y.parse().ok())
    }
}

/// Season data structure (for TV shows and anime)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    #[serde(rename = "season")]
    pub number: u32,
    #[serde(rename = "episodes")]
    pub episode_count: u32,
}

impl Season {
    pub fn new(number: u32, episode_count: u32) -> Self {
        Self {
            number,
            episode_count,
        }
    }

    /// A numbered season with episodes; specials (season 0) and empty seasons are not
    pub fn is_regular(&self) -> bool {
        self.number > 0 && self.episode_count > 0
    }

    /// Whether `episode` is a real episode number in this season
    pub fn contains(&self, episode: u32) -> bool {
        episode >= 1 && episode <= self.episode_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_parse() {
        assert_eq!("movie".parse::<MediaKind>().unwrap(), MediaKind::Movie);
        assert_eq!("TV".parse::<MediaKind>().unwrap(), MediaKind::Tv);
        assert_eq!(" anime ".parse::<MediaKind>().unwrap(), MediaKind::Anime);
        assert!("invalid-type".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_media_kind_episodic() {
        assert!(!MediaKind::Movie.is_episodic());
        assert!(MediaKind::Tv.is_episodic());
        assert!(MediaKind::Anime.is_episodic());
    }

    #[test]
    fn test_season_wire_names() {
        let json = serde_json::to_string(&Season::new(2, 12)).unwrap();
        assert_eq!(json, r#"{"season":2,"episodes":12}"#);
    }

    #[test]
    fn test_season_is_regular() {
        assert!(Season::new(1, 10).is_regular());
        assert!(!Season::new(0, 4).is_regular());
        assert!(!Season::new(3, 0).is_regular());
    }

    #[test]
    fn test_search_result_year() {
        let result = SearchResult {
            tmdb_id: 1,
            title: "Test".to_string(),
            poster_path: None,
            overview: String::new(),
            release_date: "2019-04-12".to_string(),
            rating: 7.5,
        };
        assert_eq!(result.year(), Some(2019));
    }
}
