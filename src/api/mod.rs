mod media;
mod tmdb;

pub use media::{MediaKind, SearchResult, Season};
pub use tmdb::{poster_url, TmdbClient};
