use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Minimum number of votes before a title's average rating is reported
pub const MIN_VOTE_SAMPLE: u64 = 2000;

/// One row of the movie catalog
///
/// Optional columns stay `None` when the source value is missing or
/// unparseable; nothing is defaulted to a sentinel date or id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Option<i64>,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub release_year: Option<i32>,
    pub popularity: f64,
    pub vote_count: u64,
    pub vote_average: f64,
    pub budget: f64,
    pub revenue: f64,
    /// revenue / budget, absent when the source had no usable ratio
    pub return_ratio: Option<f64>,
    pub genres: Vec<String>,
    /// Comma-joined actor names
    pub cast: Option<String>,
    /// Comma-joined director names
    pub crew: Option<String>,
    pub production_companies: Vec<String>,
    /// Franchise name, `None` for standalone films
    pub belongs_to_collection: Option<String>,
    pub overview: Option<String>,
    pub imdb_id: Option<String>,
}

impl Movie {
    pub fn release_month(&self) -> Option<u32> {
        self.release_date.map(|d| d.month())
    }

    pub fn release_weekday(&self) -> Option<Weekday> {
        self.release_date.map(|d| d.weekday())
    }

    /// Genre names joined by spaces, as fed to the genre vectorizer
    pub fn genres_text(&self) -> String {
        self.genres.join(" ")
    }

    /// Text blob used for content similarity: genres, overview, cast, crew
    pub fn content_text(&self) -> String {
        [
            self.genres_text().as_str(),
            self.overview.as_deref().unwrap_or(""),
            self.cast.as_deref().unwrap_or(""),
            self.crew.as_deref().unwrap_or(""),
        ]
        .join(" ")
    }

    /// True when both movies list at least one identical genre
    pub fn shares_genre_with(&self, other: &Movie) -> bool {
        self.genres.iter().any(|g| other.genres.contains(g))
    }

    /// Collection name, treating blank strings as standalone
    pub fn collection(&self) -> Option<&str> {
        self.belongs_to_collection
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn has_reliable_votes(&self) -> bool {
        self.vote_count >= MIN_VOTE_SAMPLE
    }
}

/// Projection of a catalog row returned by the recommendation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub title: String,
    pub genres: Vec<String>,
    pub vote_average: f64,
    pub popularity: f64,
    pub overview: Option<String>,
    pub imdb_id: Option<String>,
    /// Poster URL attached after ranking; `None` when unavailable
    pub poster: Option<String>,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            genres: movie.genres.clone(),
            vote_average: movie.vote_average,
            popularity: movie.popularity,
            overview: movie.overview.clone(),
            imdb_id: movie.imdb_id.clone(),
            poster: None,
        }
    }
}

/// Splits a textual list such as `['Animation', 'Comedy']` or `Tom Hanks, Tim Allen`
/// into its trimmed elements.
pub fn parse_list(raw: &str) -> Vec<String> {
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(clean_token)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strips quoting and list brackets left around a single list element
pub fn clean_token(token: &str) -> &str {
    token.trim_matches(|c: char| c.is_whitespace() || matches!(c, '\'' | '"' | '[' | ']'))
}

/// Parses a `YYYY-MM-DD` release date; anything else is treated as no date
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
