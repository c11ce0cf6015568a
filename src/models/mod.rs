use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod movie;

pub use movie::{Movie, MovieSummary, MIN_VOTE_SAMPLE};

/// Which credit column a person lookup searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonRole {
    Actor,
    Director,
}

impl Display for PersonRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersonRole::Actor => write!(f, "actor"),
            PersonRole::Director => write!(f, "director"),
        }
    }
}

/// How a recommendation list was assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStrategy {
    /// Collection members only, the franchise filled every slot
    Collection,
    /// Collection members (if any) followed by nearest neighbours
    CollectionThenSimilarity,
    /// Row outside the similarity index, ranked by genre overlap
    GenreOverlap,
}

// ============================================================================
// Query Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthCountResponse {
    pub month: String,
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekdayCountResponse {
    pub day: String,
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreResponse {
    pub title: String,
    pub year: Option<i32>,
    pub score: f64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteStats {
    pub title: String,
    pub year: Option<i32>,
    pub vote_count: u64,
    pub vote_average: f64,
    pub message: String,
}

/// Returned instead of stats when a title has too few votes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsufficientSample {
    pub title: String,
    pub insufficient_sample: bool,
    pub vote_count: u64,
    pub minimum_required: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum VotesResponse {
    Stats(VoteStats),
    InsufficientSample(InsufficientSample),
}

/// One film in a director's filmography
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectedMovie {
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub individual_return: Option<f64>,
    pub budget: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonStatsResponse {
    pub exact_name: String,
    pub role: PersonRole,
    pub movie_count: usize,
    pub total_return: f64,
    pub average_return: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movies: Option<Vec<DirectedMovie>>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub title: String,
    pub strategy: RecommendationStrategy,
    pub recommendations: Vec<MovieSummary>,
}
