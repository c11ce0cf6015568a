pub mod artwork;
pub mod queries;
pub mod recommendations;
pub mod similarity;
pub mod tfidf;

pub use artwork::{attach_posters, ArtworkProvider, OmdbProvider};
pub use queries::QueryService;
pub use recommendations::Recommender;
pub use similarity::build_similarity_matrix;
