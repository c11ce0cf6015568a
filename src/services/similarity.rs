use rayon::prelude::*;
use std::time::Instant;

use crate::{
    db::{Catalog, SimilarityMatrix},
    error::AppResult,
    services::tfidf::TfidfVectorizer,
};

const GENRE_WEIGHT: f64 = 0.25;
const VOTE_AVERAGE_WEIGHT: f64 = 0.25;
const POPULARITY_WEIGHT: f64 = 0.5;

/// Rating and popularity signals rescaled to [0, 1] across the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSignals {
    /// Scaled alongside popularity but not part of the weighted formula
    pub vote_count: Vec<f64>,
    pub popularity: Vec<f64>,
}

impl NormalizedSignals {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let vote_count: Vec<f64> = catalog.movies().iter().map(|m| m.vote_count as f64).collect();
        let popularity: Vec<f64> = catalog.movies().iter().map(|m| m.popularity).collect();
        Self {
            vote_count: min_max_scale(&vote_count),
            popularity: min_max_scale(&popularity),
        }
    }
}

/// Min-max scaling; a constant column maps to all zeros
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|v| if range > 0.0 { (v - min) / range } else { 0.0 })
        .collect()
}

/// Builds the weighted similarity matrix for every pair of catalog rows.
///
/// `weighted[i][j] = content[i][j] + 0.25 * genre[i][j] + 0.25 * vote_average[i] + 0.5 * popularity[i]`
///
/// The rating and popularity terms come from the source row only, so the
/// result is not symmetric. Within one row they shift every entry equally.
///
/// Each row is computed directly from the sparse vectors, so the only
/// `n x n` allocation is the resulting matrix.
pub fn build_similarity_matrix(catalog: &Catalog) -> AppResult<SimilarityMatrix> {
    let start = Instant::now();
    let movies = catalog.movies();

    tracing::info!(rows = movies.len(), "Building similarity index");

    let signals = NormalizedSignals::from_catalog(catalog);

    let content_docs: Vec<String> = movies.iter().map(|m| m.content_text()).collect();
    let genre_docs: Vec<String> = movies.iter().map(|m| m.genres_text()).collect();

    let (content_vectorizer, content_vectors) = TfidfVectorizer::fit_transform(&content_docs);
    let (genre_vectorizer, genre_vectors) = TfidfVectorizer::fit_transform(&genre_docs);

    tracing::info!(
        content_terms = content_vectorizer.vocabulary_len(),
        genre_terms = genre_vectorizer.vocabulary_len(),
        "Vocabularies fitted"
    );

    let rows: Vec<Vec<f32>> = movies
        .par_iter()
        .enumerate()
        .map(|(i, movie)| {
            let row_bias = movie.vote_average * VOTE_AVERAGE_WEIGHT
                + signals.popularity[i] * POPULARITY_WEIGHT;
            let (content_i, genre_i) = (&content_vectors[i], &genre_vectors[i]);
            content_vectors
                .iter()
                .zip(&genre_vectors)
                .map(|(content_j, genre_j)| {
                    let content = content_i.cosine(content_j);
                    let genre = genre_i.cosine(genre_j);
                    (content + genre * GENRE_WEIGHT + row_bias) as f32
                })
                .collect()
        })
        .collect();

    let matrix = SimilarityMatrix::from_rows(rows)?;

    tracing::info!(
        size = matrix.size(),
        elapsed_ms = start.elapsed().as_millis(),
        "Similarity index built"
    );

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Movie;

    fn movie(title: &str, genres: &[&str], overview: &str, vote_average: f64, popularity: f64) -> Movie {
        Movie {
            title: title.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            overview: Some(overview.to_string()),
            vote_average,
            popularity,
            ..Default::default()
        }
    }

    #[test]
    fn test_min_max_scale() {
        assert_eq!(min_max_scale(&[10.0, 20.0, 15.0]), vec![0.0, 1.0, 0.5]);
        assert_eq!(min_max_scale(&[3.0, 3.0]), vec![0.0, 0.0]);
        assert!(min_max_scale(&[]).is_empty());
    }

    #[test]
    fn test_normalized_signals() {
        let catalog = Catalog::new(vec![
            Movie { vote_count: 0, popularity: 1.0, ..Default::default() },
            Movie { vote_count: 100, popularity: 3.0, ..Default::default() },
        ]);
        let signals = NormalizedSignals::from_catalog(&catalog);
        assert_eq!(signals.vote_count, vec![0.0, 1.0]);
        assert_eq!(signals.popularity, vec![0.0, 1.0]);
    }

    #[test]
    fn test_vote_count_does_not_change_weights() {
        let few_votes = Catalog::new(vec![
            Movie { vote_count: 10, ..movie("Alien", &["Horror"], "space creature", 8.0, 10.0) },
            Movie { vote_count: 20, ..movie("Aliens", &["Horror"], "space creature", 7.0, 20.0) },
        ]);
        let many_votes = Catalog::new(vec![
            Movie { vote_count: 9000, ..movie("Alien", &["Horror"], "space creature", 8.0, 10.0) },
            Movie { vote_count: 5, ..movie("Aliens", &["Horror"], "space creature", 7.0, 20.0) },
        ]);
        assert_eq!(
            build_similarity_matrix(&few_votes).unwrap(),
            build_similarity_matrix(&many_votes).unwrap()
        );
    }

    #[test]
    fn test_weighted_formula() {
        let catalog = Catalog::new(vec![
            movie("Alien", &["Horror"], "space creature", 8.0, 10.0),
            movie("Aliens", &["Horror"], "space creature", 6.0, 20.0),
            movie("Babe", &["Family"], "talking pig", 4.0, 0.0),
        ]);
        let matrix = build_similarity_matrix(&catalog).unwrap();
        assert_eq!(matrix.size(), 3);

        // identical content and genres: cosine 1 on both, popularity scaled to 0.5
        let expected_0_1 = 1.0 + 0.25 + 8.0 * 0.25 + 0.5 * 0.5;
        assert!((matrix.get(0, 1).unwrap() as f64 - expected_0_1).abs() < 1e-5);

        // nothing shared with Babe, only the row bias remains
        let expected_0_2 = 8.0 * 0.25 + 0.5 * 0.5;
        assert!((matrix.get(0, 2).unwrap() as f64 - expected_0_2).abs() < 1e-5);
    }

    #[test]
    fn test_matrix_is_asymmetric() {
        let catalog = Catalog::new(vec![
            movie("Alien", &["Horror"], "space creature", 8.0, 10.0),
            movie("Aliens", &["Horror"], "space creature", 7.0, 20.0),
        ]);
        let matrix = build_similarity_matrix(&catalog).unwrap();

        // same text both ways; row bias 8.0 * 0.25 + 0.0 * 0.5 against 7.0 * 0.25 + 1.0 * 0.5
        let alien_to_aliens = matrix.get(0, 1).unwrap();
        let aliens_to_alien = matrix.get(1, 0).unwrap();
        assert!((alien_to_aliens - 3.25).abs() < 1e-5);
        assert!((aliens_to_alien - 3.5).abs() < 1e-5);
        assert_ne!(alien_to_aliens, aliens_to_alien);
    }

    #[test]
    fn test_every_entry_follows_weighted_formula() {
        let catalog = Catalog::new(vec![
            movie("Heat", &["Crime", "Drama"], "bank heist crew detective", 7.7, 17.9),
            movie("Ronin", &["Crime", "Thriller"], "heist crew briefcase", 6.8, 9.1),
            movie("Babe", &["Family"], "talking pig farm", 6.0, 14.4),
            movie("Casino", &["Crime", "Drama"], "mob casino vegas", 7.8, 10.1),
        ]);
        let matrix = build_similarity_matrix(&catalog).unwrap();

        let content: Vec<String> = catalog.movies().iter().map(|m| m.content_text()).collect();
        let genres: Vec<String> = catalog.movies().iter().map(|m| m.genres_text()).collect();
        let (_, content_vectors) = TfidfVectorizer::fit_transform(&content);
        let (_, genre_vectors) = TfidfVectorizer::fit_transform(&genres);
        let signals = NormalizedSignals::from_catalog(&catalog);

        for (i, movie) in catalog.movies().iter().enumerate() {
            let bias = 0.25 * movie.vote_average + 0.5 * signals.popularity[i];
            for j in 0..catalog.len() {
                let expected = content_vectors[i].cosine(&content_vectors[j])
                    + 0.25 * genre_vectors[i].cosine(&genre_vectors[j])
                    + bias;
                let actual = matrix.get(i, j).unwrap() as f64;
                assert!((actual - expected).abs() < 1e-5, "entry ({}, {})", i, j);
            }
        }
    }

    #[test]
    fn test_rows_without_text_still_build() {
        let catalog = Catalog::new(vec![Movie::default(), movie("Heat", &["Crime"], "heist", 7.0, 5.0)]);
        let matrix = build_similarity_matrix(&catalog).unwrap();
        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.get(0, 1), Some(0.0));
    }

    #[test]
    fn test_empty_catalog() {
        let matrix = build_similarity_matrix(&Catalog::default()).unwrap();
        assert_eq!(matrix.size(), 0);
    }
}
