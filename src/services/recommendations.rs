use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    db::{Catalog, SimilarityMatrix},
    error::{AppError, AppResult},
    models::{MovieSummary, RecommendationResponse, RecommendationStrategy},
};

/// Row-level outcome of a recommendation query, before projection
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRows {
    pub source_row: usize,
    pub strategy: RecommendationStrategy,
    pub rows: Vec<usize>,
}

/// Similar-movie ranking over a frozen catalog and its precomputed index
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    matrix: Arc<SimilarityMatrix>,
}

impl Recommender {
    pub fn new(catalog: Arc<Catalog>, matrix: Arc<SimilarityMatrix>) -> Self {
        if matrix.size() != catalog.len() {
            tracing::warn!(
                catalog_rows = catalog.len(),
                matrix_size = matrix.size(),
                "Similarity index does not match catalog size"
            );
        }
        Self { catalog, matrix }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Up to `count` movies similar to `title`, projected for presentation
    pub fn recommend(&self, title: &str, count: usize) -> AppResult<RecommendationResponse> {
        let ranked = self.rank(title, count)?;

        let recommendations = ranked
            .rows
            .iter()
            .filter_map(|&row| self.catalog.get(row))
            .map(MovieSummary::from)
            .collect();

        let title = self
            .catalog
            .get(ranked.source_row)
            .map(|m| m.title.clone())
            .unwrap_or_else(|| title.to_string());

        Ok(RecommendationResponse {
            title,
            strategy: ranked.strategy,
            recommendations,
        })
    }

    /// Resolves `title` and picks the rows to recommend.
    ///
    /// Rows covered by the index use collection-first ranking. Rows beyond the
    /// index fall back to genre overlap.
    pub fn rank(&self, title: &str, count: usize) -> AppResult<RankedRows> {
        if count == 0 {
            return Err(AppError::InvalidInput(
                "n_recommendations must be at least 1".to_string(),
            ));
        }

        let (row, movie) = self
            .catalog
            .find_title(title)
            .ok_or_else(|| AppError::NotFound(format!("Película no encontrada: {}", title)))?;

        if !self.matrix.covers(row) {
            tracing::warn!(
                title = %movie.title,
                row,
                matrix_size = self.matrix.size(),
                "Row outside similarity index, using genre overlap"
            );
            return Ok(RankedRows {
                source_row: row,
                strategy: RecommendationStrategy::GenreOverlap,
                rows: self.genre_overlap(row, count),
            });
        }

        let mut rows = self.catalog.collection_members(row);
        if rows.len() >= count {
            rows.truncate(count);
            tracing::debug!(title = %movie.title, count = rows.len(), "Collection fills request");
            return Ok(RankedRows {
                source_row: row,
                strategy: RecommendationStrategy::Collection,
                rows,
            });
        }

        let collection: HashSet<usize> = rows.iter().copied().collect();
        let remaining = count - rows.len();
        rows.extend(
            self.ranked_neighbours(row)
                .into_iter()
                .filter(|candidate| !collection.contains(candidate))
                .take(remaining),
        );

        tracing::debug!(
            title = %movie.title,
            collection = collection.len(),
            total = rows.len(),
            "Recommendations ranked"
        );

        Ok(RankedRows {
            source_row: row,
            strategy: RecommendationStrategy::CollectionThenSimilarity,
            rows,
        })
    }

    /// Catalog rows ordered by descending similarity to `row`, excluding `row`.
    /// Equal scores keep catalog order.
    fn ranked_neighbours(&self, row: usize) -> Vec<usize> {
        let Some(scores) = self.matrix.row(row) else {
            return Vec::new();
        };

        let mut candidates: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .take(self.catalog.len())
            .filter(|(other, _)| *other != row)
            .map(|(other, score)| (other, if score.is_nan() { f32::NEG_INFINITY } else { score }))
            .collect();

        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.into_iter().map(|(other, _)| other).collect()
    }

    /// Other rows sharing a genre with `row`, by popularity then vote count
    fn genre_overlap(&self, row: usize, count: usize) -> Vec<usize> {
        let Some(source) = self.catalog.get(row) else {
            return Vec::new();
        };

        let mut candidates: Vec<usize> = self
            .catalog
            .movies()
            .iter()
            .enumerate()
            .filter(|(other, m)| *other != row && m.shares_genre_with(source))
            .map(|(other, _)| other)
            .collect();

        candidates.sort_by(|&a, &b| {
            let (ma, mb) = (&self.catalog.movies()[a], &self.catalog.movies()[b]);
            mb.popularity
                .partial_cmp(&ma.popularity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| mb.vote_count.cmp(&ma.vote_count))
        });
        candidates.truncate(count);
        candidates
    }
}
