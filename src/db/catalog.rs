use chrono::Weekday;

use crate::models::Movie;

/// Free-text columns that support substring search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColumn {
    Title,
    Overview,
    Cast,
    Crew,
}

impl TextColumn {
    fn value(self, movie: &Movie) -> Option<&str> {
        match self {
            TextColumn::Title => Some(movie.title.as_str()),
            TextColumn::Overview => movie.overview.as_deref(),
            TextColumn::Cast => movie.cast.as_deref(),
            TextColumn::Crew => movie.crew.as_deref(),
        }
    }
}

/// Sum and mean of the `return` column over a set of rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnAggregate {
    pub total: f64,
    pub mean: f64,
}

/// In-memory movie table keyed by dense 0-based row index
///
/// Built once from a loaded snapshot and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Movie> {
        self.movies.get(row)
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Rows whose title equals `title` ignoring case, in catalog order
    pub fn by_title_ci(&self, title: &str) -> Vec<usize> {
        let needle = title.trim().to_lowercase();
        self.movies
            .iter()
            .enumerate()
            .filter(|(_, m)| m.title.to_lowercase() == needle)
            .map(|(row, _)| row)
            .collect()
    }

    /// First row matching `title` ignoring case
    pub fn find_title(&self, title: &str) -> Option<(usize, &Movie)> {
        let needle = title.trim().to_lowercase();
        self.movies
            .iter()
            .enumerate()
            .find(|(_, m)| m.title.to_lowercase() == needle)
    }

    /// Number of movies released in `month` (1-12); undated rows never count
    pub fn count_by_month(&self, month: u32) -> usize {
        self.movies
            .iter()
            .filter(|m| m.release_month() == Some(month))
            .count()
    }

    /// Number of movies released on `weekday`; undated rows never count
    pub fn count_by_weekday(&self, weekday: Weekday) -> usize {
        self.movies
            .iter()
            .filter(|m| m.release_weekday() == Some(weekday))
            .count()
    }

    /// Rows whose `column` contains `needle` ignoring case; missing values never match
    pub fn containing_ci(&self, column: TextColumn, needle: &str) -> Vec<usize> {
        let needle = needle.to_lowercase();
        self.movies
            .iter()
            .enumerate()
            .filter(|(_, m)| {
                column
                    .value(m)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            })
            .map(|(row, _)| row)
            .collect()
    }

    /// Other rows sharing `row`'s collection, in catalog order
    pub fn collection_members(&self, row: usize) -> Vec<usize> {
        let Some(collection) = self.get(row).and_then(Movie::collection) else {
            return Vec::new();
        };

        self.movies
            .iter()
            .enumerate()
            .filter(|(other, m)| *other != row && m.collection() == Some(collection))
            .map(|(other, _)| other)
            .collect()
    }

    /// Total and mean return over `rows`; missing returns add nothing to the
    /// total but still count towards the mean's denominator
    pub fn aggregate_return(&self, rows: &[usize]) -> ReturnAggregate {
        let total: f64 = rows
            .iter()
            .filter_map(|&row| self.get(row))
            .filter_map(|m| m.return_ratio)
            .filter(|r| r.is_finite())
            .sum();

        let mean = if rows.is_empty() {
            0.0
        } else {
            total / rows.len() as f64
        };

        ReturnAggregate { total, mean }
    }
}
