use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::{
    db::Catalog,
    error::AppResult,
    models::{
        movie::{parse_list, parse_release_date},
        Movie,
    },
};

/// A catalog CSV row as written by the dataset preparation step
///
/// Every column is read as optional text so one bad cell degrades that field
/// instead of rejecting the row.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMovieRecord {
    id: Option<String>,
    title: Option<String>,
    release_date: Option<String>,
    release_year: Option<String>,
    popularity: Option<String>,
    vote_count: Option<String>,
    vote_average: Option<String>,
    budget: Option<String>,
    revenue: Option<String>,
    #[serde(rename = "return")]
    return_ratio: Option<String>,
    genres: Option<String>,
    cast: Option<String>,
    crew: Option<String>,
    production_companies: Option<String>,
    belongs_to_collection: Option<String>,
    overview: Option<String>,
    imdb_id: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !matches!(v.as_str(), "nan" | "NaN" | "None" | "null"))
}

fn number(value: &Option<String>) -> Option<f64> {
    value
        .as_deref()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl From<RawMovieRecord> for Movie {
    fn from(raw: RawMovieRecord) -> Self {
        let budget = number(&raw.budget).unwrap_or(0.0);
        let revenue = number(&raw.revenue).unwrap_or(0.0);
        let return_ratio = number(&raw.return_ratio)
            .or_else(|| (budget > 0.0).then(|| revenue / budget));
        let release_date = raw.release_date.as_deref().and_then(parse_release_date);
        let release_year = number(&raw.release_year)
            .map(|y| y as i32)
            .or_else(|| release_date.map(|d| chrono::Datelike::year(&d)));

        Movie {
            id: number(&raw.id).map(|id| id as i64),
            title: raw.title.map(|t| t.trim().to_string()).unwrap_or_default(),
            release_date,
            release_year,
            popularity: number(&raw.popularity).unwrap_or(0.0),
            vote_count: number(&raw.vote_count).map(|c| c.max(0.0) as u64).unwrap_or(0),
            vote_average: number(&raw.vote_average).unwrap_or(0.0),
            budget,
            revenue,
            return_ratio,
            genres: raw.genres.as_deref().map(parse_list).unwrap_or_default(),
            cast: non_empty(raw.cast),
            crew: non_empty(raw.crew),
            production_companies: raw
                .production_companies
                .as_deref()
                .map(parse_list)
                .unwrap_or_default(),
            belongs_to_collection: non_empty(raw.belongs_to_collection),
            overview: non_empty(raw.overview),
            imdb_id: non_empty(raw.imdb_id),
        }
    }
}

/// Loads the catalog CSV at `path`
pub fn load_catalog(path: impl AsRef<Path>) -> AppResult<Catalog> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Loading movie catalog");
    let file = std::fs::File::open(path)?;
    load_catalog_from_reader(file)
}

/// Loads a catalog from any CSV source with a header row
///
/// Records the CSV parser cannot read at all are skipped with a warning.
pub fn load_catalog_from_reader<R: Read>(source: R) -> AppResult<Catalog> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(source);

    let mut movies = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in reader.deserialize::<RawMovieRecord>().enumerate() {
        match result {
            Ok(record) => movies.push(Movie::from(record)),
            Err(e) => {
                skipped += 1;
                tracing::warn!(record = line + 1, error = %e, "Skipping unreadable catalog record");
            }
        }
    }

    tracing::info!(rows = movies.len(), skipped, "Movie catalog loaded");

    Ok(Catalog::new(movies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "id,title,release_date,release_year,popularity,vote_count,vote_average,budget,revenue,return,genres,cast,crew,production_companies,belongs_to_collection,overview,imdb_id";

    #[test]
    fn test_load_full_row() {
        let csv = format!(
            "{HEADER}\n862,Toy Story,1995-10-30,1995,21.946943,5415,7.7,30000000,373554033,12.4518011,\"['Animation', 'Comedy', 'Family']\",\"Tom Hanks, Tim Allen\",John Lasseter,['Pixar Animation Studios'],Toy Story Collection,Led by Woody...,tt0114709\n"
        );
        let catalog = load_catalog_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 1);

        let movie = catalog.get(0).unwrap();
        assert_eq!(movie.id, Some(862));
        assert_eq!(movie.title, "Toy Story");
        assert_eq!(movie.release_year, Some(1995));
        assert_eq!(movie.vote_count, 5415);
        assert_eq!(movie.genres, vec!["Animation", "Comedy", "Family"]);
        assert_eq!(movie.cast.as_deref(), Some("Tom Hanks, Tim Allen"));
        assert_eq!(movie.production_companies, vec!["Pixar Animation Studios"]);
        assert_eq!(movie.collection(), Some("Toy Story Collection"));
        assert_eq!(movie.imdb_id.as_deref(), Some("tt0114709"));
    }

    #[test]
    fn test_malformed_optional_fields_degrade() {
        let csv = format!(
            "{HEADER}\n1,Broken,31/12/1999,,abc,,,0,500,,,,,,,,\n"
        );
        let catalog = load_catalog_from_reader(csv.as_bytes()).unwrap();
        let movie = catalog.get(0).unwrap();
        assert_eq!(movie.release_date, None);
        assert_eq!(movie.release_year, None);
        assert_eq!(movie.popularity, 0.0);
        assert_eq!(movie.return_ratio, None);
        assert!(movie.genres.is_empty());
        assert_eq!(movie.overview, None);
        assert_eq!(movie.belongs_to_collection, None);
    }

    #[test]
    fn test_return_derived_from_budget() {
        let csv = "title,budget,revenue\nHeat,60000000,180000000\n";
        let catalog = load_catalog_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.get(0).unwrap().return_ratio, Some(3.0));
    }

    #[test]
    fn test_short_rows_are_kept() {
        let csv = "title,overview,imdb_id\nAlien,In space,tt0078748\nShort\n";
        let catalog = load_catalog_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().title, "Short");
        assert_eq!(catalog.get(1).unwrap().imdb_id, None);
    }

    #[test]
    fn test_load_catalog_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "title,release_date").unwrap();
        writeln!(file, "Jumanji,1995-12-15").unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().release_year, Some(1995));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_catalog("/nonexistent/movies.csv").is_err());
    }
}
