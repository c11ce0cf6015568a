use chrono::Weekday;
use std::sync::Arc;

use crate::{
    db::{Catalog, TextColumn},
    error::{AppError, AppResult},
    models::{
        movie::clean_token, DirectedMovie, InsufficientSample, Movie, MonthCountResponse,
        PersonRole, PersonStatsResponse, ScoreResponse, VoteStats, VotesResponse,
        WeekdayCountResponse, MIN_VOTE_SAMPLE,
    },
};

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Spanish month name to month number, 1 = enero
pub fn month_number(name: &str) -> AppResult<u32> {
    let name = name.trim().to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| AppError::InvalidInput(format!("Mes inválido: {}", name)))
}

/// Spanish weekday name to weekday; accents are optional
pub fn weekday_from_name(name: &str) -> AppResult<Weekday> {
    let name = name.trim().to_lowercase();
    let weekday = match name.as_str() {
        "lunes" => Weekday::Mon,
        "martes" => Weekday::Tue,
        "miércoles" | "miercoles" => Weekday::Wed,
        "jueves" => Weekday::Thu,
        "viernes" => Weekday::Fri,
        "sábado" | "sabado" => Weekday::Sat,
        "domingo" => Weekday::Sun,
        _ => return Err(AppError::InvalidInput(format!("Día inválido: {}", name))),
    };
    Ok(weekday)
}

/// Canonical weekday index: 0 = lunes (Monday) through 6 = domingo (Sunday)
pub fn weekday_index(weekday: Weekday) -> u32 {
    weekday.num_days_from_monday()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn year_label(year: Option<i32>) -> String {
    year.map(|y| y.to_string())
        .unwrap_or_else(|| "desconocido".to_string())
}

/// First comma-separated credit in `rows` containing `query`, cleaned of list quoting
fn exact_credit(catalog: &Catalog, rows: &[usize], column: TextColumn, query: &str) -> String {
    let needle = query.to_lowercase();
    rows.iter()
        .filter_map(|&row| catalog.get(row))
        .filter_map(|m| match column {
            TextColumn::Cast => m.cast.as_deref(),
            TextColumn::Crew => m.crew.as_deref(),
            TextColumn::Title => Some(m.title.as_str()),
            TextColumn::Overview => m.overview.as_deref(),
        })
        .flat_map(|field| field.split(','))
        .find(|token| token.to_lowercase().contains(&needle))
        .map(clean_token)
        .filter(|name| !name.is_empty())
        .unwrap_or(query.trim())
        .to_string()
}

/// Lookup operations over the frozen catalog
#[derive(Debug, Clone)]
pub struct QueryService {
    catalog: Arc<Catalog>,
}

impl QueryService {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn find_title(&self, title: &str) -> AppResult<&Movie> {
        self.catalog
            .find_title(title)
            .map(|(_, movie)| movie)
            .ok_or_else(|| AppError::NotFound(format!("Película no encontrada: {}", title)))
    }

    pub fn get_month_count(&self, month_name: &str) -> AppResult<MonthCountResponse> {
        let month = month_number(month_name)?;
        let count = self.catalog.count_by_month(month);
        let name = MONTHS[(month - 1) as usize].to_string();

        Ok(MonthCountResponse {
            message: format!("{} películas fueron estrenadas en el mes de {}", count, name),
            month: name,
            count,
        })
    }

    pub fn get_weekday_count(&self, day_name: &str) -> AppResult<WeekdayCountResponse> {
        let weekday = weekday_from_name(day_name)?;
        let count = self.catalog.count_by_weekday(weekday);
        let day = day_name.trim().to_lowercase();

        Ok(WeekdayCountResponse {
            message: format!("{} películas fueron estrenadas en los días {}", count, day),
            day,
            count,
        })
    }

    pub fn get_score(&self, title: &str) -> AppResult<ScoreResponse> {
        let movie = self.find_title(title)?;

        Ok(ScoreResponse {
            message: format!(
                "La película {} fue estrenada en el año {} con un score/popularidad de {}",
                movie.title,
                year_label(movie.release_year),
                movie.popularity
            ),
            title: movie.title.clone(),
            year: movie.release_year,
            score: movie.popularity,
        })
    }

    /// Vote stats, or an insufficient-sample result below the vote threshold
    pub fn get_votes(&self, title: &str) -> AppResult<VotesResponse> {
        let movie = self.find_title(title)?;

        if !movie.has_reliable_votes() {
            return Ok(VotesResponse::InsufficientSample(InsufficientSample {
                title: movie.title.clone(),
                insufficient_sample: true,
                vote_count: movie.vote_count,
                minimum_required: MIN_VOTE_SAMPLE,
                message: format!(
                    "La película no cumple con el mínimo de {} valoraciones",
                    MIN_VOTE_SAMPLE
                ),
            }));
        }

        Ok(VotesResponse::Stats(VoteStats {
            message: format!(
                "La película {} fue estrenada en el año {}. La misma cuenta con un total de {} valoraciones, con un promedio de {}",
                movie.title,
                year_label(movie.release_year),
                movie.vote_count,
                movie.vote_average
            ),
            title: movie.title.clone(),
            year: movie.release_year,
            vote_count: movie.vote_count,
            vote_average: movie.vote_average,
        }))
    }

    /// Aggregated return for an actor (cast) or director (crew)
    pub fn get_person_stats(&self, name: &str, role: PersonRole) -> AppResult<PersonStatsResponse> {
        let query = name.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("El nombre no puede estar vacío".to_string()));
        }

        let column = match role {
            PersonRole::Actor => TextColumn::Cast,
            PersonRole::Director => TextColumn::Crew,
        };

        let rows = self.catalog.containing_ci(column, query);
        if rows.is_empty() {
            let what = match role {
                PersonRole::Actor => "Actor no encontrado",
                PersonRole::Director => "Director no encontrado",
            };
            return Err(AppError::NotFound(format!("{}: {}", what, query)));
        }

        let exact_name = exact_credit(&self.catalog, &rows, column, query);
        let aggregate = self.catalog.aggregate_return(&rows);
        let total_return = round3(aggregate.total);
        let average_return = round3(aggregate.mean);

        tracing::debug!(
            name = %exact_name,
            role = %role,
            movies = rows.len(),
            "Person stats aggregated"
        );

        let (movies, message) = match role {
            PersonRole::Actor => (
                None,
                format!(
                    "El actor {} ha participado de {} cantidad de filmaciones, el mismo ha conseguido un retorno de {} con un promedio de {} por filmación",
                    exact_name,
                    rows.len(),
                    total_return,
                    average_return
                ),
            ),
            PersonRole::Director => (
                Some(
                    rows.iter()
                        .filter_map(|&row| self.catalog.get(row))
                        .map(|m| DirectedMovie {
                            title: m.title.clone(),
                            release_date: m.release_date,
                            individual_return: m.return_ratio,
                            budget: m.budget,
                            revenue: m.revenue,
                        })
                        .collect(),
                ),
                format!("El director {} ha dirigido las siguientes películas:", exact_name),
            ),
        };

        Ok(PersonStatsResponse {
            exact_name,
            role,
            movie_count: rows.len(),
            total_return,
            average_return,
            movies,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movie::parse_release_date;

    fn service() -> QueryService {
        let movies = vec![
            Movie {
                title: "Toy Story".to_string(),
                release_date: parse_release_date("1995-10-30"),
                release_year: Some(1995),
                popularity: 21.946943,
                vote_count: 5415,
                vote_average: 7.7,
                return_ratio: Some(12.4518),
                cast: Some("['Tom Hanks', 'Tim Allen', 'Don Rickles']".to_string()),
                crew: Some("John Lasseter".to_string()),
                ..Default::default()
            },
            Movie {
                title: "Jumanji".to_string(),
                release_date: parse_release_date("1995-12-15"),
                release_year: Some(1995),
                popularity: 17.015539,
                vote_count: 2413,
                vote_average: 6.9,
                return_ratio: Some(4.0434),
                cast: Some("Robin Williams, Jonathan Hyde".to_string()),
                crew: Some("Joe Johnston".to_string()),
                ..Default::default()
            },
            Movie {
                title: "Toy Story 2".to_string(),
                release_date: parse_release_date("1999-10-30"),
                release_year: Some(1999),
                vote_count: 1999,
                vote_average: 9.9,
                return_ratio: None,
                budget: 90_000_000.0,
                cast: Some("Tom Hanks, Joan Cusack".to_string()),
                crew: Some("John Lasseter, Ash Brannon".to_string()),
                ..Default::default()
            },
            Movie {
                title: "Lost Reel".to_string(),
                release_date: None,
                ..Default::default()
            },
        ];
        QueryService::new(Arc::new(Catalog::new(movies)))
    }

    #[test]
    fn test_month_number_mapping() {
        assert_eq!(month_number("enero").unwrap(), 1);
        assert_eq!(month_number(" Diciembre ").unwrap(), 12);
        assert!(matches!(month_number("january"), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_weekday_mapping_starts_on_monday() {
        let days = ["lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo"];
        for (expected, day) in days.iter().enumerate() {
            assert_eq!(weekday_index(weekday_from_name(day).unwrap()), expected as u32);
        }
        assert_eq!(weekday_from_name("SABADO").unwrap(), Weekday::Sat);
        assert_eq!(weekday_from_name("miercoles").unwrap(), Weekday::Wed);
        assert!(weekday_from_name("monday").is_err());
    }

    #[test]
    fn test_month_count() {
        let response = service().get_month_count("Octubre").unwrap();
        assert_eq!(response.count, 2);
        assert_eq!(response.month, "octubre");
        assert_eq!(response.message, "2 películas fueron estrenadas en el mes de octubre");
        assert_eq!(service().get_month_count("enero").unwrap().count, 0);
    }

    #[test]
    fn test_weekday_count() {
        // 1995-10-30 Monday, 1995-12-15 Friday, 1999-10-30 Saturday
        let svc = service();
        assert_eq!(svc.get_weekday_count("lunes").unwrap().count, 1);
        assert_eq!(svc.get_weekday_count("viernes").unwrap().count, 1);
        assert_eq!(svc.get_weekday_count("sábado").unwrap().count, 1);
        assert_eq!(svc.get_weekday_count("domingo").unwrap().count, 0);
        assert!(svc.get_weekday_count("funday").is_err());
    }

    #[test]
    fn test_score() {
        let response = service().get_score("toy story").unwrap();
        assert_eq!(response.title, "Toy Story");
        assert_eq!(response.year, Some(1995));
        assert_eq!(response.score, 21.946943);
        assert!(matches!(service().get_score("nope"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_votes_threshold() {
        let svc = service();
        match svc.get_votes("Jumanji").unwrap() {
            VotesResponse::Stats(stats) => {
                assert_eq!(stats.vote_count, 2413);
                assert_eq!(stats.vote_average, 6.9);
            }
            other => panic!("expected stats, got {:?}", other),
        }
        // high average does not bypass the sample gate
        match svc.get_votes("Toy Story 2").unwrap() {
            VotesResponse::InsufficientSample(sample) => {
                assert_eq!(sample.vote_count, 1999);
                assert!(sample.insufficient_sample);
            }
            other => panic!("expected insufficient sample, got {:?}", other),
        }
        assert!(matches!(svc.get_votes("nope"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_actor_stats() {
        let response = service().get_person_stats("tom hanks", PersonRole::Actor).unwrap();
        assert_eq!(response.exact_name, "Tom Hanks");
        assert_eq!(response.movie_count, 2);
        assert_eq!(response.total_return, 12.452);
        assert_eq!(response.average_return, 6.226);
        assert!(response.movies.is_none());
    }

    #[test]
    fn test_actor_partial_name_recovers_full_credit() {
        let response = service().get_person_stats("williams", PersonRole::Actor).unwrap();
        assert_eq!(response.exact_name, "Robin Williams");
        assert_eq!(response.movie_count, 1);
    }

    #[test]
    fn test_director_filmography() {
        let response = service().get_person_stats("LASSETER", PersonRole::Director).unwrap();
        assert_eq!(response.exact_name, "John Lasseter");
        let movies = response.movies.unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title, "Toy Story");
        assert_eq!(movies[1].individual_return, None);
        assert_eq!(movies[1].budget, 90_000_000.0);
    }

    #[test]
    fn test_person_not_found_and_empty_name() {
        let svc = service();
        assert!(matches!(
            svc.get_person_stats("Meryl Streep", PersonRole::Actor),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.get_person_stats("  ", PersonRole::Director),
            Err(AppError::InvalidInput(_))
        ));
    }
}
