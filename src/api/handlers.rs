use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{
        MonthCountResponse, PersonRole, PersonStatsResponse, RecommendationResponse,
        ScoreResponse, VotesResponse, WeekdayCountResponse,
    },
    services::attach_posters,
};

use super::AppState;

const DEFAULT_RECOMMENDATIONS: usize = 5;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub n_recommendations: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_rows: usize,
    pub matrix_size: usize,
    pub index_in_sync: bool,
}

// Handlers

pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Bienvenido a la API de consulta de películas",
    })
}

/// Health check endpoint, reports whether the index matches the catalog
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let recommender = &state.inner.recommender;
    let catalog_rows = recommender.catalog().len();
    let matrix_size = recommender.matrix().size();

    Json(HealthResponse {
        status: "healthy",
        catalog_rows,
        matrix_size,
        index_in_sync: catalog_rows == matrix_size,
    })
}

/// Number of releases in a Spanish-named month
pub async fn month_count(
    State(state): State<AppState>,
    Path(mes): Path<String>,
) -> AppResult<Json<MonthCountResponse>> {
    Ok(Json(state.inner.queries.get_month_count(&mes)?))
}

/// Number of releases on a Spanish-named weekday
pub async fn weekday_count(
    State(state): State<AppState>,
    Path(dia): Path<String>,
) -> AppResult<Json<WeekdayCountResponse>> {
    Ok(Json(state.inner.queries.get_weekday_count(&dia)?))
}

pub async fn score(
    State(state): State<AppState>,
    Path(titulo): Path<String>,
) -> AppResult<Json<ScoreResponse>> {
    Ok(Json(state.inner.queries.get_score(&titulo)?))
}

pub async fn votes(
    State(state): State<AppState>,
    Path(titulo): Path<String>,
) -> AppResult<Json<VotesResponse>> {
    Ok(Json(state.inner.queries.get_votes(&titulo)?))
}

pub async fn actor(
    State(state): State<AppState>,
    Path(nombre): Path<String>,
) -> AppResult<Json<PersonStatsResponse>> {
    Ok(Json(
        state.inner.queries.get_person_stats(&nombre, PersonRole::Actor)?,
    ))
}

pub async fn director(
    State(state): State<AppState>,
    Path(nombre): Path<String>,
) -> AppResult<Json<PersonStatsResponse>> {
    Ok(Json(
        state.inner.queries.get_person_stats(&nombre, PersonRole::Director)?,
    ))
}

/// Similar movies for a title, with posters attached when available
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(titulo): Path<String>,
    params: Result<Query<RecommendationParams>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Query(params) = params.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
    let count = params.n_recommendations.unwrap_or(DEFAULT_RECOMMENDATIONS);

    tracing::info!(
        request_id = %request_id,
        title = %titulo,
        count,
        "Processing recommendation request"
    );

    let mut response = state.inner.recommender.recommend(&titulo, count)?;

    attach_posters(
        state.inner.artwork.clone(),
        &mut response.recommendations,
        state.inner.artwork_timeout,
    )
    .await;

    tracing::info!(
        request_id = %request_id,
        strategy = ?response.strategy,
        returned = response.recommendations.len(),
        "Recommendations completed"
    );

    Ok(Json(response))
}
