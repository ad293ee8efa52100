use axum::{
    extract::{Path, Query, State},
    response::Response,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{Movie, MovieDetails, MovieQuery},
    routes::AppState,
    services::{movie_search, pagination::PaginationControls},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    query: String,
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub results: Vec<Movie>,
    pub pagination: PaginationControls,
}

/// Discover (no query) or search (with query) one page of movies
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<MovieListResponse>> {
    if params.page < 1 {
        return Err(AppError::InvalidInput("page must be at least 1".to_string()));
    }

    let query = MovieQuery::for_term(&params.query, params.page);
    tracing::info!(request_id = %request_id, query = %query, "Listing movies");

    let page =
        movie_search::fetch_movies(state.provider.as_ref(), &state.popularity, &query).await?;

    Ok(Json(MovieListResponse {
        pagination: PaginationControls::new(page.page, page.total_pages),
        page: page.page,
        total_pages: page.total_pages,
        total_results: page.total_results,
        results: page.results,
    }))
}

/// Full record for the detail view
///
/// Failures other than a missing movie carry the detail view's message,
/// not the list's.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<MovieDetails>, Response> {
    movie_search::fetch_movie(state.provider.as_ref(), id)
        .await
        .map(Json)
        .map_err(AppError::into_detail_response)
}
