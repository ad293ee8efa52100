use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{models::PopularityRecord, routes::AppState};

/// Upper bound on what a client may ask for
const MAX_TRENDING: usize = 50;

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    limit: Option<usize>,
}

/// Most searched terms, highest count first
///
/// Popularity is auxiliary, so a store outage yields an empty list rather
/// than an error.
pub async fn top(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendingParams>,
) -> Json<Vec<PopularityRecord>> {
    let limit = params
        .limit
        .unwrap_or(state.trending_limit)
        .min(MAX_TRENDING);
    Json(state.popularity.top_hits(limit).await)
}
