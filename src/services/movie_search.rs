use crate::{
    error::AppResult,
    models::{MovieDetails, MoviePage, MovieQuery},
    services::{popularity::PopularityCounter, providers::MetadataProvider},
};

/// Fetch one page of movies and count the search if it found anything
///
/// The popularity update runs detached; its outcome never affects the page
/// returned here.
pub async fn fetch_movies(
    provider: &dyn MetadataProvider,
    popularity: &PopularityCounter,
    query: &MovieQuery,
) -> AppResult<MoviePage> {
    let page = provider.fetch_page(query).await?;

    if let (Some(term), Some(first)) = (query.term(), page.results.first()) {
        popularity.spawn_record_hit(term, first.clone());
    }

    Ok(page)
}

pub async fn fetch_movie(provider: &dyn MetadataProvider, movie_id: u64) -> AppResult<MovieDetails> {
    provider.fetch_movie(movie_id).await
}
