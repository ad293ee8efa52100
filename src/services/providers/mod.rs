/// Movie metadata provider abstraction
///
/// The search loop and the HTTP routes only talk to [`MetadataProvider`], so
/// TMDB can be swapped for a stub in tests or another catalogue later.
use crate::{
    error::AppResult,
    models::{MovieDetails, MoviePage, MovieQuery},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch one page of discover or search results
    ///
    /// Soft failures reported inside a 200 response surface as
    /// [`AppError::SoftFailure`](crate::error::AppError::SoftFailure).
    async fn fetch_page(&self, query: &MovieQuery) -> AppResult<MoviePage>;

    /// Fetch the full record for one movie
    async fn fetch_movie(&self, movie_id: u64) -> AppResult<MovieDetails>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
