/// TMDB (The Movie Database) provider
///
/// Endpoints used:
/// 1. `/discover/movie?sort_by=popularity.desc&page=N` while no term is typed
/// 2. `/search/movie?query=TERM&page=N` for a search
/// 3. `/movie/{id}` for the detail view
///
/// Requests authenticate with the v4 read access token as a bearer token.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{ApiErrorBody, ApiMoviePage, MovieDetails, MoviePage, MovieQuery},
    services::providers::MetadataProvider,
};
use reqwest::{Client as HttpClient, Response, StatusCode};

const DISCOVER_SORT: &str = "popularity.desc";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
    cache_ttl: u64,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache: None,
            cache_ttl: 0,
        }
    }

    /// Serve repeated pages and details from Redis
    pub fn with_cache(mut self, cache: Cache, ttl_secs: u64) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl_secs;
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(format!("{}{}", self.api_url, path))
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
    }

    /// Turns a non-success response into an error, keeping TMDB's message for logs
    async fn reject(response: Response, what: &str) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.status_message)
            .unwrap_or(body);

        tracing::error!(
            status = %status,
            detail = %detail,
            "TMDB {} request failed",
            what
        );

        AppError::ExternalApi(format!("TMDB returned status {}: {}", status, detail))
    }

    async fn request_page(&self, query: &MovieQuery) -> AppResult<MoviePage> {
        let request = match query {
            MovieQuery::Discover { page } => self
                .get("/discover/movie")
                .query(&[("sort_by", DISCOVER_SORT.to_string()), ("page", page.to_string())]),
            // reqwest percent-encodes the term
            MovieQuery::Search { term, page } => self
                .get("/search/movie")
                .query(&[("query", term.clone()), ("page", page.to_string())]),
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::reject(response, "page").await);
        }

        let api_page: ApiMoviePage = response.json().await?;
        let page = MoviePage::try_from(api_page)?;

        tracing::info!(
            query = %query,
            results = page.results.len(),
            total_pages = page.total_pages,
            provider = "tmdb",
            "Movie page fetched"
        );

        Ok(page)
    }

    async fn request_movie(&self, movie_id: u64) -> AppResult<MovieDetails> {
        let response = self.get(&format!("/movie/{}", movie_id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Movie {} not found", movie_id)));
        }
        if !response.status().is_success() {
            return Err(Self::reject(response, "movie detail").await);
        }

        let details: MovieDetails = response.json().await?;

        tracing::info!(
            movie_id = movie_id,
            title = %details.title,
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(details)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_page(&self, query: &MovieQuery) -> AppResult<MoviePage> {
        if query.page() == 0 {
            return Err(AppError::InvalidInput("Pages start at 1".to_string()));
        }

        cached!(
            self.cache,
            CacheKey::MoviePage(query.clone()),
            self.cache_ttl,
            async move { self.request_page(query).await }
        )
    }

    async fn fetch_movie(&self, movie_id: u64) -> AppResult<MovieDetails> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(movie_id),
            self.cache_ttl,
            async move { self.request_movie(movie_id).await }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let provider = TmdbProvider::new("k".to_string(), "http://tmdb.local/3/".to_string());
        assert_eq!(provider.api_url, "http://tmdb.local/3");
        assert_eq!(provider.name(), "tmdb");
    }

    #[tokio::test]
    async fn test_page_zero_rejected_without_request() {
        let provider = TmdbProvider::new("k".to_string(), "http://127.0.0.1:1".to_string());
        let result = provider.fetch_page(&MovieQuery::Discover { page: 0 }).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_movie_details_deserialization() {
        let json = r#"{
            "id": 155,
            "title": "The Dark Knight",
            "poster_path": "/qJ2tW6WMUDux911r6m7haRef0WH.jpg",
            "vote_average": 8.5,
            "release_date": "2008-07-16",
            "original_language": "en",
            "overview": "Batman raises the stakes in his war on crime.",
            "runtime": 152,
            "genres": [{"id": 18, "name": "Drama"}, {"id": 28, "name": "Action"}]
        }"#;

        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.runtime, Some(152));
        assert_eq!(details.genres.len(), 2);
        assert_eq!(details.genres[1].name, "Action");
        assert_eq!(details.rating_label(), "8.5");
    }
}
