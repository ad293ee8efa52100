use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::AppError;

/// Placeholder image used by cards when a movie has no poster
pub const NO_POSTER_IMAGE: &str = "./No-Poster.png";

const SOFT_FAILURE_DEFAULT: &str = "Failed to fetch movies";

/// One page request against the metadata provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MovieQuery {
    /// Popularity-sorted listing, used while no search term is present
    Discover { page: u32 },
    /// Free-text title search
    Search { term: String, page: u32 },
}

impl MovieQuery {
    /// Builds the query for a term as typed. Whitespace-only terms discover.
    pub fn for_term(term: &str, page: u32) -> Self {
        let term = term.trim();
        if term.is_empty() {
            MovieQuery::Discover { page }
        } else {
            MovieQuery::Search {
                term: term.to_string(),
                page,
            }
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            MovieQuery::Discover { page } | MovieQuery::Search { page, .. } => *page,
        }
    }

    /// The search term, if this is a search
    pub fn term(&self) -> Option<&str> {
        match self {
            MovieQuery::Discover { .. } => None,
            MovieQuery::Search { term, .. } => Some(term),
        }
    }
}

impl Display for MovieQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovieQuery::Discover { page } => write!(f, "discover:{}", page),
            MovieQuery::Search { term, page } => write!(f, "search:{}:{}", term, page),
        }
    }
}

/// A movie as listed in search and discover results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub overview: String,
}

impl Movie {
    /// Full poster URL, if the movie has a poster
    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        poster_url(image_base_url, self.poster_path.as_deref())
    }

    /// Poster URL for display, falling back to the placeholder image
    pub fn poster_or_placeholder(&self, image_base_url: &str) -> String {
        self.poster_url(image_base_url)
            .unwrap_or_else(|| NO_POSTER_IMAGE.to_string())
    }

    pub fn rating_label(&self) -> String {
        rating_label(self.vote_average)
    }

    pub fn year_label(&self) -> String {
        release_year(self.release_date.as_deref())
            .map(|year| year.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn language_label(&self) -> String {
        self.original_language.to_uppercase()
    }
}

/// Genre attached to a movie's detail record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Full movie record from the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl MovieDetails {
    pub fn rating_label(&self) -> String {
        rating_label(self.vote_average)
    }

    pub fn release_date_label(&self) -> &str {
        match self.release_date.as_deref() {
            Some(date) if !date.is_empty() => date,
            _ => "N/A",
        }
    }

    pub fn runtime_label(&self) -> String {
        match self.runtime {
            Some(minutes) if minutes > 0 => format!("{} minutes", minutes),
            _ => "N/A".to_string(),
        }
    }

    pub fn overview_text(&self) -> &str {
        match self.overview.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => "No overview available.",
        }
    }
}

/// One page of movie results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoviePage {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub results: Vec<Movie>,
}

/// Search-term popularity tally
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopularityRecord {
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    pub poster_url: Option<String>,
}

fn poster_url(image_base_url: &str, poster_path: Option<&str>) -> Option<String> {
    poster_path
        .filter(|path| !path.is_empty())
        .map(|path| format!("{}{}", image_base_url.trim_end_matches('/'), path))
}

fn rating_label(vote_average: Option<f64>) -> String {
    match vote_average {
        Some(vote) if vote > 0.0 => format!("{:.1}", vote),
        _ => "N/A".to_string(),
    }
}

fn release_year(release_date: Option<&str>) -> Option<i32> {
    let date = release_date.filter(|d| !d.is_empty())?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.year())
        .ok()
        .or_else(|| date.split('-').next()?.parse().ok())
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw list response from `/search/movie` and `/discover/movie`
///
/// A failed request may still come back as 200 with `success: false` and a
/// `status_message`, and without `results`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMoviePage {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub results: Option<Vec<Movie>>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status_message: Option<String>,
}

impl TryFrom<ApiMoviePage> for MoviePage {
    type Error = AppError;

    fn try_from(api: ApiMoviePage) -> Result<Self, Self::Error> {
        let results = match (api.success, api.results) {
            (Some(false), _) | (_, None) => {
                let message = api
                    .status_message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| SOFT_FAILURE_DEFAULT.to_string());
                return Err(AppError::SoftFailure(message));
            }
            (_, Some(results)) => results,
        };

        Ok(MoviePage {
            page: api.page.unwrap_or(1),
            total_pages: api.total_pages.unwrap_or(0),
            total_results: api.total_results.unwrap_or(results.len() as u64),
            results,
        })
    }
}

/// Error body TMDB sends alongside non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status_message: Option<String>,
}

// ============================================================================
// Document Store Types
// ============================================================================

/// Popularity document as stored in the document database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityDocument {
    #[serde(rename = "$id", default, skip_serializing)]
    pub id: String,
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    #[serde(default)]
    pub poster_url: Option<String>,
}

impl From<PopularityDocument> for PopularityRecord {
    fn from(doc: PopularityDocument) -> Self {
        PopularityRecord {
            search_term: doc.search_term,
            count: doc.count,
            movie_id: doc.movie_id,
            poster_url: doc.poster_url,
        }
    }
}

/// Document list envelope
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList {
    pub documents: Vec<PopularityDocument>,
}
