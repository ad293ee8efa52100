//! Search-term popularity tally.
//!
//! Every successful search with at least one result bumps a per-term counter,
//! and the trending list reads the highest counters back. None of this is
//! needed to browse movies, so both directions are best effort: failures are
//! logged, optionally forwarded on an error channel, and never reach the
//! search results.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    error::{AppError, AppResult},
    models::{Movie, PopularityRecord},
};

pub mod appwrite;
pub mod memory;
pub mod redis;

pub use appwrite::AppwriteStore;
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

/// Backing store for popularity records
///
/// `increment_or_insert` must leave at most one record per term. Stores that
/// can do it atomically should; the rest document their race window.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PopularityStore: Send + Sync {
    /// Bump the counter for `term`, creating it at 1 with the given movie
    async fn increment_or_insert(
        &self,
        term: &str,
        movie_id: u64,
        poster_url: Option<String>,
    ) -> AppResult<PopularityRecord>;

    /// Records with the highest counters first
    async fn top(&self, limit: usize) -> AppResult<Vec<PopularityRecord>>;

    fn name(&self) -> &'static str;
}

/// A popularity update that did not make it to the store
#[derive(Debug)]
pub struct PopularityFailure {
    pub search_term: String,
    pub error: AppError,
}

#[derive(Clone)]
pub struct PopularityCounter {
    store: Arc<dyn PopularityStore>,
    image_base_url: String,
    errors: Option<mpsc::UnboundedSender<PopularityFailure>>,
}

impl PopularityCounter {
    pub fn new(store: Arc<dyn PopularityStore>, image_base_url: impl Into<String>) -> Self {
        Self {
            store,
            image_base_url: image_base_url.into(),
            errors: None,
        }
    }

    /// Also report failed updates on a channel
    pub fn with_error_channel(mut self) -> (Self, mpsc::UnboundedReceiver<PopularityFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.errors = Some(tx);
        (self, rx)
    }

    /// Count one successful search of `term`, seeded by its first result
    ///
    /// Returns the updated record, or `None` when the term is blank or the
    /// store failed.
    pub async fn record_hit(&self, term: &str, movie: &Movie) -> Option<PopularityRecord> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        let poster_url = movie.poster_url(&self.image_base_url);
        match self
            .store
            .increment_or_insert(term, movie.id, poster_url)
            .await
        {
            Ok(record) => {
                tracing::debug!(
                    search_term = %record.search_term,
                    count = record.count,
                    store = self.store.name(),
                    "Search popularity recorded"
                );
                Some(record)
            }
            Err(error) => {
                tracing::error!(
                    search_term = %term,
                    error = %error,
                    store = self.store.name(),
                    "Failed to record search popularity"
                );
                if let Some(errors) = &self.errors {
                    let _ = errors.send(PopularityFailure {
                        search_term: term.to_string(),
                        error,
                    });
                }
                None
            }
        }
    }

    /// Run [`record_hit`](Self::record_hit) on a detached task
    pub fn spawn_record_hit(&self, term: &str, movie: Movie) -> JoinHandle<()> {
        let counter = self.clone();
        let term = term.to_string();
        tokio::spawn(async move {
            counter.record_hit(&term, &movie).await;
        })
    }

    /// Most searched terms, highest first. Empty when the store is unavailable.
    pub async fn top_hits(&self, limit: usize) -> Vec<PopularityRecord> {
        if limit == 0 {
            return Vec::new();
        }

        match self.store.top(limit).await {
            Ok(mut records) => {
                records.truncate(limit);
                records
            }
            Err(error) => {
                tracing::error!(
                    error = %error,
                    store = self.store.name(),
                    "Failed to load trending searches"
                );
                Vec::new()
            }
        }
    }
}
