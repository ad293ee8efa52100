use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{error::AppResult, models::PopularityRecord, services::popularity::PopularityStore};

/// Process-local popularity store
///
/// Increment-or-insert happens under one write lock, so concurrent hits on the
/// same term never create duplicates or lose counts.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, PopularityRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PopularityStore for MemoryStore {
    async fn increment_or_insert(
        &self,
        term: &str,
        movie_id: u64,
        poster_url: Option<String>,
    ) -> AppResult<PopularityRecord> {
        let mut records = self.records.write().await;
        let record = records
            .entry(term.to_string())
            .and_modify(|r| r.count += 1)
            .or_insert_with(|| PopularityRecord {
                search_term: term.to_string(),
                count: 1,
                movie_id,
                poster_url,
            });
        Ok(record.clone())
    }

    async fn top(&self, limit: usize) -> AppResult<Vec<PopularityRecord>> {
        let records = self.records.read().await;
        let mut top: Vec<PopularityRecord> = records.values().cloned().collect();
        // Ties broken by term so the order is stable
        top.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.search_term.cmp(&b.search_term))
        });
        top.truncate(limit);
        Ok(top)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
