use std::collections::HashMap;

use redis::Client;

use crate::{
    error::{AppError, AppResult},
    models::PopularityRecord,
    services::popularity::PopularityStore,
};

const COUNTS_KEY: &str = "popularity:counts";

/// Popularity store on a Redis sorted set
///
/// Counts live in one sorted set (member = term, score = hits) and the seed
/// movie of each term in a hash. Each hit is a single MULTI/EXEC of `ZINCRBY`
/// and `HSETNX`, so concurrent writers cannot duplicate a term or lose a count.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn meta_key(term: &str) -> String {
        format!("popularity:term:{}", term)
    }

    fn to_record(term: String, score: f64, meta: HashMap<String, String>) -> AppResult<PopularityRecord> {
        let movie_id = meta
            .get("movie_id")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| {
                AppError::DocumentStore(format!("Popularity entry '{}' has no movie id", term))
            })?;

        Ok(PopularityRecord {
            poster_url: meta.get("poster_url").cloned(),
            search_term: term,
            count: score.max(0.0) as u64,
            movie_id,
        })
    }
}

#[async_trait::async_trait]
impl PopularityStore for RedisStore {
    async fn increment_or_insert(
        &self,
        term: &str,
        movie_id: u64,
        poster_url: Option<String>,
    ) -> AppResult<PopularityRecord> {
        let meta_key = Self::meta_key(term);
        let mut pipe = redis::pipe();
        pipe.atomic()
            .zincr(COUNTS_KEY, term, 1)
            .hset_nx(&meta_key, "movie_id", movie_id)
            .ignore();
        if let Some(url) = &poster_url {
            pipe.hset_nx(&meta_key, "poster_url", url).ignore();
        }
        pipe.hgetall(&meta_key);

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let (score, meta): (f64, HashMap<String, String>) = pipe.query_async(&mut conn).await?;

        Self::to_record(term.to_string(), score, meta)
    }

    async fn top(&self, limit: usize) -> AppResult<Vec<PopularityRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let ranked: Vec<(String, f64)> = redis::cmd("ZREVRANGE")
            .arg(COUNTS_KEY)
            .arg(0)
            .arg(limit as isize - 1)
            .arg("WITHSCORES")
            .query_async(&mut conn)
            .await?;

        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for (term, _) in &ranked {
            pipe.hgetall(Self::meta_key(term));
        }
        let metas: Vec<HashMap<String, String>> = pipe.query_async(&mut conn).await?;

        let mut records = Vec::with_capacity(ranked.len());
        for ((term, score), meta) in ranked.into_iter().zip(metas) {
            match Self::to_record(term, score, meta) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(error = %e, "Skipping incomplete popularity entry"),
            }
        }
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_key() {
        assert_eq!(RedisStore::meta_key("batman"), "popularity:term:batman");
    }

    #[test]
    fn test_to_record_reads_meta() {
        let meta = HashMap::from([
            ("movie_id".to_string(), "268".to_string()),
            ("poster_url".to_string(), "https://img/x.jpg".to_string()),
        ]);
        let record = RedisStore::to_record("batman".to_string(), 3.0, meta).unwrap();
        assert_eq!(record.count, 3);
        assert_eq!(record.movie_id, 268);
        assert_eq!(record.poster_url.as_deref(), Some("https://img/x.jpg"));
    }

    #[test]
    fn test_to_record_without_movie_id_fails() {
        let result = RedisStore::to_record("batman".to_string(), 1.0, HashMap::new());
        assert!(matches!(result, Err(AppError::DocumentStore(_))));
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_increment_or_insert_round_trip() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let client = Client::open(url).unwrap();
        let store = RedisStore::new(client.clone());
        let term = format!("test-term-{}", uuid::Uuid::new_v4());

        let first = store.increment_or_insert(&term, 268, None).await.unwrap();
        let second = store.increment_or_insert(&term, 999, None).await.unwrap();
        assert_eq!(first.count, 1);
        assert_eq!(second.count, 2);
        assert_eq!(second.movie_id, 268);

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = redis::pipe()
            .zrem(COUNTS_KEY, &term)
            .ignore()
            .del(RedisStore::meta_key(&term))
            .ignore()
            .query_async(&mut conn)
            .await
            .unwrap();
    }
}
