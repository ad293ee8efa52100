use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use crate::{
    config::{Config, PopularityBackend},
    db::{create_redis_client, Cache, CacheWriterHandle},
    routes::{create_router, AppState},
    services::{
        popularity::{
            appwrite::AppwriteSettings, AppwriteStore, MemoryStore, PopularityCounter,
            PopularityFailure, PopularityStore, RedisStore,
        },
        providers::{MetadataProvider, TmdbProvider},
    },
};

/// Long-lived services wired from [`Config`]
pub struct Components {
    pub provider: Arc<dyn MetadataProvider>,
    pub popularity: PopularityCounter,
    cache_writer: Option<CacheWriterHandle>,
}

impl Components {
    /// Builds the provider, optional response cache and popularity store.
    /// Must run inside a tokio runtime; the cache writer is spawned here.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let redis_client = config
            .redis_url
            .as_deref()
            .map(create_redis_client)
            .transpose()
            .context("Invalid REDIS_URL")?;

        let mut provider = TmdbProvider::new(config.tmdb_api_key.clone(), config.tmdb_api_url.clone());
        let mut cache_writer = None;
        if let Some(client) = &redis_client {
            let (cache, handle) = Cache::new(client.clone());
            provider = provider.with_cache(cache, config.cache_ttl_secs);
            cache_writer = Some(handle);
        }

        let store: Arc<dyn PopularityStore> = match config.popularity_backend {
            PopularityBackend::Memory => Arc::new(MemoryStore::new()),
            PopularityBackend::Redis => {
                let client = redis_client.context("POPULARITY_BACKEND=redis requires REDIS_URL")?;
                Arc::new(RedisStore::new(client))
            }
            PopularityBackend::Appwrite => Arc::new(AppwriteStore::new(AppwriteSettings {
                endpoint: config.appwrite_endpoint.clone(),
                project_id: config.appwrite_project_id.clone(),
                api_key: config.appwrite_api_key.clone(),
                database_id: config.appwrite_database_id.clone(),
                collection_id: config.appwrite_collection_id.clone(),
            })),
        };

        tracing::info!(
            provider = provider.name(),
            popularity_store = store.name(),
            response_cache = cache_writer.is_some(),
            "Components initialized"
        );

        let (popularity, failures) =
            PopularityCounter::new(store, config.tmdb_image_base_url.clone()).with_error_channel();
        tokio::spawn(watch_popularity_failures(failures));

        Ok(Self {
            provider: Arc::new(provider),
            popularity,
            cache_writer,
        })
    }

    /// Flush queued cache writes
    pub async fn shutdown(self) {
        if let Some(handle) = self.cache_writer {
            handle.shutdown().await;
        }
    }
}

/// Keeps a running tally of failed popularity updates
///
/// Each failure is already logged where it happened; this only makes a
/// store that keeps failing visible as one escalating warning.
async fn watch_popularity_failures(mut failures: mpsc::UnboundedReceiver<PopularityFailure>) {
    let mut total: u64 = 0;
    while let Some(failure) = failures.recv().await {
        total += 1;
        if total.is_power_of_two() {
            tracing::warn!(
                failures = total,
                last_term = %failure.search_term,
                last_error = %failure.error,
                "Popularity tracking is failing"
            );
        }
    }
}

/// Run the HTTP API until Ctrl-C
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let components = Components::from_config(&config)?;

    let state = Arc::new(AppState {
        provider: components.provider.clone(),
        popularity: components.popularity.clone(),
        trending_limit: config.trending_limit,
    });
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    components.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
