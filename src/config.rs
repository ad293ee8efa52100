use std::time::Duration;

use serde::Deserialize;

/// Which backing store tallies search-term popularity
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PopularityBackend {
    /// Process-local map, lost on restart
    #[default]
    Memory,
    /// Redis sorted set with atomic increments
    Redis,
    /// Appwrite-style document database over REST
    Appwrite,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB v4 read access token (sent as a bearer token)
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with a movie's poster path to build the poster URL
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Quiet window before a typed search term is sent upstream
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// How many entries the trending list shows
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,

    #[serde(default)]
    pub popularity_backend: PopularityBackend,

    /// Redis connection URL. Enables the TMDB response cache when set.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// TTL for cached TMDB responses
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_appwrite_endpoint")]
    pub appwrite_endpoint: String,

    #[serde(default)]
    pub appwrite_project_id: String,

    /// Server API key; optional when the collection allows guest writes
    #[serde(default)]
    pub appwrite_api_key: Option<String>,

    #[serde(default)]
    pub appwrite_database_id: String,

    #[serde(default)]
    pub appwrite_collection_id: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_trending_limit() -> usize {
    5
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_appwrite_endpoint() -> String {
    "https://cloud.appwrite.io/v1".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects combinations that would only fail later at request time
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.popularity_backend {
            PopularityBackend::Redis if self.redis_url.is_none() => {
                anyhow::bail!("POPULARITY_BACKEND=redis requires REDIS_URL")
            }
            PopularityBackend::Appwrite
                if self.appwrite_project_id.is_empty()
                    || self.appwrite_database_id.is_empty()
                    || self.appwrite_collection_id.is_empty() =>
            {
                anyhow::bail!(
                    "POPULARITY_BACKEND=appwrite requires APPWRITE_PROJECT_ID, \
                     APPWRITE_DATABASE_ID and APPWRITE_COLLECTION_ID"
                )
            }
            _ => Ok(()),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
