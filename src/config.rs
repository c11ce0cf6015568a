use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// CSV file holding the movie catalog
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Binary file holding the precomputed similarity matrix
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// OMDb API base URL, used for poster lookups
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// OMDb API key. Poster lookups are disabled when absent.
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    /// Redis connection URL. Poster caching is disabled when absent.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Upper bound for a single poster lookup, in milliseconds
    #[serde(default = "default_artwork_timeout_ms")]
    pub artwork_timeout_ms: u64,
}

fn default_catalog_path() -> String {
    "data/movies.csv".to_string()
}

fn default_similarity_path() -> String {
    "data/similarity.bin".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_artwork_timeout_ms() -> u64 {
    2000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
