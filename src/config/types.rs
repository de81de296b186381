use serde::Deserialize;
use std::time::Duration;

/// Largest response body the link extractor will read (5 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// URLs scraped when no configuration file names any
pub const DEFAULT_SEED_URLS: &[&str] = &[
    "http://example.com",
    "http://www.iana.org/domains/example",
    "https://www.w3.org/Consortium/fees",
    "https://www.google.com/search?q=golang",
    "http://nonexistent.invalid",
    "https://go.dev/",
    "https://pkg.go.dev/",
    "https://tour.golang.org/welcome/1",
];

/// Twice the available parallelism, between 1 and 256
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(1)
        .clamp(1, 256)
}

/// Main configuration structure for linkscrape
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub seeds: SeedConfig,
}

/// Worker pool and deadline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of concurrent workers
    pub workers: usize,

    /// Deadline for the whole run (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Timeout for a single HTTP request (seconds)
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// Largest response body read per page (bytes)
    #[serde(rename = "max-body-bytes")]
    pub max_body_bytes: usize,
}

impl PipelineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            timeout_secs: 30,
            fetch_timeout_secs: 10,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the scraper
    pub name: String,

    /// Version of the scraper
    pub version: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "linkscrape".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "scraper.db".to_string(),
        }
    }
}

/// URLs to scrape
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub urls: Vec<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            urls: DEFAULT_SEED_URLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
