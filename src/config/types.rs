use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Siteseeker
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    pub output: OutputConfig,
}

/// Frontier and scheduling behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Community domains the first cycle starts from
    #[serde(default)]
    pub seed_domains: Vec<String>,

    /// Initial search vocabulary
    #[serde(default)]
    pub seed_keywords: Vec<String>,

    /// Hard ceiling on crawl cycles per run
    #[serde(default = "default_max_crawl_cycles")]
    pub max_crawl_cycles: u32,

    /// Delay between consecutive search dispatches against one domain (milliseconds)
    #[serde(default = "default_search_delay_ms")]
    pub search_delay_ms: u64,

    /// Delay between exploration batches (milliseconds)
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Exploration batch size; also the fetch pool width
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// A domain is no longer expanded once its retry count exceeds this
    #[serde(default = "default_max_domain_retries")]
    pub max_domain_retries: u32,

    /// A domain is no longer expanded once its keyword count exceeds this
    #[serde(default = "default_domain_discovery_limit")]
    pub domain_discovery_limit: usize,
}

impl CrawlerConfig {
    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn batch_size(&self) -> usize {
        self.max_concurrency.max(1) as usize
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_domains: Vec::new(),
            seed_keywords: Vec::new(),
            max_crawl_cycles: default_max_crawl_cycles(),
            search_delay_ms: default_search_delay_ms(),
            batch_delay_ms: default_batch_delay_ms(),
            max_concurrency: default_max_concurrency(),
            max_domain_retries: default_max_domain_retries(),
            domain_discovery_limit: default_domain_discovery_limit(),
        }
    }
}

/// Settings for the bundled HTTP fetch backend
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra attempts after a transient failure
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Search endpoint template; `{query}` is replaced by the encoded query
    #[serde(default = "default_search_url")]
    pub search_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            retry_limit: default_retry_limit(),
            retry_delay_ms: default_retry_delay_ms(),
            search_url: default_search_url(),
        }
    }
}

/// Keyword lists and host patterns used to classify extracted links
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClassifierConfig {
    #[serde(default)]
    pub gambling_indicators: Vec<String>,

    #[serde(default)]
    pub illegal_server_indicators: Vec<String>,

    #[serde(default)]
    pub ad_banner_indicators: Vec<String>,

    #[serde(default)]
    pub chat_invite_indicators: Vec<String>,

    #[serde(default)]
    pub community_indicators: Vec<String>,

    /// Hosts whose links are chat invites (e.g. "open.kakao.com", "*.discord.com")
    #[serde(default)]
    pub chat_invite_hosts: Vec<String>,

    /// Hosts known to be community sites
    #[serde(default)]
    pub community_hosts: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Path to the markdown export
    #[serde(default = "default_summary_path")]
    pub summary_path: String,
}

fn default_max_crawl_cycles() -> u32 {
    1000
}

fn default_search_delay_ms() -> u64 {
    1000
}

fn default_batch_delay_ms() -> u64 {
    500
}

fn default_max_concurrency() -> u32 {
    5
}

fn default_max_domain_retries() -> u32 {
    3
}

fn default_domain_discovery_limit() -> usize {
    200
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_retry_limit() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    5_000
}

fn default_search_url() -> String {
    "https://www.google.com/search?q={query}".to_string()
}

fn default_summary_path() -> String {
    "./targets.md".to_string()
}
