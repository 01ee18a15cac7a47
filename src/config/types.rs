use serde::Deserialize;

/// Main configuration structure for anidump
///
/// Every section is optional; an absent section takes the defaults that
/// point at the public AniLibria endpoints and a `dump/` directory relative
/// to the working directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Location of the sitemap document
    #[serde(rename = "sitemap-url")]
    pub sitemap_url: String,

    /// Release metadata endpoint, queried with `?code=<identifier>`
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// Host that relative poster paths are resolved against
    #[serde(rename = "poster-base-url")]
    pub poster_base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sitemap_url: "https://anilibria.tv/sitemap.xml".to_string(),
            api_url: "https://api.anilibria.tv/v2/gettitle".to_string(),
            poster_base_url: "https://anilibria.tv".to_string(),
        }
    }
}

/// Shortest pause the remote API tolerates between releases (milliseconds)
pub const MIN_REQUEST_DELAY: u64 = 600;

/// Crawler pacing and timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Pause after each release (milliseconds, at least [`MIN_REQUEST_DELAY`])
    #[serde(rename = "request-delay")]
    pub request_delay: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout")]
    pub connect_timeout: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_delay: MIN_REQUEST_DELAY,
            request_timeout: 30,
            connect_timeout: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Root of the dump tree
    #[serde(rename = "dump-dir")]
    pub dump_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dump_dir: "dump".to_string(),
        }
    }
}
