use serde::Deserialize;

/// Placeholder substituted with the 1-based list page number in `list-url`
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Placeholder substituted with the 1-based offset of the page's first result
///
/// The warnings listing paginates by result offset: page `p` starts at
/// result `(p - 1) * page-size + 1`.
pub const START_PLACEHOLDER: &str = "{start}";

/// Main configuration structure
///
/// Built once at start-up and shared read-only for the whole run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Listing URL template; `{start}` is replaced with the first result's
    /// offset and `{page}` with the page number
    #[serde(rename = "list-url")]
    pub list_url: String,

    /// Domains the crawler may request (exact or `*.example.com`)
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// Number of results shown per list page
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Explicit number of list pages to crawl; derived from the first page when absent
    pub pages: Option<u32>,

    /// Upper bound on the number of list pages a run may visit
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Minimum time between requests to the same domain (milliseconds)
    #[serde(rename = "download-delay-ms")]
    pub download_delay_ms: u64,

    /// Maximum number of concurrent requests to one domain
    #[serde(rename = "concurrent-requests-per-domain")]
    pub concurrent_requests_per_domain: u32,

    /// Maximum number of requests the driver keeps in flight
    #[serde(rename = "max-in-flight")]
    pub max_in_flight: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            list_url: "https://www.fma.govt.nz/news-and-resources/warnings-and-alerts/?start={start}"
                .to_string(),
            allowed_domains: vec!["www.fma.govt.nz".to_string()],
            page_size: 10,
            pages: None,
            max_pages: 1000,
            download_delay_ms: 5000,
            concurrent_requests_per_domain: 2,
            max_in_flight: 8,
        }
    }
}

impl CrawlerConfig {
    /// Builds the URL string of a given 1-based list page
    pub fn list_page_url(&self, page: u32) -> String {
        self.list_url
            .replace(START_PLACEHOLDER, &self.page_start(page).to_string())
            .replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    /// Offset of the first result shown on `page` (1-based)
    pub fn page_start(&self, page: u32) -> u64 {
        u64::from(page.saturating_sub(1)) * u64::from(self.page_size.max(1)) + 1
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "fma-warnings".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://www.fma.govt.nz/".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one JSON file per warning
    #[serde(rename = "data-directory")]
    pub data_directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_directory: "../data/data_scraped".to_string(),
        }
    }
}
