use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, UserAgentConfig, PAGE_PLACEHOLDER, START_PLACEHOLDER,
};
use crate::url::{extract_domain, matches_wildcard};
use crate::ConfigError;
use url::Url;

/// Upper bound for `concurrent-requests-per-domain`
const MAX_DOMAIN_CONCURRENCY: u32 = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_domains must list at least one domain".to_string(),
        ));
    }

    for pattern in &config.allowed_domains {
        validate_domain_pattern(pattern)?;
    }

    validate_list_url(config)?;

    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1".to_string(),
        ));
    }

    if let Some(pages) = config.pages {
        if pages < 1 || pages > config.max_pages {
            return Err(ConfigError::Validation(format!(
                "pages must be between 1 and max_pages ({}), got {}",
                config.max_pages, pages
            )));
        }
    }

    if config.concurrent_requests_per_domain < 1
        || config.concurrent_requests_per_domain > MAX_DOMAIN_CONCURRENCY
    {
        return Err(ConfigError::Validation(format!(
            "concurrent_requests_per_domain must be between 1 and {}, got {}",
            MAX_DOMAIN_CONCURRENCY, config.concurrent_requests_per_domain
        )));
    }

    if config.max_in_flight < 1 {
        return Err(ConfigError::Validation(
            "max_in_flight must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the list URL template and checks its host is allowed
fn validate_list_url(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if !config.list_url.contains(START_PLACEHOLDER) && !config.list_url.contains(PAGE_PLACEHOLDER) {
        return Err(ConfigError::Validation(format!(
            "list_url must contain the '{}' or '{}' placeholder, got '{}'",
            START_PLACEHOLDER, PAGE_PLACEHOLDER, config.list_url
        )));
    }

    let url = Url::parse(&config.list_page_url(1))
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid list_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "list_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    let domain = extract_domain(&url)
        .ok_or_else(|| ConfigError::InvalidUrl("list_url has no host".to_string()))?;

    if !config
        .allowed_domains
        .iter()
        .any(|pattern| matches_wildcard(pattern, &domain))
    {
        return Err(ConfigError::Validation(format!(
            "list_url host '{}' is not in allowed_domains",
            domain
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "data_directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    if let Some(domain) = pattern.strip_prefix("*.") {
        validate_domain_string(domain)
    } else {
        validate_domain_string(pattern)
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
