use crate::config::types::{ClassifierConfig, Config, CrawlerConfig, FetchConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_classifier_config(&config.classifier)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates seeds and frontier limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if !config.seed_domains.iter().any(|d| !d.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "seed-domains must contain at least one domain".to_string(),
        ));
    }

    if !config.seed_keywords.iter().any(|k| !k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "seed-keywords must contain at least one keyword".to_string(),
        ));
    }

    if config.max_concurrency < 1 || config.max_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrency must be between 1 and 100, got {}",
            config.max_concurrency
        )));
    }

    if config.max_crawl_cycles < 1 {
        return Err(ConfigError::Validation(
            "max-crawl-cycles must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout-ms must be greater than zero".to_string(),
        ));
    }

    if !config.search_url.contains("{query}") {
        return Err(ConfigError::Validation(format!(
            "search-url must contain a {{query}} placeholder, got '{}'",
            config.search_url
        )));
    }

    let probe = config.search_url.replace("{query}", "probe");
    Url::parse(&probe)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search-url: {}", e)))?;

    Ok(())
}

fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    for pattern in config
        .chat_invite_hosts
        .iter()
        .chain(config.community_hosts.iter())
    {
        validate_host_pattern(pattern)?;
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a host pattern (supports a leading `*.` wildcard)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    let host = pattern.strip_prefix("*.").unwrap_or(pattern);

    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "Host pattern '{}' has no host",
            pattern
        )));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' has a misplaced dot",
            host
        )));
    }

    if !host.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' must contain at least one dot (e.g., 'discord.gg')",
            host
        )));
    }

    Ok(())
}
