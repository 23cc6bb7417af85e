use crate::config::types::{
    Config, CrawlerConfig, FeedConfig, FilterConfig, OutputConfig, UserAgentConfig,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_feed_config(&config.feed)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_filter_config(&config.filters)?;
    Ok(())
}

/// Validates the feed location
fn validate_feed_config(config: &FeedConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    if !config.feed_path.is_empty() && !config.feed_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "feed_path must start with '/', got '{}'",
            config.feed_path
        )));
    }

    if config.page_param.is_empty() {
        return Err(ConfigError::Validation(
            "page_param cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.lower_bound < 1 {
        return Err(ConfigError::Validation(
            "lower_bound must be >= 1".to_string(),
        ));
    }

    if config.upper_estimate < config.lower_bound {
        return Err(ConfigError::Validation(format!(
            "upper_estimate ({}) must be >= lower_bound ({})",
            config.upper_estimate, config.lower_bound
        )));
    }

    validate_page_range(config.start_page, config.end_page)?;

    if config.progress_interval < 1 {
        return Err(ConfigError::Validation(
            "progress_interval must be >= 1".to_string(),
        ));
    }

    if config.fetch_timeout_secs < 1 || config.download_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got fetch={}s download={}s",
            config.fetch_timeout_secs, config.download_timeout_secs
        )));
    }

    if config.chunk_size < 512 {
        return Err(ConfigError::Validation(format!(
            "chunk_size must be >= 512 bytes, got {}",
            config.chunk_size
        )));
    }

    Ok(())
}

/// Validates a start/end page pair
///
/// Shared with the command line, where the range may come from a prompt.
pub fn validate_page_range(start: u32, end: Option<u32>) -> ConfigResult<()> {
    if start < 1 {
        return Err(ConfigError::Validation(
            "start_page must be >= 1".to_string(),
        ));
    }

    if let Some(end) = end {
        if end < start {
            return Err(ConfigError::Validation(format!(
                "end_page ({}) must be >= start_page ({})",
                end, start
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
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
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.download_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "download_root cannot be empty".to_string(),
        ));
    }

    if let Some(summary) = &config.summary_path {
        if summary.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the heuristic tables
fn validate_filter_config(config: &FilterConfig) -> ConfigResult<()> {
    if config.source_attributes.is_empty() {
        return Err(ConfigError::Validation(
            "source_attributes must name at least one attribute".to_string(),
        ));
    }

    if config.source_attributes.iter().any(|a| a.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "source_attributes cannot contain empty names".to_string(),
        ));
    }

    // An empty pattern would match every URL and silently discard all images
    if config.skip_patterns.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "skip_patterns cannot contain empty strings".to_string(),
        ));
    }

    if config.fallback_extension.is_empty()
        || !config
            .fallback_extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::Validation(format!(
            "fallback_extension must be non-empty and alphanumeric, got '{}'",
            config.fallback_extension
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> ConfigResult<()> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
