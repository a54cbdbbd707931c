use crate::config::types::{Config, CrawlerConfig, UserAgentConfig};
use crate::url::{extract_host, fix_url};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Upper bound on concurrent fetches
const MAX_TASKS_LIMIT: usize = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_roots(&config.roots)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates root URLs
///
/// Bare hosts are accepted; each root must parse after `fix_url` and name a
/// host.
fn validate_roots(roots: &[String]) -> Result<(), ConfigError> {
    if roots.is_empty() {
        return Err(ConfigError::Validation(
            "at least one root URL is required".to_string(),
        ));
    }

    for root in roots {
        let fixed = fix_url(root);
        let url = Url::parse(&fixed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root '{}': {}", root, e)))?;

        if extract_host(&url).is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Root '{}' has no host",
                root
            )));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_redirect >= 0 is always true for u32; zero disables redirects

    if config.max_tries < 1 {
        return Err(ConfigError::Validation(format!(
            "max-tries must be >= 1, got {}",
            config.max_tries
        )));
    }

    if config.max_tasks < 1 || config.max_tasks > MAX_TASKS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-tasks must be between 1 and {}, got {}",
            MAX_TASKS_LIMIT, config.max_tasks
        )));
    }

    if let Some(pattern) = &config.exclude {
        Regex::new(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("Invalid exclude pattern '{}': {}", pattern, e))
        })?;
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    // Contact URL is optional
    if !config.contact_url.is_empty() {
        Url::parse(&config.contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}
