//! Semantic validation of loaded configurations

use crate::config::types::Config;
use crate::ConfigError;

/// Validates a parsed configuration
///
/// Checks that numeric ranges make sense and that the search base URL is an
/// absolute HTTP(S) URL. Returns the first violation found.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.harvest.pages == 0 {
        return Err(ConfigError::Validation(
            "harvest.pages must be at least 1".to_string(),
        ));
    }

    if config.harvest.max_articles_per_page == 0 {
        return Err(ConfigError::Validation(
            "harvest.max-articles-per-page must be at least 1".to_string(),
        ));
    }

    if config.harvest.short_term.trim().is_empty() || config.harvest.long_term.trim().is_empty() {
        return Err(ConfigError::Validation(
            "harvest search terms must not be empty".to_string(),
        ));
    }

    if config.harvest.term_variants.is_empty() {
        return Err(ConfigError::Validation(
            "harvest.term-variants must name at least one variant".to_string(),
        ));
    }

    match url::Url::parse(&config.search.base_url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        Ok(parsed) => {
            return Err(ConfigError::Validation(format!(
                "search.base-url must be http(s), got scheme '{}'",
                parsed.scheme()
            )));
        }
        Err(e) => {
            return Err(ConfigError::Validation(format!(
                "search.base-url is not a valid URL: {}",
                e
            )));
        }
    }

    if config.cache.ttl_hours == 0 {
        return Err(ConfigError::Validation(
            "cache.ttl-hours must be at least 1".to_string(),
        ));
    }

    if config.fetch.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch.timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.fetch.request_delay_min_ms > config.fetch.request_delay_max_ms {
        return Err(ConfigError::Validation(
            "fetch.request-delay-min-ms must not exceed request-delay-max-ms".to_string(),
        ));
    }

    if config.fetch.page_delay_min_ms > config.fetch.page_delay_max_ms {
        return Err(ConfigError::Validation(
            "fetch.page-delay-min-ms must not exceed page-delay-max-ms".to_string(),
        ));
    }

    if config.output.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output.database-path must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn valid_config() -> Config {
        Config {
            harvest: HarvestConfig {
                pages: 3,
                max_articles_per_page: 10,
                short_term: "AI".to_string(),
                long_term: "artificial intelligence".to_string(),
                term_variants: vec![TermVariant::Short, TermVariant::Long],
                source_label: "Khaleej Times".to_string(),
            },
            search: SearchConfig {
                base_url: "https://www.khaleejtimes.com/search".to_string(),
            },
            cache: CacheConfig {
                directory: "./cache".to_string(),
                ttl_hours: 24,
                eviction_hours: 1,
                file_retention_days: 7,
            },
            fetch: FetchConfig {
                timeout_secs: 15,
                retry_count: 3,
                retry_backoff_ms: 1000,
                request_delay_min_ms: 1500,
                request_delay_max_ms: 3500,
                page_delay_min_ms: 3000,
                page_delay_max_ms: 5000,
            },
            output: OutputConfig {
                database_path: "./kumo.db".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_zero_pages_rejected() {
        let mut config = valid_config();
        config.harvest.pages = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_term_rejected() {
        let mut config = valid_config();
        config.harvest.short_term = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let mut config = valid_config();
        config.search.base_url = "ftp://example.com/search".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_inverted_delay_range_rejected() {
        let mut config = valid_config();
        config.fetch.request_delay_min_ms = 5000;
        config.fetch.request_delay_max_ms = 1000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = valid_config();
        config.cache.ttl_hours = 0;
        assert!(validate(&config).is_err());
    }
}
