//! HTTP fetcher
//!
//! Cache-first GET with retry, backoff, identity rotation, and politeness
//! delays:
//! - the cache store is consulted before any network call; a hit
//!   short-circuits the network path entirely,
//! - each request carries a randomly chosen browser identity from a fixed
//!   pool,
//! - 429 and 5xx responses and timeouts are retried with exponential
//!   backoff; other failures surface immediately,
//! - every successful network fetch is written through the cache and
//!   followed by a randomized politeness sleep.

use crate::cache::CacheStore;
use crate::config::FetchConfig;
use crate::FetchError;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Browser identity pool, rotated per request to reduce fingerprinting
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:90.0) Gecko/20100101 Firefox/90.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:88.0) Gecko/20100101 Firefox/88.0",
];

/// Builds the HTTP client used for all requests
///
/// The user agent is set per request (rotated from the pool), so the
/// client itself carries none.
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Picks a randomized browser-identity header set
fn random_headers() -> HeaderMap {
    let user_agent = {
        let mut rng = rand::thread_rng();
        USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())]
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(user_agent),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        reqwest::header::CACHE_CONTROL,
        HeaderValue::from_static("max-age=0"),
    );
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Cache-first retrying HTTP fetcher
pub struct Fetcher {
    client: Client,
    cache: CacheStore,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(cache: CacheStore, config: FetchConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config)?;
        Ok(Self {
            client,
            cache,
            config,
        })
    }

    /// Fetches a URL, serving from cache when a fresh entry exists
    ///
    /// On a cache miss, issues a GET with retry on transient failures
    /// (HTTP 429/5xx and timeouts, up to `retry-count` extra attempts with
    /// exponential backoff). A successful body is written through the cache
    /// and followed by a politeness sleep; cache hits incur no delay.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Some(cached) = self.cache.get(url) {
            tracing::info!("Using cache for {}", url);
            return Ok(cached);
        }

        tracing::info!("Fetching URL: {}", url);
        let body = self.fetch_with_retries(url).await?;

        self.cache.put(url, &body);
        self.politeness_delay().await;

        Ok(body)
    }

    async fn fetch_with_retries(&self, url: &str) -> Result<String, FetchError> {
        let max_attempts = self.config.retry_count + 1;
        let mut last_status: Option<u16> = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let backoff = Duration::from_millis(
                    self.config.retry_backoff_ms.saturating_mul(1 << (attempt - 1)),
                );
                tracing::debug!(
                    "Retry {}/{} for {} after {:?}",
                    attempt,
                    self.config.retry_count,
                    url,
                    backoff
                );
                tokio::time::sleep(backoff).await;
            }

            let response = self
                .client
                .get(url)
                .headers(random_headers())
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response.text().await.map_err(|source| {
                            FetchError::Transport {
                                url: url.to_string(),
                                source,
                            }
                        });
                    }

                    if is_transient(status) {
                        tracing::warn!("Transient HTTP {} for {}", status.as_u16(), url);
                        last_status = Some(status.as_u16());
                        continue;
                    }

                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Err(e) if e.is_timeout() => {
                    tracing::warn!("Timeout fetching {}", url);
                    last_status = None;
                    continue;
                }
                Err(source) => {
                    return Err(FetchError::Transport {
                        url: url.to_string(),
                        source,
                    });
                }
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts: max_attempts,
            last_status,
        })
    }

    /// Sleeps a randomized interval within the politeness window
    async fn politeness_delay(&self) {
        let millis = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.config.request_delay_min_ms..=self.config.request_delay_max_ms)
        };
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}
