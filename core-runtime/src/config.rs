//! # Client Configuration Module
//!
//! Provides configuration management for the remote-content client.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `ClientConfig` holding every tunable of the transport, the request
//! pipeline and the worker pool. `build()` validates eagerly so a bad value
//! surfaces at startup rather than on the first request.
//!
//! ## Defaults
//!
//! | Setting | Default |
//! |---------|---------|
//! | `connect_timeout` | 15 s |
//! | `read_timeout` | 30 s |
//! | `max_retries` | 3 |
//! | `retry_base_delay` | 1 s (delay before retry *n* is `n × base`) |
//! | `cache_max_age` | 5 min |
//! | `response_cache_capacity` | 0 (disabled) |
//! | `worker_threads` | available parallelism + 1 |
//! | `user_agent` | `remote-content/<version>` |
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .max_retries(5)
//!     .read_timeout(Duration::from_secs(60))
//!     .build()
//!     .expect("valid configuration");
//!
//! assert_eq!(config.max_retries, 5);
//! ```
//!
//! ## Error Handling
//!
//! Invalid values are rejected with an actionable message:
//!
//! ```should_panic
//! use core_runtime::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .worker_threads(0)
//!     .build()
//!     .expect("Should fail - a pool needs at least one worker");
//! ```

use crate::error::{Error, Result};
use std::time::Duration;

/// Upper bound on retries; beyond this the backoff alone exceeds a minute.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Upper bound on in-memory cached responses.
pub const RESPONSE_CACHE_CAPACITY_LIMIT: usize = 10_000;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(5 * 60);

/// Settings the API client is built from. Use [`ClientConfigBuilder`] to
/// construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,

    /// Time allowed for the whole exchange once connected
    pub read_timeout: Duration,

    /// Retries after the first attempt for transport-level failures
    pub max_retries: u32,

    /// Linear backoff unit
    pub retry_base_delay: Duration,

    /// `max-age` stamped on successful GET responses
    pub cache_max_age: Duration,

    /// Entries kept by the in-memory response cache; 0 disables it
    pub response_cache_capacity: usize,

    /// Fixed size of the worker pool
    pub worker_threads: usize,

    /// `User-Agent` sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            response_cache_capacity: 0,
            worker_threads: default_worker_threads(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        + 1
}

fn default_user_agent() -> String {
    format!("remote-content/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(Error::Config(
                "Connect timeout must be greater than zero".to_string(),
            ));
        }

        if self.read_timeout.is_zero() {
            return Err(Error::Config(
                "Read timeout must be greater than zero".to_string(),
            ));
        }

        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(Error::Config(format!(
                "max_retries {} exceeds maximum of {}",
                self.max_retries, MAX_RETRIES_LIMIT
            )));
        }

        if self.response_cache_capacity > RESPONSE_CACHE_CAPACITY_LIMIT {
            return Err(Error::Config(format!(
                "Response cache capacity {} exceeds maximum of {} entries. \
                 Use 0 to disable the cache.",
                self.response_cache_capacity, RESPONSE_CACHE_CAPACITY_LIMIT
            )));
        }

        if self.worker_threads == 0 {
            return Err(Error::Config(
                "Worker pool needs at least one thread".to_string(),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("User agent cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Builder for [`ClientConfig`]. Unset values fall back to the defaults.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_base_delay: Option<Duration>,
    cache_max_age: Option<Duration>,
    response_cache_capacity: Option<usize>,
    worker_threads: Option<usize>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Sets how many times a transport failure is retried. `0` disables
    /// retrying.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = Some(delay);
        self
    }

    pub fn cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = Some(max_age);
        self
    }

    /// Enables the in-memory response cache with room for `entries`
    /// responses.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::ClientConfig;
    ///
    /// let config = ClientConfig::builder()
    ///     .response_cache_capacity(256)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.response_cache_capacity, 256);
    /// ```
    pub fn response_cache_capacity(mut self, entries: usize) -> Self {
        self.response_cache_capacity = Some(entries);
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when any value is out of range.
    pub fn build(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();

        let config = ClientConfig {
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            read_timeout: self.read_timeout.unwrap_or(defaults.read_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_base_delay: self.retry_base_delay.unwrap_or(defaults.retry_base_delay),
            cache_max_age: self.cache_max_age.unwrap_or(defaults.cache_max_age),
            response_cache_capacity: self
                .response_cache_capacity
                .unwrap_or(defaults.response_cache_capacity),
            worker_threads: self.worker_threads.unwrap_or(defaults.worker_threads),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        };

        config.validate()?;

        Ok(config)
    }
}
