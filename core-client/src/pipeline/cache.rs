use bridge_traits::error::Result;
use bridge_traits::http::{HttpMethod, HttpRequest, HttpResponse};
use core_async::time::{Duration, Instant};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::debug;

use super::Next;

const CACHE_CONTROL: &str = "Cache-Control";

/// Annotates GET responses with `Cache-Control: max-age=<secs>` and, when a
/// [`ResponseCache`] is configured, serves fresh successful responses
/// without going further down the chain. Other methods pass through.
pub struct CacheStage {
    max_age: Duration,
    cache: Option<ResponseCache>,
}

impl CacheStage {
    /// `capacity` 0 means directive only, no storage.
    pub fn new(max_age: Duration, capacity: usize) -> Self {
        Self {
            max_age,
            cache: ResponseCache::new(capacity),
        }
    }

    pub fn directive(&self) -> String {
        format!("max-age={}", self.max_age.as_secs())
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    pub async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        if request.method != HttpMethod::Get {
            return next.run(request).await;
        }

        let url = request.url.clone();
        let cache = self.cache.as_ref();
        let storable = !has_directive(&request, "no-store");

        if let Some(cache) = cache {
            if !bypasses_cache(&request) {
                if let Some(hit) = cache.lookup(&url) {
                    debug!(request_id = %next.call().request_id(), %url, "Served from response cache");
                    return Ok(hit);
                }
            }
        }

        let response = next
            .run(request)
            .await?
            .with_header(CACHE_CONTROL, self.directive());

        if let Some(cache) = cache {
            if storable && response.is_success() {
                cache.store(url, &response, self.max_age);
            }
        }

        Ok(response)
    }
}

fn bypasses_cache(request: &HttpRequest) -> bool {
    has_directive(request, "no-cache") || has_directive(request, "no-store")
}

fn has_directive(request: &HttpRequest, directive: &str) -> bool {
    request.header_value(CACHE_CONTROL).is_some_and(|value| {
        value
            .split(',')
            .any(|part| part.trim().eq_ignore_ascii_case(directive))
    })
}

struct CachedResponse {
    response: HttpResponse,
    expires_at: Instant,
}

/// Entry-bounded LRU of successful GET responses keyed by URL.
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CachedResponse>>,
}

impl ResponseCache {
    /// `None` when `capacity` is 0.
    pub fn new(capacity: usize) -> Option<Self> {
        NonZeroUsize::new(capacity).map(|capacity| Self {
            entries: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Fresh response for `url`; expired entries are evicted on access.
    pub fn lookup(&self, url: &str) -> Option<HttpResponse> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let fresh = entries
            .get(url)
            .map(|entry| (entry.expires_at > now).then(|| entry.response.clone()));

        match fresh {
            Some(Some(response)) => Some(response),
            Some(None) => {
                entries.pop(url);
                None
            }
            None => None,
        }
    }

    pub fn store(&self, url: String, response: &HttpResponse, max_age: Duration) {
        if max_age.is_zero() {
            return;
        }
        self.entries.lock().put(
            url,
            CachedResponse {
                response: response.clone(),
                expires_at: Instant::now() + max_age,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
