//! Caching policy as a pure function of the request, the cached entry and a network call.
//!
//! Nothing here touches storage. [`handle`] reports what should be written back in
//! [`Handled::cache_write`] and the caller decides how and when to persist it.

use super::fetch::{FetchRequest, FetchResponse, Method, ResponseKind};
use super::network::NetworkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Dynamic data: try the network, fall back to the cache
    NetworkFirst,
    /// Static shell assets: serve from the cache, fill it from the network on a miss
    CacheFirst,
}

#[derive(Debug, Clone)]
pub struct RoutePolicy {
    dynamic_prefixes: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            dynamic_prefixes: vec![crate::routes::API_PREFIX.to_string()],
        }
    }
}

impl RoutePolicy {
    pub fn new<I, S>(dynamic_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dynamic_prefixes: dynamic_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn strategy_for(&self, request: &FetchRequest) -> Strategy {
        let path = request.path();
        if self.dynamic_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            Strategy::NetworkFirst
        } else {
            Strategy::CacheFirst
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheWrite {
    pub key: String,
    pub response: FetchResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Network,
    Cache,
    Offline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Handled {
    pub response: FetchResponse,
    pub cache_write: Option<CacheWrite>,
    pub source: Source,
}

impl Handled {
    fn from_network(response: FetchResponse, cache_write: Option<CacheWrite>) -> Self {
        Self {
            response,
            cache_write,
            source: Source::Network,
        }
    }

    fn from_cache(response: FetchResponse) -> Self {
        Self {
            response,
            cache_write: None,
            source: Source::Cache,
        }
    }

    fn offline() -> Self {
        Self {
            response: FetchResponse::offline(),
            cache_write: None,
            source: Source::Offline,
        }
    }
}

fn network_first_cacheable(request: &FetchRequest, response: &FetchResponse) -> bool {
    request.method == Method::Get && response.is_ok()
}

fn cache_first_cacheable(request: &FetchRequest, response: &FetchResponse) -> bool {
    request.method == Method::Get && response.status == 200 && response.kind == ResponseKind::Basic
}

/// Decide the response for `request`.
///
/// `cached` is the entry stored under the request's cache key, if any. `fetch` is called
/// at most once; under cache-first it is not called at all when `cached` is present.
pub fn handle<F>(
    request: &FetchRequest,
    strategy: Strategy,
    cached: Option<FetchResponse>,
    fetch: F,
) -> Handled
where
    F: FnOnce(&FetchRequest) -> Result<FetchResponse, NetworkError>,
{
    match strategy {
        Strategy::NetworkFirst => match fetch(request) {
            Ok(response) => {
                let write = network_first_cacheable(request, &response).then(|| CacheWrite {
                    key: request.cache_key(),
                    response: response.clone(),
                });
                Handled::from_network(response, write)
            }
            Err(e) => {
                log::debug!("Network failed for {}: {e}", request.url);
                match cached {
                    Some(response) => Handled::from_cache(response),
                    None => Handled::offline(),
                }
            }
        },
        Strategy::CacheFirst => {
            if let Some(response) = cached {
                return Handled::from_cache(response);
            }
            match fetch(request) {
                Ok(response) => {
                    let write = cache_first_cacheable(request, &response).then(|| CacheWrite {
                        key: request.cache_key(),
                        response: response.clone(),
                    });
                    Handled::from_network(response, write)
                }
                Err(e) => {
                    log::debug!("Network failed for {}: {e}", request.url);
                    Handled::offline()
                }
            }
        }
    }
}
