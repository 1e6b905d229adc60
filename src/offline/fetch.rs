//! Requests and responses seen by the offline worker

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::AccessToken;
use crate::interfaces::http_api::AUTHORIZATION;

pub const OFFLINE_STATUS: u16 = 503;
pub const OFFLINE_BODY: &str = "Offline";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: Url,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
}

impl FetchRequest {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: Method::Get,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_token(self, token: &AccessToken) -> Self {
        self.with_header(AUTHORIZATION, token.bearer_header())
    }

    /// Cache key: method plus full URL. Headers (including credentials) are not part of it.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// Mirrors the Fetch response types that matter for caching decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Same-origin network response
    Basic,
    /// Cross-origin network response
    Cors,
    /// Constructed locally, never from the network
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// The synthetic response served when neither network nor cache can answer.
    pub fn offline() -> Self {
        Self {
            status: OFFLINE_STATUS,
            kind: ResponseKind::Default,
            headers: BTreeMap::from([("content-type".to_string(), "text/plain".to_string())]),
            body: OFFLINE_BODY.as_bytes().to_vec(),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.kind == ResponseKind::Default
            && self.status == OFFLINE_STATUS
            && self.body == OFFLINE_BODY.as_bytes()
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
