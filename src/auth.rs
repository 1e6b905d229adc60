//! Bearer credential helpers shared by the gateway and the client

use std::fmt;

use serde::{Deserialize, Serialize};

const BEARER_SCHEME: &str = "Bearer";
const JSON_MEDIA_TYPE: &str = "application/json";

/// Cookie the login page sets so that page navigations carry the credential too.
pub const SESSION_COOKIE: &str = "pwa_access_token";

/// An opaque bearer credential. Its `Debug` output never includes the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Returns `None` for an empty or whitespace-only value.
    pub fn new(value: impl AsRef<str>) -> Option<Self> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    /// Value for an `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("{BEARER_SCHEME} {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Look up one cookie in a `Cookie` header value.
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Whether an `Accept` header asks for JSON rather than a renderable page.
pub fn accepts_json(accept: Option<&str>) -> bool {
    accept.is_some_and(|a| a.to_ascii_lowercase().contains(JSON_MEDIA_TYPE))
}
