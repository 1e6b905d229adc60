use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::auth::AccessToken;
use crate::interfaces::http_api::{build_agent, AUTHORIZATION};
use crate::routes::ApiRoute;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] ureq::Error),
    #[error("upstream returned a body that is not JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// Status and body exactly as the upstream sent them
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Blocking client for the fixed upstream telemetry server
pub struct Upstream {
    agent: ureq::Agent,
    base: String,
    token: Option<AccessToken>,
}

impl Upstream {
    pub fn new(base: &Url, token: Option<AccessToken>, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
            base: base.as_str().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn url_for(&self, route: ApiRoute) -> String {
        format!("{}/{}", self.base, route.upstream_suffix())
    }

    /// Forward a permitted request. Only the `Authorization` header travels upstream;
    /// a configured upstream credential takes its place.
    pub fn forward(
        &self,
        route: ApiRoute,
        authorization: Option<&str>,
    ) -> Result<UpstreamReply, UpstreamError> {
        let url = self.url_for(route);
        let authorization = match &self.token {
            Some(token) => Some(token.bearer_header()),
            None => authorization.map(str::to_string),
        };

        log::debug!("Forwarding {} to {url}", route.path());
        let mut request = self.agent.get(&url);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let mut response = request.call()?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_vec()?;
        // The body is relayed verbatim, but it has to be JSON
        serde_json::from_slice::<serde::de::IgnoredAny>(&body)?;

        log::debug!("Upstream answered {status} for {}", route.path());
        Ok(UpstreamReply { status, body })
    }
}
