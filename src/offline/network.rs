use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;
use url::{Origin, Url};

use crate::interfaces::http_api::build_agent;

use super::fetch::{FetchRequest, FetchResponse, Method, ResponseKind};

/// A rejected fetch: the request never produced an HTTP response
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error(transparent)]
    Http(#[from] ureq::Error),
    #[error("network unavailable: {0}")]
    Unavailable(String),
}

pub trait Network: Send + Sync {
    fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, NetworkError>;
}

/// Network access over HTTP, classifying responses relative to the app origin
pub struct HttpNetwork {
    agent: ureq::Agent,
    origin: Origin,
}

impl HttpNetwork {
    pub fn new(app_url: &Url, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
            origin: app_url.origin(),
        }
    }

    fn kind_for(&self, url: &Url) -> ResponseKind {
        if url.origin() == self.origin {
            ResponseKind::Basic
        } else {
            ResponseKind::Cors
        }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &BTreeMap<String, String>,
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Network for HttpNetwork {
    fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, NetworkError> {
        let url = request.url.as_str();
        let mut response = match request.method {
            Method::Get => with_headers(self.agent.get(url), &request.headers).call()?,
            Method::Head => with_headers(self.agent.head(url), &request.headers).call()?,
            Method::Post => with_headers(self.agent.post(url), &request.headers).send_empty()?,
        };

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Ok(FetchResponse {
            status: response.status().as_u16(),
            kind: self.kind_for(&request.url),
            headers,
            body: response.body_mut().read_to_vec()?,
        })
    }
}
