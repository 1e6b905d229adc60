use std::time::Duration;

use ureq::tls::{TlsConfig, TlsProvider};

pub const AUTHORIZATION: &str = "Authorization";

/// Blocking HTTP agent shared by the upstream proxy and the offline worker.
///
/// Non-2xx statuses are returned as ordinary responses so callers can relay them.
pub fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .tls_config(TlsConfig::builder().provider(TlsProvider::NativeTls).build())
        .build()
        .into()
}
