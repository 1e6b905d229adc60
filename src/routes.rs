//! HTTP routes shared by the gateway and the dashboard client

pub const AUTH_PAGE: &str = "/auth.html";
pub const AUTH_CHECK: &str = "/auth-check";

/// Routes that bypass the access gate entirely.
pub const PUBLIC_ROUTES: [&str; 2] = [AUTH_PAGE, AUTH_CHECK];

/// Path prefix of the data endpoints; requests under it are treated as dynamic.
pub const API_PREFIX: &str = "/api/";

pub fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.contains(&path)
}

/// Data endpoints proxied to the upstream telemetry server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiRoute {
    Current,
    CurrentAndMax,
    Today,
    YearlyYield,
}

impl ApiRoute {
    pub const ALL: [ApiRoute; 4] = [
        ApiRoute::Current,
        ApiRoute::CurrentAndMax,
        ApiRoute::Today,
        ApiRoute::YearlyYield,
    ];

    /// Path exposed by the gateway.
    pub fn path(self) -> &'static str {
        match self {
            ApiRoute::Current => "/api/current",
            ApiRoute::CurrentAndMax => "/api/current-and-max",
            ApiRoute::Today => "/api/today",
            ApiRoute::YearlyYield => "/api/yearly-yield",
        }
    }

    /// Path segment appended to the upstream base URL.
    pub fn upstream_suffix(self) -> &'static str {
        &self.path()[API_PREFIX.len()..]
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes() {
        assert!(is_public("/auth.html"));
        assert!(is_public("/auth-check"));
        assert!(!is_public("/api/current"));
        assert!(!is_public("/auth.html/"));
        assert!(!is_public("/"));
    }

    #[test]
    fn upstream_suffixes() {
        assert_eq!(ApiRoute::Current.upstream_suffix(), "current");
        assert_eq!(ApiRoute::CurrentAndMax.upstream_suffix(), "current-and-max");
        assert_eq!(ApiRoute::Today.upstream_suffix(), "today");
        assert_eq!(ApiRoute::YearlyYield.upstream_suffix(), "yearly-yield");
    }

    #[test]
    fn route_lookup() {
        assert_eq!(ApiRoute::from_path("/api/today"), Some(ApiRoute::Today));
        assert_eq!(ApiRoute::from_path("/api/unknown"), None);
    }
}
