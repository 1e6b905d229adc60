use crate::auth::{self, AccessToken};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// No secret configured; every request passes. Development only.
    Open,
    Allowed,
    Denied,
}

impl GateDecision {
    pub fn is_permitted(self) -> bool {
        !matches!(self, GateDecision::Denied)
    }
}

/// Bearer-token check applied to every non-public route
#[derive(Clone, Debug)]
pub struct Gate {
    secret: Option<AccessToken>,
}

impl Gate {
    pub fn new(secret: Option<AccessToken>) -> Self {
        Self { secret }
    }

    /// True when no secret is configured and the gate lets everything through.
    /// This is an insecure fallback and must never reach a deployment.
    pub fn is_open(&self) -> bool {
        self.secret.is_none()
    }

    /// Check the raw `Authorization` header value against the configured secret.
    pub fn check(&self, authorization: Option<&str>) -> GateDecision {
        let Some(secret) = &self.secret else {
            return GateDecision::Open;
        };
        match authorization.and_then(auth::bearer_token) {
            Some(token) if secret.matches(token) => GateDecision::Allowed,
            _ => GateDecision::Denied,
        }
    }

    /// Like [`Gate::check`], but a browser navigation may instead present the
    /// credential in the session cookie set by the login page.
    pub fn check_request(
        &self,
        authorization: Option<&str>,
        cookie: Option<&str>,
    ) -> GateDecision {
        match self.check(authorization) {
            GateDecision::Denied => {}
            decision => return decision,
        }
        let from_cookie = cookie.and_then(|c| auth::cookie_value(c, auth::SESSION_COOKIE));
        match (&self.secret, from_cookie) {
            (Some(secret), Some(token)) if secret.matches(token) => GateDecision::Allowed,
            _ => GateDecision::Denied,
        }
    }
}
