//! Token-gated reverse proxy in front of the upstream telemetry server
//!
//! Every request is stateless. Public routes skip the gate, everything else must carry
//! the configured bearer token. Permitted API calls are forwarded to the upstream and
//! its status and body are relayed unchanged; the only error the gateway produces on
//! its own is a fixed 500 when the upstream cannot be reached.

mod error;
mod gate;
mod login_page;
mod upstream;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE},
        HeaderMap, StatusCode,
    },
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::auth;
use crate::config::GatewayConfig;
use crate::routes::{self, ApiRoute};

pub use error::{
    GatewayError, UNAUTHORIZED_ERROR, UNAUTHORIZED_MESSAGE, UPSTREAM_ERROR, UPSTREAM_MESSAGE,
};
pub use gate::{Gate, GateDecision};
pub use login_page::LOGIN_PAGE;
pub use upstream::{Upstream, UpstreamError, UpstreamReply};

pub struct AppState {
    pub gate: Gate,
    pub upstream: Arc<Upstream>,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            gate: Gate::new(config.pwa_token.clone()),
            upstream: Arc::new(Upstream::new(
                &config.upstream_base,
                config.upstream_token.clone(),
                config.upstream_timeout,
            )),
        }
    }
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, [(CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: axum::http::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub fn router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route(routes::AUTH_PAGE, get(auth_page))
        .route(routes::AUTH_CHECK, get(auth_check));

    for route in ApiRoute::ALL {
        router = router.route(
            route.path(),
            get(move |State(state): State<Arc<AppState>>, headers: HeaderMap| {
                proxy(state, headers, route)
            }),
        );
    }

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    // Added last so that it also covers the fallback
    router
        .layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
}

async fn require_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if routes::is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let headers = request.headers();
    let decision = state
        .gate
        .check_request(header_str(headers, AUTHORIZATION), header_str(headers, COOKIE));
    match decision {
        GateDecision::Denied => {
            log::debug!("Denied access to {}", request.uri().path());
            GatewayError::AuthDenied {
                wants_json: auth::accepts_json(header_str(headers, ACCEPT)),
            }
            .into_response()
        }
        GateDecision::Allowed | GateDecision::Open => next.run(request).await,
    }
}

async fn auth_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

async fn auth_check(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let authenticated = state
        .gate
        .check(header_str(&headers, AUTHORIZATION))
        .is_permitted();
    let status = if authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (status, Json(json!({ "authenticated": authenticated }))).into_response()
}

async fn proxy(state: Arc<AppState>, headers: HeaderMap, route: ApiRoute) -> Response {
    let authorization = header_str(&headers, AUTHORIZATION).map(str::to_string);
    let upstream = state.upstream.clone();

    // ureq blocks; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || {
        upstream.forward(route, authorization.as_deref())
    })
    .await
    .map_err(GatewayError::from)
    .and_then(|reply| reply.map_err(GatewayError::from));

    match outcome {
        Ok(reply) => reply.into_response(),
        Err(e) => {
            log::error!("Proxying {} failed: {e}", route.path());
            e.into_response()
        }
    }
}

pub async fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config));
    if state.gate.is_open() {
        log::warn!(
            "No PWA access token configured; the access gate is DISABLED and every route \
             is public. This is only acceptable for local development."
        );
    }
    log::info!("Proxying API requests to {}", config.upstream_base);
    if let Some(dir) = &config.static_dir {
        log::info!("Serving app shell from {}", dir.display());
    }

    let app = router(state, config.static_dir.as_deref());
    let listener = TcpListener::bind(config.listen_addr).await?;
    log::info!("Gateway listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Gateway shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
