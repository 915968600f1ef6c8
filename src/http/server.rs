//! Router assembly and the HTTP/HTTPS serve loops.
//!
//! # Responsibilities
//! - Create the Axum router with the four endpoints
//! - Inject shared identity and scoreboard state into handlers
//! - Serve the router over plaintext TCP and over TLS
//! - Wrap every HTTPS response with the Strict-Transport-Security header
//!
//! Both listeners dispatch by exact path match; anything else gets Axum's
//! default 404.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::any;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::identity::ServerIdentity;
use crate::scoreboard::Scoreboard;

/// Strict-Transport-Security value attached to every HTTPS response.
const HSTS: &str = "max-age=66012000; includeSubDomains";

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<ServerIdentity>,
    pub scoreboard: Scoreboard,
}

/// Build the four-endpoint router shared by the HTTP and HTTPS listeners.
///
/// Any method is accepted on every path; the endpoints answer identically
/// regardless of verb.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(handlers::echo))
        .route("/slow", any(handlers::slow))
        .route("/stats", any(handlers::stats))
        .route("/reset", any(handlers::reset))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve plaintext HTTP on an already-bound listener.
///
/// Returns only on a fatal serve error; the composing binary treats that as
/// process-terminating.
pub async fn serve_http(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP listener starting");
    axum::serve(listener, build_router(state)).await
}

/// Serve the same four endpoints over TLS.
///
/// The TLS policy (server-auth-only vs. mutual) is baked into `tls` by
/// [`crate::net::tls::build_server_config`]. Every response, including 404s,
/// carries the HSTS header. The `handle` lets callers learn the bound
/// address when serving on an ephemeral port.
pub async fn serve_https(
    addr: SocketAddr,
    tls: RustlsConfig,
    state: AppState,
    handle: Handle,
) -> Result<(), std::io::Error> {
    tracing::info!(address = %addr, "HTTPS listener starting");
    let router = build_router(state).layer(SetResponseHeaderLayer::overriding(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static(HSTS),
    ));
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(router.into_make_service())
        .await
}
