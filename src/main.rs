//! lb-echo: multi-protocol echo backend for load-balancer testing.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────┐
//!                    │                 lb-echo                   │
//!                    │                                           │
//!   HTTP request ────┼─▶ http listener ──┐                       │
//!                    │                   ├─▶ echo / slow ────────┼─▶ body = server id
//!   HTTPS request ───┼─▶ tls policy ─────┘    stats / reset      │   + JSESSIONID cookie
//!                    │   (server-auth or          │              │
//!                    │    mutual TLS)             ▼              │
//!                    │                      scoreboard           │
//!                    │                  (current/peak/total)     │
//!                    │                                           │
//!   UDP datagram ────┼─▶ udp loop (main task) ───────────────────┼─▶ reply = server id
//!                    └──────────────────────────────────────────┘
//! ```
//!
//! The HTTP and HTTPS listeners run as background tasks; the UDP loop
//! occupies the main task. The first fatal transport error from any of the
//! three terminates the process.

use std::net::SocketAddr;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tokio::net::{TcpListener, UdpSocket};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lb_echo::config::Options;
use lb_echo::http::server::{serve_http, serve_https, AppState};
use lb_echo::identity::ServerIdentity;
use lb_echo::net::{tls, udp};
use lb_echo::scoreboard::Scoreboard;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lb_echo=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = Options::parse();

    tracing::info!(
        port = options.port,
        https_port = options.https_port,
        id = %options.id,
        "lb-echo starting"
    );

    let state = AppState {
        identity: Arc::new(ServerIdentity::new(options.id.as_str())?),
        scoreboard: Scoreboard::new(),
    };

    // Plaintext listener on the shared port.
    let http_listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], options.port))).await?;
    let mut http_task = tokio::spawn(serve_http(http_listener, state.clone()));

    // TLS listener, only when a port is configured. Bad TLS material is
    // fatal here, before any traffic is served.
    let mut https_task = if options.https_enabled() {
        let (cert, key) = options.tls_material()?;
        let server_config = tls::build_server_config(cert, key, options.client_ca.as_deref())?;
        let rustls_config = RustlsConfig::from_config(Arc::new(server_config));
        let addr = SocketAddr::from(([0, 0, 0, 0], options.https_port));
        Some(tokio::spawn(serve_https(
            addr,
            rustls_config,
            state.clone(),
            axum_server::Handle::new(),
        )))
    } else {
        None
    };

    // UDP shares the HTTP port number and occupies the main task. Whichever
    // listener fails first takes the process down with it.
    let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], options.port))).await?;
    let udp_loop = udp::run(socket, Arc::clone(&state.identity));

    match https_task.as_mut() {
        Some(https) => {
            tokio::select! {
                result = udp_loop => result?,
                result = &mut http_task => result??,
                result = https => result??,
            }
        }
        None => {
            tokio::select! {
                result = udp_loop => result?,
                result = &mut http_task => result??,
            }
        }
    }

    Ok(())
}
