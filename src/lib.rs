//! Multi-protocol echo backend for validating load-balancer behavior.
//!
//! Answers plain HTTP, TLS-wrapped HTTPS (optionally with mutual-TLS client
//! verification), and raw UDP with a fixed server identifier, and exposes
//! live connection-concurrency statistics so a test harness can assert on
//! fan-out, session persistence, and slow-backend handling.

pub mod config;
pub mod http;
pub mod identity;
pub mod net;
pub mod scoreboard;

pub use config::Options;
pub use http::server::AppState;
pub use identity::ServerIdentity;
pub use scoreboard::Scoreboard;
