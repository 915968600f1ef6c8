//! HTTP surface shared by the plaintext and TLS listeners.
//!
//! # Data Flow
//! ```text
//! TCP or TLS connection
//!     → server.rs (router assembly, serve loops, HSTS on HTTPS)
//!     → handlers.rs (echo / slow / stats / reset)
//!     → shared Scoreboard + ServerIdentity state
//! ```

pub mod handlers;
pub mod server;

pub use server::AppState;
