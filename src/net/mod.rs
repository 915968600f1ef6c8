//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming HTTPS connection
//!     → tls.rs (material loading, policy: server-auth vs. mutual)
//!     → handshake enforced by rustls before the HTTP layer sees bytes
//!
//! Incoming datagram
//!     → udp.rs (receive loop, canned reply, no accounting)
//! ```

pub mod tls;
pub mod udp;
