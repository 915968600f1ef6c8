//! Startup configuration.
//!
//! Flags are resolved once in `main` and handed to the core as plain values:
//! a listen port (shared by HTTP and UDP), an optional HTTPS port, a server
//! id, and optional TLS material paths. An HTTPS port of 0 is the sentinel
//! for "HTTPS disabled".

use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

/// Command-line options for the echo backend.
#[derive(Debug, Parser)]
#[command(name = "lb-echo")]
#[command(about = "Multi-protocol echo backend for load-balancer testing", long_about = None)]
pub struct Options {
    /// Port for the HTTP and UDP listeners (same numeric value for both).
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Port for the HTTPS listener; 0 disables HTTPS.
    #[arg(long, default_value_t = 0)]
    pub https_port: u16,

    /// Server id embedded in the session cookie and every response body.
    #[arg(long, default_value = "lb-echo")]
    pub id: String,

    /// PEM server certificate, required when HTTPS is enabled.
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// PEM private key, required when HTTPS is enabled.
    #[arg(long)]
    pub key: Option<PathBuf>,

    /// PEM CA bundle; when present, HTTPS clients must present a
    /// certificate verifiable against it (mutual TLS).
    #[arg(long)]
    pub client_ca: Option<PathBuf>,
}

/// Startup configuration errors. All of these are fatal before any traffic
/// is served.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HTTPS enabled but --cert was not provided")]
    MissingCert,
    #[error("HTTPS enabled but --key was not provided")]
    MissingKey,
}

impl Options {
    /// Whether the HTTPS listener should run.
    pub fn https_enabled(&self) -> bool {
        self.https_port != 0
    }

    /// Certificate and key paths for the HTTPS listener.
    pub fn tls_material(&self) -> Result<(&Path, &Path), ConfigError> {
        let cert = self.cert.as_deref().ok_or(ConfigError::MissingCert)?;
        let key = self.key.as_deref().ok_or(ConfigError::MissingKey)?;
        Ok((cert, key))
    }
}
