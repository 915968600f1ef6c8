//! TLS material loading and server policy construction.
//!
//! Two policies are supported:
//! - server-auth-only: no client certificate requested, ALPN list
//!   `h2, http/1.1, http/1.0`
//! - mutual TLS: a client certificate is required and verified against the
//!   configured CA pool; the handshake fails without one, and no ALPN list
//!   is advertised
//!
//! Both pin the protocol floor to TLS 1.2 with a fixed cipher-suite
//! allow-list and key-exchange group order. Unreadable or unparseable
//! material is fatal at startup, never deferred to the first handshake.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::crypto::aws_lc_rs as provider;
use rustls::crypto::{CryptoProvider, SupportedKxGroup};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::{VerifierBuilderError, WebPkiClientVerifier};
use rustls::{RootCertStore, ServerConfig, SupportedCipherSuite};
use thiserror::Error;

/// Cipher suites offered, in server-preference order.
///
/// rustls carries no CBC or static-RSA suites, so this is the AES-256-GCM
/// subset of the classic ECDHE allow-list plus the TLS 1.3 equivalent.
static CIPHER_SUITES: &[SupportedCipherSuite] = &[
    provider::cipher_suite::TLS13_AES_256_GCM_SHA384,
    provider::cipher_suite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    provider::cipher_suite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
];

/// Key-exchange groups, in preference order.
static KX_GROUPS: &[&dyn SupportedKxGroup] = &[
    provider::kx_group::X25519,
    provider::kx_group::SECP256R1,
    provider::kx_group::SECP384R1,
];

/// ALPN protocols advertised when client verification is not required.
static ALPN_PROTOCOLS: &[&[u8]] = &[b"h2", b"http/1.1", b"http/1.0"];

/// Errors from TLS material loading or policy construction.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("no certificates found in {0}")]
    EmptyCertChain(String),
    #[error("no private key found in {0}")]
    NoPrivateKey(String),
    #[error("invalid certificate in {path}: {source}")]
    BadCertificate {
        path: String,
        source: rustls::Error,
    },
    #[error("client verifier construction failed: {0}")]
    Verifier(#[from] VerifierBuilderError),
    #[error("TLS configuration rejected: {0}")]
    Config(#[from] rustls::Error),
}

/// Load a PEM certificate chain. An empty or unparseable file is an error.
pub fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let file = File::open(path).map_err(|e| TlsError::Read {
        path: display(path),
        source: e,
    })?;
    let mut reader = BufReader::new(file);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::Read {
            path: display(path),
            source: e,
        })?;
    if certs.is_empty() {
        return Err(TlsError::EmptyCertChain(display(path)));
    }
    Ok(certs)
}

/// Load the first PEM private key (PKCS#8, RSA, or SEC1).
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let file = File::open(path).map_err(|e| TlsError::Read {
        path: display(path),
        source: e,
    })?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| TlsError::Read {
            path: display(path),
            source: e,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(display(path)))
}

/// Build the rustls server configuration for the HTTPS listener.
///
/// `client_ca` selects the policy: `None` means server-auth-only with the
/// fixed ALPN list, `Some` means mutual TLS against the given CA pool with
/// no ALPN list. The aws-lc-rs provider supplies the platform CSPRNG.
pub fn build_server_config(
    cert_path: &Path,
    key_path: &Path,
    client_ca: Option<&Path>,
) -> Result<ServerConfig, TlsError> {
    let certs = load_certs(cert_path)?;
    let key = load_private_key(key_path)?;

    let builder = ServerConfig::builder_with_provider(Arc::new(crypto_provider()))
        .with_protocol_versions(&[&rustls::version::TLS12, &rustls::version::TLS13])?;

    let config = match client_ca {
        Some(ca_path) => {
            let mut roots = RootCertStore::empty();
            for cert in load_certs(ca_path)? {
                roots.add(cert).map_err(|e| TlsError::BadCertificate {
                    path: display(ca_path),
                    source: e,
                })?;
            }
            let verifier = WebPkiClientVerifier::builder_with_provider(
                Arc::new(roots),
                Arc::new(crypto_provider()),
            )
            .build()?;
            tracing::info!(ca = %ca_path.display(), "Mutual TLS enabled");
            builder
                .with_client_cert_verifier(verifier)
                .with_single_cert(certs, key)?
        }
        None => {
            let mut config = builder
                .with_no_client_auth()
                .with_single_cert(certs, key)?;
            config.alpn_protocols = ALPN_PROTOCOLS.iter().map(|p| p.to_vec()).collect();
            config
        }
    };
    Ok(config)
}

fn crypto_provider() -> CryptoProvider {
    CryptoProvider {
        cipher_suites: CIPHER_SUITES.to_vec(),
        kx_groups: KX_GROUPS.to_vec(),
        ..provider::default_provider()
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
