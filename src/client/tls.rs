//! TLS connector shared by all probes of a run

use crate::error::{AppError, Result};
use std::sync::Arc;
use tokio_rustls::rustls::{self, pki_types::ServerName, ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

/// Build a connector trusting the bundled webpki roots.
///
/// The ring provider is passed explicitly so the process-wide default
/// provider never has to be installed.
pub fn build_connector() -> Result<TlsConnector> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| AppError::tls(format!("Failed to configure TLS: {}", e)))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// SNI value for the trace host
pub fn server_name(host: &str) -> Result<ServerName<'static>> {
    ServerName::try_from(host.to_string())
        .map_err(|e| AppError::tls(format!("Invalid TLS server name '{}': {}", host, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_connector() {
        assert!(build_connector().is_ok());
    }

    #[test]
    fn test_server_name() {
        assert!(server_name("speed.cloudflare.com").is_ok());
        assert!(server_name("104.16.0.1").is_ok());
        assert!(server_name("not a host").is_err());
    }
}
