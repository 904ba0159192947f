//! TLS termination for the listeners, built from the PEM material installed
//! on the bridge.

use std::io;
use std::sync::Arc;

use rustls::ServerConfig;
use wicket_core::TlsMaterial;

fn invalid(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

/// Build a rustls server config from a PEM certificate chain and key.
pub fn server_config(material: &TlsMaterial) -> io::Result<Arc<ServerConfig>> {
    // Ensure a crypto provider is installed (ring via feature flag).
    let _ = rustls::crypto::ring::default_provider().install_default();

    let certs = rustls_pemfile::certs(&mut material.certificate_pem.as_bytes())
        .collect::<Result<Vec<_>, _>>()?;
    if certs.is_empty() {
        return Err(invalid("no certificate in PEM"));
    }
    let key = rustls_pemfile::private_key(&mut material.private_key_pem.as_bytes())?
        .ok_or_else(|| invalid("no private key in PEM"))?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| invalid(format!("build rustls ServerConfig: {e}")))?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(Arc::new(config))
}

/// Server config for the bridge's current TLS material, if any.
pub fn from_bridge(bridge: &wicket_core::Bridge) -> io::Result<Option<Arc<ServerConfig>>> {
    bridge
        .tls_material()
        .map(|material| server_config(&material))
        .transpose()
}
