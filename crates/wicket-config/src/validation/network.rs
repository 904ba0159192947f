//! Validation for listening addresses and TLS material.

use crate::schema::WicketConfig;

pub(crate) fn validate_server(errors: &mut Vec<String>, config: &WicketConfig) {
    let server = &config.server;
    if server.host.trim().is_empty() {
        errors.push("server.host must not be empty".into());
    }
    if server.port != 0 && server.port == server.ws_port {
        errors.push(format!(
            "server.port and server.ws_port must differ (both {})",
            server.port
        ));
    }
}

pub(crate) fn validate_tls(errors: &mut Vec<String>, config: &WicketConfig) {
    let tls = &config.tls;
    if tls.certificate_path.is_empty() != tls.private_key_path.is_empty() {
        errors.push("tls.certificate_path and tls.private_key_path must be set together".into());
    }
}
