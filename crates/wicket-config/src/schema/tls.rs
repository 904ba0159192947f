use serde::{Deserialize, Serialize};

/// PEM files used by a TLS-enabled transport. Both or neither must be set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TlsConfig {
    pub certificate_path: String,
    pub private_key_path: String,
}

impl TlsConfig {
    pub fn is_configured(&self) -> bool {
        !self.certificate_path.is_empty() && !self.private_key_path.is_empty()
    }
}
