//! Full configuration validation.
//!
//! Validates numeric ranges, port conflicts and TLS completeness. Each
//! domain has its own submodule; this orchestrator calls them all and
//! collects errors into a single `ConfigError`.

mod helpers;
mod limits;
mod network;


use crate::schema::WicketConfig;
use wicket_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &WicketConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    limits::validate_browser(&mut errors, config);
    limits::validate_windows(&mut errors, config);
    network::validate_server(&mut errors, config);
    network::validate_tls(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
