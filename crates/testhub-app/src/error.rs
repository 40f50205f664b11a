//! # Design
//!
//! - Centralize bootstrap errors behind one type returned from `main`.
//! - Keep error messages constant while carrying the failed operation as context.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded from the environment.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: testhub_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: testhub_telemetry::TelemetryError,
    },
    /// The remote job client could not be constructed.
    #[error("remote client operation failed")]
    Remote {
        /// Operation identifier.
        operation: &'static str,
        /// Source remote error.
        source: testhub_remote::RemoteError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: testhub_api::ApiServerError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: testhub_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: testhub_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn remote(
        operation: &'static str,
        source: testhub_remote::RemoteError,
    ) -> Self {
        Self::Remote { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: testhub_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "relay_config.from_env",
            testhub_config::ConfigError::InvalidField {
                field: "TESTHUB_BIND_ADDR".to_string(),
                reason: "not_a_socket_address",
                value: Some("nope".to_string()),
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "relay_config.from_env",
                ..
            }
        ));
        assert_eq!(config.to_string(), "configuration operation failed");
        assert!(config.source().is_some());

        let remote = AppError::remote(
            "remote_client.new",
            testhub_remote::RemoteError::InvalidBaseUrl {
                url: "ftp://nowhere".to_string(),
            },
        );
        assert!(matches!(remote, AppError::Remote { .. }));

        let api = AppError::api_server(
            "api_server.serve",
            testhub_api::ApiServerError::Serve {
                source: io::Error::other("io"),
            },
        );
        assert!(matches!(api, AppError::ApiServer { .. }));
    }
}
