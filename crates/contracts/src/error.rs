//! Layered error definitions
//!
//! `ContractError` for config and IO failures, `ProviderError` for the
//! sensor platform boundary.

use thiserror::Error;

use crate::{ListenerId, SensorType};

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors reported by a sensor provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The platform refused the subscription
    #[error("subscription refused for {sensor_type} ({source_name}): {message}")]
    SubscriptionRefused {
        sensor_type: SensorType,
        source_name: String,
        message: String,
    },

    /// The listener is already subscribed to a source
    #[error("{listener} is already subscribed")]
    AlreadySubscribed { listener: ListenerId },
}

impl ProviderError {
    pub fn subscription_refused(
        sensor_type: SensorType,
        source_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SubscriptionRefused {
            sensor_type,
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
