//! Error types for the virtual brain runtime
//!
//! The tick algorithm itself never fails. Errors only surface when a caller
//! addresses a neuron that does not exist, builds an inconsistent network, or
//! hands in invalid configuration.

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, BrainError>;

/// Errors that can occur while building or driving a brain
#[derive(Error, Debug)]
pub enum BrainError {
    /// Neuron not found
    #[error("Neuron {neuron_id} not found")]
    NeuronNotFound {
        /// Neuron ID that was not found
        neuron_id: u32,
    },

    /// Invalid network configuration
    #[error("Invalid network configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Network topology error
    #[error("Network topology error: {reason}")]
    NetworkTopology {
        /// Reason for topology error
        reason: String,
    },

    /// Operation not supported by this neuron variant
    #[error("Neuron {neuron_id} does not support {operation}")]
    UnsupportedOperation {
        /// Neuron the operation was addressed to
        neuron_id: u32,
        /// Operation name
        operation: String,
    },

    /// Configuration text could not be parsed
    #[error("Config parse error: {reason}")]
    ConfigParse {
        /// Parser message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrainError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create a network topology error
    pub fn network_topology(reason: impl Into<String>) -> Self {
        Self::NetworkTopology {
            reason: reason.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(neuron_id: u32, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            neuron_id,
            operation: operation.into(),
        }
    }

    /// Create a config parse error
    pub fn config_parse(reason: impl Into<String>) -> Self {
        Self::ConfigParse {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BrainError::invalid_config("duplicate neuron");
        assert!(matches!(err, BrainError::InvalidConfiguration { .. }));

        let err = BrainError::invalid_parameter("decay_rate", "0.0", "> 0.0");
        assert!(matches!(err, BrainError::InvalidParameter { .. }));

        let err = BrainError::unsupported(3, "fire");
        assert!(matches!(err, BrainError::UnsupportedOperation { neuron_id: 3, .. }));
    }

    #[test]
    fn test_error_display() {
        let err = BrainError::NeuronNotFound { neuron_id: 42 };
        assert_eq!(format!("{}", err), "Neuron 42 not found");

        let err = BrainError::unsupported(7, "emit");
        assert_eq!(format!("{}", err), "Neuron 7 does not support emit");
    }
}
