//! Error types for hub peripheral operations

use crate::peripherals::SubscriptionId;
use crate::transport::TransportError;
use thiserror::Error;

/// The main error type for peripheral operations
#[derive(Error, Debug)]
pub enum HubError {
    /// Out-of-range speed, color, duration or mode; raised before anything is written
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unsubscribe of a callback that is not registered
    #[error("Not subscribed: {0}")]
    NotSubscribed(SubscriptionId),

    /// Failure reported by the connection layer, passed through unchanged
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Payload that cannot be interpreted in the peripheral's current state
    #[error("Cannot decode notification: {0}")]
    ProtocolDecodeAmbiguity(String),
}

impl HubError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        HubError::InvalidArgument(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        HubError::ProtocolDecodeAmbiguity(msg.into())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_error() {
        let err = HubError::invalid_argument("speed 1.5");
        assert!(matches!(err, HubError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "Invalid argument: speed 1.5");
    }

    #[test]
    fn test_decode_error() {
        let err = HubError::decode("mode OFF");
        assert_eq!(err.to_string(), "Cannot decode notification: mode OFF");
    }

    #[test]
    fn test_from_transport_error() {
        let err: HubError = TransportError::NotConnected.into();
        assert!(matches!(err, HubError::Transport(TransportError::NotConnected)));
        assert!(err.to_string().contains("Transport error"));
    }
}
