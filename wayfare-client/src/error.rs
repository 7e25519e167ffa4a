use wayfare_core::{CoreError, StorageError, TransportError};
use wayfare_offer::OfferError;

pub const NETWORK_MESSAGE: &str = "Network connection failed. Please check your internet connection.";
pub const INVALID_API_KEY_MESSAGE: &str = "API key is invalid. Please check your API credentials.";
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const FLIGHT_SEARCH_FAILED_MESSAGE: &str = "Failed to search flights. Please try again.";
pub const AIRPORT_SEARCH_FAILED_MESSAGE: &str = "Failed to search airports. Please try again.";

/// Which request failed; selects the generic fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SearchAirports,
    SearchFlights,
}

impl Operation {
    fn generic_message(&self) -> &'static str {
        match self {
            Operation::SearchAirports => AIRPORT_SEARCH_FAILED_MESSAGE,
            Operation::SearchFlights => FLIGHT_SEARCH_FAILED_MESSAGE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("Network connection failed: {0}")]
    Network(String),

    #[error("Aggregator rejected the API key")]
    InvalidApiKey,

    #[error("Aggregator rate limit exceeded")]
    RateLimited,

    #[error("{operation:?} failed: {detail}")]
    Upstream { operation: Operation, detail: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    pub fn from_transport(err: TransportError, operation: Operation) -> Self {
        match err {
            TransportError::Connection(detail) => ClientError::Network(detail),
            TransportError::Status { status: 401 } => ClientError::InvalidApiKey,
            TransportError::Status { status: 429 } => ClientError::RateLimited,
            other => ClientError::Upstream {
                operation,
                detail: other.to_string(),
            },
        }
    }

    /// The one line shown to the user. Details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(message) => message.clone(),
            ClientError::Network(_) => NETWORK_MESSAGE.to_string(),
            ClientError::InvalidApiKey => INVALID_API_KEY_MESSAGE.to_string(),
            ClientError::RateLimited => RATE_LIMIT_MESSAGE.to_string(),
            ClientError::Upstream { operation, .. } => operation.generic_message().to_string(),
            ClientError::Storage(_) => FLIGHT_SEARCH_FAILED_MESSAGE.to_string(),
        }
    }
}

impl From<OfferError> for ClientError {
    fn from(err: OfferError) -> Self {
        ClientError::Upstream {
            operation: Operation::SearchFlights,
            detail: err.to_string(),
        }
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(message) => ClientError::Validation(message),
            CoreError::StorageError(e) => ClientError::Storage(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_map_to_distinct_messages() {
        let cases = [
            (TransportError::Connection("refused".into()), NETWORK_MESSAGE),
            (TransportError::Status { status: 401 }, INVALID_API_KEY_MESSAGE),
            (TransportError::Status { status: 429 }, RATE_LIMIT_MESSAGE),
            (TransportError::Status { status: 500 }, FLIGHT_SEARCH_FAILED_MESSAGE),
            (TransportError::Timeout, FLIGHT_SEARCH_FAILED_MESSAGE),
        ];

        for (err, expected) in cases {
            assert_eq!(ClientError::from_transport(err, Operation::SearchFlights).user_message(), expected);
        }
    }

    #[test]
    fn test_generic_message_depends_on_operation() {
        let err = ClientError::from_transport(TransportError::Decode("eof".into()), Operation::SearchAirports);
        assert_eq!(err.user_message(), AIRPORT_SEARCH_FAILED_MESSAGE);
    }

    #[test]
    fn test_malformed_payload_is_generic() {
        let err: ClientError = OfferError::MissingData.into();
        assert_eq!(err.user_message(), FLIGHT_SEARCH_FAILED_MESSAGE);
    }

    #[test]
    fn test_storage_failure_keeps_its_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ClientError = CoreError::from(StorageError::from(io)).into();
        assert!(matches!(err, ClientError::Storage(StorageError::Io(_))));
        assert_eq!(err.user_message(), FLIGHT_SEARCH_FAILED_MESSAGE);
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err: ClientError = CoreError::validation("Please select a return date").into();
        assert_eq!(err.user_message(), "Please select a return date");
    }
}
