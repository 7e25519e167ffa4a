use async_trait::async_trait;

/// Failures at the HTTP boundary, before any response body is interpreted.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Upstream returned HTTP {status}")]
    Status { status: u16 },
    #[error("Response body could not be decoded: {0}")]
    Decode(String),
    #[error("Transport error: {0}")]
    Other(String),
}

/// The flight aggregation API.
///
/// Implementations perform exactly one request per call and return the decoded
/// JSON body; interpreting the body is left to the caller.
#[async_trait]
pub trait FlightDataSource: Send + Sync {
    /// `GET /api/v1/flights/searchAirport`
    async fn search_airports(
        &self,
        query: &str,
        locale: &str,
    ) -> Result<serde_json::Value, TransportError>;

    /// `GET /api/v2/flights/searchFlights`
    async fn search_flights(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<serde_json::Value, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable key-value storage holding JSON text under fixed keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}
