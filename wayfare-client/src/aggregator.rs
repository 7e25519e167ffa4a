use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{error, info};
use wayfare_core::{FlightDataSource, TransportError};
use wayfare_shared::Masked;
use wayfare_store::app_config::AggregatorConfig;

const AIRPORT_SEARCH_PATH: &str = "/api/v1/flights/searchAirport";
const FLIGHT_SEARCH_PATH: &str = "/api/v2/flights/searchFlights";
const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// RapidAPI-hosted flight aggregator over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpAggregator {
    client: Client,
    base_url: String,
    host: String,
    api_key: Masked<String>,
}

impl HttpAggregator {
    pub fn new(config: &AggregatorConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            host: config.host.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Point at a different origin, e.g. a local stub server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("X-RapidAPI-Key", self.api_key.expose().as_str())
            .header("X-RapidAPI-Host", self.host.as_str())
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Value, TransportError> {
        let response = request.send().await.map_err(|e| {
            error!("Request to {} failed: {}", path, e);
            transport_error(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("{} returned HTTP {}", path, status.as_u16());
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

fn transport_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connection(e.to_string())
    } else if let Some(status) = e.status() {
        TransportError::Status {
            status: status.as_u16(),
        }
    } else if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

#[async_trait]
impl FlightDataSource for HttpAggregator {
    async fn search_airports(&self, query: &str, locale: &str) -> Result<Value, TransportError> {
        info!("Searching airports for '{}'", query);
        let request = self
            .get(AIRPORT_SEARCH_PATH)
            .query(&[("query", query), ("locale", locale)]);
        self.send(request, AIRPORT_SEARCH_PATH).await
    }

    async fn search_flights(&self, params: &[(&'static str, String)]) -> Result<Value, TransportError> {
        info!("Searching flights with {} parameters", params.len());
        let request = self.get(FLIGHT_SEARCH_PATH).query(params);
        self.send(request, FLIGHT_SEARCH_PATH).await
    }
}
