use std::sync::Arc;
use tracing::{debug, info};
use wayfare_core::{Airport, FlightDataSource};
use wayfare_offer::normalize_airports;

use crate::error::{ClientError, Operation};

pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Typeahead lookup of airports and cities.
pub struct AirportLookup {
    source: Arc<dyn FlightDataSource>,
    locale: String,
    min_query_len: usize,
}

impl AirportLookup {
    pub fn new(source: Arc<dyn FlightDataSource>, locale: impl Into<String>) -> Self {
        Self {
            source,
            locale: locale.into(),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }

    pub fn with_min_query_len(mut self, min_query_len: usize) -> Self {
        self.min_query_len = min_query_len;
        self
    }

    /// Suggestions in server order. Short queries return nothing without a request.
    pub async fn search(&self, query: &str) -> Result<Vec<Airport>, ClientError> {
        let query = query.trim();
        if query.chars().count() < self.min_query_len {
            debug!("Airport query '{}' too short, skipping lookup", query);
            return Ok(Vec::new());
        }

        let body = self
            .source
            .search_airports(query, &self.locale)
            .await
            .map_err(|e| ClientError::from_transport(e, Operation::SearchAirports))?;

        let airports = normalize_airports(body);
        info!("Found {} airports for '{}'", airports.len(), query);
        Ok(airports)
    }
}
