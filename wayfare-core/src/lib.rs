pub mod airport;
pub mod auth;
pub mod filters;
pub mod history;
pub mod offer;
pub mod repository;
pub mod search;

pub use airport::Airport;
pub use filters::FlightFilters;
pub use history::RecentSearch;
pub use offer::{Agent, Airline, FilterStats, Itinerary, Offer, Price, SearchResult, Segment, SegmentEndpoint};
pub use repository::{FlightDataSource, KeyValueStore, StorageError, TransportError};
pub use search::{CabinClass, LocaleSettings, SearchForm, SearchQuery, SortBy, TripType};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Carries the exact message shown next to the form that failed.
    #[error("{0}")]
    ValidationError(String),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
