use std::sync::Arc;
use wayfare_core::{FlightDataSource, KeyValueStore, TransportError};
use wayfare_session::{AuthStore, SearchStore};
use wayfare_store::{Config, FileStore, JsonStorage, MemoryStore, SearchHistory};

use crate::aggregator::HttpAggregator;
use crate::airports::AirportLookup;
use crate::auth::{AuthService, AuthSession};
use crate::flights::FlightService;

/// Everything a front end needs, wired once and shared.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchStore>,
    pub auth: Arc<AuthStore>,
    pub flights: Arc<FlightService>,
    pub airports: Arc<AirportLookup>,
    pub session: Arc<AuthSession>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let source: Arc<dyn FlightDataSource> = Arc::new(HttpAggregator::new(&config.aggregator)?);
        let store: Arc<dyn KeyValueStore> = if config.storage.path.is_empty() {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FileStore::new(&config.storage.path))
        };
        Ok(Self::with_parts(source, JsonStorage::new(store), config))
    }

    /// Wire the app around an arbitrary data source and storage backend.
    pub fn with_parts(source: Arc<dyn FlightDataSource>, storage: JsonStorage, config: &Config) -> Self {
        let history = SearchHistory::with_limit(storage.clone(), config.search.recent_search_limit);
        let search = Arc::new(SearchStore::with_history(history));
        let auth = Arc::new(AuthStore::new());

        let flights = FlightService::new(source.clone(), search.clone(), config.aggregator.locale_settings());
        let airports = AirportLookup::new(source, config.aggregator.locale.clone())
            .with_min_query_len(config.search.min_airport_query_len);
        let session = AuthSession::new(AuthService::new(storage), auth.clone());

        Self {
            search,
            auth,
            flights: Arc::new(flights),
            airports: Arc::new(airports),
            session: Arc::new(session),
        }
    }

    /// Load persisted recent searches and the signed-in user.
    pub async fn hydrate(&self) {
        self.search.hydrate_recent().await;
        self.session.restore().await;
    }
}
