use std::sync::Arc;
use tracing::{error, info, warn};
use wayfare_core::{FlightDataSource, LocaleSettings, RecentSearch, SearchForm, SearchQuery, SearchResult};
use wayfare_offer::build_search_result;
use wayfare_session::SearchStore;

use crate::error::{ClientError, Operation};

/// Runs a flight search end to end and reports every outcome to the search store.
pub struct FlightService {
    source: Arc<dyn FlightDataSource>,
    store: Arc<SearchStore>,
    locale: LocaleSettings,
}

impl FlightService {
    pub fn new(source: Arc<dyn FlightDataSource>, store: Arc<SearchStore>, locale: LocaleSettings) -> Self {
        Self { source, store, locale }
    }

    pub fn store(&self) -> &Arc<SearchStore> {
        &self.store
    }

    /// Validate `form`, query the aggregator and publish the outcome.
    ///
    /// Invalid forms never reach the network. A result that arrives after a
    /// newer search has begun is returned to the caller but not published.
    pub async fn search(&self, form: &SearchForm) -> Result<SearchResult, ClientError> {
        let query = match form.build(&self.locale) {
            Ok(query) => query,
            Err(e) => {
                let err = ClientError::from(e);
                self.store.validation_failed(err.user_message());
                return Err(err);
            }
        };

        let ticket = self.store.begin_search(query.clone());
        match self.fetch(&query).await {
            Ok(result) => {
                info!(
                    "Search {} returned {} offers (session {})",
                    ticket.0,
                    result.offers.len(),
                    result.session_id
                );
                if self.store.search_succeeded(ticket, result.clone()) {
                    self.remember(form, &query).await;
                }
                Ok(result)
            }
            Err(err) => {
                error!("Search {} failed: {}", ticket.0, err);
                self.store.search_failed(ticket, err.user_message());
                Err(err)
            }
        }
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<SearchResult, ClientError> {
        let body = self
            .source
            .search_flights(&query.to_query_params())
            .await
            .map_err(|e| ClientError::from_transport(e, Operation::SearchFlights))?;
        Ok(build_search_result(body, query)?)
    }

    async fn remember(&self, form: &SearchForm, query: &SearchQuery) {
        let (Some(from), Some(to)) = (form.origin.clone(), form.destination.clone()) else {
            warn!("Search succeeded without both airports on the form");
            return;
        };
        let entry = RecentSearch::new(from, to, query.date, query.return_date, query.passenger_count());
        self.store.record_recent_search(entry).await;
    }
}
