use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};
use wayfare_core::history::push_recent;
use wayfare_core::{FlightFilters, Offer, RecentSearch, SearchQuery, SearchResult};
use wayfare_store::history::DEFAULT_RECENT_LIMIT;
use wayfare_store::SearchHistory;

/// Identifies one begun search. Later searches always get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SearchTicket(pub u64);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub query: Option<SearchQuery>,
    pub result: Option<SearchResult>,
    pub selected_offer: Option<Offer>,
    pub filters: FlightFilters,
    pub recent_searches: Vec<RecentSearch>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Completions carrying an older ticket than this are ignored
    pub latest_ticket: u64,
}

impl SearchState {
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.latest_ticket
    }
}

#[derive(Debug, Clone)]
pub enum SearchAction {
    Begin { ticket: SearchTicket, query: SearchQuery },
    Succeeded { ticket: SearchTicket, result: SearchResult },
    Failed { ticket: SearchTicket, message: String },
    /// The form never reached the network; no ticket involved.
    ValidationFailed(String),
    SelectOffer(Option<Offer>),
    UpdateFilters(FlightFilters),
    ClearFilters,
    RecordRecent { entry: RecentSearch, limit: usize },
    /// Persisted list loaded at start-up. Entries recorded in memory before it
    /// arrived stay on top.
    HydrateRecent { persisted: Vec<RecentSearch>, limit: usize },
    ClearSearch,
}

/// Pure transition function. `None` means the action was discarded and the
/// state is unchanged.
pub fn reduce(state: &SearchState, action: SearchAction) -> Option<SearchState> {
    let mut next = state.clone();
    match action {
        SearchAction::Begin { ticket, query } => {
            next.latest_ticket = ticket.0;
            next.query = Some(query);
            next.is_loading = true;
            next.error = None;
        }
        SearchAction::Succeeded { ticket, result } => {
            if !state.is_current(ticket) {
                return None;
            }
            next.result = Some(result);
            next.is_loading = false;
            next.error = None;
        }
        SearchAction::Failed { ticket, message } => {
            if !state.is_current(ticket) {
                return None;
            }
            next.is_loading = false;
            next.error = Some(message);
        }
        SearchAction::ValidationFailed(message) => {
            next.error = Some(message);
        }
        SearchAction::SelectOffer(offer) => {
            next.selected_offer = offer;
        }
        SearchAction::UpdateFilters(patch) => {
            next.filters = state.filters.merge(patch);
        }
        SearchAction::ClearFilters => {
            next.filters = FlightFilters::default();
        }
        SearchAction::RecordRecent { entry, limit } => {
            next.recent_searches = push_recent(&state.recent_searches, entry, limit);
        }
        SearchAction::HydrateRecent { persisted, limit } => {
            let mut merged = persisted;
            merged.truncate(limit);
            for entry in state.recent_searches.iter().rev() {
                merged = push_recent(&merged, entry.clone(), limit);
            }
            next.recent_searches = merged;
        }
        SearchAction::ClearSearch => {
            // Retire any in-flight search so its completion cannot refill the screen.
            next = SearchState {
                recent_searches: std::mem::take(&mut next.recent_searches),
                latest_ticket: state.latest_ticket + 1,
                ..SearchState::default()
            };
        }
    }
    Some(next)
}

/// Search/session container. Cheap to share behind an `Arc`.
pub struct SearchStore {
    tx: watch::Sender<Arc<SearchState>>,
    history: Option<SearchHistory>,
    recent_limit: usize,
}

impl SearchStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(SearchState::default()));
        Self {
            tx,
            history: None,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    /// Persist recent searches through `history`.
    pub fn with_history(history: SearchHistory) -> Self {
        let recent_limit = history.limit();
        Self {
            history: Some(history),
            recent_limit,
            ..Self::new()
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SearchState>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Arc<SearchState> {
        self.tx.borrow().clone()
    }

    /// Apply `action` and publish the new snapshot. Returns false if it was discarded.
    pub fn dispatch(&self, action: SearchAction) -> bool {
        self.tx.send_if_modified(|current| match reduce(current, action) {
            Some(next) => {
                *current = Arc::new(next);
                true
            }
            None => false,
        })
    }

    pub fn begin_search(&self, query: SearchQuery) -> SearchTicket {
        let mut issued = SearchTicket(0);
        self.tx.send_modify(|current| {
            let ticket = SearchTicket(current.latest_ticket + 1);
            if let Some(next) = reduce(current, SearchAction::Begin { ticket, query }) {
                *current = Arc::new(next);
            }
            issued = ticket;
        });
        debug!("Search {} started", issued.0);
        issued
    }

    pub fn search_succeeded(&self, ticket: SearchTicket, result: SearchResult) -> bool {
        let applied = self.dispatch(SearchAction::Succeeded { ticket, result });
        if !applied {
            debug!("Discarding stale result for search {}", ticket.0);
        }
        applied
    }

    pub fn search_failed(&self, ticket: SearchTicket, message: impl Into<String>) -> bool {
        let applied = self.dispatch(SearchAction::Failed {
            ticket,
            message: message.into(),
        });
        if !applied {
            debug!("Discarding stale failure for search {}", ticket.0);
        }
        applied
    }

    pub fn validation_failed(&self, message: impl Into<String>) {
        self.dispatch(SearchAction::ValidationFailed(message.into()));
    }

    pub fn select_offer(&self, offer: Option<Offer>) {
        self.dispatch(SearchAction::SelectOffer(offer));
    }

    pub fn update_filters(&self, patch: FlightFilters) {
        self.dispatch(SearchAction::UpdateFilters(patch));
    }

    pub fn clear_filters(&self) {
        self.dispatch(SearchAction::ClearFilters);
    }

    /// Update the in-memory list first, then persist. A storage failure is
    /// logged and leaves the in-memory list as updated.
    pub async fn record_recent_search(&self, entry: RecentSearch) {
        self.dispatch(SearchAction::RecordRecent {
            entry: entry.clone(),
            limit: self.recent_limit,
        });

        if let Some(history) = &self.history {
            if let Err(e) = history.save_recent_search(entry).await {
                warn!("Failed to persist recent search: {}", e);
            }
        }
    }

    /// Load persisted recent searches, typically once at start-up.
    pub async fn hydrate_recent(&self) {
        let Some(history) = &self.history else {
            return;
        };
        match history.recent_searches().await {
            Ok(list) => {
                debug!("Restored {} recent searches", list.len());
                self.dispatch(SearchAction::HydrateRecent {
                    persisted: list,
                    limit: self.recent_limit,
                });
            }
            Err(e) => warn!("Failed to load recent searches: {}", e),
        }
    }

    pub fn clear_search(&self) {
        self.dispatch(SearchAction::ClearSearch);
    }
}

impl Default for SearchStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use wayfare_core::{Airport, CabinClass, FilterStats, SortBy};
    use wayfare_store::JsonStorage;

    fn query(to: &str) -> SearchQuery {
        SearchQuery {
            origin_sky_id: "JFK".to_string(),
            destination_sky_id: to.to_string(),
            origin_entity_id: "1".to_string(),
            destination_entity_id: "2".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            return_date: None,
            cabin_class: CabinClass::Economy,
            adults: 1,
            children: None,
            infants: None,
            sort_by: SortBy::Best,
            currency: "USD".to_string(),
            market: "en-US".to_string(),
            locale: "en-US".to_string(),
        }
    }

    fn result_for(q: &SearchQuery, offer_ids: &[&str]) -> SearchResult {
        SearchResult {
            session_id: format!("session-{}", q.destination_sky_id),
            query: q.clone(),
            offers: offer_ids
                .iter()
                .map(|id| Offer {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            filter_stats: FilterStats::default(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_begin_then_succeed() {
        let store = SearchStore::new();
        let q = query("LHR");
        let ticket = store.begin_search(q.clone());

        let loading = store.snapshot();
        assert!(loading.is_loading);
        assert_eq!(loading.query.as_ref(), Some(&q));

        assert!(store.search_succeeded(ticket, result_for(&q, &["a", "b"])));
        let done = store.snapshot();
        assert!(!done.is_loading);
        assert_eq!(done.error, None);
        assert_eq!(done.result.as_ref().map(|r| r.offers.len()), Some(2));
    }

    #[test]
    fn test_stale_completion_never_overwrites_newer_search() {
        let store = SearchStore::new();
        let first = store.begin_search(query("LHR"));
        let second = store.begin_search(query("CDG"));
        assert!(second > first);

        assert!(store.search_succeeded(second, result_for(&query("CDG"), &["cdg-1"])));
        assert!(!store.search_succeeded(first, result_for(&query("LHR"), &["lhr-1"])));
        assert!(!store.search_failed(first, "late failure"));

        let state = store.snapshot();
        assert_eq!(state.result.as_ref().map(|r| r.session_id.as_str()), Some("session-CDG"));
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_failure_keeps_prior_result() {
        let store = SearchStore::new();
        let q = query("LHR");
        let t1 = store.begin_search(q.clone());
        store.search_succeeded(t1, result_for(&q, &["a"]));

        let t2 = store.begin_search(q.clone());
        store.search_failed(t2, "Failed to search flights. Please try again.");

        let state = store.snapshot();
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("Failed to search flights. Please try again."));
        assert_eq!(state.result.as_ref().map(|r| r.offers[0].id.as_str()), Some("a"));
    }

    #[test]
    fn test_validation_failure_leaves_loading_alone() {
        let store = SearchStore::new();
        store.validation_failed("Please fill in all required fields");

        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some("Please fill in all required fields"));
        assert!(!state.is_loading);
        assert_eq!(state.latest_ticket, 0);
    }

    #[test]
    fn test_clear_search_resets_selection_and_retires_in_flight() {
        let store = SearchStore::new();
        let q = query("LHR");
        let ticket = store.begin_search(q.clone());
        store.select_offer(Some(Offer::default()));
        store.update_filters(FlightFilters {
            stops: Some(vec![0]),
            ..Default::default()
        });
        store.validation_failed("oops");

        store.clear_search();
        let cleared = store.snapshot();
        assert_eq!(cleared.selected_offer, None);
        assert_eq!(cleared.error, None);
        assert_eq!(cleared.query, None);
        assert!(cleared.filters.is_empty());
        assert!(!cleared.is_loading);

        assert!(!store.search_succeeded(ticket, result_for(&q, &["late"])));
        assert!(store.snapshot().result.is_none());

        let next = store.begin_search(q);
        assert!(next > ticket);
    }

    #[test]
    fn test_selection_and_filters_are_independent_of_search() {
        let store = SearchStore::new();
        let offer = Offer {
            id: "picked".to_string(),
            ..Default::default()
        };
        store.select_offer(Some(offer.clone()));
        store.update_filters(FlightFilters {
            duration: Some(600),
            ..Default::default()
        });
        store.update_filters(FlightFilters {
            airlines: Some(vec!["Acme Air".to_string()]),
            ..Default::default()
        });

        let state = store.snapshot();
        assert_eq!(state.selected_offer, Some(offer));
        assert_eq!(state.filters.duration, Some(600));
        assert_eq!(state.filters.airlines, Some(vec!["Acme Air".to_string()]));

        store.clear_filters();
        assert!(store.snapshot().filters.is_empty());
    }

    fn recent(to: &str, day: u32) -> RecentSearch {
        RecentSearch::new(
            Airport::new("JFK", "New York", "", ""),
            Airport::new(to, to, "", ""),
            NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            None,
            1,
        )
    }

    #[test]
    fn test_hydrate_keeps_searches_recorded_before_it() {
        let early = SearchState {
            recent_searches: vec![recent("CDG", 3), recent("LHR", 1)],
            ..Default::default()
        };
        let persisted = vec![recent("LHR", 1), recent("NRT", 2), recent("SFO", 4)];

        let next = reduce(&early, SearchAction::HydrateRecent { persisted, limit: 3 }).unwrap();
        let ids: Vec<&str> = next.recent_searches.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["JFK-CDG-2025-06-03", "JFK-LHR-2025-06-01", "JFK-NRT-2025-06-02"]);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_snapshot() {
        let store = SearchStore::new();
        let mut rx = store.subscribe();
        store.begin_search(query("LHR"));

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_loading);
    }

    #[tokio::test]
    async fn test_recent_searches_persist_and_hydrate() {
        let storage = JsonStorage::in_memory();
        let store = SearchStore::with_history(SearchHistory::new(storage.clone()));
        let entry = RecentSearch::new(
            Airport::new("JFK", "New York", "", ""),
            Airport::new("LHR", "London", "", ""),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            None,
            1,
        );

        store.record_recent_search(entry.clone()).await;
        store.record_recent_search(entry.clone()).await;
        assert_eq!(store.snapshot().recent_searches.len(), 1);

        let restored = SearchStore::with_history(SearchHistory::new(storage));
        restored.hydrate_recent().await;
        assert_eq!(restored.snapshot().recent_searches, vec![entry]);
    }
}
