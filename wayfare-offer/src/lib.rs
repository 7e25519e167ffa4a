//! Offer pipeline: aggregator payload -> normalized `SearchResult`, plus the
//! derived statistics and the display ordering used by result lists.

pub mod normalizer;
pub mod ranker;
pub mod raw;
pub mod stats;

pub use normalizer::{build_search_result, normalize_airports, OfferError};
pub use ranker::{display_order, rank_for_display, rank_in_place};
pub use raw::{RawAirportResponse, RawSearchResponse};
pub use stats::compute_filter_stats;
