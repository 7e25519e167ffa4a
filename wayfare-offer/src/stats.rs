use std::collections::{BTreeSet, HashSet};

use wayfare_core::{FilterStats, Offer};

/// Aggregates over a result set, computed in one pass.
///
/// Price bounds only consider offers with a usable amount; when none has one
/// both bounds are 0. Airline names keep first-seen order.
pub fn compute_filter_stats(offers: &[Offer]) -> FilterStats {
    let mut bounds: Option<(f64, f64)> = None;
    let mut seen = HashSet::new();
    let mut airlines = Vec::new();
    let mut stops = BTreeSet::new();

    for offer in offers {
        if offer.price.is_priced() {
            let amount = offer.price.amount;
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(amount), max.max(amount)),
                None => (amount, amount),
            });
        }

        for itinerary in offer.itineraries() {
            stops.insert(itinerary.stops);
            for segment in &itinerary.segments {
                if seen.insert(segment.airline.name.as_str()) {
                    airlines.push(segment.airline.name.clone());
                }
            }
        }
    }

    let (min_price, max_price) = bounds.unwrap_or((0.0, 0.0));

    FilterStats {
        min_price,
        max_price,
        airlines,
        stops: stops.into_iter().collect(),
        total_results: offers.len(),
    }
}
