use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use wayfare_core::{
    Agent, Airline, Airport, Itinerary, Offer, Price, SearchQuery, SearchResult, Segment, SegmentEndpoint,
};

use crate::raw::{
    first_non_empty, RawAirportResponse, RawItinerary, RawLeg, RawPlace, RawPrice, RawSearchResponse, RawSegment,
};
use crate::stats::compute_filter_stats;

const UNKNOWN_AGENT: &str = "Unknown";

#[derive(Debug, thiserror::Error)]
pub enum OfferError {
    #[error("No flight data received from API")]
    MissingData,

    #[error("Flight data has no itinerary collection")]
    MissingItineraries,

    #[error("Itinerary {index} has no outbound segments")]
    EmptyOutbound { index: usize },

    #[error("Response body is not a JSON object: {0}")]
    Malformed(String),
}

/// Turn a flight search response body into a `SearchResult`.
///
/// One offer is produced per raw itinerary, in the order received. Missing
/// fields inside an itinerary are defaulted; only a missing envelope or a
/// missing outbound leg aborts.
pub fn build_search_result(raw: Value, query: &SearchQuery) -> Result<SearchResult, OfferError> {
    let response: RawSearchResponse =
        serde_json::from_value(raw).map_err(|e| OfferError::Malformed(e.to_string()))?;

    let data = response.data.ok_or(OfferError::MissingData)?;
    let itineraries = data.itineraries.ok_or(OfferError::MissingItineraries)?;

    let mut offers = itineraries
        .into_iter()
        .enumerate()
        .map(|(index, item)| normalize_offer(index, item, &query.currency))
        .collect::<Result<Vec<_>, _>>()?;
    dedupe_offer_ids(&mut offers);

    let filter_stats = compute_filter_stats(&offers);
    let timestamp = Utc::now();
    let session_id = data
        .session_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("session-{}", timestamp.timestamp_millis()));

    tracing::info!(
        "Normalized {} offers for {} -> {} (session {})",
        offers.len(),
        query.origin_sky_id,
        query.destination_sky_id,
        session_id
    );

    Ok(SearchResult {
        session_id,
        query: query.clone(),
        offers,
        filter_stats,
        timestamp,
    })
}

fn normalize_offer(index: usize, item: RawItinerary, currency: &str) -> Result<Offer, OfferError> {
    let price = normalize_price(&item.price, currency);
    if !price.is_priced() {
        tracing::debug!("Itinerary {} has no usable price, defaulting to {}", index, price.amount);
    }

    let mut legs = item.legs.into_iter();

    let outbound = legs
        .next()
        .filter(|leg| !leg.segments.is_empty())
        .map(|leg| normalize_itinerary(index, 0, leg))
        .ok_or(OfferError::EmptyOutbound { index })?;

    // A return leg that resolves to nothing just means one-way.
    let inbound = legs
        .next()
        .filter(|leg| !leg.segments.is_empty())
        .map(|leg| normalize_itinerary(index, 1, leg));

    let agent = item.agent.map(|a| Agent {
        name: a.name.filter(|n| !n.is_empty()).unwrap_or_else(|| UNKNOWN_AGENT.to_string()),
        rating: a.rating,
    });

    Ok(Offer {
        id: item.id.filter(|s| !s.is_empty()).unwrap_or_else(|| format!("offer-{}", index)),
        token: item.token.unwrap_or_default(),
        price,
        outbound,
        inbound,
        deep_link: item.deep_link.unwrap_or_default(),
        agent,
        is_best_value: item.is_best_value.unwrap_or(false),
        is_cheapest: item.is_cheapest.unwrap_or(false),
        is_fastest: item.is_fastest.unwrap_or(false),
    })
}

/// Offer ids are unique within a result. A repeated id, whether upstream or
/// synthesized, is replaced by the first free `offer-<index>[-<n>]`.
fn dedupe_offer_ids(offers: &mut [Offer]) {
    let mut seen = HashSet::new();
    for (index, offer) in offers.iter_mut().enumerate() {
        if seen.insert(offer.id.clone()) {
            continue;
        }
        let mut candidate = format!("offer-{}", index);
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("offer-{}-{}", index, n);
            n += 1;
        }
        tracing::debug!("Offer id {} already taken, using {}", offer.id, candidate);
        seen.insert(candidate.clone());
        offer.id = candidate;
    }
}

/// Numeric `raw` wins; otherwise the number embedded in `formatted`; otherwise 0.
fn normalize_price(raw: &RawPrice, currency: &str) -> Price {
    let amount = raw
        .raw
        .filter(|a| a.is_finite())
        .or_else(|| raw.formatted.as_deref().and_then(parse_formatted_price))
        .unwrap_or(0.0);

    let formatted = raw
        .formatted
        .clone()
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| format!("{} {:.2}", currency, amount));

    Price {
        amount,
        currency: currency.to_string(),
        formatted,
    }
}

/// "$1,234.50" -> 1234.5. Currency symbols, codes and thousands separators are dropped.
fn parse_formatted_price(formatted: &str) -> Option<f64> {
    let cleaned: String = formatted
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().ok().filter(|a| a.is_finite())
}

fn normalize_itinerary(offer_index: usize, leg_index: usize, leg: RawLeg) -> Itinerary {
    let segments = leg
        .segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| normalize_segment(i, segment))
        .collect();

    Itinerary {
        id: leg
            .id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("leg-{}-{}", offer_index, leg_index)),
        segments,
        total_duration: leg.duration_in_minutes.unwrap_or(0),
        stops: leg.stop_count.unwrap_or(0),
    }
}

fn normalize_segment(index: usize, segment: RawSegment) -> Segment {
    let departure = segment.departure.unwrap_or_default();
    let arrival = segment.arrival.unwrap_or_default();
    let marketing = &segment.marketing_carrier;
    let operating = &segment.operating_carrier;

    Segment {
        id: segment
            .id
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("segment-{}", index)),
        origin: endpoint(&segment.origin, &departure),
        destination: endpoint(&segment.destination, &arrival),
        duration_minutes: segment.duration_in_minutes.unwrap_or(0),
        airline: Airline {
            name: first_non_empty([marketing.name.as_ref(), operating.name.as_ref()]),
            code: first_non_empty([marketing.alternate_id.as_ref(), marketing.id.as_ref()]),
            logo: marketing.logo_url.clone().unwrap_or_default(),
        },
        flight_number: segment.flight_number.unwrap_or_default(),
        aircraft: segment.aircraft.name.filter(|a| !a.is_empty()),
        operating_airline: operating.name.clone().unwrap_or_default(),
        stops: segment.stops.unwrap_or(0),
        cabin_class: segment.cabin_class.unwrap_or_default(),
        departure,
        arrival,
    }
}

fn endpoint(place: &RawPlace, time: &str) -> SegmentEndpoint {
    SegmentEndpoint {
        airport: place.name.clone().unwrap_or_default(),
        city: place.city.clone().unwrap_or_default(),
        time: time.to_string(),
        display_code: first_non_empty([place.display_code.as_ref(), place.id.as_ref()]),
    }
}

/// Map an airport lookup body to suggestions, keeping server order.
///
/// Entries without flight parameters, or without a code or a display name,
/// are skipped. A body with no `data` list yields no suggestions.
pub fn normalize_airports(raw: Value) -> Vec<Airport> {
    let response: RawAirportResponse = serde_json::from_value(raw).unwrap_or_default();

    let Some(entries) = response.data else {
        tracing::warn!("No airport data found in response");
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            let params = entry.navigation.relevant_flight_params?;
            let airport = Airport {
                code: params.sky_id.unwrap_or_default(),
                name: first_non_empty([
                    entry.presentation.suggestion_title.as_ref(),
                    entry.navigation.localized_name.as_ref(),
                ]),
                city: params.city.unwrap_or_default(),
                country: params.country.unwrap_or_default(),
                entity_id: params.entity_id.unwrap_or_default(),
            };
            airport.is_resolvable().then_some(airport)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::HashSet;
    use wayfare_core::{CabinClass, SortBy};

    fn query() -> SearchQuery {
        SearchQuery {
            origin_sky_id: "NYC".to_string(),
            destination_sky_id: "LON".to_string(),
            origin_entity_id: "27537542".to_string(),
            destination_entity_id: "27544008".to_string(),
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

    fn leg(airline: &str) -> Value {
        json!({ "segments": [ { "marketingCarrier": { "name": airline } } ] })
    }

    #[test]
    fn test_concrete_mapping() {
        let raw = json!({
            "data": {
                "itineraries": [{
                    "price": { "raw": 250 },
                    "legs": [{
                        "segments": [{
                            "departure": "2025-06-01T10:00",
                            "arrival": "2025-06-01T13:00",
                            "durationInMinutes": 180,
                            "marketingCarrier": { "name": "Acme Air" }
                        }]
                    }]
                }]
            }
        });

        let result = build_search_result(raw, &query()).unwrap();
        let offer = &result.offers[0];

        assert_eq!(offer.price.amount, 250.0);
        assert_eq!(offer.price.currency, "USD");
        assert_eq!(offer.outbound.segments[0].airline.name, "Acme Air");
        assert_eq!(offer.outbound.segments[0].duration_minutes, 180);
        // Leg has no durationInMinutes, so the total is not summed from segments.
        assert_eq!(offer.outbound.total_duration, 0);
        assert_eq!(offer.outbound.segments[0].id, "segment-0");
        assert_eq!(offer.outbound.segments[0].origin.time, "2025-06-01T10:00");
        assert_eq!(offer.id, "offer-0");
        assert!(offer.inbound.is_none());
        assert!(result.session_id.starts_with("session-"));
    }

    #[test]
    fn test_leg_totals_come_from_the_leg() {
        let raw = json!({
            "data": {
                "sessionId": "abc-123",
                "itineraries": [{
                    "id": "it-1",
                    "price": { "raw": 410.5, "formatted": "$411" },
                    "legs": [
                        { "id": "out", "durationInMinutes": 425, "stopCount": 1, "segments": [ {}, {} ] },
                        { "id": "in", "durationInMinutes": 400, "stopCount": 0, "segments": [ {} ] }
                    ],
                    "isBestValue": true,
                    "isCheapest": false,
                    "isFastest": true,
                    "deepLink": "https://example.com/book/it-1",
                    "agent": { "rating": 4.5 }
                }]
            }
        });

        let result = build_search_result(raw, &query()).unwrap();
        let offer = &result.offers[0];

        assert_eq!(result.session_id, "abc-123");
        assert_eq!(offer.id, "it-1");
        assert_eq!(offer.price.formatted, "$411");
        assert_eq!(offer.outbound.total_duration, 425);
        assert_eq!(offer.outbound.stops, 1);
        assert_eq!(offer.outbound.segments.len(), 2);
        assert_eq!(offer.outbound.segments[1].id, "segment-1");
        assert_eq!(offer.inbound.as_ref().map(|i| i.id.as_str()), Some("in"));
        assert!(offer.is_best_value && offer.is_fastest && !offer.is_cheapest);
        assert_eq!(offer.agent.as_ref().map(|a| a.name.as_str()), Some("Unknown"));
        assert_eq!(offer.agent.as_ref().and_then(|a| a.rating), Some(4.5));
    }

    #[test]
    fn test_price_falls_back_to_formatted_then_zero() {
        let raw = json!({
            "data": {
                "itineraries": [
                    { "price": { "formatted": "$1,234.50" }, "legs": [ leg("A") ] },
                    { "price": { "formatted": "call us" }, "legs": [ leg("B") ] },
                    { "legs": [ leg("C") ] }
                ]
            }
        });

        let result = build_search_result(raw, &query()).unwrap();
        assert_eq!(result.offers[0].price.amount, 1234.5);
        assert_eq!(result.offers[1].price.amount, 0.0);
        assert_eq!(result.offers[1].price.formatted, "call us");
        assert_eq!(result.offers[2].price.amount, 0.0);
        assert_eq!(result.offers[2].price.formatted, "USD 0.00");
        // Unpriced offers stay in the list but not in the price range.
        assert_eq!(result.offers.len(), 3);
        assert_eq!(result.filter_stats.min_price, 1234.5);
        assert_eq!(result.filter_stats.max_price, 1234.5);
    }

    #[test]
    fn test_synthesized_ids_never_collide_with_upstream_ids() {
        let raw = json!({
            "data": { "itineraries": [
                { "id": "offer-1", "legs": [ leg("A") ] },
                { "legs": [ leg("B") ] },
                { "id": "offer-1", "legs": [ leg("C") ] },
                { "id": "offer-3", "legs": [ leg("D") ] }
            ] }
        });

        let result = build_search_result(raw, &query()).unwrap();
        let ids: Vec<&str> = result.offers.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["offer-1", "offer-1-1", "offer-2", "offer-3"]);
    }

    #[test]
    fn test_n_entries_give_n_offers_with_unique_ids() {
        let itineraries: Vec<Value> = (0..25)
            .map(|i| {
                let mut item = json!({ "price": { "raw": 100 + i }, "legs": [ leg("Acme Air") ] });
                // Mix in a few upstream ids alongside synthesized ones.
                if i % 5 == 0 {
                    item["id"] = json!(format!("upstream-{}", i));
                }
                item
            })
            .collect();

        let result = build_search_result(json!({ "data": { "itineraries": itineraries } }), &query()).unwrap();
        let ids: HashSet<&str> = result.offers.iter().map(|o| o.id.as_str()).collect();

        assert_eq!(result.offers.len(), 25);
        assert_eq!(ids.len(), 25);
        assert_eq!(result.filter_stats.total_results, 25);
    }

    #[test]
    fn test_missing_itineraries_is_an_error_but_empty_is_not() {
        let err = build_search_result(json!({ "data": { "sessionId": "x" } }), &query()).unwrap_err();
        assert!(matches!(err, OfferError::MissingItineraries));

        let err = build_search_result(json!({ "message": "oops" }), &query()).unwrap_err();
        assert!(matches!(err, OfferError::MissingData));

        let err = build_search_result(json!("not json object"), &query()).unwrap_err();
        assert!(matches!(err, OfferError::Malformed(_)));

        let result = build_search_result(json!({ "data": { "itineraries": [] } }), &query()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.filter_stats.min_price, 0.0);
        assert_eq!(result.filter_stats.max_price, 0.0);
    }

    #[test]
    fn test_empty_outbound_fails_fast() {
        let raw = json!({
            "data": { "itineraries": [ { "legs": [ leg("A") ] }, { "legs": [ { "segments": [] } ] } ] }
        });
        let err = build_search_result(raw, &query()).unwrap_err();
        assert!(matches!(err, OfferError::EmptyOutbound { index: 1 }));
    }

    #[test]
    fn test_empty_inbound_means_one_way() {
        let raw = json!({
            "data": { "itineraries": [ { "legs": [ leg("A"), { "segments": [] } ] } ] }
        });
        let result = build_search_result(raw, &query()).unwrap();
        assert!(result.offers[0].inbound.is_none());
    }

    #[test]
    fn test_airline_name_and_code_fallbacks() {
        let raw = json!({
            "data": { "itineraries": [ { "legs": [ { "segments": [
                { "operatingCarrier": { "name": "Op Air" }, "marketingCarrier": { "id": "-31722" } },
                { "marketingCarrier": { "name": "Mk Air", "alternateId": "MK", "id": "-1" },
                  "origin": { "id": "JFK", "name": "John F. Kennedy" },
                  "destination": { "displayCode": "LHR", "id": "-x" },
                  "aircraft": { "name": "" } }
            ] } ] } ] }
        });

        let result = build_search_result(raw, &query()).unwrap();
        let segments = &result.offers[0].outbound.segments;

        assert_eq!(segments[0].airline.name, "Op Air");
        assert_eq!(segments[0].airline.code, "-31722");
        assert_eq!(segments[0].operating_airline, "Op Air");
        assert_eq!(segments[1].airline.name, "Mk Air");
        assert_eq!(segments[1].airline.code, "MK");
        assert_eq!(segments[1].origin.display_code, "JFK");
        assert_eq!(segments[1].origin.airport, "John F. Kennedy");
        assert_eq!(segments[1].destination.display_code, "LHR");
        assert_eq!(segments[1].aircraft, None);
        assert_eq!(segments[1].cabin_class, "");
    }

    #[test]
    fn test_airport_normalization() {
        let raw = json!({
            "status": true,
            "data": [
                {
                    "presentation": { "suggestionTitle": "New York (Any)" },
                    "navigation": {
                        "localizedName": "New York",
                        "relevantFlightParams": { "skyId": "NYCA", "entityId": "27537542" }
                    }
                },
                { "presentation": { "suggestionTitle": "No params" }, "navigation": {} },
                {
                    "navigation": {
                        "localizedName": "London Heathrow",
                        "relevantFlightParams": { "skyId": "LHR", "entityId": "95565050", "city": "London", "country": "United Kingdom" }
                    }
                },
                {
                    "presentation": { "suggestionTitle": "No code" },
                    "navigation": { "relevantFlightParams": { "skyId": "" } }
                }
            ]
        });

        let airports = normalize_airports(raw);
        assert_eq!(airports.len(), 2);
        assert_eq!(airports[0].code, "NYCA");
        assert_eq!(airports[0].name, "New York (Any)");
        assert_eq!(airports[0].entity_id, "27537542");
        assert_eq!(airports[1].name, "London Heathrow");
        assert_eq!(airports[1].city, "London");
        assert!(airports.iter().all(|a| !a.code.is_empty() && !a.name.is_empty()));

        assert!(normalize_airports(json!({ "message": "error" })).is_empty());
    }
}
