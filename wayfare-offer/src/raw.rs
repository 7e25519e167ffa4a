//! Typed view of the aggregator's JSON bodies.
//!
//! Every field is optional or defaulted and every field is parsed leniently: a
//! value of the wrong type becomes the default instead of failing the whole
//! document. The only shape checks that can fail are the envelope ones, which
//! the normalizer reports as errors.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Parse `T` from whatever is there, falling back to `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// A list parsed element by element, so one bad element does not drop its siblings.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient_seq(deserializer)?.unwrap_or_default())
}

/// Like `lenient_vec`, but keeps "not a list at all" distinguishable from "empty list".
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| T::deserialize(item).unwrap_or_default())
                .collect(),
        ),
        _ => None,
    })
}

// ============================================================================
// Flight search (`/api/v2/flights/searchFlights`)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<RawSearchData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchData {
    #[serde(default, deserialize_with = "lenient")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub itineraries: Option<Vec<RawItinerary>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItinerary {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: RawPrice,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub legs: Vec<RawLeg>,
    #[serde(default, deserialize_with = "lenient")]
    pub deep_link: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub agent: Option<RawAgent>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_best_value: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_cheapest: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_fastest: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPrice {
    #[serde(default, deserialize_with = "lenient")]
    pub raw: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatted: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAgent {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLeg {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub segments: Vec<RawSegment>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration_in_minutes: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub stop_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSegment {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub origin: RawPlace,
    #[serde(default, deserialize_with = "lenient")]
    pub destination: RawPlace,
    #[serde(default, deserialize_with = "lenient")]
    pub departure: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub arrival: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration_in_minutes: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub marketing_carrier: RawCarrier,
    #[serde(default, deserialize_with = "lenient")]
    pub operating_carrier: RawCarrier,
    #[serde(default, deserialize_with = "lenient")]
    pub flight_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub aircraft: RawAircraft,
    #[serde(default, deserialize_with = "lenient")]
    pub stops: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub cabin_class: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlace {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCarrier {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub alternate_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAircraft {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

// ============================================================================
// Airport lookup (`/api/v1/flights/searchAirport`)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RawAirportResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub data: Option<Vec<RawAirportEntry>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAirportEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub presentation: RawPresentation,
    #[serde(default, deserialize_with = "lenient")]
    pub navigation: RawNavigation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPresentation {
    #[serde(default, deserialize_with = "lenient")]
    pub suggestion_title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNavigation {
    #[serde(default, deserialize_with = "lenient")]
    pub localized_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub relevant_flight_params: Option<RawFlightParams>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlightParams {
    #[serde(default, deserialize_with = "lenient")]
    pub sky_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub entity_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
}

/// First candidate that is present and non-empty, else an empty string.
pub(crate) fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a String>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .cloned()
        .unwrap_or_default()
}
