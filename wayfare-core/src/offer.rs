use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::search::SearchQuery;

/// One end of a segment as displayed to the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SegmentEndpoint {
    pub airport: String,
    pub city: String,
    pub time: String,
    pub display_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Airline {
    pub name: String,
    pub code: String,
    pub logo: String,
}

/// One non-stop flown leg
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub origin: SegmentEndpoint,
    pub destination: SegmentEndpoint,
    pub departure: String,
    pub arrival: String,
    pub duration_minutes: u32,
    pub airline: Airline,
    pub flight_number: String,
    pub aircraft: Option<String>,
    pub operating_airline: String,
    pub stops: u32,
    pub cabin_class: String,
}

impl Segment {
    /// Aggregator timestamps are local wall-clock times without an offset.
    pub fn departure_time(&self) -> Option<NaiveDateTime> {
        parse_local_timestamp(&self.departure)
    }

    pub fn arrival_time(&self) -> Option<NaiveDateTime> {
        parse_local_timestamp(&self.arrival)
    }
}

fn parse_local_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// One direction of travel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub id: String,
    pub segments: Vec<Segment>,
    pub total_duration: u32,
    pub stops: u32,
}

impl Itinerary {
    pub fn origin(&self) -> Option<&SegmentEndpoint> {
        self.segments.first().map(|s| &s.origin)
    }

    pub fn destination(&self) -> Option<&SegmentEndpoint> {
        self.segments.last().map(|s| &s.destination)
    }

    pub fn departure(&self) -> Option<&str> {
        self.segments.first().map(|s| s.departure.as_str())
    }

    pub fn arrival(&self) -> Option<&str> {
        self.segments.last().map(|s| s.arrival.as_str())
    }

    pub fn is_direct(&self) -> bool {
        self.stops == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub amount: f64,
    pub currency: String,
    pub formatted: String,
}

impl Price {
    /// Zero or unparseable prices are kept on the offer but left out of price statistics.
    pub fn is_priced(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }
}

/// The booking agent that sells the offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub name: String,
    pub rating: Option<f64>,
}

/// A priced, bookable itinerary pairing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub token: String,
    pub price: Price,
    pub outbound: Itinerary,
    pub inbound: Option<Itinerary>,
    pub deep_link: String,
    pub agent: Option<Agent>,
    pub is_best_value: bool,
    pub is_cheapest: bool,
    pub is_fastest: bool,
}

impl Offer {
    pub fn is_round_trip(&self) -> bool {
        self.inbound.is_some()
    }

    /// Outbound then inbound itineraries, in flown order.
    pub fn itineraries(&self) -> impl Iterator<Item = &Itinerary> {
        std::iter::once(&self.outbound).chain(self.inbound.iter())
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.itineraries().flat_map(|it| it.segments.iter())
    }

    /// Booking happens outside the app; without a link the offer can only be viewed.
    pub fn booking_link(&self) -> Option<&str> {
        if self.deep_link.is_empty() {
            None
        } else {
            Some(&self.deep_link)
        }
    }
}

/// Aggregates derived from an offer list, used to seed filter controls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
    pub min_price: f64,
    pub max_price: f64,
    pub airlines: Vec<String>,
    pub stops: Vec<u32>,
    pub total_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Upstream correlation id; only useful when reporting issues
    pub session_id: String,
    pub query: SearchQuery,
    /// Offers in the order the aggregator returned them
    pub offers: Vec<Offer>,
    pub filter_stats: FilterStats,
    pub timestamp: DateTime<Utc>,
}

impl SearchResult {
    pub fn find_offer(&self, offer_id: &str) -> Option<&Offer> {
        self.offers.iter().find(|o| o.id == offer_id)
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(airline: &str) -> Segment {
        Segment {
            airline: Airline { name: airline.to_string(), ..Default::default() },
            departure: "2025-06-01T10:00:00".to_string(),
            arrival: "2025-06-01T13:00".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_segments_cover_both_directions() {
        let offer = Offer {
            outbound: Itinerary { segments: vec![segment("Acme Air")], ..Default::default() },
            inbound: Some(Itinerary { segments: vec![segment("Beta Jet"), segment("Acme Air")], ..Default::default() }),
            ..Default::default()
        };

        let names: Vec<&str> = offer.segments().map(|s| s.airline.name.as_str()).collect();
        assert_eq!(names, vec!["Acme Air", "Beta Jet", "Acme Air"]);
        assert!(offer.is_round_trip());
    }

    #[test]
    fn test_timestamp_parsing_accepts_both_precisions() {
        let s = segment("Acme Air");
        assert!(s.departure_time().is_some());
        assert!(s.arrival_time().is_some());
        assert!(Segment::default().departure_time().is_none());
    }

    #[test]
    fn test_booking_link() {
        let mut offer = Offer::default();
        assert_eq!(offer.booking_link(), None);
        offer.deep_link = "https://example.com/book".to_string();
        assert_eq!(offer.booking_link(), Some("https://example.com/book"));
    }
}
