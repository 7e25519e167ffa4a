use serde::{Deserialize, Serialize};

/// Client-side filter criteria picked on the results screen.
///
/// Every field is optional; `None` means "no constraint". The same type is used
/// as the partial update passed to `merge`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FlightFilters {
    pub price_range: Option<(f64, f64)>,
    pub airlines: Option<Vec<String>>,
    pub stops: Option<Vec<u32>>,
    /// Hours of day, inclusive
    pub departure_time_range: Option<(u32, u32)>,
    pub arrival_time_range: Option<(u32, u32)>,
    /// Maximum total duration in minutes
    pub duration: Option<u32>,
}

impl FlightFilters {
    /// Overlay the fields set in `patch`; unset fields keep their current value.
    pub fn merge(&self, patch: FlightFilters) -> FlightFilters {
        FlightFilters {
            price_range: patch.price_range.or(self.price_range),
            airlines: patch.airlines.or_else(|| self.airlines.clone()),
            stops: patch.stops.or_else(|| self.stops.clone()),
            departure_time_range: patch.departure_time_range.or(self.departure_time_range),
            arrival_time_range: patch.arrival_time_range.or(self.arrival_time_range),
            duration: patch.duration.or(self.duration),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == FlightFilters::default()
    }
}
