use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::airport::Airport;
use crate::{CoreError, CoreResult};

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";
pub const MISSING_RETURN_DATE_MESSAGE: &str = "Please select a return date";
pub const NO_ADULTS_MESSAGE: &str = "At least one adult passenger is required";
pub const RETURN_BEFORE_DEPARTURE_MESSAGE: &str = "Return date cannot be before departure date";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium_economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Best,
    Cheapest,
    Fastest,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Best => "best",
            SortBy::Cheapest => "cheapest",
            SortBy::Fastest => "fastest",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    OneWay,
    #[default]
    RoundTrip,
}

/// Currency / market / locale sent with every search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleSettings {
    pub currency: String,
    pub market: String,
    pub locale: String,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            market: "en-US".to_string(),
            locale: "en-US".to_string(),
        }
    }
}

/// A validated flight search, ready to be sent to the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub origin_sky_id: String,
    pub destination_sky_id: String,
    pub origin_entity_id: String,
    pub destination_entity_id: String,
    pub date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub cabin_class: CabinClass,
    pub adults: u32,
    pub children: Option<u32>,
    pub infants: Option<u32>,
    pub sort_by: SortBy,
    pub currency: String,
    pub market: String,
    pub locale: String,
}

impl SearchQuery {
    pub fn is_round_trip(&self) -> bool {
        self.return_date.is_some()
    }

    pub fn passenger_count(&self) -> u32 {
        self.adults + self.children.unwrap_or(0) + self.infants.unwrap_or(0)
    }

    /// Query-string parameters for the flight search endpoint.
    /// Optional values are only sent when present (and non-zero for counts).
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("originSkyId", self.origin_sky_id.clone()),
            ("destinationSkyId", self.destination_sky_id.clone()),
            ("originEntityId", self.origin_entity_id.clone()),
            ("destinationEntityId", self.destination_entity_id.clone()),
            ("date", self.date.format(DATE_FORMAT).to_string()),
            ("adults", self.adults.to_string()),
            ("cabinClass", self.cabin_class.as_str().to_string()),
            ("sortBy", self.sort_by.as_str().to_string()),
            ("currency", self.currency.clone()),
            ("market", self.market.clone()),
            ("locale", self.locale.clone()),
        ];

        if let Some(return_date) = self.return_date {
            params.push(("returnDate", return_date.format(DATE_FORMAT).to_string()));
        }
        if let Some(children) = self.children.filter(|c| *c > 0) {
            params.push(("children", children.to_string()));
        }
        if let Some(infants) = self.infants.filter(|i| *i > 0) {
            params.push(("infants", infants.to_string()));
        }

        params
    }
}

/// Raw user input from the search screen.
#[derive(Debug, Clone)]
pub struct SearchForm {
    pub trip_type: TripType,
    pub origin: Option<Airport>,
    pub destination: Option<Airport>,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub cabin_class: CabinClass,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub sort_by: SortBy,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            trip_type: TripType::default(),
            origin: None,
            destination: None,
            departure_date: None,
            return_date: None,
            cabin_class: CabinClass::default(),
            adults: 1,
            children: 0,
            infants: 0,
            sort_by: SortBy::default(),
        }
    }
}

impl SearchForm {
    /// Validate the form and assemble a `SearchQuery`.
    ///
    /// Checks run in the order the user sees them: required fields first,
    /// then the round-trip return date, then consistency.
    pub fn build(&self, locale: &LocaleSettings) -> CoreResult<SearchQuery> {
        let (origin, destination, date) = match (&self.origin, &self.destination, self.departure_date) {
            (Some(o), Some(d), Some(date)) => (o, d, date),
            _ => return Err(CoreError::validation(MISSING_FIELDS_MESSAGE)),
        };

        let return_date = match self.trip_type {
            TripType::OneWay => None,
            TripType::RoundTrip => Some(
                self.return_date
                    .ok_or_else(|| CoreError::validation(MISSING_RETURN_DATE_MESSAGE))?,
            ),
        };

        if self.adults == 0 {
            return Err(CoreError::validation(NO_ADULTS_MESSAGE));
        }

        if let Some(ret) = return_date {
            if ret < date {
                return Err(CoreError::validation(RETURN_BEFORE_DEPARTURE_MESSAGE));
            }
        }

        Ok(SearchQuery {
            origin_sky_id: origin.code.clone(),
            destination_sky_id: destination.code.clone(),
            origin_entity_id: origin.region_id().to_string(),
            destination_entity_id: destination.region_id().to_string(),
            date,
            return_date,
            cabin_class: self.cabin_class,
            adults: self.adults,
            children: (self.children > 0).then_some(self.children),
            infants: (self.infants > 0).then_some(self.infants),
            sort_by: self.sort_by,
            currency: locale.currency.clone(),
            market: locale.market.clone(),
            locale: locale.locale.clone(),
        })
    }
}
