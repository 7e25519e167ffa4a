use serde::{Deserialize, Serialize};

/// An airport (or city) suggestion returned by the aggregator's lookup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    /// Aggregator location code (`skyId`), e.g. "JFK"
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    /// Region identifier the flight search expects alongside the code
    #[serde(default)]
    pub entity_id: String,
}

impl Airport {
    pub fn new(code: &str, name: &str, city: &str, country: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            entity_id: String::new(),
        }
    }

    pub fn with_entity_id(mut self, entity_id: &str) -> Self {
        self.entity_id = entity_id.to_string();
        self
    }

    /// Both fields the UI needs to render a suggestion are present.
    pub fn is_resolvable(&self) -> bool {
        !self.code.is_empty() && !self.name.is_empty()
    }

    /// The identifier sent as `originEntityId` / `destinationEntityId`.
    /// Falls back to the country when the lookup did not return an entity id.
    pub fn region_id(&self) -> &str {
        if self.entity_id.is_empty() {
            &self.country
        } else {
            &self.entity_id
        }
    }
}
