use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::airport::Airport;

/// A previously submitted search, shown as a shortcut on the search screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    /// Derived from route and dates, so repeating a search replaces the old entry
    pub id: String,
    pub from: Airport,
    pub to: Airport,
    pub date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: u32,
    pub timestamp: DateTime<Utc>,
}

impl RecentSearch {
    pub fn new(
        from: Airport,
        to: Airport,
        date: NaiveDate,
        return_date: Option<NaiveDate>,
        passengers: u32,
    ) -> Self {
        let id = Self::derive_id(&from, &to, date, return_date);
        Self {
            id,
            from,
            to,
            date,
            return_date,
            passengers,
            timestamp: Utc::now(),
        }
    }

    fn derive_id(from: &Airport, to: &Airport, date: NaiveDate, return_date: Option<NaiveDate>) -> String {
        match return_date {
            Some(ret) => format!("{}-{}-{}-{}", from.code, to.code, date, ret),
            None => format!("{}-{}-{}", from.code, to.code, date),
        }
    }
}

/// Prepend `entry`, drop any older entry with the same id, keep at most `limit`.
pub fn push_recent(list: &[RecentSearch], entry: RecentSearch, limit: usize) -> Vec<RecentSearch> {
    let mut updated = Vec::with_capacity(limit.min(list.len() + 1));
    let id = entry.id.clone();
    updated.push(entry);
    updated.extend(list.iter().filter(|s| s.id != id).cloned());
    updated.truncate(limit);
    updated
}
