//! Normalized itinerary records.
//!
//! The serde shape of `ItineraryRecord` is the JSON document the model is
//! asked to produce, so a record serializes back into valid model output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of a planned trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    /// 1-based position in the trip
    #[serde(rename = "day")]
    pub day_index: u32,
    pub date: NaiveDate,
    pub morning: String,
    pub afternoon: String,
    pub evening: String,
}

/// A validated multi-day itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryRecord {
    pub trip_name: String,
    pub location: String,
    pub trip_start: NaiveDate,
    pub trip_end: NaiveDate,
    pub num_days: u32,
    pub travel_companions: String,
    pub lodging: String,
    pub activities: String,
    #[serde(rename = "itinerary")]
    pub days: Vec<DayPlan>,
}

impl ItineraryRecord {
    /// Serialize to the model's response shape
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to the model's response shape, indented
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Look up a day by its 1-based index
    pub fn day(&self, day_index: u32) -> Option<&DayPlan> {
        day_index
            .checked_sub(1)
            .and_then(|i| self.days.get(i as usize))
    }
}
