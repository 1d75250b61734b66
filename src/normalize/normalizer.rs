//! Response Normalizer - raw model text to a validated `ItineraryRecord`
//!
//! Validation rules:
//! - the text must yield a JSON object (see `ExtractionStrategy`)
//! - `location`, `trip_start`, `trip_end` and `itinerary` are required
//! - every itinerary entry needs `day`, `date`, `morning`, `afternoon`, `evening`
//! - dates are ISO `YYYY-MM-DD` and `trip_start <= trip_end`
//! - after sorting by `day`, day numbers run exactly `1..=n` and day 1 falls on `trip_start`
//!
//! `num_days` is always re-derived from the itinerary length.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extract::{first_json_object, strip_code_fence};
use crate::domain::{DayPlan, ItineraryRecord, parse_date};
use crate::error::{Result, TripPlanError};

/// How to treat text surrounding the JSON document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Strip code fences, then fall back to the first balanced JSON object in the text
    #[default]
    Embedded,
    /// The whole trimmed response must be the JSON document
    Strict,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStrategy::Embedded => write!(f, "embedded"),
            ExtractionStrategy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for ExtractionStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "embedded" => Ok(ExtractionStrategy::Embedded),
            "strict" => Ok(ExtractionStrategy::Strict),
            other => Err(format!("unknown extraction strategy '{}' (expected embedded or strict)", other)),
        }
    }
}

/// A text field the model may emit as a string or a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Text {
    One(String),
    Many(Vec<String>),
}

impl Text {
    fn into_string(self) -> String {
        match self {
            Text::One(s) => s,
            Text::Many(items) => items.join(", "),
        }
    }
}

fn text_or_empty(text: Option<Text>) -> String {
    text.map(Text::into_string).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct RawItinerary {
    trip_name: Option<Text>,
    location: Option<String>,
    trip_start: Option<String>,
    trip_end: Option<String>,
    num_days: Option<Value>,
    #[serde(alias = "traveling_with")]
    travel_companions: Option<Text>,
    lodging: Option<Text>,
    #[serde(alias = "adventure")]
    activities: Option<Text>,
    itinerary: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawDay {
    day: Option<u32>,
    date: Option<String>,
    morning: Option<Text>,
    afternoon: Option<Text>,
    evening: Option<Text>,
}

fn malformed(message: impl Into<String>) -> TripPlanError {
    TripPlanError::MalformedOutput(message.into())
}

fn require<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| malformed(format!("missing required field '{}'", field)))
}

fn require_date(value: Option<String>, field: &str) -> Result<NaiveDate> {
    let raw = require(value, field)?;
    parse_date(&raw).ok_or_else(|| malformed(format!("{} '{}' is not a YYYY-MM-DD date", field, raw)))
}

/// Turns raw model output into an `ItineraryRecord`
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer {
    strategy: ExtractionStrategy,
}

impl ResponseNormalizer {
    pub fn new(strategy: ExtractionStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ExtractionStrategy {
        self.strategy
    }

    /// Parse and validate a raw response
    pub fn normalize(&self, raw: &str) -> Result<ItineraryRecord> {
        let document = self.parse_document(raw)?;
        let raw_itinerary: RawItinerary = serde_json::from_value(document)
            .map_err(|e| malformed(format!("response does not match the itinerary shape: {}", e)))?;
        build_record(raw_itinerary)
    }

    /// Locate and parse the JSON object according to the strategy
    fn parse_document(&self, raw: &str) -> Result<Value> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(malformed("response is empty"));
        }

        let value = match self.strategy {
            ExtractionStrategy::Strict => serde_json::from_str::<Value>(trimmed)
                .map_err(|e| malformed(format!("response is not a JSON document: {}", e)))?,
            ExtractionStrategy::Embedded => {
                let unfenced = strip_code_fence(trimmed);
                match serde_json::from_str::<Value>(unfenced) {
                    Ok(value) => value,
                    Err(_) => {
                        log::debug!("Response is not bare JSON; searching for an embedded object");
                        first_json_object(trimmed)
                            .ok_or_else(|| malformed("no JSON object found in response"))?
                    }
                }
            }
        };

        if !value.is_object() {
            return Err(malformed("response JSON is not an object"));
        }
        Ok(value)
    }
}

/// Normalize with the default (embedded) extraction strategy
pub fn normalize(raw: &str) -> Result<ItineraryRecord> {
    ResponseNormalizer::default().normalize(raw)
}

fn build_record(raw: RawItinerary) -> Result<ItineraryRecord> {
    let location = require(raw.location, "location")?;
    let trip_start = require_date(raw.trip_start, "trip_start")?;
    let trip_end = require_date(raw.trip_end, "trip_end")?;
    if trip_start > trip_end {
        return Err(malformed(format!(
            "trip_start {} is after trip_end {}",
            trip_start, trip_end
        )));
    }

    let entries = match require(raw.itinerary, "itinerary")? {
        Value::Array(entries) => entries,
        other => return Err(malformed(format!("itinerary must be an array, got {}", json_kind(&other)))),
    };
    if entries.is_empty() {
        return Err(malformed("itinerary is empty"));
    }

    let mut days = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| build_day(i, entry))
        .collect::<Result<Vec<DayPlan>>>()?;
    days.sort_by_key(|d| d.day_index);

    for (i, day) in days.iter().enumerate() {
        let expected = i as u32 + 1;
        if day.day_index != expected {
            return Err(malformed(format!(
                "itinerary days must run 1..={} without gaps or repeats; found day {} at position {}",
                days.len(),
                day.day_index,
                expected
            )));
        }
    }
    if days[0].date != trip_start {
        return Err(malformed(format!(
            "day 1 is dated {} but the trip starts {}",
            days[0].date, trip_start
        )));
    }

    let num_days = days.len() as u32;
    if let Some(reported) = raw.num_days.as_ref()
        && reported.as_u64() != Some(u64::from(num_days))
    {
        log::warn!(
            "Model reported num_days {} but itinerary has {} entries; using {}",
            reported,
            num_days,
            num_days
        );
    }

    Ok(ItineraryRecord {
        trip_name: text_or_empty(raw.trip_name),
        location,
        trip_start,
        trip_end,
        num_days,
        travel_companions: text_or_empty(raw.travel_companions),
        lodging: text_or_empty(raw.lodging),
        activities: text_or_empty(raw.activities),
        days,
    })
}

fn build_day(position: usize, entry: Value) -> Result<DayPlan> {
    if !entry.is_object() {
        return Err(malformed(format!(
            "itinerary entry {} must be an object, got {}",
            position,
            json_kind(&entry)
        )));
    }
    let raw: RawDay = serde_json::from_value(entry)
        .map_err(|e| malformed(format!("itinerary entry {} has the wrong shape: {}", position, e)))?;

    let field = |name: &str| format!("itinerary[{}].{}", position, name);
    let day_index = require(raw.day, &field("day"))?;
    if day_index == 0 {
        return Err(malformed(format!("{} must be 1 or greater", field("day"))));
    }

    Ok(DayPlan {
        day_index,
        date: require_date(raw.date, &field("date"))?,
        morning: require(raw.morning, &field("morning"))?.into_string(),
        afternoon: require(raw.afternoon, &field("afternoon"))?.into_string(),
        evening: require(raw.evening, &field("evening"))?.into_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
