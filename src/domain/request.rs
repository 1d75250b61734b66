//! Trip request types.
//!
//! A `TripRequest` is what the caller hands the pipeline. A `TripForm` is the
//! raw multi-valued form submission it can be built from.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TripPlanError};
use crate::prompt::{PromptVariables, vars};

/// ISO date format used for every date that enters or leaves the pipeline
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form keys of the trip planning form
pub mod form_keys {
    pub const LOCATION: &str = "location-search";
    pub const TRIP_START: &str = "trip-start";
    pub const TRIP_END: &str = "trip-end";
    pub const TRAVELING_WITH: &str = "traveling-with";
    pub const LODGING: &str = "lodging";
    pub const ADVENTURE: &str = "adventure";
}

/// Join a multi-select field into the single string used in prompt text.
///
/// Empty selections render as the empty string.
pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}

/// Parse an ISO `YYYY-MM-DD` date.
///
/// chrono accepts unpadded fields and short years for `%Y-%m-%d`, so the value
/// must also format back to itself.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == value).then_some(date)
}

/// Caller-supplied trip planning input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub location: String,
    pub trip_start: NaiveDate,
    pub trip_end: NaiveDate,
    #[serde(default)]
    pub travel_companions: Vec<String>,
    #[serde(default)]
    pub lodging_preferences: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
}

impl TripRequest {
    /// Create a request with empty selections.
    ///
    /// Fails with `InvalidRequest` when `trip_start` is after `trip_end`.
    pub fn new(location: impl Into<String>, trip_start: NaiveDate, trip_end: NaiveDate) -> Result<Self> {
        let request = Self {
            location: location.into(),
            trip_start,
            trip_end,
            travel_companions: Vec::new(),
            lodging_preferences: Vec::new(),
            activities: Vec::new(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn with_companions(mut self, companions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.travel_companions = companions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lodging(mut self, lodging: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.lodging_preferences = lodging.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_activities(mut self, activities: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.activities = activities.into_iter().map(Into::into).collect();
        self
    }

    /// Check the date ordering invariant
    pub fn validate(&self) -> Result<()> {
        if self.trip_start > self.trip_end {
            return Err(TripPlanError::InvalidRequest(format!(
                "trip_start {} is after trip_end {}",
                self.trip_start, self.trip_end
            )));
        }
        Ok(())
    }

    /// Number of calendar days the trip covers, inclusive of both ends
    pub fn num_days(&self) -> i64 {
        (self.trip_end - self.trip_start).num_days() + 1
    }

    /// Prompt bindings for this request.
    ///
    /// A blank location is left unbound so composition reports it as missing.
    pub fn variables(&self) -> PromptVariables {
        let mut variables = PromptVariables::new();
        if !self.location.trim().is_empty() {
            variables.insert(vars::LOCATION, self.location.trim());
        }
        variables.insert(vars::TRIP_START, self.trip_start.format(DATE_FORMAT).to_string());
        variables.insert(vars::TRIP_END, self.trip_end.format(DATE_FORMAT).to_string());
        variables.insert(vars::TRAVEL_COMPANIONS, join_list(&self.travel_companions));
        variables.insert(vars::LODGING, join_list(&self.lodging_preferences));
        variables.insert(vars::ACTIVITIES, join_list(&self.activities));
        variables
    }

    /// Build a request from a raw form submission
    pub fn from_form(form: &TripForm) -> Result<Self> {
        let location = form
            .first(form_keys::LOCATION)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| TripPlanError::MissingField(vars::LOCATION.to_string()))?;
        let trip_start = form_date(form, form_keys::TRIP_START, vars::TRIP_START)?;
        let trip_end = form_date(form, form_keys::TRIP_END, vars::TRIP_END)?;

        Ok(Self::new(location, trip_start, trip_end)?
            .with_companions(form.values(form_keys::TRAVELING_WITH).iter().cloned())
            .with_lodging(form.values(form_keys::LODGING).iter().cloned())
            .with_activities(form.values(form_keys::ADVENTURE).iter().cloned()))
    }
}

fn form_date(form: &TripForm, key: &str, field: &str) -> Result<NaiveDate> {
    let raw = form
        .first(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| TripPlanError::MissingField(field.to_string()))?;
    parse_date(raw)
        .ok_or_else(|| TripPlanError::InvalidRequest(format!("{} must be YYYY-MM-DD, got '{}'", field, raw)))
}

/// Raw multi-valued form submission; repeated keys keep their order.
#[derive(Debug, Clone, Default)]
pub struct TripForm {
    fields: HashMap<String, Vec<String>>,
}

impl TripForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs, as a URL-encoded body decodes
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = Self::new();
        for (key, value) in pairs {
            form.insert(key, value);
        }
        form
    }

    /// Append a value under a key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_default().push(value.into());
    }

    /// First value for a key
    pub fn first(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// All values for a key, empty when absent
    pub fn values(&self, key: &str) -> &[String] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
