//! Domain types for tripplan
//!
//! - TripRequest / TripForm: what the caller asks for
//! - ItineraryRecord / DayPlan: what the pipeline hands back

pub mod itinerary;
pub mod request;

pub use itinerary::{DayPlan, ItineraryRecord};
pub use request::{DATE_FORMAT, TripForm, TripRequest, form_keys, join_list, parse_date};
