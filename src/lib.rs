//! Tripplan - few-shot itinerary planning
//!
//! Tripplan turns a trip request into a day-by-day itinerary by composing a
//! few-shot prompt, handing it to a text generator, and validating the reply
//! into a structured record.

pub mod domain;
pub mod error;
pub mod fewshot;
pub mod llm;
pub mod normalize;
pub mod planner;
pub mod prompt;

pub use error::{Recovery, Result, TripPlanError};
pub use planner::{PlannerSettings, TripPlanner};
