//! Prompt System - composing itinerary prompts
//!
//! This module provides the Handlebars-backed renderer, the tagged
//! `PromptTemplate` type, and the composer that interleaves the example
//! library with a trip request.

mod composer;
mod render;
mod template;

pub use composer::{CompositionMode, JSON_DIRECTIVE, PromptComposer, SUFFIX_TEMPLATE};
pub use render::PromptRenderer;
pub use template::{PromptTemplate, PromptVariables, placeholders};

/// Variable names bound from a trip request
pub mod vars {
    pub const LOCATION: &str = "location";
    pub const TRIP_START: &str = "trip_start";
    pub const TRIP_END: &str = "trip_end";
    pub const TRAVEL_COMPANIONS: &str = "travel_companions";
    pub const LODGING: &str = "lodging";
    pub const ACTIVITIES: &str = "activities";

    /// Every variable the suffix template needs
    pub const REQUIRED: [&str; 6] = [LOCATION, TRIP_START, TRIP_END, TRAVEL_COMPANIONS, LODGING, ACTIVITIES];
}
