//! Example Library - few-shot demonstrations for itinerary prompts

mod library;

pub use library::{Example, LIBRARY_VERSION, escape_literal, get_examples};
