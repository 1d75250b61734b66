//! Response Normalizer - validating model output into itinerary records

mod extract;
mod normalizer;

pub use extract::{balanced_objects, first_json_object, strip_code_fence};
pub use normalizer::{ExtractionStrategy, ResponseNormalizer, normalize};
