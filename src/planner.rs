//! Trip planner - compose, generate, normalize
//!
//! One `plan` call is one attempt. Provider failures and malformed output end
//! the request; the caller decides whether to try again (see `Recovery`).

use std::sync::Arc;
use std::time::Instant;

use crate::domain::{ItineraryRecord, TripRequest};
use crate::error::Result;
use crate::llm::{GenerationOptions, Generator};
use crate::normalize::{ExtractionStrategy, ResponseNormalizer};
use crate::prompt::{CompositionMode, PromptComposer, PromptTemplate};

/// Pipeline knobs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannerSettings {
    pub mode: CompositionMode,
    pub extraction: ExtractionStrategy,
    pub options: GenerationOptions,
}

impl PlannerSettings {
    pub fn with_mode(mut self, mode: CompositionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_extraction(mut self, extraction: ExtractionStrategy) -> Self {
        self.extraction = extraction;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// End-to-end itinerary pipeline around an injected generator
pub struct TripPlanner {
    generator: Arc<dyn Generator>,
    composer: PromptComposer,
    normalizer: ResponseNormalizer,
    settings: PlannerSettings,
    /// Built once in template mode
    template: Option<PromptTemplate>,
}

impl TripPlanner {
    /// Create a planner; template mode builds its template here
    pub fn new(generator: Arc<dyn Generator>, settings: PlannerSettings) -> Result<Self> {
        let composer = PromptComposer::default();
        let template = match settings.mode {
            CompositionMode::Template => Some(composer.build_template()?),
            CompositionMode::Direct => None,
        };
        log::debug!(
            "Trip planner ready (mode={}, extraction={}, model={})",
            settings.mode,
            settings.extraction,
            generator.model()
        );

        Ok(Self {
            generator,
            composer,
            normalizer: ResponseNormalizer::new(settings.extraction),
            settings,
            template,
        })
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// The prompt `plan` would send for `request`
    pub fn prompt_for(&self, request: &TripRequest) -> Result<String> {
        match &self.template {
            Some(template) => self.composer.compose(template, request),
            None => self.composer.compose_direct(request),
        }
    }

    /// Plan one trip
    pub async fn plan(&self, request: &TripRequest) -> Result<ItineraryRecord> {
        let started = Instant::now();
        let prompt = self.prompt_for(request)?;
        tracing::debug!(
            stage = "compose",
            chars = prompt.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Prompt composed"
        );

        let generate_started = Instant::now();
        let raw = match self.generator.generate(&prompt, &self.settings.options).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(stage = "generate", model = self.generator.model(), error = %e, "Generation failed");
                return Err(e.into());
            }
        };
        tracing::debug!(
            stage = "generate",
            model = self.generator.model(),
            chars = raw.len(),
            elapsed_ms = generate_started.elapsed().as_millis() as u64,
            "Response received"
        );

        let record = match self.normalizer.normalize(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(stage = "normalize", error = %e, "Response rejected");
                return Err(e);
            }
        };

        if let Some(requested) = day_count_mismatch(request, &record) {
            tracing::warn!(
                stage = "normalize",
                requested,
                planned = record.num_days,
                "Itinerary length differs from the requested dates"
            );
        }

        log::info!(
            "Planned {}-day trip to {} in {}ms",
            record.num_days,
            record.location,
            started.elapsed().as_millis()
        );
        Ok(record)
    }
}

/// Requested day count, when the itinerary covers a different number of days
fn day_count_mismatch(request: &TripRequest, record: &ItineraryRecord) -> Option<i64> {
    let requested = request.num_days();
    (requested != i64::from(record.num_days)).then_some(requested)
}
