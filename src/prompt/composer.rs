//! Prompt Composer - few-shot examples followed by the trip suffix
//!
//! Two composition modes:
//! - Direct: examples and the bound suffix are rendered into one string per request.
//! - Template: examples are embedded once into a deferred template whose suffix
//!   keeps its placeholders, plus a JSON-only directive; requests bind it later.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::render::PromptRenderer;
use super::template::{PromptTemplate, PromptVariables};
use super::vars;
use crate::domain::TripRequest;
use crate::error::Result;
use crate::fewshot::{Example, LIBRARY_VERSION, escape_literal, get_examples};

/// The request description every prompt ends with
pub const SUFFIX_TEMPLATE: &str = "This trip is to {{location}} between {{trip_start}} and {{trip_end}}. \
This person will be traveling {{travel_companions}} and would like to stay in {{lodging}}. \
They want to do the following activities: {{activities}}. \
Create a daily itinerary for this trip using this information.";

/// Appended to template-mode prompts
pub const JSON_DIRECTIVE: &str = "Respond with only a single JSON document in exactly the format of the examples above. \
Do not include any text before or after the JSON.";

/// Between examples, and between the examples and the suffix
const SEPARATOR: &str = "\n\n";

/// How the composer produces prompts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionMode {
    /// Render everything per request
    #[default]
    Direct,
    /// Build a reusable deferred template once
    Template,
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionMode::Direct => write!(f, "direct"),
            CompositionMode::Template => write!(f, "template"),
        }
    }
}

impl FromStr for CompositionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(CompositionMode::Direct),
            "template" => Ok(CompositionMode::Template),
            other => Err(format!("unknown composition mode '{}' (expected direct or template)", other)),
        }
    }
}

/// Builds itinerary prompts from the example library and a trip request
pub struct PromptComposer {
    examples: &'static [Example],
    renderer: PromptRenderer,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(get_examples())
    }
}

impl PromptComposer {
    pub fn new(examples: &'static [Example]) -> Self {
        log::debug!(
            "Prompt composer using {} examples (library {})",
            examples.len(),
            LIBRARY_VERSION
        );
        Self {
            examples,
            renderer: PromptRenderer::new(),
        }
    }

    /// The suffix alone as a deferred template
    pub fn suffix_template() -> Result<PromptTemplate> {
        PromptTemplate::deferred(SUFFIX_TEMPLATE, vars::REQUIRED)
    }

    /// Examples rendered as prompt text, each followed by its response
    fn examples_block(&self, escape: bool) -> String {
        self.examples
            .iter()
            .map(|e| {
                let block = format!("{}\n{}", e.prompt_text, e.response_text);
                if escape { escape_literal(&block) } else { block }
            })
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    fn with_examples(&self, escape: bool, tail: &str) -> String {
        if self.examples.is_empty() {
            return tail.to_string();
        }
        format!("{}{}{}", self.examples_block(escape), SEPARATOR, tail)
    }

    /// Direct mode: one complete prompt for `request`
    pub fn compose_direct(&self, request: &TripRequest) -> Result<String> {
        let suffix = self.render_suffix(request)?;
        let prompt = self.with_examples(false, &suffix);
        log::debug!("Composed direct prompt ({} chars)", prompt.len());
        Ok(prompt)
    }

    /// Template mode: examples embedded, suffix placeholders left unbound
    pub fn build_template(&self) -> Result<PromptTemplate> {
        let tail = format!("{}{}{}", SUFFIX_TEMPLATE, SEPARATOR, JSON_DIRECTIVE);
        let body = self.with_examples(true, &tail);
        PromptTemplate::deferred(body, vars::REQUIRED)
    }

    /// Bind `request` into a template built by this composer
    pub fn compose(&self, template: &PromptTemplate, request: &TripRequest) -> Result<String> {
        request.validate()?;
        self.renderer.render(template, &request.variables())
    }

    /// The suffix bound with `request`
    pub fn render_suffix(&self, request: &TripRequest) -> Result<String> {
        request.validate()?;
        self.render_suffix_with(&request.variables())
    }

    /// The suffix bound with explicit variables
    pub fn render_suffix_with(&self, variables: &PromptVariables) -> Result<String> {
        self.renderer.render(&Self::suffix_template()?, variables)
    }

    pub fn examples(&self) -> &'static [Example] {
        self.examples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_date;
    use crate::error::TripPlanError;
    use std::collections::BTreeSet;

    fn zion() -> TripRequest {
        TripRequest::new(
            "Zion National Park",
            parse_date("2024-08-22").unwrap(),
            parse_date("2024-08-25").unwrap(),
        )
        .unwrap()
        .with_companions(["solo"])
        .with_lodging(["campsites"])
        .with_activities(["hiking"])
    }

    #[test]
    fn test_compose_direct_contains_examples_and_suffix() {
        let composer = PromptComposer::default();
        let prompt = composer.compose_direct(&zion()).unwrap();

        for example in get_examples() {
            assert!(prompt.contains(example.prompt_text));
            assert!(prompt.contains(example.response_text));
        }
        assert!(prompt.ends_with("Create a daily itinerary for this trip using this information."));
        assert!(prompt.contains("This trip is to Zion National Park between 2024-08-22 and 2024-08-25"));
        assert!(!prompt.contains(JSON_DIRECTIVE));
    }

    #[test]
    fn test_compose_direct_example_order() {
        let composer = PromptComposer::default();
        let prompt = composer.compose_direct(&zion()).unwrap();
        let positions: Vec<usize> = get_examples()
            .iter()
            .map(|e| prompt.find(e.prompt_text).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        let suffix_pos = prompt.find("This trip is to Zion").unwrap();
        assert!(suffix_pos > *positions.last().unwrap());
    }

    #[test]
    fn test_compose_direct_missing_location() {
        let composer = PromptComposer::default();
        let mut request = zion();
        request.location = String::new();
        match composer.compose_direct(&request) {
            Err(TripPlanError::MissingField(name)) => assert_eq!(name, "location"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_compose_direct_rejects_reversed_dates() {
        let composer = PromptComposer::default();
        let mut request = zion();
        std::mem::swap(&mut request.trip_start, &mut request.trip_end);
        assert!(matches!(
            composer.compose_direct(&request),
            Err(TripPlanError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_build_template_required_variables() {
        let template = PromptComposer::default().build_template().unwrap();
        let expected: BTreeSet<&str> = [
            "location",
            "trip_start",
            "trip_end",
            "travel_companions",
            "lodging",
            "activities",
        ]
        .into_iter()
        .collect();
        assert_eq!(template.required_variables(), expected);
    }

    #[test]
    fn test_build_template_embeds_examples_and_directive() {
        let template = PromptComposer::default().build_template().unwrap();
        for example in get_examples() {
            assert!(template.body().contains(example.prompt_text));
        }
        assert!(template.body().contains("{{location}}"));
        assert!(template.body().ends_with(JSON_DIRECTIVE));
    }

    #[test]
    fn test_template_mode_zion() {
        let composer = PromptComposer::default();
        let template = composer.build_template().unwrap();
        let prompt = composer.compose(&template, &zion()).unwrap();

        assert!(prompt.contains("This trip is to Zion National Park between 2024-08-22 and 2024-08-25"));
        assert!(prompt.contains("traveling solo and would like to stay in campsites"));
        assert!(prompt.contains("following activities: hiking."));
        assert!(prompt.ends_with(JSON_DIRECTIVE));
        for example in get_examples() {
            assert!(prompt.contains(example.response_text));
        }
    }

    #[test]
    fn test_template_reused_across_requests() {
        let composer = PromptComposer::default();
        let template = composer.build_template().unwrap();

        let mut other = zion();
        other.location = "Arches National Park".to_string();
        other.activities = vec!["hiking".to_string(), "biking".to_string()];

        let first = composer.compose(&template, &zion()).unwrap();
        let second = composer.compose(&template, &other).unwrap();
        assert!(first.contains("Zion National Park"));
        assert!(second.contains("This trip is to Arches National Park"));
        assert!(second.contains("activities: hiking, biking."));
    }

    #[test]
    fn test_template_mode_missing_location() {
        let composer = PromptComposer::default();
        let template = composer.build_template().unwrap();
        let mut request = zion();
        request.location = "  ".to_string();
        match composer.compose(&template, &request) {
            Err(TripPlanError::MissingField(name)) => assert_eq!(name, "location"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_selections_render_empty() {
        let composer = PromptComposer::default();
        let request = TripRequest::new(
            "Olympic National Park",
            parse_date("2024-06-01").unwrap(),
            parse_date("2024-06-02").unwrap(),
        )
        .unwrap();
        let suffix = composer.render_suffix(&request).unwrap();
        assert_eq!(
            suffix,
            "This trip is to Olympic National Park between 2024-06-01 and 2024-06-02. \
This person will be traveling  and would like to stay in . \
They want to do the following activities: . \
Create a daily itinerary for this trip using this information."
        );
    }

    #[test]
    fn test_no_examples() {
        let composer = PromptComposer::new(&[]);
        let prompt = composer.compose_direct(&zion()).unwrap();
        assert!(prompt.starts_with("This trip is to Zion"));
    }

    #[test]
    fn test_composition_mode_parse() {
        assert_eq!("direct".parse::<CompositionMode>().unwrap(), CompositionMode::Direct);
        assert_eq!("Template".parse::<CompositionMode>().unwrap(), CompositionMode::Template);
        assert!("fewshot".parse::<CompositionMode>().is_err());
        assert_eq!(CompositionMode::Template.to_string(), "template");
    }

    #[test]
    fn test_composition_mode_serde() {
        let mode: CompositionMode = serde_yaml::from_str("template").unwrap();
        assert_eq!(mode, CompositionMode::Template);
    }
}
