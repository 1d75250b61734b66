//! End-to-end pipeline integration tests
//!
//! Drives the public API from a trip request through composition, a scripted
//! generator and normalization.

use std::sync::Arc;
use std::time::Duration;

use tripplan::domain::{TripForm, TripRequest, form_keys, parse_date};
use tripplan::error::Result;
use tripplan::fewshot::get_examples;
use tripplan::llm::{ProviderError, ScriptedGenerator};
use tripplan::normalize::{ExtractionStrategy, normalize};
use tripplan::prompt::{CompositionMode, PromptComposer};
use tripplan::{PlannerSettings, Recovery, TripPlanError, TripPlanner};

const ZION_REPLY: &str = r#"{
  "trip_name": "Zion Solo Adventure",
  "location": "Zion National Park",
  "trip_start": "2024-08-22",
  "trip_end": "2024-08-25",
  "num_days": 3,
  "travel_companions": "solo",
  "lodging": "campsites",
  "activities": "hiking",
  "itinerary": [
    {"day": 4, "date": "2024-08-25", "morning": "Pack up camp", "afternoon": "Drive out via Mt. Carmel", "evening": "Head home"},
    {"day": 1, "date": "2024-08-22", "morning": "Arrive and set up at Watchman", "afternoon": "Pa'rus Trail", "evening": "Sunset at Canyon Junction"},
    {"day": 3, "date": "2024-08-24", "morning": "Observation Point", "afternoon": "Rest by the river", "evening": "Stargazing"},
    {"day": 2, "date": "2024-08-23", "morning": "Angels Landing", "afternoon": "Emerald Pools", "evening": "Campfire dinner"}
  ]
}"#;

fn zion() -> Result<TripRequest> {
    Ok(TripRequest::new(
        "Zion National Park",
        parse_date("2024-08-22").unwrap(),
        parse_date("2024-08-25").unwrap(),
    )?
    .with_companions(["solo"])
    .with_lodging(["campsites"])
    .with_activities(["hiking"]))
}

/// Direct mode: the sent prompt carries the examples and the bound suffix,
/// and the reply comes back sorted with a re-derived day count
#[tokio::test]
async fn test_direct_mode_end_to_end() -> Result<()> {
    let generator = Arc::new(ScriptedGenerator::with_response(ZION_REPLY));
    let planner = TripPlanner::new(generator.clone(), PlannerSettings::default())?;

    let record = planner.plan(&zion()?).await?;
    assert_eq!(record.num_days, 4);
    let order: Vec<u32> = record.days.iter().map(|d| d.day_index).collect();
    assert_eq!(order, vec![1, 2, 3, 4]);
    assert_eq!(record.days[0].date, record.trip_start);

    let prompt = &generator.prompts()[0];
    for example in get_examples() {
        assert!(prompt.contains(example.response_text));
    }
    assert!(prompt.contains("This trip is to Zion National Park between 2024-08-22 and 2024-08-25"));
    Ok(())
}

/// Template mode: one template serves several requests
#[tokio::test]
async fn test_template_mode_reuse() -> Result<()> {
    let generator = Arc::new(ScriptedGenerator::new());
    generator.push_response(ZION_REPLY);
    generator.push_response(ZION_REPLY);

    let settings = PlannerSettings::default().with_mode(CompositionMode::Template);
    let planner = TripPlanner::new(generator.clone(), settings)?;

    let first = zion()?;
    let mut second = zion()?;
    second.travel_companions = vec!["partner".to_string(), "kids".to_string()];

    planner.plan(&first).await?;
    planner.plan(&second).await?;

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("traveling solo and"));
    assert!(prompts[1].contains("traveling partner, kids and"));
    assert!(!prompts[1].contains("{{location}}"));
    Ok(())
}

/// Form input flows through the same pipeline
#[tokio::test]
async fn test_form_request() -> Result<()> {
    let form = TripForm::from_pairs([
        (form_keys::LOCATION, "Zion National Park"),
        (form_keys::TRIP_START, "2024-08-22"),
        (form_keys::TRIP_END, "2024-08-25"),
        (form_keys::TRAVELING_WITH, "solo"),
        (form_keys::LODGING, "campsites"),
        (form_keys::ADVENTURE, "hiking"),
        (form_keys::ADVENTURE, "photography"),
    ]);
    let request = TripRequest::from_form(&form)?;

    let generator = Arc::new(ScriptedGenerator::with_response(ZION_REPLY));
    let planner = TripPlanner::new(generator.clone(), PlannerSettings::default())?;
    planner.plan(&request).await?;

    assert!(generator.prompts()[0].contains("following activities: hiking, photography."));
    Ok(())
}

/// Prose around the JSON is tolerated only under embedded extraction
#[tokio::test]
async fn test_prose_wrapped_reply() -> Result<()> {
    let wrapped = format!("Sure! Here's your itinerary:\n\n{}\n\nHave a great trip!", ZION_REPLY);

    let generator = Arc::new(ScriptedGenerator::with_response(wrapped.clone()));
    let record = TripPlanner::new(generator, PlannerSettings::default())?
        .plan(&zion()?)
        .await?;
    assert_eq!(record.trip_name, "Zion Solo Adventure");

    let generator = Arc::new(ScriptedGenerator::with_response(wrapped));
    let settings = PlannerSettings::default().with_extraction(ExtractionStrategy::Strict);
    let err = TripPlanner::new(generator, settings)?.plan(&zion()?).await.unwrap_err();
    assert!(matches!(err, TripPlanError::MalformedOutput(_)));
    Ok(())
}

/// Provider failures reach the caller unchanged after exactly one call
#[tokio::test]
async fn test_provider_failure_single_attempt() -> Result<()> {
    let generator = Arc::new(ScriptedGenerator::with_error(ProviderError::Timeout(Duration::from_secs(
        5,
    ))));
    generator.push_response(ZION_REPLY);
    let planner = TripPlanner::new(generator.clone(), PlannerSettings::default())?;

    let err = planner.plan(&zion()?).await.unwrap_err();
    assert!(matches!(err.as_provider(), Some(ProviderError::Timeout(d)) if *d == Duration::from_secs(5)));
    assert_eq!(err.recovery(), Recovery::RetryLater);
    assert_eq!(generator.call_count(), 1);
    Ok(())
}

/// A blank location stops the request before generation
#[tokio::test]
async fn test_blank_location() -> Result<()> {
    let generator = Arc::new(ScriptedGenerator::with_response(ZION_REPLY));
    let planner = TripPlanner::new(generator.clone(), PlannerSettings::default())?;

    let mut request = zion()?;
    request.location = " ".to_string();
    match planner.plan(&request).await {
        Err(TripPlanError::MissingField(field)) => assert_eq!(field, "location"),
        other => panic!("expected MissingField, got {:?}", other),
    }
    assert_eq!(generator.call_count(), 0);
    Ok(())
}

/// Normalized output survives another pass unchanged
#[test]
fn test_normalize_is_idempotent() -> Result<()> {
    let first = normalize(ZION_REPLY)?;
    let json = first.to_json().map_err(|e| TripPlanError::MalformedOutput(e.to_string()))?;
    assert_eq!(normalize(&json)?, first);
    Ok(())
}

/// Saved replies on disk normalize like live ones
#[test]
fn test_normalize_saved_reply() -> Result<()> {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("reply.txt");
    std::fs::write(&path, format!("```json\n{}\n```\n", ZION_REPLY)).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let record = normalize(&raw)?;
    assert_eq!(record.location, "Zion National Park");
    Ok(())
}

/// Every example answer in the library is itself a valid itinerary
#[test]
fn test_library_examples_normalize() -> Result<()> {
    for example in PromptComposer::default().examples() {
        let record = normalize(example.response_text)?;
        assert_eq!(record.num_days as usize, record.days.len());
    }
    Ok(())
}
