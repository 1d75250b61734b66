use clap::{CommandFactory, Parser};
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, RequestArgs};
use config::Config;
use tripplan::domain::{ItineraryRecord, TripRequest};
use tripplan::fewshot::{LIBRARY_VERSION, get_examples};
use tripplan::llm::{AnthropicGenerator, Generator, ProviderError, ScriptedGenerator, anthropic::API_KEY_ENV};
use tripplan::normalize::{ExtractionStrategy, ResponseNormalizer, normalize};
use tripplan::prompt::{CompositionMode, PromptComposer};
use tripplan::{PlannerSettings, Recovery, TripPlanError, TripPlanner};

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplan")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("tripplan.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // Runs before the config is read, so the filter stays open and the max
    // level narrows it; `log-level` is applied the same way once loaded
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
        .target(env_logger::Target::Pipe(target))
        .init();
    if !rust_log_set() {
        log::set_max_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn rust_log_set() -> bool {
    std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some()
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
        Some(Commands::Plan {
            request,
            strict,
            json,
            response_file,
        }) => handle_plan_command(request, *strict, *json, response_file.as_deref(), cli, config).await,
        Some(Commands::Prompt { request, suffix_only }) => handle_prompt_command(request, *suffix_only, config),
        Some(Commands::Normalize { file, strict, json }) => handle_normalize_command(file, *strict, *json, config),
        Some(Commands::Examples) => handle_examples_command(),
    }
}

fn planner_settings(request: &RequestArgs, strict: bool, config: &Config) -> PlannerSettings {
    let mut settings = config.planner_settings();
    if let Some(mode) = request.mode {
        settings.mode = mode;
    }
    if strict {
        settings.extraction = ExtractionStrategy::Strict;
    }
    settings
}

async fn run_plan(
    generator: Arc<dyn Generator>,
    settings: PlannerSettings,
    request: &TripRequest,
) -> tripplan::Result<ItineraryRecord> {
    TripPlanner::new(generator, settings)?.plan(request).await
}

async fn handle_plan_command(
    args: &RequestArgs,
    strict: bool,
    json: bool,
    response_file: Option<&Path>,
    cli: &Cli,
    config: &Config,
) -> Result<()> {
    let request = args.to_request()?;
    let settings = planner_settings(args, strict, config);
    info!(
        "Planning trip to {} ({} to {}, mode={}, extraction={})",
        request.location, request.trip_start, request.trip_end, settings.mode, settings.extraction
    );

    let record = match response_file {
        Some(path) => {
            let raw = fs::read_to_string(path).context(format!("Failed to read response from {}", path.display()))?;
            if cli.is_verbose() {
                println!("{} {}", "Replaying response:".cyan(), path.display());
            }
            run_plan(Arc::new(ScriptedGenerator::with_response(raw)), settings, &request).await?
        }
        None => {
            let generator = Arc::new(AnthropicGenerator::new(config.anthropic_config()).map_err(TripPlanError::from)?);
            if cli.is_verbose() {
                println!("{} {}", "Model:".cyan(), generator.model());
            }
            let record = run_plan(generator.clone(), settings, &request).await?;
            let usage = generator.total_usage();
            info!(
                "Token usage: {} in, {} out, {} total",
                usage.input_tokens,
                usage.output_tokens,
                usage.total()
            );
            record
        }
    };

    print_record(&record, json)
}

fn handle_prompt_command(args: &RequestArgs, suffix_only: bool, config: &Config) -> Result<()> {
    let request = args.to_request()?;
    let composer = PromptComposer::default();

    let prompt = if suffix_only {
        composer.render_suffix(&request)?
    } else {
        match args.mode.unwrap_or(config.composer.mode) {
            CompositionMode::Direct => composer.compose_direct(&request)?,
            CompositionMode::Template => composer.compose(&composer.build_template()?, &request)?,
        }
    };
    info!("Printing {} char prompt", prompt.len());
    println!("{}", prompt);
    Ok(())
}

fn handle_normalize_command(file: &Path, strict: bool, json: bool, config: &Config) -> Result<()> {
    let raw = fs::read_to_string(file).context(format!("Failed to read response from {}", file.display()))?;
    let strategy = if strict {
        ExtractionStrategy::Strict
    } else {
        config.normalizer.extraction
    };
    info!("Normalizing {} with {} extraction", file.display(), strategy);

    let record = ResponseNormalizer::new(strategy).normalize(&raw)?;
    print_record(&record, json)
}

fn handle_examples_command() -> Result<()> {
    println!("{} {}", "Example library".green().bold(), LIBRARY_VERSION);
    for (i, example) in get_examples().iter().enumerate() {
        let record = normalize(example.response_text)?;
        println!(
            "  {}. {} - {} ({} days, {} to {})",
            i + 1,
            record.trip_name.bold(),
            record.location,
            record.num_days,
            record.trip_start,
            record.trip_end
        );
    }
    Ok(())
}

fn print_record(record: &ItineraryRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", record.to_json_pretty().context("Failed to serialize itinerary")?);
        return Ok(());
    }

    if !record.trip_name.is_empty() {
        println!("{}", record.trip_name.green().bold());
    }
    println!("{} {}", "Location:".cyan(), record.location);
    println!(
        "{} {} to {} ({} days)",
        "Dates:".cyan(),
        record.trip_start,
        record.trip_end,
        record.num_days
    );
    for (label, value) in [
        ("Traveling with:", &record.travel_companions),
        ("Lodging:", &record.lodging),
        ("Activities:", &record.activities),
    ] {
        if !value.is_empty() {
            println!("{} {}", label.cyan(), value);
        }
    }

    for day in &record.days {
        println!();
        println!("{}", format!("Day {} ({})", day.day_index, day.date).yellow().bold());
        println!("  {} {}", "Morning:  ".bold(), day.morning);
        println!("  {} {}", "Afternoon:".bold(), day.afternoon);
        println!("  {} {}", "Evening:  ".bold(), day.evening);
    }
    Ok(())
}

fn recovery_hint(err: &TripPlanError) -> String {
    if let Some(provider) = err.as_provider() {
        match provider {
            ProviderError::MissingApiKey { .. } | ProviderError::Authentication { .. } => {
                return format!("check that {} holds a valid API key", API_KEY_ENV);
            }
            ProviderError::RateLimited { retry_after } => {
                return format!("rate limited; retry in {}s", retry_after.as_secs());
            }
            _ => {}
        }
    }

    match err.recovery() {
        Recovery::FixInput => "check the trip details and try again".to_string(),
        Recovery::RetryLater => "the provider is unavailable; retry later".to_string(),
        Recovery::RetrySame => "the model returned an unusable itinerary; running the same request again may work".to_string(),
        Recovery::NotRecoverable => "this is a bug in tripplan; please report it".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.is_verbose()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if !cli.is_verbose() && !rust_log_set() {
        log::set_max_level(config.log_filter());
    }

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    if let Err(e) = run_application(&cli, &config).await {
        if let Some(err) = e.downcast_ref::<TripPlanError>() {
            log::error!("Request failed: {}", err);
            eprintln!("{} {}", "Hint:".yellow().bold(), recovery_hint(err));
        }
        return Err(e).context("Application failed");
    }

    Ok(())
}
