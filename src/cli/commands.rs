//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - plan: run the full pipeline for one trip
//! - prompt: print the prompt a trip would send
//! - normalize: validate a saved model response
//! - examples: list the example library

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use tripplan::domain::{TripRequest, parse_date};
use tripplan::prompt::CompositionMode;

/// Tripplan - few-shot national park itinerary planner
#[derive(Parser, Debug)]
#[command(name = "tripplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Trip request fields shared by `plan` and `prompt`
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Destination, e.g. "Zion National Park"
    #[arg(short, long)]
    pub location: String,

    /// First day of the trip (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_iso_date)]
    pub start: NaiveDate,

    /// Last day of the trip (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_iso_date)]
    pub end: NaiveDate,

    /// Who is coming along (repeatable)
    #[arg(long = "with", value_name = "COMPANION")]
    pub companions: Vec<String>,

    /// Lodging preference (repeatable)
    #[arg(long)]
    pub lodging: Vec<String>,

    /// Activity of interest (repeatable)
    #[arg(short, long = "activity")]
    pub activities: Vec<String>,

    /// Composition mode (overrides config)
    #[arg(short, long)]
    pub mode: Option<CompositionMode>,
}

impl RequestArgs {
    pub fn to_request(&self) -> tripplan::Result<TripRequest> {
        Ok(TripRequest::new(self.location.clone(), self.start, self.end)?
            .with_companions(self.companions.iter().cloned())
            .with_lodging(self.lodging.iter().cloned())
            .with_activities(self.activities.iter().cloned()))
    }
}

fn parse_iso_date(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("expected YYYY-MM-DD, got '{}'", value))
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan a trip and print the itinerary
    Plan {
        #[command(flatten)]
        request: RequestArgs,

        /// Require the reply to be bare JSON
        #[arg(long)]
        strict: bool,

        /// Print the itinerary as JSON
        #[arg(short, long)]
        json: bool,

        /// Replay a saved model response instead of calling the provider
        #[arg(short, long)]
        response_file: Option<PathBuf>,
    },

    /// Print the prompt a trip would send
    Prompt {
        #[command(flatten)]
        request: RequestArgs,

        /// Print only the trip description, without examples
        #[arg(long)]
        suffix_only: bool,
    },

    /// Normalize a saved model response
    Normalize {
        /// File holding the raw response
        file: PathBuf,

        /// Require the reply to be bare JSON
        #[arg(long)]
        strict: bool,

        /// Print the itinerary as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List the example library
    Examples,
}
