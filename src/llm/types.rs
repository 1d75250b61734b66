//! Generation options passed to a backend on every call

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default cap on generated tokens
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Cap on generated output length
///
/// `Unbounded` has no cost or length ceiling and must be chosen explicitly.
/// In config files it is written as the literal string `unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OutputLimitRepr", into = "OutputLimitRepr")]
pub enum OutputLimit {
    Tokens(u32),
    Unbounded,
}

impl Default for OutputLimit {
    fn default() -> Self {
        OutputLimit::Tokens(DEFAULT_MAX_OUTPUT_TOKENS)
    }
}

impl OutputLimit {
    /// Token cap, or None when unbounded
    pub fn tokens(&self) -> Option<u32> {
        match self {
            OutputLimit::Tokens(n) => Some(*n),
            OutputLimit::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, OutputLimit::Unbounded)
    }
}

impl fmt::Display for OutputLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputLimit::Tokens(n) => write!(f, "{}", n),
            OutputLimit::Unbounded => write!(f, "unbounded"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum OutputLimitRepr {
    Tokens(u32),
    Keyword(String),
}

impl TryFrom<OutputLimitRepr> for OutputLimit {
    type Error = String;

    fn try_from(repr: OutputLimitRepr) -> Result<Self, Self::Error> {
        match repr {
            OutputLimitRepr::Tokens(n) => Ok(OutputLimit::Tokens(n)),
            OutputLimitRepr::Keyword(s) if s.eq_ignore_ascii_case("unbounded") => Ok(OutputLimit::Unbounded),
            OutputLimitRepr::Keyword(s) => Err(format!(
                "expected a token count or \"unbounded\", got \"{}\"",
                s
            )),
        }
    }
}

impl From<OutputLimit> for OutputLimitRepr {
    fn from(limit: OutputLimit) -> Self {
        match limit {
            OutputLimit::Tokens(n) => OutputLimitRepr::Tokens(n),
            OutputLimit::Unbounded => OutputLimitRepr::Keyword("unbounded".to_string()),
        }
    }
}

/// Per-call options for a generation backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    pub max_output_tokens: OutputLimit,
    pub timeout: Option<Duration>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output cap
    pub fn with_max_output_tokens(mut self, limit: OutputLimit) -> Self {
        self.max_output_tokens = limit;
        self
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Token usage reported by a backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Accumulate another usage record into this one
    pub fn add(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
