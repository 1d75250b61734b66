use eyre::{Context, Result, eyre};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tripplan::PlannerSettings;
use tripplan::llm::{AnthropicConfig, GenerationOptions, OutputLimit, anthropic::DEFAULT_MODEL};
use tripplan::normalize::ExtractionStrategy;
use tripplan::prompt::CompositionMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub composer: ComposerConfig,
    pub normalizer: NormalizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LlmConfig {
    pub model: String,
    pub max_output_tokens: OutputLimit,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: OutputLimit::default(),
            timeout_ms: 300000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub mode: CompositionMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub extraction: ExtractionStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
            composer: ComposerConfig::default(),
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// An explicit path must load. Otherwise the first default location that
    /// exists is used, and a file there that fails to load is an error rather
    /// than a silent fall back to defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        Self::load_first_existing(&Self::default_locations())
    }

    /// `~/.config/<project>/<project>.yml`, then `./<project>.yml`
    fn default_locations() -> Vec<PathBuf> {
        let project_name = env!("CARGO_PKG_NAME");
        let file_name = format!("{}.yml", project_name);

        let mut locations = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join(project_name).join(&file_name));
        }
        locations.push(PathBuf::from(file_name));
        locations
    }

    fn load_first_existing(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|path| path.exists()) {
            Some(path) => Self::load_from_file(path).map_err(|e| {
                log::error!("Failed to load config from {}: {:#}", path.display(), e);
                e.wrap_err(format!("Failed to load config from {}", path.display()))
            }),
            None => {
                log::info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject settings no request could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_ms == 0 {
            return Err(eyre!("llm.timeout-ms must be greater than zero"));
        }
        if self.llm.max_output_tokens == OutputLimit::Tokens(0) {
            return Err(eyre!("llm.max-output-tokens must be greater than zero (or \"unbounded\")"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(eyre!("llm.model must not be empty"));
        }
        if let Some(level) = &self.log_level
            && level.parse::<LevelFilter>().is_err()
        {
            return Err(eyre!("log-level '{}' is not one of off, error, warn, info, debug, trace", level));
        }
        Ok(())
    }

    /// Level named by `log-level`, `info` when unset
    pub fn log_filter(&self) -> LevelFilter {
        self.log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.llm.timeout_ms)
    }

    /// Pipeline settings for the library
    pub fn planner_settings(&self) -> PlannerSettings {
        PlannerSettings::default()
            .with_mode(self.composer.mode)
            .with_extraction(self.normalizer.extraction)
            .with_options(
                GenerationOptions::new()
                    .with_max_output_tokens(self.llm.max_output_tokens)
                    .with_timeout(self.timeout()),
            )
    }

    /// Provider client settings
    pub fn anthropic_config(&self) -> AnthropicConfig {
        AnthropicConfig {
            model: self.llm.model.clone(),
            timeout: self.timeout(),
        }
    }
}
