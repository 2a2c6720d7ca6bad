//! Configuration for a book generation run.
//!
//! Load order: `bookgen.toml` → environment variables → defaults. The CLI
//! applies its own flag overrides on top and calls [`BookgenConfig::validate`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = "bookgen.toml";

const DEFAULT_TOPIC: &str = "Enterprise resource planning, data science, business intelligence, sales consulting, digital marketing, and marketing automation";

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookgenConfig {
    pub book: BookConfig,
    pub model: ModelConfig,
    pub stages: StagesConfig,
    pub output: OutputConfig,
    pub policy: PolicyConfig,
}

/// What the book is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Free-text topic embedded into every prompt.
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Chapter count requested in the outline prompt. The model may return
    /// more or fewer; the parsed outline wins.
    pub chapters: usize,
}

/// Which model to call and how to reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub provider: String,
    pub base_url: String,
    /// Global per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Sampling options for one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageParams {
    pub max_tokens: u32,
    /// Omitted from the request when unset, so the provider default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Per-stage sampling options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagesConfig {
    pub title: StageParams,
    pub chapters: StageParams,
    pub sections: StageParams,
    pub text: StageParams,
}

/// Where the rendered HTML goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Explicit file name. Derived from the book title when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Emit `<h3>` section headings.
    pub section_titles: bool,
}

/// What to do when a stage yields nothing usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Leave the value undefined and keep going.
    #[default]
    Continue,
    /// Fail the run.
    Abort,
}

/// Failure handling for malformed responses and empty outlines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub on_malformed: FailurePolicy,
    pub on_empty_outline: FailurePolicy,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            author: None,
            chapters: 10,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-3.5-turbo-instruct".to_string(),
            provider: "openai".to_string(),
            base_url: "https://api.openai.com".to_string(),
            timeout_secs: 120,
        }
    }
}

impl StageParams {
    pub fn new(max_tokens: u32, temperature: Option<f32>) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            title: StageParams::new(32, None),
            chapters: StageParams::new(128, Some(1.4)),
            sections: StageParams::new(128, Some(1.2)),
            text: StageParams::new(512, Some(1.2)),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            filename: None,
            section_titles: true,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl BookgenConfig {
    /// Load `bookgen.toml` from `dir`, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let config = if path.exists() {
            tracing::debug!("loading config from {}", path.display());
            Self::read_file(&path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Load an explicit config file, with env var overrides. The file must exist.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::read_file(path)?.with_env_overrides())
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(author) = std::env::var("BOOKGEN_AUTHOR") {
            self.book.author = Some(author).filter(|a| !a.trim().is_empty());
        }
        env_override("BOOKGEN_TOPIC", &mut self.book.topic);
        env_override("BOOKGEN_CHAPTERS", &mut self.book.chapters);
        env_override("BOOKGEN_MODEL", &mut self.model.name);
        env_override("BOOKGEN_BASE_URL", &mut self.model.base_url);
        self
    }

    /// Check value ranges. Called after every override has been applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.book.topic.trim().is_empty() {
            return Err(ConfigError::Invalid("book.topic must not be empty".into()));
        }
        if self.book.chapters == 0 {
            return Err(ConfigError::Invalid("book.chapters must be at least 1".into()));
        }
        if self.model.name.trim().is_empty() {
            return Err(ConfigError::Invalid("model.name must not be empty".into()));
        }
        if self.model.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "model.timeout_secs must be at least 1".into(),
            ));
        }

        for (stage, params) in [
            ("title", &self.stages.title),
            ("chapters", &self.stages.chapters),
            ("sections", &self.stages.sections),
            ("text", &self.stages.text),
        ] {
            if params.max_tokens == 0 {
                return Err(ConfigError::Invalid(format!(
                    "stages.{stage}.max_tokens must be at least 1"
                )));
            }
            if let Some(t) = params.temperature
                && !(0.0..=2.0).contains(&t)
            {
                return Err(ConfigError::Invalid(format!(
                    "stages.{stage}.temperature ({t}) must be within 0.0..=2.0"
                )));
            }
        }

        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
