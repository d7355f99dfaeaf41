//! TOML-based pipeline configuration for the generate, train, and serve jobs.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level pipeline configuration parsed from TOML.
///
/// All fields have defaults matching the baseline pipeline. Load from
/// TOML with [`PipelineConfig::from_toml_file`] or use
/// [`PipelineConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Synthetic dataset generator parameters.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Model trainer parameters.
    #[serde(default)]
    pub trainer: TrainerConfig,
    /// Prediction server parameters.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Synthetic dataset generator parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Number of days to generate at hourly granularity (must be > 0).
    pub days: usize,
    /// Master random seed.
    pub seed: u64,
    /// Output dataset CSV path.
    pub output: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            days: 365,
            seed: 42,
            output: "energy_dataset.csv".to_string(),
        }
    }
}

/// Model trainer parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainerConfig {
    /// Input dataset CSV path.
    pub input: String,
    /// Output model artifact path.
    pub output: String,
    /// Target sector: `"residential"`, `"commercial"`, or `"industrial"`.
    pub target: String,
    /// Number of trees in the random forest (must be > 0).
    pub n_trees: usize,
    /// Fraction of records held out for evaluation (must be in (0, 1)).
    pub test_fraction: f64,
    /// Random seed for the train/test split and forest fitting.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            input: "energy_dataset.csv".to_string(),
            output: "energy_model.json".to_string(),
            target: "commercial".to_string(),
            n_trees: 200,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Prediction server parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Model artifact path loaded at startup.
    pub model: String,
    /// Port to bind the HTTP API to.
    pub port: u16,
    /// Input validation mode: `"permissive"` or `"strict"`.
    ///
    /// Permissive mode forwards request fields to the model unchecked,
    /// matching the baseline serving behavior. Strict mode rejects
    /// out-of-range fields with a 400 response.
    pub validation: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            model: "energy_model.json".to_string(),
            port: 8000,
            validation: "permissive".to_string(),
        }
    }
}

/// Request input validation mode for the prediction server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Forward inputs to the model unchecked.
    Permissive,
    /// Reject out-of-range inputs with a 400 response.
    Strict,
}

impl ServerConfig {
    /// Parses the configured validation mode.
    ///
    /// Call after [`PipelineConfig::validate`]; unknown values fall back
    /// to permissive.
    pub fn validation_mode(&self) -> ValidationMode {
        if self.validation == "strict" {
            ValidationMode::Strict
        } else {
            ValidationMode::Permissive
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"generator.days"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Valid target sector names for the trainer.
pub const TARGET_SECTORS: &[&str] = &["residential", "commercial", "industrial"];

impl PipelineConfig {
    /// Returns the baseline pipeline configuration.
    pub fn baseline() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            trainer: TrainerConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Parses a pipeline configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a pipeline configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let g = &self.generator;
        if g.days == 0 {
            errors.push(ConfigError {
                field: "generator.days".into(),
                message: "must be > 0".into(),
            });
        }
        if g.output.is_empty() {
            errors.push(ConfigError {
                field: "generator.output".into(),
                message: "must not be empty".into(),
            });
        }

        let t = &self.trainer;
        if !TARGET_SECTORS.contains(&t.target.as_str()) {
            errors.push(ConfigError {
                field: "trainer.target".into(),
                message: format!(
                    "must be one of {}, got \"{}\"",
                    TARGET_SECTORS.join(", "),
                    t.target
                ),
            });
        }
        if t.n_trees == 0 {
            errors.push(ConfigError {
                field: "trainer.n_trees".into(),
                message: "must be > 0".into(),
            });
        }
        if !(t.test_fraction > 0.0 && t.test_fraction < 1.0) {
            errors.push(ConfigError {
                field: "trainer.test_fraction".into(),
                message: "must be in (0.0, 1.0)".into(),
            });
        }

        let s = &self.server;
        if s.validation != "permissive" && s.validation != "strict" {
            errors.push(ConfigError {
                field: "server.validation".into(),
                message: format!(
                    "must be \"permissive\" or \"strict\", got \"{}\"",
                    s.validation
                ),
            });
        }

        errors
    }
}
