//! Configuration for the cleaning pipeline, built with a fluent builder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a cleaning run.
///
/// Use [`CleaningConfig::builder()`] for fluent setup:
///
/// ```rust,ignore
/// let config = CleaningConfig::builder()
///     .output_dir("results")
///     .enforce_vocabulary(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Whether to scan controlled-vocabulary columns after canonicalization
    /// and log a warning for every value outside the declared vocabulary.
    /// Default: true
    pub enforce_vocabulary: bool,

    /// Whether to keep the internal `row_key` column in the output.
    /// Useful for auditing which original rows survived.
    /// Default: false
    pub keep_row_key: bool,

    /// Output directory for the cleaned CSV.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Output file name without extension.
    /// Default: "police_killings_clean"
    pub output_name: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            enforce_vocabulary: true,
            keep_row_key: false,
            output_dir: PathBuf::from("output"),
            output_name: "police_killings_clean".to_string(),
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.output_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyOutputName);
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Output name must not be empty")]
    EmptyOutputName,
}

/// Builder for [`CleaningConfig`].
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    enforce_vocabulary: Option<bool>,
    keep_row_key: Option<bool>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
}

impl CleaningConfigBuilder {
    /// Enable or disable post-canonicalization vocabulary warnings.
    pub fn enforce_vocabulary(mut self, enforce: bool) -> Self {
        self.enforce_vocabulary = Some(enforce);
        self
    }

    /// Keep the internal `row_key` column in the output.
    pub fn keep_row_key(mut self, keep: bool) -> Self {
        self.keep_row_key = Some(keep);
        self
    }

    /// Set the output directory for the cleaned CSV.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the output file name (without extension).
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let defaults = CleaningConfig::default();
        let config = CleaningConfig {
            enforce_vocabulary: self.enforce_vocabulary.unwrap_or(defaults.enforce_vocabulary),
            keep_row_key: self.keep_row_key.unwrap_or(defaults.keep_row_key),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            output_name: self.output_name.unwrap_or(defaults.output_name),
        };

        config.validate()?;
        Ok(config)
    }
}
