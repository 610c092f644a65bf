//! Error types for the dataset normalizer.
//!
//! Every failure is fatal to the run: the pipeline is a batch offline
//! transform with no partial-output contract, so errors abort before the
//! cleaned file is written. Each variant carries enough context (row key,
//! column, offending value) to keep the static correction and vocabulary
//! tables maintainable.

use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// A required source column is absent from the raw header, in both its
    /// vendor and canonical spelling.
    #[error("required source column '{0}' not found in raw header")]
    MissingColumn(String),

    /// A null survived every fill stage in a column that must not be null.
    #[error("column '{column}' still null at row {row_key} after all fill stages")]
    UnfilledNull { column: String, row_key: u32 },

    /// A manual correction references a row key that is no longer present,
    /// usually a stale entry left behind by an earlier row drop.
    #[error("manual correction targets row {row_key}, which is not present in the table")]
    CorrectionTargetMissing { row_key: u32 },

    /// A value could not be coerced to the column's target type.
    #[error("cannot coerce '{value}' in column '{column}' at row {row_key}")]
    TypeCoercion {
        column: String,
        row_key: u32,
        value: String,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, useful for scripting against the CLI.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingColumn(_) => "SCHEMA_ERROR",
            Self::UnfilledNull { .. } => "IMPUTATION_ERROR",
            Self::CorrectionTargetMissing { .. } => "CORRECTION_TARGET_MISSING",
            Self::TypeCoercion { .. } => "TYPE_COERCION_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
