//! Pipeline orchestration: runs every cleaning stage in its fixed order.
//!
//! Stage order matters and is part of the contract:
//!
//! 1. Schema normalization (row keys assigned here)
//! 2. Manual row corrections
//! 3. Sentinel fills
//! 4. Value canonicalization
//! 5. Type coercion (age, date)
//! 6. Statistical fills (mode, median)
//! 7. Unresolvable row drops
//! 8. Name derivation
//! 9. Vocabulary scan and no-null verification
//!
//! Corrections run before any fallback fill so researched facts always win,
//! and row drops run last among the null policies so correction row keys
//! never go stale.

use crate::coerce::TypeCoercer;
use crate::config::CleaningConfig;
use crate::corrections::{self, RowCorrection, CORRECTIONS};
use crate::error::Result;
use crate::impute::Imputer;
use crate::names;
use crate::schema::{SchemaNormalizer, CANONICAL_COLUMNS, DERIVED_COLUMNS, ROW_KEY};
use crate::vocab::Canonicalizer;
use polars::prelude::*;
use static_assertions::assert_impl_all;
use tracing::{info, warn};

/// Result of a full cleaning run.
#[derive(Debug)]
pub struct CleaningOutcome {
    /// The cleaned table, canonical columns plus the two derived name
    /// columns, in output order.
    pub data: DataFrame,
    /// Human-readable ledger of every transformation applied.
    pub steps: Vec<String>,
    /// Rows in the raw input.
    pub rows_in: usize,
    /// Rows in the cleaned output.
    pub rows_out: usize,
    /// Out-of-vocabulary values found in the final scan (also logged).
    pub vocabulary_warnings: Vec<String>,
}

/// The cleaning pipeline.
///
/// Build one with [`Cleaner::builder()`]; the default configuration and the
/// built-in correction table cover the standard dataset.
pub struct Cleaner {
    config: CleaningConfig,
    corrections: Vec<RowCorrection>,
}

assert_impl_all!(Cleaner: Send);

impl Default for Cleaner {
    fn default() -> Self {
        Self {
            config: CleaningConfig::default(),
            corrections: CORRECTIONS.to_vec(),
        }
    }
}

impl Cleaner {
    /// Create a builder for a customized cleaner.
    pub fn builder() -> CleanerBuilder {
        CleanerBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run the full cleaning pipeline on a raw table.
    pub fn clean(&self, df: DataFrame) -> Result<CleaningOutcome> {
        let rows_in = df.height();
        let mut steps = Vec::new();

        info!("Starting cleaning pipeline ({} rows)", rows_in);

        let (mut df, from_raw_headers) = SchemaNormalizer::normalize(df, &mut steps)?;

        // Corrections are keyed to the raw file's row indices. On
        // already-canonical input those keys point at reassigned rows, so
        // applying them would silently edit the wrong incidents.
        if from_raw_headers {
            corrections::apply(&mut df, &self.corrections, &mut steps)?;
        } else if !self.corrections.is_empty() {
            warn!(
                "Input headers already canonical; skipping {} correction(s) keyed to raw row indices",
                self.corrections.len()
            );
            steps.push(format!(
                "Skipped {} correction(s): input was not a raw export",
                self.corrections.len()
            ));
        }
        Imputer::fill_sentinels(&mut df, &mut steps)?;
        Canonicalizer::canonicalize(&mut df, &mut steps)?;
        TypeCoercer::coerce_age(&mut df, &mut steps)?;
        TypeCoercer::coerce_date(&mut df, &mut steps)?;
        Imputer::fill_statistical(&mut df, &mut steps)?;
        Imputer::drop_unresolvable_rows(&mut df, &mut steps)?;
        names::derive_name_columns(&mut df, &mut steps)?;

        let vocabulary_warnings = if self.config.enforce_vocabulary {
            let violations = Canonicalizer::vocabulary_violations(&df)?;
            for violation in &violations {
                warn!("Out-of-vocabulary value: {}", violation);
            }
            violations
        } else {
            Vec::new()
        };

        Imputer::verify_no_nulls(&df)?;

        // Output order: canonical columns, derived names, optionally the key.
        let mut selection: Vec<PlSmallStr> = CANONICAL_COLUMNS
            .iter()
            .chain(DERIVED_COLUMNS.iter())
            .map(|c| (*c).into())
            .collect();
        if self.config.keep_row_key {
            selection.push(ROW_KEY.into());
        }
        let df = df.select(selection)?;

        let rows_out = df.height();
        info!(
            "Cleaning complete: {} rows in, {} rows out, {} step(s)",
            rows_in,
            rows_out,
            steps.len()
        );

        Ok(CleaningOutcome {
            data: df,
            steps,
            rows_in,
            rows_out,
            vocabulary_warnings,
        })
    }
}

/// Builder for [`Cleaner`].
#[derive(Default)]
pub struct CleanerBuilder {
    config: Option<CleaningConfig>,
    corrections: Option<Vec<RowCorrection>>,
}

impl CleanerBuilder {
    /// Set the cleaning configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the built-in correction table.
    ///
    /// The built-in table is keyed to the original row indices of the
    /// standard raw file; pass an empty slice when cleaning other raw data.
    /// Corrections are only applied to input with vendor headers, so re-runs
    /// on already-cleaned output skip the table automatically.
    pub fn corrections(mut self, corrections: impl Into<Vec<RowCorrection>>) -> Self {
        self.corrections = Some(corrections.into());
        self
    }

    pub fn build(self) -> Cleaner {
        Cleaner {
            config: self.config.unwrap_or_default(),
            corrections: self.corrections.unwrap_or_else(|| CORRECTIONS.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleaningConfig;

    #[test]
    fn test_builder_defaults() {
        let cleaner = Cleaner::builder().build();
        assert!(cleaner.config().enforce_vocabulary);
        assert_eq!(cleaner.corrections.len(), CORRECTIONS.len());
    }

    #[test]
    fn test_builder_overrides() {
        let cleaner = Cleaner::builder()
            .config(
                CleaningConfig::builder()
                    .enforce_vocabulary(false)
                    .build()
                    .unwrap(),
            )
            .corrections(Vec::new())
            .build();

        assert!(!cleaner.config().enforce_vocabulary);
        assert!(cleaner.corrections.is_empty());
    }
}
