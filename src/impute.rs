//! Null imputation: sentinel fills, statistical fills, row drops, and the
//! final no-null verification.
//!
//! Policies run in a fixed priority order across the pipeline: the manual
//! correction table first (see `corrections`), then the fills here, then row
//! drops, and finally a verification pass that turns any surviving null into
//! an error naming the column and row key.

use crate::error::{CleaningError, Result};
use crate::schema::{CANONICAL_COLUMNS, DERIVED_COLUMNS, ROW_KEY};
use crate::utils::{fill_numeric_nulls, fill_string_nulls, string_mode};
use polars::prelude::*;
use tracing::{debug, info};

/// Columns where absence is itself meaningful, with their sentinel.
pub const SENTINEL_FILLS: &[(&str, &str)] = &[
    ("victim_img_url", "none"),
    ("street_address", "none"),
    ("desc_of_circumstances", "unavailable"),
    ("news_article_link", "unavailable"),
    ("victims_gender", "unknown"),
    ("official_disposition_of_death", "unknown"),
    ("agency_resp_for_death", "unknown"),
];

/// Categorical columns filled with their mode once canonicalized.
pub const MODE_FILLS: &[&str] = &["geo_type"];

/// Numeric columns filled with their rounded median once coerced.
pub const MEDIAN_FILLS: &[&str] = &["victims_age"];

/// Columns with no viable fallback: rows still null here are dropped.
pub const DROP_IF_NULL: &[&str] = &["city", "zipcode"];

/// Null-imputation engine for the canonical table.
pub struct Imputer;

impl Imputer {
    /// Fill sentinel columns with their fixed placeholder.
    pub fn fill_sentinels(df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        info!("Filling sentinel columns...");

        for (column, sentinel) in SENTINEL_FILLS {
            let series = df.column(column)?.as_materialized_series().clone();
            let nulls = series.null_count();
            if nulls == 0 {
                continue;
            }
            let filled = fill_string_nulls(&series, sentinel)?;
            df.replace(column, filled)?;
            steps.push(format!("Filled {} null(s) in '{}' with '{}'", nulls, column, sentinel));
            debug!("Filled {} null(s) in '{}' with '{}'", nulls, column, sentinel);
        }

        Ok(())
    }

    /// Statistical fallback fills: mode for low-cardinality categoricals,
    /// rounded median for the numeric age column.
    pub fn fill_statistical(df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        info!("Applying statistical fills...");

        for column in MODE_FILLS {
            let series = df.column(column)?.as_materialized_series().clone();
            if series.null_count() == 0 {
                continue;
            }
            if let Some(mode) = string_mode(&series) {
                let filled = fill_string_nulls(&series, &mode)?;
                df.replace(column, filled)?;
                steps.push(format!("Filled '{}' with mode '{}'", column, mode));
                debug!("Filled '{}' with mode '{}'", column, mode);
            }
            // An all-null column has no mode; verification reports it.
        }

        for column in MEDIAN_FILLS {
            let series = df.column(column)?.as_materialized_series().clone();
            if series.null_count() == 0 {
                continue;
            }
            if let Some(median) = series.median() {
                let rounded = median.round();
                let filled = fill_numeric_nulls(&series, rounded)?;
                df.replace(column, filled)?;
                steps.push(format!("Filled '{}' with rounded median {}", column, rounded));
                debug!("Filled '{}' with rounded median {}", column, rounded);
            }
        }

        Ok(())
    }

    /// Drop rows that are still null in a column with no fallback policy.
    ///
    /// Must run only after every manual correction has been applied; a
    /// correction keyed to a dropped row would otherwise go stale.
    pub fn drop_unresolvable_rows(df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        for column in DROP_IF_NULL {
            let before = df.height();
            let mask = !df.column(column)?.as_materialized_series().is_null();
            *df = df.filter(&mask)?;
            let dropped = before - df.height();
            if dropped > 0 {
                steps.push(format!("Dropped {} row(s) with null '{}'", dropped, column));
                info!("Dropped {} row(s) with null '{}'", dropped, column);
            }
        }
        Ok(())
    }

    /// Verify the no-null contract over every output column.
    pub fn verify_no_nulls(df: &DataFrame) -> Result<()> {
        let keys = df.column(ROW_KEY)?.as_materialized_series().clone();
        let keys = keys.u32()?;

        for column in CANONICAL_COLUMNS.iter().chain(DERIVED_COLUMNS.iter()) {
            let Ok(col) = df.column(column) else {
                continue;
            };
            let series = col.as_materialized_series();
            if series.null_count() == 0 {
                continue;
            }

            let mask = series.is_null();
            for (i, is_null) in mask.into_iter().enumerate() {
                if is_null.unwrap_or(false) {
                    return Err(CleaningError::UnfilledNull {
                        column: (*column).to_string(),
                        row_key: keys.get(i).unwrap_or(i as u32),
                    });
                }
            }
        }

        debug!("No-null verification passed");
        Ok(())
    }
}
