//! Type coercion for the age and date columns.
//!
//! Both columns arrive as free text. Age tokens that carry no number
//! ("unknown") become null so the median fill can take over; decade tokens
//! ("40s") take the decade midpoint. Dates must parse; an unparseable date
//! is an error, never a silent null.

use crate::error::{CleaningError, Result};
use crate::schema::ROW_KEY;
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, info};

/// Date formats tried in order when parsing the incident date.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%m/%d/%y",
    "%Y-%m-%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d-%b-%y",
];

/// Age tokens that mean "not recorded" rather than a number.
const AGE_UNKNOWN_TOKENS: &[&str] = &["unknown", "n/a", "na", ""];

pub struct TypeCoercer;

impl TypeCoercer {
    /// Coerce `victims_age` to Float64.
    ///
    /// Free-text handling: unknown tokens become null, decade tokens like
    /// "40s" become the decade midpoint, plain numbers parse directly.
    /// Anything else, or a negative value, is a coercion error.
    pub fn coerce_age(df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        let series = df.column("victims_age")?.as_materialized_series().clone();

        let coerced = match series.dtype() {
            DataType::String => {
                let keys = df.column(ROW_KEY)?.as_materialized_series().clone();
                let keys = keys.u32()?;
                let str_series = series.str()?;
                let mut values: Vec<Option<f64>> = Vec::with_capacity(series.len());

                for (i, opt) in str_series.into_iter().enumerate() {
                    let value = match opt {
                        None => None,
                        Some(raw) => Self::parse_age(raw).map_err(|value| {
                            CleaningError::TypeCoercion {
                                column: "victims_age".to_string(),
                                row_key: keys.get(i).unwrap_or(i as u32),
                                value,
                            }
                        })?,
                    };
                    values.push(value);
                }
                Series::new("victims_age".into(), values)
            }
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => series.cast(&DataType::Float64)?,
            other => {
                return Err(CleaningError::TypeCoercion {
                    column: "victims_age".to_string(),
                    row_key: 0,
                    value: format!("column dtype {}", other),
                });
            }
        };

        df.replace("victims_age", coerced)?;
        steps.push("Coerced 'victims_age' to numeric".to_string());
        debug!("Coerced 'victims_age' to Float64");
        Ok(())
    }

    /// Parse a single free-text age token. Returns the offending text on
    /// failure so the caller can build a full error.
    fn parse_age(raw: &str) -> std::result::Result<Option<f64>, String> {
        let token = raw.trim().to_lowercase();
        if AGE_UNKNOWN_TOKENS.contains(&token.as_str()) {
            return Ok(None);
        }

        // Decade midpoint convention: "40s" -> 40.
        if let Some(decade) = token.strip_suffix('s')
            && let Ok(base) = decade.parse::<u32>()
        {
            return Ok(Some(f64::from(base)));
        }

        match token.parse::<f64>() {
            Ok(age) if age >= 0.0 => Ok(Some(age)),
            _ => Err(raw.to_string()),
        }
    }

    /// Parse the free-text `date` column into a calendar date.
    pub fn coerce_date(df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        let series = df.column("date")?.as_materialized_series().clone();

        // Already a date (e.g. re-running on cleaned output).
        if series.dtype() == &DataType::Date {
            return Ok(());
        }

        let keys = df.column(ROW_KEY)?.as_materialized_series().clone();
        let keys = keys.u32()?;
        let str_series = series.str()?;
        let epoch = NaiveDate::default();
        let mut days: Vec<Option<i32>> = Vec::with_capacity(series.len());

        for (i, opt) in str_series.into_iter().enumerate() {
            match opt {
                None => days.push(None),
                Some(raw) => {
                    let parsed = Self::parse_date(raw).ok_or_else(|| {
                        CleaningError::TypeCoercion {
                            column: "date".to_string(),
                            row_key: keys.get(i).unwrap_or(i as u32),
                            value: raw.to_string(),
                        }
                    })?;
                    days.push(Some((parsed - epoch).num_days() as i32));
                }
            }
        }

        let coerced = Series::new("date".into(), days).cast(&DataType::Date)?;
        df.replace("date", coerced)?;
        steps.push("Parsed 'date' into calendar dates".to_string());
        info!("Parsed 'date' column into calendar dates");
        Ok(())
    }

    fn parse_date(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_keys(mut df: DataFrame) -> DataFrame {
        let keys: Vec<u32> = (0..df.height() as u32).collect();
        df.with_column(Series::new(ROW_KEY.into(), keys)).unwrap();
        df
    }

    #[test]
    fn test_age_decade_midpoint() {
        let mut df = with_keys(df!["victims_age" => ["40s", "27", "Unknown"]].unwrap());
        let mut steps = Vec::new();

        TypeCoercer::coerce_age(&mut df, &mut steps).unwrap();

        let age = df.column("victims_age").unwrap().as_materialized_series().clone();
        assert!(matches!(age.dtype(), DataType::Float64));
        assert_eq!(age.get(0).unwrap().try_extract::<f64>().unwrap(), 40.0);
        assert_eq!(age.get(1).unwrap().try_extract::<f64>().unwrap(), 27.0);
        assert!(age.get(2).unwrap().is_null());
    }

    #[test]
    fn test_age_garbage_is_coercion_error() {
        let mut df = with_keys(df!["victims_age" => ["27", "fortyish"]].unwrap());
        let mut steps = Vec::new();

        let err = TypeCoercer::coerce_age(&mut df, &mut steps).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_COERCION_ERROR");
        assert!(err.to_string().contains("fortyish"));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_age_negative_rejected() {
        let mut df = with_keys(df!["victims_age" => ["-4"]].unwrap());
        let mut steps = Vec::new();

        assert!(TypeCoercer::coerce_age(&mut df, &mut steps).is_err());
    }

    #[test]
    fn test_age_numeric_column_cast() {
        let mut df = with_keys(df!["victims_age" => [27i64, 43]].unwrap());
        let mut steps = Vec::new();

        TypeCoercer::coerce_age(&mut df, &mut steps).unwrap();
        let age = df.column("victims_age").unwrap().as_materialized_series().clone();
        assert!(matches!(age.dtype(), DataType::Float64));
    }

    #[test]
    fn test_date_formats() {
        let mut df = with_keys(
            df!["date" => ["7/17/2014", "2015-03-02", "January 5, 2016"]].unwrap(),
        );
        let mut steps = Vec::new();

        TypeCoercer::coerce_date(&mut df, &mut steps).unwrap();

        let date = df.column("date").unwrap().as_materialized_series().clone();
        assert_eq!(date.dtype(), &DataType::Date);
        assert_eq!(date.null_count(), 0);
    }

    #[test]
    fn test_unparseable_date_is_error_not_null() {
        let mut df = with_keys(df!["date" => ["7/17/2014", "sometime in June"]].unwrap());
        let mut steps = Vec::new();

        let err = TypeCoercer::coerce_date(&mut df, &mut steps).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_COERCION_ERROR");
        assert!(err.to_string().contains("sometime in June"));
    }

    #[test]
    fn test_date_column_already_coerced_is_left_alone() {
        let days = Series::new("date".into(), vec![Some(16633i32)])
            .cast(&DataType::Date)
            .unwrap();
        let mut df = with_keys(DataFrame::new(vec![days.into()]).unwrap());
        let mut steps = Vec::new();

        TypeCoercer::coerce_date(&mut df, &mut steps).unwrap();
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    }
}
