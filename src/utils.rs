//! Shared series helpers used across the pipeline stages.

use polars::prelude::*;

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always Float64, which is also the target dtype for every
/// numeric column in this dataset (age, zipcode).
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let mask = series.is_null();
    let mut result = Vec::with_capacity(series.len());

    for i in 0..series.len() {
        if mask.get(i).unwrap_or(false) {
            result.push(Some(fill_value));
        } else {
            let val = series.get(i)?;
            result.push(Some(val.try_extract::<f64>()?));
        }
    }

    Ok(Series::new(series.name().clone(), result))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let str_series = series.str()?;
    let result: Vec<Option<String>> = str_series
        .into_iter()
        .map(|opt| {
            Some(match opt {
                Some(val) => val.to_string(),
                None => fill_value.to_string(),
            })
        })
        .collect();

    Ok(Series::new(series.name().clone(), result))
}

/// Calculate the mode (most frequent value) of a string Series.
///
/// Count ties resolve to the lexicographically smallest value, so the fill
/// is deterministic run to run.
pub fn string_mode(series: &Series) -> Option<String> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return None;
    }

    let str_chunked = non_null.str().ok()?;

    let mut value_counts: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();
    for val in str_chunked.into_iter().flatten() {
        *value_counts.entry(val.to_string()).or_insert(0) += 1;
    }

    value_counts
        .into_iter()
        .max_by(|(val_a, count_a), (val_b, count_b)| {
            count_a.cmp(count_b).then_with(|| val_b.cmp(val_a))
        })
        .map(|(val, _)| val)
}

/// Rewrite a string Series with the given (position, value) edits applied.
pub fn set_string_cells(series: &Series, edits: &[(usize, &str)]) -> PolarsResult<Series> {
    let str_series = series.str()?;
    let mut values: Vec<Option<String>> = str_series
        .into_iter()
        .map(|opt| opt.map(str::to_string))
        .collect();

    for (pos, value) in edits {
        if *pos < values.len() {
            values[*pos] = Some((*value).to_string());
        }
    }

    Ok(Series::new(series.name().clone(), values))
}

/// Rewrite a numeric Series with the given (position, value) edits applied.
///
/// The column is promoted to Float64 so an edit can land in an
/// integer-inferred column (zip codes read from a partially-null CSV column).
pub fn set_numeric_cells(series: &Series, edits: &[(usize, f64)]) -> PolarsResult<Series> {
    let as_f64 = series.cast(&DataType::Float64)?;
    let chunked = as_f64.f64()?;
    let mut values: Vec<Option<f64>> = chunked.into_iter().collect();

    for (pos, value) in edits {
        if *pos < values.len() {
            values[*pos] = Some(*value);
        }
    }

    Ok(Series::new(series.name().clone(), values))
}
