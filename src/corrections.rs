//! Manually curated row-level corrections.
//!
//! Each entry records facts recovered by outside research on one incident:
//! reading the linked news article (gender, age), looking up the city or
//! county from the zip code and state, or classifying urban/suburban/rural
//! from census household density. All fixes for a row are applied together,
//! before any fallback imputation, unconditionally overwriting the cell.
//!
//! Entries are keyed by the original row index of the raw file. A key that
//! no longer resolves is an error, not a no-op: it means the table went
//! stale, most likely because a row drop was reordered ahead of it.

use crate::error::{CleaningError, Result};
use crate::schema::ROW_KEY;
use crate::utils::{set_numeric_cells, set_string_cells};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

/// A single corrected cell value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fix {
    Text(&'static str),
    Number(f64),
}

/// All corrections for one incident row.
#[derive(Debug, Clone, Copy)]
pub struct RowCorrection {
    pub row_key: u32,
    pub fixes: &'static [(&'static str, Fix)],
}

macro_rules! fix {
    ($key:expr, $($col:expr => $val:expr),+ $(,)?) => {
        RowCorrection { row_key: $key, fixes: &[$(($col, $val)),+] }
    };
}

use Fix::{Number, Text};

/// The curated correction ledger for the source dataset, ordered by row key.
pub const CORRECTIONS: &[RowCorrection] = &[
    // News-article research for rows missing a gender (and once, an age).
    fix!(13, "victims_gender" => Text("male")),
    fix!(112, "victims_gender" => Text("male"), "victims_age" => Text("40")),
    // County looked up from city and state.
    fix!(493, "county" => Text("Copiah")),
    fix!(522, "geo_type" => Text("suburban")),
    fix!(528, "victims_gender" => Text("male"), "county" => Text("Wyandotte"),
         "geo_type" => Text("suburban")),
    fix!(595, "geo_type" => Text("suburban")),
    fix!(774, "victims_gender" => Text("male"), "county" => Text("Genesee"),
         "geo_type" => Text("suburban")),
    fix!(1000, "geo_type" => Text("rural")),
    fix!(1004, "geo_type" => Text("rural")),
    fix!(1029, "victims_gender" => Text("male")),
    fix!(1250, "county" => Text("Pratt"), "street_address" => Text("500 N Main St"),
         "zipcode" => Number(67124.0), "geo_type" => Text("suburban")),
    fix!(1281, "geo_type" => Text("suburban")),
    fix!(1305, "county" => Text("Gadsden"), "geo_type" => Text("suburban")),
    fix!(1322, "county" => Text("Hunt"), "geo_type" => Text("suburban")),
    fix!(1336, "county" => Text("Utah"), "geo_type" => Text("suburban")),
    fix!(1346, "county" => Text("Milwaukee"), "geo_type" => Text("urban")),
    fix!(1356, "county" => Text("Pemiscot"), "geo_type" => Text("suburban")),
    fix!(1367, "county" => Text("Loudon"), "geo_type" => Text("rural")),
    fix!(1430, "county" => Text("Pierce"), "geo_type" => Text("suburban")),
    fix!(1607, "county" => Text("Caldwell"), "geo_type" => Text("suburban")),
    fix!(1812, "geo_type" => Text("rural")),
    fix!(1947, "geo_type" => Text("suburban")),
    fix!(1965, "county" => Text("Maricopa"), "geo_type" => Text("suburban")),
    fix!(1981, "county" => Text("Daviess"), "geo_type" => Text("suburban")),
    fix!(2072, "geo_type" => Text("suburban")),
    fix!(2207, "geo_type" => Text("suburban")),
    fix!(2419, "geo_type" => Text("urban")),
    fix!(2488, "geo_type" => Text("suburban")),
    fix!(2813, "street_address" => Text("6800 62nd Ave NE"),
         "zipcode" => Number(98115.0), "geo_type" => Text("urban")),
    fix!(3315, "county" => Text("Lake"), "geo_type" => Text("suburban")),
    // City looked up from zip code and state.
    fix!(3339, "city" => Text("Land O' Lakes")),
    fix!(3344, "city" => Text("Campbellton"), "zipcode" => Number(78008.0),
         "geo_type" => Text("rural")),
    fix!(3346, "zipcode" => Number(57752.0), "geo_type" => Text("rural")),
    fix!(3347, "geo_type" => Text("suburban")),
    fix!(3475, "street_address" => Text("X4 Rd"), "zipcode" => Number(81411.0),
         "geo_type" => Text("rural"), "city" => Text("Bedrock")),
    fix!(3581, "geo_type" => Text("suburban")),
    fix!(3621, "geo_type" => Text("rural")),
    fix!(3699, "geo_type" => Text("rural")),
    fix!(3740, "geo_type" => Text("suburban")),
    fix!(4409, "geo_type" => Text("suburban"), "zipcode" => Number(32218.0)),
    fix!(4451, "geo_type" => Text("urban")),
    fix!(4535, "geo_type" => Text("suburban"), "zipcode" => Number(46368.0)),
    fix!(4571, "geo_type" => Text("suburban"), "zipcode" => Number(97210.0)),
    fix!(4592, "geo_type" => Text("suburban"), "zipcode" => Number(77014.0)),
    fix!(4593, "geo_type" => Text("suburban"), "zipcode" => Number(77014.0)),
    fix!(4594, "geo_type" => Text("suburban"), "zipcode" => Number(74434.0)),
    fix!(4640, "geo_type" => Text("suburban"), "zipcode" => Number(30680.0)),
    fix!(5021, "geo_type" => Text("rural")),
    fix!(5164, "geo_type" => Text("rural"), "street_address" => Text("182 N 4430 Rd")),
    fix!(5192, "geo_type" => Text("suburban")),
    fix!(5268, "geo_type" => Text("suburban")),
    fix!(5371, "geo_type" => Text("suburban"), "zipcode" => Number(77073.0)),
    fix!(5561, "city" => Text("Jacksonville")),
    fix!(5623, "geo_type" => Text("suburban")),
    fix!(5709, "geo_type" => Text("rural")),
    fix!(5805, "geo_type" => Text("suburban")),
    fix!(6080, "geo_type" => Text("urban")),
    fix!(6188, "geo_type" => Text("urban")),
    fix!(6442, "geo_type" => Text("rural")),
    fix!(6511, "city" => Text("Douglas")),
    fix!(6570, "street_address" => Text("12097 Veterans Memorial Dr"),
         "zipcode" => Number(77067.0), "geo_type" => Text("suburban")),
    fix!(6573, "geo_type" => Text("suburban"), "zipcode" => Number(73104.0),
         "city" => Text("Oklahoma City")),
    fix!(6637, "geo_type" => Text("suburban"), "zipcode" => Number(70767.0)),
    fix!(6643, "street_address" => Text("32000 Westport Way"),
         "zipcode" => Number(92596.0), "geo_type" => Text("suburban")),
    fix!(6697, "street_address" => Text("2335 Union Dr"), "geo_type" => Text("suburban")),
    fix!(6746, "geo_type" => Text("suburban")),
    fix!(6812, "geo_type" => Text("suburban")),
    fix!(6848, "geo_type" => Text("urban")),
    fix!(6862, "zipcode" => Number(15224.0), "geo_type" => Text("urban")),
    fix!(6933, "geo_type" => Text("suburban")),
    fix!(7099, "geo_type" => Text("urban")),
    fix!(7461, "geo_type" => Text("suburban")),
];

/// Apply a correction slice to the table.
///
/// Edits are grouped per column so each affected column is rebuilt once.
pub fn apply(df: &mut DataFrame, corrections: &[RowCorrection], steps: &mut Vec<String>) -> Result<()> {
    if corrections.is_empty() {
        return Ok(());
    }

    info!("Applying {} manual row corrections", corrections.len());

    // Map row keys to current positions.
    let key_series = df.column(ROW_KEY)?.as_materialized_series().clone();
    let keys = key_series.u32()?;
    let mut positions: HashMap<u32, usize> = HashMap::with_capacity(keys.len());
    for (pos, key) in keys.into_iter().enumerate() {
        if let Some(key) = key {
            positions.insert(key, pos);
        }
    }

    let mut text_edits: HashMap<&str, Vec<(usize, &str)>> = HashMap::new();
    let mut numeric_edits: HashMap<&str, Vec<(usize, f64)>> = HashMap::new();
    let mut cells = 0usize;

    for correction in corrections {
        let pos = *positions
            .get(&correction.row_key)
            .ok_or(CleaningError::CorrectionTargetMissing {
                row_key: correction.row_key,
            })?;

        for (column, fix) in correction.fixes.iter().copied() {
            match fix {
                Fix::Text(value) => text_edits.entry(column).or_default().push((pos, value)),
                Fix::Number(value) => numeric_edits.entry(column).or_default().push((pos, value)),
            }
            cells += 1;
        }
    }

    for (column, edits) in &text_edits {
        let series = df.column(column)?.as_materialized_series().clone();
        let edited = set_string_cells(&series, edits)?;
        df.replace(column, edited)?;
        debug!("Corrected {} cell(s) in '{}'", edits.len(), column);
    }

    for (column, edits) in &numeric_edits {
        let series = df.column(column)?.as_materialized_series().clone();
        let edited = set_numeric_cells(&series, edits)?;
        df.replace(column, edited)?;
        debug!("Corrected {} cell(s) in '{}'", edits.len(), column);
    }

    steps.push(format!(
        "Applied {} manual corrections ({} cells)",
        corrections.len(),
        cells
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        let mut df = df![
            "victims_gender" => [Option::<&str>::None, Some("Male"), None],
            "zipcode" => [Some(10001i64), None, Some(30303)],
        ]
        .unwrap();
        df.with_column(Series::new(ROW_KEY.into(), vec![10u32, 20, 30]))
            .unwrap();
        df
    }

    #[test]
    fn test_apply_overwrites_cells_atomically() {
        let mut df = frame();
        let mut steps = Vec::new();

        const TABLE: &[RowCorrection] = &[
            fix!(20, "victims_gender" => Text("female"), "zipcode" => Number(77067.0)),
        ];

        apply(&mut df, TABLE, &mut steps).unwrap();

        let gender = df.column("victims_gender").unwrap().as_materialized_series().clone();
        assert_eq!(gender.str().unwrap().get(1), Some("female"));

        let zip = df.column("zipcode").unwrap().as_materialized_series().clone();
        assert_eq!(zip.get(1).unwrap().try_extract::<f64>().unwrap(), 77067.0);
        // Untouched cells keep their values (and nulls).
        assert_eq!(zip.get(0).unwrap().try_extract::<f64>().unwrap(), 10001.0);
        assert!(df.column("victims_gender").unwrap().as_materialized_series().get(0).unwrap().is_null());
    }

    #[test]
    fn test_stale_row_key_is_an_error() {
        let mut df = frame();
        let mut steps = Vec::new();

        const TABLE: &[RowCorrection] = &[fix!(999, "victims_gender" => Text("male"))];

        let err = apply(&mut df, TABLE, &mut steps).unwrap_err();
        assert_eq!(err.error_code(), "CORRECTION_TARGET_MISSING");
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn test_default_table_is_sorted_and_unique() {
        let mut previous = None;
        for correction in CORRECTIONS {
            if let Some(prev) = previous {
                assert!(correction.row_key > prev, "table must stay sorted by row key");
            }
            assert!(!correction.fixes.is_empty());
            previous = Some(correction.row_key);
        }
    }
}
