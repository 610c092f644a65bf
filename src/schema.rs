//! Schema normalization: vendor headers to the canonical column set.
//!
//! This is the first pipeline stage. It assigns the `row_key` column from the
//! original positional index (the anchor for every manual correction later
//! on), prunes all-null rows and columns, renames vendor headers, and drops
//! the vendor columns that carry nothing useful.

use crate::error::{CleaningError, Result};
use polars::prelude::*;
use tracing::{debug, info};

/// Name of the synthetic row-identity column carried through the pipeline.
pub const ROW_KEY: &str = "row_key";

/// Vendor header -> canonical name, in canonical output order (modulo the
/// three dropped columns). Taken verbatim from the source dataset's header.
pub const RENAME_MAP: &[(&str, &str)] = &[
    ("Victim's name", "victims_name"),
    ("Victim's age", "victims_age"),
    ("Victim's gender", "victims_gender"),
    ("Victim's race", "victims_race"),
    ("URL of image of victim", "victim_img_url"),
    ("Date of Incident (month/day/year)", "date"),
    ("Street Address of Incident", "street_address"),
    ("City", "city"),
    ("State", "state"),
    ("Zipcode", "zipcode"),
    ("County", "county"),
    ("Agency responsible for death", "agency_resp_for_death"),
    ("Cause of death", "cause_of_death"),
    (
        "A brief description of the circumstances surrounding the death",
        "desc_of_circumstances",
    ),
    (
        "Official disposition of death (justified or other)",
        "official_disposition_of_death",
    ),
    ("Criminal Charges?", "criminal_charges"),
    (
        "Link to news article or photo of official document",
        "news_article_link",
    ),
    ("Symptoms of mental illness?", "mental_illness"),
    ("Unarmed", "unarmed"),
    ("Alleged Weapon (Source: WaPo)", "alleged_weapon"),
    ("Alleged Threat Level (Source: WaPo)", "threat_level"),
    ("Fleeing (Source: WaPo)", "fleeing"),
    ("Body Camera (Source: WaPo)", "video_surveillance"),
    ("WaPo ID (If included in WaPo database)", "wapo_id"),
    ("ID", "id"),
    ("Off-Duty Killing?", "off_duty_killing"),
    (
        "Geography (via Trulia methodology based on zipcode population density: \
         http://jedkolko.com/wp-content/uploads/2015/05/full-ZCTA-urban-suburban-rural-classification.xlsx )",
        "geo_type",
    ),
];

/// Canonical columns dropped unconditionally: `id` duplicates the row key,
/// `wapo_id` is unsearchable in the upstream database, and
/// `off_duty_killing` is 97% null in the source data.
pub const DROP_COLUMNS: &[&str] = &["id", "wapo_id", "off_duty_killing"];

/// Canonical output columns, in output order.
pub const CANONICAL_COLUMNS: &[&str] = &[
    "victims_name",
    "victims_age",
    "victims_gender",
    "victims_race",
    "victim_img_url",
    "date",
    "street_address",
    "city",
    "state",
    "zipcode",
    "county",
    "agency_resp_for_death",
    "cause_of_death",
    "desc_of_circumstances",
    "official_disposition_of_death",
    "criminal_charges",
    "news_article_link",
    "mental_illness",
    "unarmed",
    "alleged_weapon",
    "threat_level",
    "fleeing",
    "video_surveillance",
    "geo_type",
];

/// Columns derived at the end of the pipeline, appended after the canonical
/// set in the output.
pub const DERIVED_COLUMNS: &[&str] = &["first_name", "last_name"];

/// Schema normalizer for the raw vendor table.
pub struct SchemaNormalizer;

impl SchemaNormalizer {
    /// Normalize the raw table: assign row keys, prune all-null rows and
    /// columns, rename vendor headers, drop unwanted columns, and select the
    /// canonical column set.
    ///
    /// Headers already in canonical form are accepted as-is, so the full
    /// pipeline can be re-run on its own output. The returned flag says
    /// whether any vendor header was actually renamed; the pipeline uses it
    /// to tell a raw export from already-cleaned data, whose row keys no
    /// longer line up with the correction table.
    pub fn normalize(df: DataFrame, steps: &mut Vec<String>) -> Result<(DataFrame, bool)> {
        let mut df = df;
        let rows_in = df.height();

        info!("Normalizing schema ({} rows, {} columns)", rows_in, df.width());

        // Row keys come from the original positional index, before any row
        // is pruned, so they line up with the manual correction table.
        let keys: Vec<u32> = (0..df.height() as u32).collect();
        df.with_column(Series::new(ROW_KEY.into(), keys))?;

        df = Self::prune_all_null_rows(df)?;
        let pruned_rows = rows_in - df.height();
        if pruned_rows > 0 {
            steps.push(format!("Dropped {} all-null rows", pruned_rows));
            debug!("Dropped {} all-null rows", pruned_rows);
        }

        df = Self::prune_all_null_columns(df, steps);

        // Rename vendor headers; tolerate already-canonical headers.
        let mut renamed = 0usize;
        for (raw, canonical) in RENAME_MAP {
            if df.column(raw).is_ok() {
                df.rename(raw, (*canonical).into())?;
                renamed += 1;
            } else if df.column(canonical).is_ok() {
                continue;
            } else if !DROP_COLUMNS.contains(canonical) {
                return Err(CleaningError::MissingColumn((*raw).to_string()));
            }
        }

        let to_drop: Vec<PlSmallStr> = DROP_COLUMNS
            .iter()
            .filter(|c| df.column(c).is_ok())
            .map(|c| (*c).into())
            .collect();
        if !to_drop.is_empty() {
            steps.push(format!("Dropped columns: {:?}", DROP_COLUMNS));
            df = df.drop_many(to_drop);
        }

        // Selecting the canonical set also discards any unmapped vendor
        // columns and the derived columns of a previous run.
        let mut selection: Vec<PlSmallStr> =
            CANONICAL_COLUMNS.iter().map(|c| (*c).into()).collect();
        selection.push(ROW_KEY.into());
        df = df.select(selection)?;

        steps.push(format!(
            "Renamed headers to canonical set ({} columns)",
            CANONICAL_COLUMNS.len()
        ));

        Ok((df, renamed > 0))
    }

    /// Remove rows where every vendor column is null (`row_key` excluded).
    fn prune_all_null_rows(df: DataFrame) -> Result<DataFrame> {
        let data_width = df.width() - 1;
        if data_width == 0 {
            return Ok(df);
        }

        let mut null_counts = vec![0usize; df.height()];
        for col in df.get_columns() {
            if col.name().as_str() == ROW_KEY {
                continue;
            }
            let mask = col.as_materialized_series().is_null();
            for (i, is_null) in mask.into_iter().enumerate() {
                if is_null.unwrap_or(false) {
                    null_counts[i] += 1;
                }
            }
        }

        let keep: Vec<bool> = null_counts.iter().map(|n| *n < data_width).collect();
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok(df.filter(&mask)?)
    }

    /// Whether a header (vendor or canonical) maps to a required output
    /// column. Required columns have a fill policy downstream and must
    /// survive even when entirely null.
    fn is_required_header(name: &str) -> bool {
        if CANONICAL_COLUMNS.contains(&name) {
            return true;
        }
        RENAME_MAP
            .iter()
            .any(|(raw, canonical)| *raw == name && !DROP_COLUMNS.contains(canonical))
    }

    /// Remove non-required columns that contain no values at all.
    fn prune_all_null_columns(df: DataFrame, steps: &mut Vec<String>) -> DataFrame {
        let all_null: Vec<PlSmallStr> = df
            .get_columns()
            .iter()
            .filter(|col| {
                let name = col.name().as_str();
                name != ROW_KEY
                    && !Self::is_required_header(name)
                    && col.null_count() == col.len()
            })
            .map(|col| col.name().clone())
            .collect();

        if all_null.is_empty() {
            return df;
        }

        steps.push(format!("Dropped {} all-null columns", all_null.len()));
        debug!("Dropped all-null columns: {:?}", all_null);
        df.drop_many(all_null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor_frame() -> DataFrame {
        df![
            "Victim's name" => ["Eric Garner", "John Smith"],
            "Victim's age" => ["43", "27"],
            "Victim's gender" => ["Male", "Male"],
            "Victim's race" => ["Black", "White"],
            "URL of image of victim" => [Some("http://img/1"), None],
            "Date of Incident (month/day/year)" => ["7/17/2014", "1/2/2015"],
            "Street Address of Incident" => ["202 Bay St", "1 Main St"],
            "City" => ["Staten Island", "Springfield"],
            "State" => ["NY", "IL"],
            "Zipcode" => [10301i64, 62701],
            "County" => ["Richmond", "Sangamon"],
            "Agency responsible for death" => ["NYPD", "Springfield PD"],
            "Cause of death" => ["Asphyxiated", "Gunshot"],
            "A brief description of the circumstances surrounding the death" => ["...", "..."],
            "Official disposition of death (justified or other)" => ["Unreported", "Justified"],
            "Criminal Charges?" => ["No", "No"],
            "Link to news article or photo of official document" => ["http://a", "http://b"],
            "Symptoms of mental illness?" => ["No", "Unknown"],
            "Unarmed" => ["Unarmed", "Allegedly Armed"],
            "Alleged Weapon (Source: WaPo)" => ["none", "gun"],
            "Alleged Threat Level (Source: WaPo)" => ["other", "attack"],
            "Fleeing (Source: WaPo)" => ["Not Fleeing", "Foot"],
            "Body Camera (Source: WaPo)" => ["No", "No"],
            "WaPo ID (If included in WaPo database)" => [Some(101i64), None],
            "ID" => [1i64, 2],
            "Off-Duty Killing?" => [Option::<&str>::None, None],
            "Geography (via Trulia methodology based on zipcode population density: \
             http://jedkolko.com/wp-content/uploads/2015/05/full-ZCTA-urban-suburban-rural-classification.xlsx )"
                => ["Urban", "Suburban"],
        ]
        .unwrap()
    }

    #[test]
    fn test_normalize_renames_and_drops() {
        let mut steps = Vec::new();
        let (df, from_raw) = SchemaNormalizer::normalize(vendor_frame(), &mut steps).unwrap();
        assert!(from_raw);

        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        assert!(names.contains(&"victims_name".to_string()));
        assert!(names.contains(&"geo_type".to_string()));
        assert!(names.contains(&ROW_KEY.to_string()));
        assert!(!names.contains(&"wapo_id".to_string()));
        assert!(!names.contains(&"id".to_string()));
        assert!(!names.contains(&"off_duty_killing".to_string()));
        assert_eq!(df.width(), CANONICAL_COLUMNS.len() + 1);
    }

    #[test]
    fn test_missing_required_column_is_schema_error() {
        let df = df![
            "Victim's name" => ["A"],
        ]
        .unwrap();

        let mut steps = Vec::new();
        let err = SchemaNormalizer::normalize(df, &mut steps).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_ERROR");
    }

    #[test]
    fn test_canonical_headers_accepted() {
        let mut steps = Vec::new();
        let (once, _) = SchemaNormalizer::normalize(vendor_frame(), &mut steps).unwrap();

        // Feeding the canonical table back through must not fail, and must
        // be flagged as not coming from raw vendor headers.
        let (again, from_raw) =
            SchemaNormalizer::normalize(once.drop(ROW_KEY).unwrap(), &mut steps).unwrap();
        assert_eq!(again.width(), CANONICAL_COLUMNS.len() + 1);
        assert!(!from_raw);
    }

    #[test]
    fn test_all_null_required_column_survives() {
        // An entirely null gender column is valid input; it has a sentinel
        // fill downstream and must not be pruned away.
        let mut df = vendor_frame();
        df.replace(
            "Victim's gender",
            Series::new("Victim's gender".into(), vec![Option::<&str>::None, None]),
        )
        .unwrap();

        let mut steps = Vec::new();
        let (out, _) = SchemaNormalizer::normalize(df, &mut steps).unwrap();

        let gender = out
            .column("victims_gender")
            .unwrap()
            .as_materialized_series()
            .clone();
        assert_eq!(gender.null_count(), 2);
    }

    #[test]
    fn test_row_keys_survive_pruning() {
        let df = df![
            "Victim's name" => [Some("A"), None, Some("C")],
            "Victim's age" => [Some("30"), None, Some("40")],
            "Victim's gender" => [Some("Male"), None, Some("Male")],
            "Victim's race" => [Some("White"), None, Some("Black")],
            "URL of image of victim" => [Option::<&str>::None, None, None],
            "Date of Incident (month/day/year)" => [Some("1/1/2015"), None, Some("1/3/2015")],
            "Street Address of Incident" => [Some("1 A St"), None, Some("3 C St")],
            "City" => [Some("X"), None, Some("Z")],
            "State" => [Some("NY"), None, Some("CA")],
            "Zipcode" => [Some(10001i64), None, Some(90001)],
            "County" => [Some("A"), None, Some("C")],
            "Agency responsible for death" => [Some("PD"), None, Some("PD")],
            "Cause of death" => [Some("Gunshot"), None, Some("Gunshot")],
            "A brief description of the circumstances surrounding the death" => [Some("d"), None, Some("d")],
            "Official disposition of death (justified or other)" => [Some("Justified"), None, Some("Justified")],
            "Criminal Charges?" => [Some("No"), None, Some("No")],
            "Link to news article or photo of official document" => [Some("u"), None, Some("u")],
            "Symptoms of mental illness?" => [Some("No"), None, Some("No")],
            "Unarmed" => [Some("Unarmed"), None, Some("Unarmed")],
            "Alleged Weapon (Source: WaPo)" => [Some("none"), None, Some("none")],
            "Alleged Threat Level (Source: WaPo)" => [Some("other"), None, Some("other")],
            "Fleeing (Source: WaPo)" => [Some("Not Fleeing"), None, Some("Not Fleeing")],
            "Body Camera (Source: WaPo)" => [Some("No"), None, Some("No")],
            "WaPo ID (If included in WaPo database)" => [Option::<i64>::None, None, None],
            "ID" => [Some(1i64), None, Some(3)],
            "Off-Duty Killing?" => [Option::<&str>::None, None, None],
            "Geography (via Trulia methodology based on zipcode population density: \
             http://jedkolko.com/wp-content/uploads/2015/05/full-ZCTA-urban-suburban-rural-classification.xlsx )"
                => [Some("Urban"), None, Some("Rural")],
        ]
        .unwrap();

        let mut steps = Vec::new();
        let (out, _) = SchemaNormalizer::normalize(df, &mut steps).unwrap();

        // The middle row is all-null and pruned; survivors keep their
        // original index as row key.
        assert_eq!(out.height(), 2);
        let keys = out.column(ROW_KEY).unwrap().as_materialized_series().clone();
        let keys = keys.u32().unwrap();
        assert_eq!(keys.get(0), Some(0));
        assert_eq!(keys.get(1), Some(2));
    }
}
