//! Categorical value canonicalization.
//!
//! Each controlled column gets the same treatment: trim, fold to lowercase,
//! collapse exact synonyms, then a marker-substring pass over free-text
//! columns whose raw values are too varied to enumerate. Markers are checked
//! in a fixed order with first-match-wins semantics; more specific phrases
//! are listed before any phrase they contain (so "charged, convicted after
//! trial" lands on "charged, convicted", not on plain "charged").
//!
//! Proper-noun and prose columns (agency, circumstance description) are only
//! trimmed; names, addresses and URLs are left alone entirely.

use once_cell::sync::Lazy;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Canonicalization rules for one column.
pub struct ColumnRules {
    pub column: &'static str,
    /// Fold values to lowercase before matching. Off for prose columns.
    pub fold_case: bool,
    /// Exact-match synonym collapses, keyed by lowercased variant.
    pub synonyms: &'static [(&'static str, &'static str)],
    /// Ordered (marker substring, canonical label) pairs; first match wins.
    pub markers: &'static [(&'static str, &'static str)],
    /// Declared canonical label set; empty means open vocabulary.
    pub vocabulary: &'static [&'static str],
}

const DISPOSITION_MARKERS: &[(&str, &str)] = &[
    ("charged, convicted", "charged, convicted"),
    ("unjustified", "unjustified"),
    ("justified", "justified"),
    ("acquitted", "acquitted"),
    ("convicted", "convicted"),
    ("charged", "charged"),
    ("pending investigation", "pending investigation"),
    // Typo variant that appears in the raw data.
    ("pending investigaton", "pending investigation"),
    ("ongoing investigation", "under investigation"),
    ("under investigation", "under investigation"),
    ("no indictment", "no indictment"),
    ("no known charges", "no charges"),
    ("no charges", "no charges"),
    ("unreported", "unreported"),
    ("indicted", "indicted"),
    ("unknown", "unknown"),
];

/// Per-column rule table for every categorical/free-text column.
pub const COLUMN_RULES: &[ColumnRules] = &[
    ColumnRules {
        column: "victims_gender",
        fold_case: true,
        synonyms: &[],
        markers: &[],
        vocabulary: &["male", "female", "transgender", "unknown"],
    },
    ColumnRules {
        column: "victims_race",
        fold_case: true,
        synonyms: &[
            ("unknown race", "unknown"),
            ("asian", "asian/pacific islander"),
            ("pacific islander", "asian/pacific islander"),
        ],
        markers: &[],
        vocabulary: &[
            "white",
            "black",
            "hispanic",
            "native american",
            "asian/pacific islander",
            "unknown",
        ],
    },
    ColumnRules {
        column: "mental_illness",
        fold_case: true,
        synonyms: &[("unkown", "unknown")],
        markers: &[],
        vocabulary: &["yes", "no", "unknown", "drug or alcohol use"],
    },
    ColumnRules {
        column: "geo_type",
        fold_case: true,
        synonyms: &[],
        markers: &[],
        vocabulary: &["urban", "suburban", "rural"],
    },
    ColumnRules {
        column: "cause_of_death",
        fold_case: true,
        synonyms: &[],
        markers: &[],
        vocabulary: &[],
    },
    ColumnRules {
        column: "unarmed",
        fold_case: true,
        synonyms: &[],
        markers: &[],
        vocabulary: &[],
    },
    ColumnRules {
        column: "alleged_weapon",
        fold_case: true,
        synonyms: &[("air pistol", "airsoft pistol")],
        markers: &[("airsoft", "airsoft pistol")],
        vocabulary: &[],
    },
    ColumnRules {
        column: "threat_level",
        fold_case: true,
        synonyms: &[],
        markers: &[],
        vocabulary: &[],
    },
    ColumnRules {
        column: "fleeing",
        fold_case: true,
        synonyms: &[],
        markers: &[],
        vocabulary: &[],
    },
    ColumnRules {
        column: "video_surveillance",
        fold_case: true,
        synonyms: &[],
        markers: &[],
        vocabulary: &[],
    },
    ColumnRules {
        column: "criminal_charges",
        fold_case: true,
        synonyms: &[("no", "no charges"), ("no known charges", "no charges")],
        markers: &[
            ("charged, convicted", "charged, convicted"),
            ("charged, acquitted", "charged, acquitted"),
            ("charged, mistrial", "charged, mistrial"),
            ("charged", "charged"),
        ],
        vocabulary: &[],
    },
    ColumnRules {
        column: "official_disposition_of_death",
        fold_case: true,
        synonyms: &[],
        markers: DISPOSITION_MARKERS,
        vocabulary: &[],
    },
    // Prose/proper-noun columns: trim only.
    ColumnRules {
        column: "agency_resp_for_death",
        fold_case: false,
        synonyms: &[],
        markers: &[],
        vocabulary: &[],
    },
    ColumnRules {
        column: "desc_of_circumstances",
        fold_case: false,
        synonyms: &[],
        markers: &[],
        vocabulary: &[],
    },
];

/// Rule lookup by column name.
pub static RULES_BY_COLUMN: Lazy<HashMap<&'static str, &'static ColumnRules>> =
    Lazy::new(|| COLUMN_RULES.iter().map(|r| (r.column, r)).collect());

/// Canonicalize one raw value under the given rules.
pub fn canonical_value(rules: &ColumnRules, raw: &str) -> String {
    let trimmed = raw.trim();
    let folded = trimmed.to_lowercase();

    if let Some((_, canonical)) = rules.synonyms.iter().find(|(variant, _)| *variant == folded) {
        return (*canonical).to_string();
    }

    for (marker, canonical) in rules.markers {
        if folded.contains(marker) {
            return (*canonical).to_string();
        }
    }

    if rules.fold_case { folded } else { trimmed.to_string() }
}

/// Canonicalizer over the whole table.
pub struct Canonicalizer;

impl Canonicalizer {
    /// Apply the rule table to every matching string column in place.
    pub fn canonicalize(df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        info!("Canonicalizing categorical columns...");
        let mut rewritten = 0usize;

        for rules in COLUMN_RULES {
            let Ok(col) = df.column(rules.column) else {
                continue;
            };
            let series = col.as_materialized_series().clone();
            if series.dtype() != &DataType::String {
                continue;
            }

            let str_series = series.str()?;
            let mut changed = 0usize;
            let values: Vec<Option<String>> = str_series
                .into_iter()
                .map(|opt| {
                    opt.map(|raw| {
                        let canonical = canonical_value(rules, raw);
                        if canonical != raw {
                            changed += 1;
                        }
                        canonical
                    })
                })
                .collect();

            if changed > 0 {
                df.replace(rules.column, Series::new(rules.column.into(), values))?;
                debug!("Canonicalized {} value(s) in '{}'", changed, rules.column);
                rewritten += changed;
            }
        }

        steps.push(format!("Canonicalized {} categorical values", rewritten));
        Ok(())
    }

    /// Report surviving values that fall outside a declared vocabulary.
    ///
    /// Raw data can legitimately contain labels the vocabulary tables do not
    /// anticipate, so this reports rather than fails; the pipeline surfaces
    /// the report as warnings when vocabulary enforcement is on.
    pub fn vocabulary_violations(df: &DataFrame) -> Result<Vec<String>> {
        let mut violations = Vec::new();

        for rules in COLUMN_RULES {
            if rules.vocabulary.is_empty() {
                continue;
            }
            let Ok(col) = df.column(rules.column) else {
                continue;
            };
            let series = col.as_materialized_series().clone();
            if series.dtype() != &DataType::String {
                continue;
            }

            let mut seen: Vec<&str> = Vec::new();
            for value in series.str()?.into_iter().flatten() {
                if !rules.vocabulary.contains(&value) && !seen.contains(&value) {
                    seen.push(value);
                    violations.push(format!(
                        "column '{}': value '{}' outside declared vocabulary",
                        rules.column, value
                    ));
                }
            }
        }

        if !violations.is_empty() {
            warn!("{} vocabulary violation(s) found", violations.len());
        }
        Ok(violations)
    }
}
