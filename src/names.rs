//! Derivation of `first_name` and `last_name` from the full victim name.
//!
//! The splitter is deliberately conservative: it understands leading titles,
//! trailing generational suffixes, and common surname particles, and leaves
//! everything else alone. Names the police withheld map to the "unknown"
//! sentinel in both derived columns.

use crate::error::Result;
use polars::prelude::*;
use tracing::info;

/// The source dataset records withheld names with this exact phrase.
const WITHHELD: &str = "name withheld by police";

/// Leading honorifics stripped before splitting.
const TITLES: &[&str] = &["mr", "mrs", "ms", "dr", "rev"];

/// Trailing generational suffixes stripped before splitting.
const SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "v"];

/// Particles that begin a compound surname ("De La Cruz", "Van Der Berg").
const PARTICLES: &[&str] = &[
    "de", "del", "della", "di", "da", "van", "von", "der", "den", "la", "le", "st",
];

/// Split a full name into (first, last).
///
/// Withheld or empty names yield ("unknown", "unknown"). A single token is
/// treated as a first name with an empty surname. For longer names the
/// surname starts at the first particle token, or at the final token when
/// no particle is present.
pub fn split_full_name(full: &str) -> (String, String) {
    let trimmed = full.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(WITHHELD) {
        return ("unknown".to_string(), "unknown".to_string());
    }

    let mut tokens: Vec<&str> = trimmed.split_whitespace().collect();

    match tokens.len() {
        1 => return (tokens[0].to_string(), String::new()),
        2 => return (tokens[0].to_string(), tokens[1].to_string()),
        _ => {}
    }

    if is_listed(tokens[0], TITLES) {
        tokens.remove(0);
    }

    let mut end = tokens.len();
    while end > 2 && is_listed(tokens[end - 1], SUFFIXES) {
        end -= 1;
    }
    let tokens = &tokens[..end];

    if tokens.len() < 2 {
        return match tokens {
            [only] => ((*only).to_string(), String::new()),
            _ => ("unknown".to_string(), "unknown".to_string()),
        };
    }

    // Surname begins at the first particle after the first name, if any.
    let surname_start = tokens[1..tokens.len() - 1]
        .iter()
        .position(|t| is_listed(t, PARTICLES))
        .map(|i| i + 1)
        .unwrap_or(tokens.len() - 1);

    let first = tokens[..surname_start].join(" ");
    let last = tokens[surname_start..].join(" ");
    (first, last)
}

fn is_listed(token: &str, list: &[&str]) -> bool {
    let token = token.trim_end_matches('.');
    list.iter().any(|entry| token.eq_ignore_ascii_case(entry))
}

/// Append `first_name` and `last_name` columns derived from `victims_name`.
///
/// Re-running on already-derived output simply recomputes both columns.
pub fn derive_name_columns(df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
    info!("Deriving first and last name columns...");

    let names = df.column("victims_name")?.as_materialized_series().clone();
    let names = names.str()?;

    let mut firsts: Vec<String> = Vec::with_capacity(names.len());
    let mut lasts: Vec<String> = Vec::with_capacity(names.len());
    for opt in names {
        let (first, last) = split_full_name(opt.unwrap_or(""));
        firsts.push(first);
        lasts.push(last);
    }

    df.with_column(Series::new("first_name".into(), firsts))?;
    df.with_column(Series::new("last_name".into(), lasts))?;
    steps.push("Derived 'first_name' and 'last_name' from 'victims_name'".to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_token_name() {
        assert_eq!(
            split_full_name("Eric Garner"),
            ("Eric".to_string(), "Garner".to_string())
        );
    }

    #[test]
    fn test_particle_surname() {
        assert_eq!(
            split_full_name("Oscar De La Cruz"),
            ("Oscar".to_string(), "De La Cruz".to_string())
        );
    }

    #[test]
    fn test_suffix_stripped() {
        assert_eq!(
            split_full_name("John Smith Jr."),
            ("John".to_string(), "Smith".to_string())
        );
    }

    #[test]
    fn test_title_stripped() {
        assert_eq!(
            split_full_name("Mr. James Earl Ray"),
            ("James Earl".to_string(), "Ray".to_string())
        );
    }

    #[test]
    fn test_middle_name_joins_first() {
        assert_eq!(
            split_full_name("Mary Anne Porter"),
            ("Mary Anne".to_string(), "Porter".to_string())
        );
    }

    #[test]
    fn test_withheld_name() {
        assert_eq!(
            split_full_name("Name withheld by police"),
            ("unknown".to_string(), "unknown".to_string())
        );
    }

    #[test]
    fn test_single_token() {
        assert_eq!(split_full_name("Prince"), ("Prince".to_string(), String::new()));
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(
            split_full_name("   "),
            ("unknown".to_string(), "unknown".to_string())
        );
    }

    #[test]
    fn test_derive_columns() {
        let mut df = df!["victims_name" => ["Eric Garner", "Name withheld by police"]].unwrap();
        let mut steps = Vec::new();

        derive_name_columns(&mut df, &mut steps).unwrap();

        let first = df.column("first_name").unwrap().as_materialized_series().clone();
        let last = df.column("last_name").unwrap().as_materialized_series().clone();
        assert_eq!(first.str().unwrap().get(0), Some("Eric"));
        assert_eq!(last.str().unwrap().get(0), Some("Garner"));
        assert_eq!(first.str().unwrap().get(1), Some("unknown"));
        assert_eq!(last.str().unwrap().get(1), Some("unknown"));
    }
}
