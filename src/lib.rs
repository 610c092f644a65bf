//! Police Killings Dataset Cleaner
//!
//! A cleaning pipeline for the Mapping Police Violence raw export, built on
//! Polars.
//!
//! # Overview
//!
//! The raw file arrives with verbose vendor headers, inconsistent
//! categorical spellings, free-text ages and dates, and scattered nulls.
//! This library normalizes it into a fixed canonical schema with:
//!
//! - **Schema normalization**: vendor headers renamed, dead columns dropped
//! - **Manual corrections**: a curated ledger of researched cell fixes
//! - **Value canonicalization**: controlled vocabularies per column
//! - **Type coercion**: numeric ages (decade tokens included), real dates
//! - **Null policy**: sentinel, mode, and median fills, then row drops
//! - **Name derivation**: `first_name` and `last_name` columns
//!
//! The output is guaranteed null-free across every output column.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use police_killings_cleaner::{io, Cleaner, CleaningConfig};
//!
//! let df = io::load_csv("police_killings.csv".as_ref())?;
//!
//! let cleaner = Cleaner::builder()
//!     .config(CleaningConfig::builder().output_dir("results").build()?)
//!     .build();
//!
//! let outcome = cleaner.clean(df)?;
//! println!("{} rows in, {} rows out", outcome.rows_in, outcome.rows_out);
//! ```

pub mod coerce;
pub mod config;
pub mod corrections;
pub mod error;
pub mod impute;
pub mod io;
pub mod names;
pub mod pipeline;
pub mod schema;
pub mod utils;
pub mod vocab;

pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use corrections::{Fix, RowCorrection, CORRECTIONS};
pub use error::{CleaningError, Result, ResultExt};
pub use pipeline::{Cleaner, CleanerBuilder, CleaningOutcome};
pub use schema::{CANONICAL_COLUMNS, DERIVED_COLUMNS, ROW_KEY};
