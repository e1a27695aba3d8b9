//! Import, export, and configuration persistence for promptmix.
//!
//! Parses spreadsheet-shaped CSV/TSV exports into libraries, writes
//! generated combinations as BOM-prefixed CSV or TSV, and persists the
//! configuration as atomically written JSON.

pub mod errors;
pub mod export;
pub mod import;
pub mod store;

pub use errors::IoError;
pub use export::{combinations_to_tsv, write_combinations_csv, write_library_tsv};
pub use import::{parse_library_column, parse_master_sheet};
pub use store::{load_config, merge_default_libraries, save_config, write_bytes_atomic};
