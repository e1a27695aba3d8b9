//! Core contracts and helpers for promptmix.
//!
//! This crate defines the library/config data model, the fragment format
//! shared by the engine and the IO layer, the template tokenizer, and
//! validation helpers used across the workspace.

pub mod config;
pub mod error;
pub mod fragment;
pub mod library;
pub mod template;
pub mod validation;

pub use config::{CombineMode, Config, OverrideRule};
pub use error::{Error, Result};
pub use fragment::{FIELD_SEP, FRAGMENT_SEP, Fragment, VALUE_SEP, format_fragments, parse_fragments};
pub use library::{Library, LibraryValue, PickMode};
pub use template::Template;
pub use validation::{ValidationIssue, validate_config};

/// Current contract version for persisted `config.json` documents.
pub const CONFIG_VERSION: &str = "0.1";
