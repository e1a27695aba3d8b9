use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::template::Template;

/// Non-fatal finding produced while validating a configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
        }
    }
}

/// Validate internal consistency of a configuration.
///
/// This checks:
/// - library names are non-empty and unique
/// - pick counts are at least 1 and participation rates at most 100
/// - override rules reference known libraries
///
/// Template placeholders matching no library are legal (they are stripped
/// at render time) but reported as warnings.
pub fn validate_config(config: &Config) -> Result<Vec<ValidationIssue>> {
    let mut names = BTreeSet::new();

    for library in &config.libraries {
        if library.name.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "library name must not be empty".to_string(),
            ));
        }
        if !names.insert(library.name.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "duplicate library name: {}",
                library.name
            )));
        }
        if library.pick_count == 0 {
            return Err(Error::InvalidConfig(format!(
                "library '{}' pick_count must be at least 1",
                library.name
            )));
        }
        if library.participation > 100 {
            return Err(Error::InvalidConfig(format!(
                "library '{}' participation must be at most 100",
                library.name
            )));
        }
    }

    for rule in &config.overrides {
        if !names.contains(rule.library.as_str()) {
            return Err(Error::UnknownLibrary(rule.library.clone()));
        }
    }

    let mut warnings = Vec::new();
    if let Some(source) = &config.template {
        let template = Template::parse(source);
        for placeholder in template.placeholders() {
            if !names.contains(placeholder) {
                warnings.push(ValidationIssue::new(
                    "unknown_placeholder",
                    format!("template placeholder '{{{placeholder}}}' matches no library"),
                ));
            }
        }
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverrideRule;
    use crate::library::{Library, LibraryValue};

    fn config_with(names: &[&str]) -> Config {
        Config::new(
            names
                .iter()
                .map(|name| Library::new(*name, vec![LibraryValue::plain("v")]))
                .collect(),
        )
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let config = config_with(&["场景", "场景"]);
        assert!(matches!(
            validate_config(&config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn override_must_reference_known_library() {
        let mut config = config_with(&["场景"]);
        config.overrides.push(OverrideRule {
            library: "不存在".to_string(),
            value: "x".to_string(),
            count: 0,
        });
        assert!(matches!(
            validate_config(&config),
            Err(Error::UnknownLibrary(_))
        ));
    }

    #[test]
    fn unknown_placeholder_is_a_warning_not_an_error() {
        let mut config = config_with(&["场景"]);
        config.template = Some("{场景}和{未知}".to_string());
        let warnings = validate_config(&config).expect("config should validate");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "unknown_placeholder");
    }

    #[test]
    fn zero_pick_count_is_rejected() {
        let mut config = config_with(&["场景"]);
        config.libraries[0].pick_count = 0;
        assert!(validate_config(&config).is_err());
    }
}
