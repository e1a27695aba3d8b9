use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One candidate value inside a library.
///
/// The variant is chosen explicitly at creation or import time; the engine
/// never infers the shape from which fields happen to be populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LibraryValue {
    /// Plain text value with an optional sampling weight.
    Plain {
        text: String,
        #[serde(default = "default_weight")]
        weight: f64,
    },
    /// Text value tagged with linkage categories.
    ///
    /// An empty category list means the value is universal and stays
    /// eligible under every linkage category.
    Categorized {
        text: String,
        #[serde(default = "default_weight")]
        weight: f64,
        #[serde(default)]
        categories: Vec<String>,
    },
    /// An image URL resolved to descriptive text by an injected describer.
    ImageUrl { url: String },
}

fn default_weight() -> f64 {
    1.0
}

impl LibraryValue {
    /// Convenience constructor for an unweighted plain value.
    pub fn plain(text: impl Into<String>) -> Self {
        LibraryValue::Plain {
            text: text.into(),
            weight: 1.0,
        }
    }

    /// Convenience constructor for a weighted plain value.
    pub fn weighted(text: impl Into<String>, weight: f64) -> Self {
        LibraryValue::Plain {
            text: text.into(),
            weight,
        }
    }

    /// Convenience constructor for a categorized value.
    pub fn categorized(text: impl Into<String>, categories: Vec<String>) -> Self {
        LibraryValue::Categorized {
            text: text.into(),
            weight: 1.0,
            categories,
        }
    }

    /// The sampled text, or the raw URL for image values.
    pub fn text(&self) -> &str {
        match self {
            LibraryValue::Plain { text, .. } => text,
            LibraryValue::Categorized { text, .. } => text,
            LibraryValue::ImageUrl { url } => url,
        }
    }

    /// Sampling weight; image values always weigh 1.
    pub fn weight(&self) -> f64 {
        match self {
            LibraryValue::Plain { weight, .. } => *weight,
            LibraryValue::Categorized { weight, .. } => *weight,
            LibraryValue::ImageUrl { .. } => 1.0,
        }
    }

    /// Linkage categories; empty means universal.
    pub fn categories(&self) -> &[String] {
        match self {
            LibraryValue::Categorized { categories, .. } => categories,
            _ => &[],
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, LibraryValue::ImageUrl { .. })
    }

    /// Whether the value is eligible under the given linkage category.
    pub fn matches_category(&self, category: &str) -> bool {
        let categories = self.categories();
        categories.is_empty() || categories.iter().any(|c| c == category)
    }
}

/// How many values a library contributes per combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PickMode {
    /// One value per combination, sampled at random.
    One,
    /// Up to `pick_count` distinct values per combination.
    Many,
    /// Values taken in order, one per combination, wrapping at the end.
    Sequential,
}

impl Default for PickMode {
    fn default() -> Self {
        PickMode::One
    }
}

/// A named pool of candidate values forming one dimension of a combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Library {
    pub name: String,
    #[serde(default)]
    pub values: Vec<LibraryValue>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub pick: PickMode,
    /// Number of values taken in `many` mode and as the Cartesian prefix size.
    #[serde(default = "default_pick_count")]
    pub pick_count: usize,
    /// Probability (0-100) that the library contributes to a random-join
    /// combination at all.
    #[serde(default = "default_participation")]
    pub participation: u8,
}

fn default_enabled() -> bool {
    true
}

fn default_pick_count() -> usize {
    1
}

fn default_participation() -> u8 {
    100
}

impl Library {
    /// A plain pick-one library from bare strings.
    pub fn new(name: impl Into<String>, values: Vec<LibraryValue>) -> Self {
        Self {
            name: name.into(),
            values,
            enabled: true,
            pick: PickMode::One,
            pick_count: 1,
            participation: 100,
        }
    }

    pub fn has_image_values(&self) -> bool {
        self.values.iter().any(LibraryValue::is_image)
    }

    pub fn has_categorized_values(&self) -> bool {
        self.values
            .iter()
            .any(|value| !value.categories().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_value_deserializes_by_kind() {
        let value: LibraryValue = serde_json::from_str(
            r#"{"kind": "categorized", "text": "森林", "categories": ["自然"]}"#,
        )
        .expect("parse categorized value");

        assert_eq!(value.text(), "森林");
        assert_eq!(value.weight(), 1.0);
        assert!(value.matches_category("自然"));
        assert!(!value.matches_category("都市"));
    }

    #[test]
    fn universal_value_matches_every_category() {
        let value = LibraryValue::plain("basic");
        assert!(value.matches_category("anything"));
    }

    #[test]
    fn library_defaults_apply_on_deserialize() {
        let library: Library =
            serde_json::from_str(r#"{"name": "风格", "values": []}"#).expect("parse library");

        assert!(library.enabled);
        assert_eq!(library.pick, PickMode::One);
        assert_eq!(library.pick_count, 1);
        assert_eq!(library.participation, 100);
    }
}
