use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::CONFIG_VERSION;
use crate::library::Library;

/// Top-level combination strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// One random combination per call, honoring participation rates and
    /// categorical linkage.
    Random,
    /// Full cross-product over a shuffled prefix of each library.
    Cartesian,
}

impl Default for CombineMode {
    fn default() -> Self {
        CombineMode::Random
    }
}

/// A user-supplied literal that replaces a library's sampled value in some
/// or all combinations of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverrideRule {
    /// Name of the library whose fragment is rewritten.
    pub library: String,
    /// Literal replacement value.
    pub value: String,
    /// How many combinations (by iteration order) the override applies to;
    /// 0 means all of them.
    #[serde(default)]
    pub count: usize,
}

/// The full set of libraries plus global generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub libraries: Vec<Library>,
    /// Template with `{libraryName}` placeholders; when absent,
    /// combinations fall back to the fragment join format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub mode: CombineMode,
    /// Constrain sampling across libraries to a shared random category.
    #[serde(default)]
    pub category_linkage: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<OverrideRule>,
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            libraries: Vec::new(),
            template: None,
            mode: CombineMode::Random,
            category_linkage: false,
            overrides: Vec::new(),
        }
    }
}

impl Config {
    pub fn new(libraries: Vec<Library>) -> Self {
        Self {
            libraries,
            ..Self::default()
        }
    }

    pub fn library(&self, name: &str) -> Option<&Library> {
        self.libraries.iter().find(|library| library.name == name)
    }

    /// Libraries that take part in generation, in declaration order.
    pub fn enabled_libraries(&self) -> impl Iterator<Item = &Library> {
        self.libraries.iter().filter(|library| library.enabled)
    }
}
