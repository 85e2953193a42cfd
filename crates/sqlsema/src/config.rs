//! Validator configuration

use serde::{Deserialize, Serialize};
use sqlsema_types::semantic::{NameMatcher, name_matcher};

/// Session settings of a [`Validator`](crate::Validator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Whether calls may be made legal by inserting implicit casts
    pub type_coercion: bool,
    /// Whether table, alias and column names match case-sensitively
    pub case_sensitive: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            type_coercion: true,
            case_sensitive: true,
        }
    }
}

impl ValidatorConfig {
    /// Enable or disable implicit casts
    pub fn with_type_coercion(mut self, enabled: bool) -> Self {
        self.type_coercion = enabled;
        self
    }

    /// Set whether names match case-sensitively
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Load from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Get the matcher for the configured case sensitivity
    pub fn name_matcher(&self) -> &'static dyn NameMatcher {
        name_matcher(self.case_sensitive)
    }
}
