use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a class of prompts the user can opt out of
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceKey(String);

impl PreferenceKey {
    pub const ALTERNATIVE_SUGGESTIONS: &'static str = "alternative_suggestions";
    pub const ENHANCEMENT_SUGGESTIONS: &'static str = "enhancement_suggestions";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn alternative_suggestions() -> Self {
        Self::new(Self::ALTERNATIVE_SUGGESTIONS)
    }

    pub fn enhancement_suggestions() -> Self {
        Self::new(Self::ENHANCEMENT_SUGGESTIONS)
    }

    /// Key suppressing warnings of one kind, e.g. `drm_warnings`
    pub fn warnings(kind: &str) -> Self {
        Self(format!("{kind}_warnings"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PreferenceKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
