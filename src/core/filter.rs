//! Filter selections carried by a list request

use serde::{Deserialize, Serialize};

/// Dropdown value the UI uses to mean "do not filter on this key"
pub const ALL_SENTINEL: &str = "all";

/// What a single filter key asks for
///
/// `Any` never restricts the query. A literal `"all"` column value can still
/// be matched with `Equals("all")`; only [`FilterSelection::from_ui`] treats
/// `"all"` as the sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSelection {
    /// No restriction
    #[default]
    Any,

    /// Column must equal this value
    Equals(String),
}

impl FilterSelection {
    /// Interpret a raw dropdown value
    ///
    /// `""` and `"all"` mean [`FilterSelection::Any`]; anything else is an
    /// equality on the value as given.
    pub fn from_ui(raw: &str) -> Self {
        if raw.is_empty() || raw == ALL_SENTINEL {
            FilterSelection::Any
        } else {
            FilterSelection::Equals(raw.to_string())
        }
    }

    pub fn equals(value: impl Into<String>) -> Self {
        FilterSelection::Equals(value.into())
    }

    /// The value to match, if this selection restricts anything
    pub fn restriction(&self) -> Option<&str> {
        match self {
            FilterSelection::Any => None,
            FilterSelection::Equals(v) => Some(v),
        }
    }
}
