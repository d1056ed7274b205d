//! Settings for reading attribute tables from text

use serde::{Deserialize, Serialize};

/// Tokens that mark an entry as undefined when a table is read from text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissingValues {
    pub tokens: Vec<String>,
    pub case_sensitive: bool,
}

impl Default for MissingValues {
    fn default() -> Self {
        Self {
            tokens: ["", "-", "N/A", "NA", "NaN", "null", "None"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            case_sensitive: false,
        }
    }
}

impl MissingValues {
    /// Whether `value` (surrounding whitespace ignored) is undefined
    pub fn is_missing(&self, value: &str) -> bool {
        let value = value.trim();
        self.tokens.iter().any(|token| {
            if self.case_sensitive {
                value == token
            } else {
                value.eq_ignore_ascii_case(token)
            }
        })
    }
}
