use std::fmt;

use crate::error::InputError;

/// A search text that passed validation: trimmed, lowercase, and made only of
/// ASCII letters, whitespace, hyphens and apostrophes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let processed = raw.trim().to_lowercase();

        if processed.is_empty() {
            return Err(InputError::Empty);
        }

        let valid = processed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_whitespace() || c == '-' || c == '\'');
        if !valid {
            return Err(InputError::InvalidCharacters);
        }

        Ok(Self(processed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
