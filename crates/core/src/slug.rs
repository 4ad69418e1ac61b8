//! URL-safe unique identifiers derived from titles.
//!
//! Unicode letters and digits are allowed (titles are frequently non-Latin),
//! together with `-` and `_`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Validated slug.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn parse(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::validation("slug cannot be empty"));
        }
        if let Some(bad) = value.chars().find(|c| !is_slug_char(*c)) {
            return Err(DomainError::validation(format!(
                "slug '{value}' contains invalid character '{bad}'"
            )));
        }
        Ok(Self(value))
    }

    /// Derive a slug from free text.
    ///
    /// Lowercases, drops punctuation, collapses whitespace and hyphen runs into
    /// a single `-`, and trims leading/trailing `-`/`_`. Returns `None` when
    /// nothing usable remains (e.g. a title made only of punctuation).
    pub fn from_title(title: &str) -> Option<Self> {
        let mut out = String::with_capacity(title.len());
        let mut pending_dash = false;

        for c in title.chars().flat_map(char::to_lowercase) {
            if c.is_whitespace() || c == '-' {
                pending_dash = true;
            } else if is_slug_char(c) {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c);
            }
        }

        let trimmed = out.trim_matches(|c| c == '-' || c == '_');
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_slug_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl ValueObject for Slug {}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Slug {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
