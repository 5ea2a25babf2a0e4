//! Tag-name normalization.
//!
//! The historian accepts point names over `[A-Za-z0-9_%:]`, and a name must
//! start with one of `[A-Za-z0-9_%]`. Arbitrary caller strings are mapped
//! onto that set:
//!
//! 1. every other character (and every control character) becomes `.`
//! 2. leading characters that cannot start a name are dropped
//! 3. an empty result is rejected
//! 4. the configured prefix is prepended as-is

use crate::error::{HistorianError, Result};

/// Character substituted for anything outside the accepted set.
pub const REPLACEMENT: char = '.';

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '%' | ':')
}

fn is_leading_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '%')
}

/// Normalize `raw` and prepend `prefix`.
pub fn normalize_tag_name(raw: &str, prefix: &str) -> Result<String> {
    let replaced: String = raw
        .chars()
        .map(|c| if is_name_char(c) { c } else { REPLACEMENT })
        .collect();

    let trimmed = replaced.trim_start_matches(|c: char| !is_leading_char(c));
    if trimmed.is_empty() {
        return Err(HistorianError::InvalidTagName(raw.to_string()));
    }

    let mut name = String::with_capacity(prefix.len() + trimmed.len());
    name.push_str(prefix);
    name.push_str(trimmed);
    Ok(name)
}

/// Normalizer bound to a configured prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagNormalizer {
    prefix: String,
}

impl TagNormalizer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn normalize(&self, raw: &str) -> Result<String> {
        normalize_tag_name(raw, &self.prefix)
    }
}
