use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const OG_TITLE: &str = "og:title";
pub const OG_DESCRIPTION: &str = "og:description";

/// Preview metadata keyed by OpenGraph property name.
///
/// A key mapped to `None` was looked for and not found; that is distinct from
/// the key being missing, which means it was never derived. Serializes as a
/// JSON object with `null` for absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OgMetadata(BTreeMap<String, Option<String>>);

impl OgMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Value for `key`, treating absent and missing alike.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_deref())
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.value(OG_TITLE)
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.value(OG_DESCRIPTION)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.0.insert(key.into(), value);
    }

    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, Option<String>> {
        &self.0
    }
}

impl From<OgMetadata> for BTreeMap<String, Option<String>> {
    fn from(metadata: OgMetadata) -> Self {
        metadata.0
    }
}

/// Length bounds for a generated description, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBudget {
    pub min_size: usize,
    pub max_size: usize,
}

impl SummaryBudget {
    pub fn new(min_size: usize, max_size: usize) -> anyhow::Result<Self> {
        if min_size == 0 {
            anyhow::bail!("summary min size must be positive");
        }
        if min_size > max_size {
            anyhow::bail!("summary min size ({min_size}) must not exceed max size ({max_size})");
        }
        Ok(Self { min_size, max_size })
    }
}

impl Default for SummaryBudget {
    fn default() -> Self {
        Self {
            min_size: 200,
            max_size: 500,
        }
    }
}
