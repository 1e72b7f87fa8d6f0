//! Normalized resource records and collections

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One normalized resource: field name -> value.
///
/// Values are strings, `null` for an absent scalar, a `", "`-joined string
/// for lists, or a nested string map for tags and listeners.
pub type Record = Map<String, Value>;

/// Profile and region a set of records was collected under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContext {
    pub profile: String,
    pub region: String,
}

impl AccountContext {
    pub fn new(profile: &str, region: &str) -> Self {
        Self {
            profile: profile.to_string(),
            region: region.to_string(),
        }
    }
}

/// All records of one resource kind from a single enumeration call,
/// keyed and ordered by resource identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceCollection {
    records: BTreeMap<String, Record>,
}

impl ResourceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the one it replaced
    pub fn insert(&mut self, id: String, record: Record) -> Option<Record> {
        self.records.insert(id, record)
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serialize to compact JSON text
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize resource collection")
    }

    /// Parse JSON text produced by [`ResourceCollection::to_json`]
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse resource collection JSON")
    }
}
