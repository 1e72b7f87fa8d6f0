//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads all AWS resource definitions from embedded JSON files
//! and provides lookup functions for the rest of the crate. A definition
//! names the SDK call that lists the resource and the table of fields that
//! are extracted from every returned item.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/ec2.json"),
    include_str!("../resources/elb.json"),
];

/// How a single output field is pulled out of a raw API item.
///
/// Every rule resolves to a value even when the API omitted the data, so
/// all records of one kind share the same key set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    /// Scalar at `path`; `null` when absent
    Text { path: String },
    /// Array at `path` joined with a separator; `""` when absent.
    /// With `item_path`, each element contributes the value at that sub-path.
    List {
        path: String,
        #[serde(default)]
        item_path: Option<String>,
    },
    /// `[{Key, Value}]` at `path` folded into an object; `{}` when absent
    Tags { path: String },
    /// Array of objects at `path` folded into `{key_path: value_path}`
    Pairs {
        path: String,
        key_path: String,
        value_path: String,
    },
}

/// Field definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    /// Output key in the normalized record
    pub name: String,
    #[serde(flatten)]
    pub rule: FieldRule,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    /// Human-readable kind label, written to the `Resource` field
    pub display_name: String,
    /// Dispatch key of the SDK client (`ec2`, `elb`, `elbv2`)
    pub service: String,
    /// Label written to the `Service` field
    pub service_label: String,
    pub sdk_method: String,
    pub response_path: String,
    pub id_field: String,
    /// Identifier used when `id_field` is absent on an item
    #[serde(default)]
    pub id_fallback: Option<String>,
    pub fields: Vec<FieldDef>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get all resource keys, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}
