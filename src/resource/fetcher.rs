//! Resource Fetcher
//!
//! Describes one resource kind through a [`ResourceSource`] and normalizes
//! every returned item according to the kind's field table.

use super::collection::{AccountContext, Record, ResourceCollection};
use super::registry::{get_resource, FieldRule, ResourceDef};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::future::Future;

/// Separator used when a list of values is rendered as one string
pub const LIST_SEPARATOR: &str = ", ";

/// Anything that can answer an SDK describe call with a raw JSON response.
///
/// The live implementation is [`crate::aws::client::AwsClient`]; tests plug
/// in canned responses.
pub trait ResourceSource {
    fn invoke(&self, service: &str, method: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Fetch and normalize one resource kind (single page, one API call)
pub async fn fetch_resources<S: ResourceSource>(
    source: &S,
    context: &AccountContext,
    resource_key: &str,
) -> Result<ResourceCollection> {
    let Some(resource_def) = get_resource(resource_key) else {
        return Err(anyhow::anyhow!("Unknown resource: {}", resource_key));
    };

    let response = source
        .invoke(&resource_def.service, &resource_def.sdk_method)
        .await
        .with_context(|| format!("Failed to enumerate {}", resource_def.display_name))?;

    if let Some(token) = next_page_token(&response) {
        tracing::warn!(
            "{} response has more pages (token {}); only the first page is collected",
            resource_def.display_name,
            token
        );
    }

    let items = extract_items(&response, &resource_def.response_path);
    let collection = normalize_items(resource_def, context, items)
        .with_context(|| format!("Failed to enumerate {}", resource_def.display_name))?;

    tracing::info!(
        "Enumerated {} {} record(s) [profile: {}, region: {}]",
        collection.len(),
        resource_def.display_name,
        context.profile,
        context.region
    );

    Ok(collection)
}

fn next_page_token(response: &Value) -> Option<&str> {
    ["NextToken", "NextMarker"]
        .iter()
        .find_map(|key| response.get(*key).and_then(|v| v.as_str()))
        .filter(|token| !token.is_empty())
}

/// Extract the item array at `path`; anything else yields no items
fn extract_items<'a>(response: &'a Value, path: &str) -> &'a [Value] {
    let node = if path.is_empty() {
        Some(response)
    } else {
        lookup(response, path)
    };

    node.and_then(|v| v.as_array())
        .map(|arr| arr.as_slice())
        .unwrap_or(&[])
}

/// Normalize raw items into a fresh collection keyed by resource ID
pub fn normalize_items(
    resource_def: &ResourceDef,
    context: &AccountContext,
    items: &[Value],
) -> Result<ResourceCollection> {
    let mut collection = ResourceCollection::new();

    for item in items {
        let (id, record) = normalize_item(resource_def, context, item)?;
        if collection.insert(id.clone(), record).is_some() {
            tracing::warn!("Duplicate {} identifier {}", resource_def.display_name, id);
        }
    }

    Ok(collection)
}

/// Normalize one raw item. Fails only when the item has no identifier.
pub fn normalize_item(
    resource_def: &ResourceDef,
    context: &AccountContext,
    item: &Value,
) -> Result<(String, Record)> {
    let id = item_id(item, &resource_def.id_field)
        .or_else(|| {
            resource_def
                .id_fallback
                .as_deref()
                .and_then(|path| item_id(item, path))
        })
        .with_context(|| {
            format!(
                "{} record is missing its identifier ({})",
                resource_def.display_name, resource_def.id_field
            )
        })?;

    let mut record = Record::new();
    record.insert("Profile".into(), Value::String(context.profile.clone()));
    record.insert("Region".into(), Value::String(context.region.clone()));
    record.insert(
        "Service".into(),
        Value::String(resource_def.service_label.clone()),
    );
    record.insert(
        "Resource".into(),
        Value::String(resource_def.display_name.clone()),
    );
    record.insert("ID".into(), Value::String(id.clone()));

    for field in &resource_def.fields {
        record.insert(field.name.clone(), apply_rule(&field.rule, item));
    }

    Ok((id, record))
}

fn item_id(item: &Value, path: &str) -> Option<String> {
    lookup(item, path)
        .and_then(scalar_to_string)
        .filter(|id| !id.is_empty())
}

fn apply_rule(rule: &FieldRule, item: &Value) -> Value {
    match rule {
        FieldRule::Text { path } => lookup(item, path)
            .and_then(scalar_to_string)
            .map(Value::String)
            .unwrap_or(Value::Null),
        FieldRule::List { path, item_path } => {
            Value::String(join_list(lookup(item, path), item_path.as_deref()))
        },
        FieldRule::Tags { path } => {
            Value::Object(collect_pairs(lookup(item, path), "Key", "Value"))
        },
        FieldRule::Pairs {
            path,
            key_path,
            value_path,
        } => Value::Object(collect_pairs(lookup(item, path), key_path, value_path)),
    }
}

fn join_list(node: Option<&Value>, item_path: Option<&str>) -> String {
    let Some(node) = node else {
        return String::new();
    };

    match node {
        Value::Array(arr) => arr
            .iter()
            .filter_map(|element| match item_path {
                Some(sub) => lookup(element, sub),
                None => Some(element),
            })
            .filter_map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        other => scalar_to_string(other).unwrap_or_default(),
    }
}

fn collect_pairs(node: Option<&Value>, key_path: &str, value_path: &str) -> Map<String, Value> {
    let mut map = Map::new();

    let Some(entries) = node.and_then(|v| v.as_array()) else {
        return map;
    };

    for entry in entries {
        let Some(key) = lookup(entry, key_path).and_then(scalar_to_string) else {
            continue;
        };
        let value = lookup(entry, value_path)
            .and_then(scalar_to_string)
            .unwrap_or_default();
        map.insert(key, Value::String(value));
    }

    map
}

/// Follow a dot-notation path; numeric segments index into arrays
pub fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = item;

    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(idx) if current.is_array() => current.get(idx)?,
            _ => current.get(part)?,
        };
    }

    Some(current)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
