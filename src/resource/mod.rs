//! Resource abstraction layer
//!
//! This module provides a data-driven approach to enumerating AWS resources.
//! Resource definitions are loaded from JSON files at compile time; each one
//! names the SDK call to make and the table of fields to extract, so every
//! resource kind goes through the same describe-and-normalize routine.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`fetcher`] - Describes a resource kind and normalizes the items
//! - [`sdk_dispatch`] - Maps abstract SDK method names to concrete AWS SDK calls
//!
//! # Resource Definitions
//!
//! Resources are defined in JSON files under `src/resources/`:
//! - `ec2.json` - Instances, security groups, network interfaces, elastic IPs
//! - `elb.json` - Classic and application/network load balancers
//!
//! # Example
//!
//! ```ignore
//! use awsrecon::aws::client::AwsClient;
//! use awsrecon::resource::fetch_resources;
//!
//! async fn list_instances(client: &AwsClient) -> anyhow::Result<String> {
//!     let collection = fetch_resources(client, &client.context(), "ec2-instances").await?;
//!     collection.to_json()
//! }
//! ```

mod collection;
mod fetcher;
mod kind;
mod registry;
pub mod sdk_dispatch;

pub use collection::{AccountContext, Record, ResourceCollection};
pub use fetcher::{
    fetch_resources, lookup, normalize_item, normalize_items, ResourceSource, LIST_SEPARATOR,
};
pub use kind::ResourceKind;
pub use registry::*;
pub use sdk_dispatch::invoke_sdk;
