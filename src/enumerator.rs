//! Resource Enumerator
//!
//! Session-scoped entry point: one enumerator per account context, one
//! `enumerate_*` operation per resource kind. Every call performs a single
//! describe request and replaces the kind's stored collection and its JSON
//! text; nothing accumulates across calls.

use crate::aws::client::AwsClient;
use crate::resource::{fetch_resources, AccountContext, ResourceCollection, ResourceKind, ResourceSource};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::collections::HashMap;

pub struct ResourceEnumerator<S = AwsClient> {
    context: AccountContext,
    source: S,
    collections: HashMap<ResourceKind, ResourceCollection>,
    serialized: HashMap<ResourceKind, String>,
}

impl ResourceEnumerator<AwsClient> {
    /// Open an AWS session for `profile` in `region`.
    ///
    /// Fails immediately, without retrying, when the profile or its
    /// credentials cannot be resolved.
    pub async fn connect(profile: &str, region: &str) -> Result<Self> {
        let client = AwsClient::new(profile, region)
            .await
            .context("Failed to construct resource enumerator")?;
        Ok(Self::new(client.context(), client))
    }
}

impl<S: ResourceSource> ResourceEnumerator<S> {
    pub fn new(context: AccountContext, source: S) -> Self {
        Self {
            context,
            source,
            collections: HashMap::new(),
            serialized: HashMap::new(),
        }
    }

    pub fn context(&self) -> &AccountContext {
        &self.context
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Describe and normalize one kind without touching stored results
    pub async fn fetch(&self, kind: ResourceKind) -> Result<ResourceCollection> {
        fetch_resources(&self.source, &self.context, kind.resource_key()).await
    }

    /// Enumerate one kind, store the collection and return its JSON text.
    ///
    /// On failure the previously stored result for this kind and every other
    /// kind is left as it was.
    pub async fn enumerate(&mut self, kind: ResourceKind) -> Result<&str> {
        let collection = self.fetch(kind).await?;
        self.store(kind, collection)
    }

    pub async fn enumerate_instances(&mut self) -> Result<&str> {
        self.enumerate(ResourceKind::Instances).await
    }

    pub async fn enumerate_security_groups(&mut self) -> Result<&str> {
        self.enumerate(ResourceKind::SecurityGroups).await
    }

    pub async fn enumerate_network_interfaces(&mut self) -> Result<&str> {
        self.enumerate(ResourceKind::NetworkInterfaces).await
    }

    pub async fn enumerate_classic_load_balancers(&mut self) -> Result<&str> {
        self.enumerate(ResourceKind::ClassicLoadBalancers).await
    }

    pub async fn enumerate_application_load_balancers(&mut self) -> Result<&str> {
        self.enumerate(ResourceKind::ApplicationLoadBalancers).await
    }

    pub async fn enumerate_elastic_ips(&mut self) -> Result<&str> {
        self.enumerate(ResourceKind::ElasticIps).await
    }

    /// Fetch several kinds concurrently and store every successful result.
    ///
    /// Returns the kinds that failed together with their errors.
    pub async fn enumerate_all(
        &mut self,
        kinds: &[ResourceKind],
    ) -> Vec<(ResourceKind, anyhow::Error)> {
        let this = &*self;
        let results = join_all(
            kinds
                .iter()
                .map(|&kind| async move { (kind, this.fetch(kind).await) }),
        )
        .await;

        let mut failures = Vec::new();
        for (kind, result) in results {
            match result.and_then(|collection| self.store(kind, collection).map(|_| ())) {
                Ok(()) => {},
                Err(e) => {
                    tracing::error!("{} enumeration failed: {:#}", kind, e);
                    failures.push((kind, e));
                },
            }
        }
        failures
    }

    /// Typed collection from the last successful call for `kind`
    pub fn collection(&self, kind: ResourceKind) -> Option<&ResourceCollection> {
        self.collections.get(&kind)
    }

    /// JSON text from the last successful call for `kind`
    pub fn json(&self, kind: ResourceKind) -> Option<&str> {
        self.serialized.get(&kind).map(|s| s.as_str())
    }

    fn store(&mut self, kind: ResourceKind, collection: ResourceCollection) -> Result<&str> {
        let json = collection.to_json()?;
        self.collections.insert(kind, collection);

        let slot = self.serialized.entry(kind).or_default();
        *slot = json;
        Ok(slot.as_str())
    }
}
