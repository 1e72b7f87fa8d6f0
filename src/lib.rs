//! awsrecon
//!
//! Enumerates the EC2-family resources of one AWS account and region
//! (instances, security groups, network interfaces, classic and
//! application/network load balancers, elastic IPs) and normalizes each
//! resource into a flat record of human-readable fields, serialized as a
//! JSON object keyed by resource identifier.

pub mod aws;
pub mod config;
pub mod enumerator;
pub mod resource;

/// Version injected at compile time via AWSRECON_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AWSRECON_VERSION") {
    Some(v) => v,
    None => "dev",
};

pub use enumerator::ResourceEnumerator;
pub use resource::{AccountContext, Record, ResourceCollection, ResourceKind};
