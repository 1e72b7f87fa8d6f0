//! AWS API interaction module
//!
//! This module provides the session plumbing for talking to AWS: profile and
//! region resolution, credential checks, and the service clients.
//!
//! # Module Structure
//!
//! - [`auth`] - Shared-config loading and credential verification
//! - [`client`] - The EC2 / ELB / ELBv2 clients for one account and region
//! - [`profiles`] - Profile listing from the shared config files
//!
//! # Example
//!
//! ```ignore
//! use awsrecon::aws::client::AwsClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = AwsClient::new("production", "us-east-1").await?;
//!     let groups = client.ec2.describe_security_groups().send().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod profiles;
