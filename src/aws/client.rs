//! AWS Client
//!
//! Holds the three service clients one account/region session needs:
//! EC2, classic Elastic Load Balancing and Elastic Load Balancing v2.

use super::auth;
use crate::resource::{sdk_dispatch, AccountContext, ResourceSource};
use anyhow::{Context, Result};
use aws_config::SdkConfig;
use serde_json::Value;

/// Main AWS client
#[derive(Clone, Debug)]
pub struct AwsClient {
    pub ec2: aws_sdk_ec2::Client,
    pub elb: aws_sdk_elasticloadbalancing::Client,
    pub elbv2: aws_sdk_elasticloadbalancingv2::Client,
    pub profile: String,
    pub region: String,
}

impl AwsClient {
    /// Create a client for a named profile and region.
    ///
    /// Credentials are resolved eagerly; an unknown profile or expired
    /// session is reported here rather than on the first describe call.
    pub async fn new(profile: &str, region: &str) -> Result<Self> {
        let config = auth::load_sdk_config(profile, region).await;

        auth::verify_credentials(&config)
            .await
            .with_context(|| format!("Failed to initialize AWS session for profile '{}'", profile))?;

        tracing::info!("AWS session ready [profile: {}, region: {}]", profile, region);

        Ok(Self::from_sdk_config(profile, &config))
    }

    /// Build the service clients from an already-loaded configuration
    pub fn from_sdk_config(profile: &str, config: &SdkConfig) -> Self {
        let region = config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_default();

        Self {
            ec2: aws_sdk_ec2::Client::new(config),
            elb: aws_sdk_elasticloadbalancing::Client::new(config),
            elbv2: aws_sdk_elasticloadbalancingv2::Client::new(config),
            profile: profile.to_string(),
            region,
        }
    }

    pub fn context(&self) -> AccountContext {
        AccountContext::new(&self.profile, &self.region)
    }
}

impl ResourceSource for AwsClient {
    async fn invoke(&self, service: &str, method: &str) -> Result<Value> {
        sdk_dispatch::invoke_sdk(service, method, self).await
    }
}

/// Format an AWS error for display
pub fn format_aws_error(error: &anyhow::Error) -> String {
    // `{:#}` renders the whole context chain, where the SDK error code lives
    let error_str = format!("{:#}", error);

    if error_str.contains("ExpiredToken") || error_str.contains("RequestExpired") {
        return "AWS session expired. Refresh the credentials for this profile.".to_string();
    }
    if error_str.contains("UnauthorizedOperation") || error_str.contains("AccessDenied") {
        return "Permission denied. Check the IAM permissions of this profile.".to_string();
    }
    if error_str.contains("AuthFailure")
        || error_str.contains("InvalidClientTokenId")
        || error_str.contains("SignatureDoesNotMatch")
    {
        return "Authentication failed. Check the access keys of this profile.".to_string();
    }
    if error_str.contains("Failed to resolve AWS credentials")
        || error_str.contains("No AWS credentials provider")
    {
        return "No usable credentials. Check the profile name and ~/.aws/credentials.".to_string();
    }
    if error_str.contains("RequestLimitExceeded") || error_str.contains("Throttling") {
        return "Rate limit exceeded. Please try again later.".to_string();
    }
    if error_str.contains("OptInRequired") || error_str.contains("InvalidRegion") {
        return "Region not enabled for this account.".to_string();
    }
    if error_str.contains("dispatch failure") || error_str.contains("timeout") {
        return "Could not reach the AWS endpoint. Check your network connection and region."
            .to_string();
    }

    let sanitized = error_str
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(160)
        .collect::<String>();

    if error_str.chars().count() > 160 {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
