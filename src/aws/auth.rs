//! AWS Authentication
//!
//! Resolves the shared AWS configuration for a named profile and region and
//! checks that credentials can actually be obtained before any API call.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_ec2::config::Region;
use std::path::PathBuf;
use std::time::SystemTime;

/// Profile used when neither flag, config file nor environment names one
pub const DEFAULT_PROFILE: &str = "default";

/// Region used when nothing else resolves one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Load the SDK configuration for a profile/region pair
pub async fn load_sdk_config(profile: &str, region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .profile_name(profile)
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Resolve credentials once so a bad profile fails at construction time
pub async fn verify_credentials(config: &SdkConfig) -> Result<()> {
    let provider = config
        .credentials_provider()
        .context("No AWS credentials provider configured")?;

    let credentials = provider
        .provide_credentials()
        .await
        .context("Failed to resolve AWS credentials. Check the profile in ~/.aws/credentials")?;

    if let Some(expiry) = credentials.expiry() {
        if expiry <= SystemTime::now() {
            return Err(anyhow::anyhow!(
                "AWS credentials have expired (ExpiredToken). Refresh the session for this profile"
            ));
        }
    }

    tracing::debug!("AWS credentials resolved");
    Ok(())
}

/// Path of the shared AWS config file
pub fn get_aws_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AWS_CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|p| p.join(".aws").join("config"))
}

/// Path of the shared AWS credentials file
pub fn get_aws_credentials_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AWS_SHARED_CREDENTIALS_FILE") {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|p| p.join(".aws").join("credentials"))
}

/// Validate a profile name before it is used to build paths or sections
pub(crate) fn validate_profile_name(profile: &str) -> bool {
    !profile.is_empty()
        && profile.len() <= 64
        && profile
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@' | '+'))
}

/// Read the default profile from the environment
pub fn get_default_profile() -> Option<String> {
    let profile = std::env::var("AWS_PROFILE").ok()?;
    if validate_profile_name(&profile) {
        return Some(profile);
    }
    tracing::warn!("Invalid profile name in AWS_PROFILE");
    None
}

/// Get the default region for a profile (environment, then ~/.aws/config)
pub fn get_default_region(profile: &str) -> Option<String> {
    for var in ["AWS_REGION", "AWS_DEFAULT_REGION"] {
        if let Ok(region) = std::env::var(var) {
            if !region.trim().is_empty() {
                return Some(region.trim().to_string());
            }
        }
    }

    let path = get_aws_config_path()?;
    let content = std::fs::read_to_string(path).ok()?;
    parse_profile_region(&content, profile)
}

/// Section header a profile uses in ~/.aws/config
fn config_section_name(profile: &str) -> String {
    if profile == DEFAULT_PROFILE {
        DEFAULT_PROFILE.to_string()
    } else {
        format!("profile {}", profile)
    }
}

/// Find `region = ...` in the profile's section of an AWS config file
pub(crate) fn parse_profile_region(content: &str, profile: &str) -> Option<String> {
    let wanted = config_section_name(profile);
    let mut in_section = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = section.trim() == wanted;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "region" && !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
    }

    None
}
