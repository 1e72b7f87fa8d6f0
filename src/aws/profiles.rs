//! AWS Profiles
//!
//! Lists the named profiles defined in the shared config and credentials files.

use super::auth::{get_aws_config_path, get_aws_credentials_path, validate_profile_name};

/// Which shared file a section header came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFile {
    /// `~/.aws/config`: `[default]` and `[profile name]`
    Config,
    /// `~/.aws/credentials`: `[name]`
    Credentials,
}

/// Extract profile names from the section headers of one file
pub fn parse_profile_names(content: &str, file: ProfileFile) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix('[').and_then(|l| l.strip_suffix(']')))
        .filter_map(|section| {
            let section = section.trim();
            match file {
                ProfileFile::Credentials => Some(section),
                ProfileFile::Config if section == "default" => Some(section),
                ProfileFile::Config => section.strip_prefix("profile ").map(str::trim),
            }
        })
        .filter(|name| validate_profile_name(name))
        .map(str::to_string)
        .collect()
}

/// List all profiles found locally, sorted and de-duplicated
pub fn list_profiles() -> Vec<String> {
    let sources = [
        (get_aws_config_path(), ProfileFile::Config),
        (get_aws_credentials_path(), ProfileFile::Credentials),
    ];

    let mut profiles: Vec<String> = sources
        .into_iter()
        .filter_map(|(path, file)| {
            let path = path?;
            match std::fs::read_to_string(&path) {
                Ok(content) => Some(parse_profile_names(&content, file)),
                Err(e) => {
                    tracing::debug!("Skipping {:?}: {}", path, e);
                    None
                },
            }
        })
        .flatten()
        .collect();

    profiles.sort();
    profiles.dedup();
    profiles
}
