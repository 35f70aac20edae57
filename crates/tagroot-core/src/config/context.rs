//! The context file: project-level configuration values checked into the repo.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{ConfigError, TerraformStateSource};

/// Context values as written in `tagroot.yaml`.
///
/// Every field is optional; environment variables override these and
/// built-in defaults fill the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFile {
    #[serde(default)]
    pub top_level_domain_name: Option<String>,

    #[serde(default)]
    pub app_name: Option<String>,

    /// Credential profile used to list organization accounts.
    #[serde(default)]
    pub accounts_profile: Option<String>,

    #[serde(default)]
    pub use_terraform_state_role_arn: Option<bool>,

    /// Environment name that drops the environment label from domain names.
    #[serde(default)]
    pub production_environment: Option<String>,

    #[serde(default)]
    pub aws_region: Option<String>,

    #[serde(default)]
    pub global_aws_region: Option<String>,

    #[serde(default)]
    pub terraform_state: Option<TerraformStateSource>,
}

impl ContextFile {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }
}
