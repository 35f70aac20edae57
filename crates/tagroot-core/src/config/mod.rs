//! Synthesis configuration.
//!
//! Configuration is assembled once at startup from three layers, highest
//! precedence first:
//!
//! 1. **Environment variables** (`CDKTF_*`)
//! 2. **Context file** (`tagroot.yaml`, see [`ContextFile`])
//! 3. **Built-in defaults**
//!
//! Empty values count as unset at every layer. The resulting [`SynthConfig`]
//! is passed explicitly to resolution and naming; nothing downstream reads
//! the process environment.

pub mod context;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use context::ContextFile;

/// Environment variable names.
pub mod env_vars {
    pub const TOP_LEVEL_DOMAIN_NAME: &str = "CDKTF_TOP_LEVEL_DOMAIN_NAME";
    pub const APP_NAME: &str = "CDKTF_APP_NAME";
    pub const ACCOUNT_PROFILE: &str = "CDKTF_ACCOUNT_PROFILE";
    pub const USE_TERRAFORM_STATE_ROLE_ARN: &str = "CDKTF_USE_TERRAFORM_STATE_ROLE_ARN";
    pub const PRODUCTION_ENVIRONMENT: &str = "CDKTF_PRODUCTION_ENVIRONMENT";
    pub const AWS_REGION: &str = "CDKTF_AWS_REGION";
}

pub const DEFAULT_PRODUCTION_MARKER: &str = "prod";
pub const DEFAULT_REGION: &str = "eu-west-1";
pub const DEFAULT_GLOBAL_REGION: &str = "us-east-1";
pub const DEFAULT_TERRAFORM_STATE_ACCOUNT: &str = "build";

/// Where the terraform state account comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TerraformStateSource {
    /// A fixed account, looked up by name.
    Account { name: String },
    /// The account named by the environment account's `terraform-state` tag.
    Tag,
}

impl Default for TerraformStateSource {
    fn default() -> Self {
        TerraformStateSource::Account {
            name: DEFAULT_TERRAFORM_STATE_ACCOUNT.to_string(),
        }
    }
}

/// Fully resolved configuration for one synthesis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Registered domain, e.g. `example.com`.
    pub top_level_domain: String,

    /// Application name; first label of every FQDN.
    pub app_name: String,

    /// Credential profile for the organization directory.
    pub accounts_profile: Option<String>,

    /// Access terraform state by assuming a role instead of a named profile.
    pub use_role_arn: bool,

    pub production_marker: String,

    /// Region for the state backend and the default provider.
    pub region: String,

    /// Region for global resources (certificates for CloudFront).
    pub global_region: String,

    pub terraform_state: TerraformStateSource,
}

impl SynthConfig {
    /// Read the context file (if any) and the process environment.
    ///
    /// This is the only place the process environment is consulted.
    pub fn load(context_path: Option<&Path>) -> Result<Self, ConfigError> {
        let context = match context_path {
            Some(path) => ContextFile::from_file(path)?,
            None => ContextFile::default(),
        };
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_sources(context, &vars)
    }

    /// Combine a context file with a captured set of environment variables.
    pub fn from_sources(
        context: ContextFile,
        vars: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let var = |name: &str| vars.get(name).filter(|v| !v.is_empty()).cloned();

        let top_level_domain = first_set(
            var(env_vars::TOP_LEVEL_DOMAIN_NAME),
            context.top_level_domain_name,
        )
        .ok_or(ConfigError::Missing("top_level_domain_name"))?;

        let app_name = first_set(var(env_vars::APP_NAME), context.app_name)
            .ok_or(ConfigError::Missing("app_name"))?;

        let accounts_profile = first_set(var(env_vars::ACCOUNT_PROFILE), context.accounts_profile);

        let use_role_arn = match var(env_vars::USE_TERRAFORM_STATE_ROLE_ARN) {
            Some(raw) => parse_bool(env_vars::USE_TERRAFORM_STATE_ROLE_ARN, &raw)?,
            None => context.use_terraform_state_role_arn.unwrap_or(false),
        };

        let production_marker = first_set(
            var(env_vars::PRODUCTION_ENVIRONMENT),
            context.production_environment,
        )
        .unwrap_or_else(|| DEFAULT_PRODUCTION_MARKER.to_string());

        let region = first_set(var(env_vars::AWS_REGION), context.aws_region)
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let global_region = first_set(None, context.global_aws_region)
            .unwrap_or_else(|| DEFAULT_GLOBAL_REGION.to_string());

        Ok(Self {
            top_level_domain,
            app_name,
            accounts_profile,
            use_role_arn,
            production_marker,
            region,
            global_region,
            terraform_state: context.terraform_state.unwrap_or_default(),
        })
    }

    /// Whether `environment` is the production environment.
    pub fn is_production(&self, environment: &str) -> bool {
        environment == self.production_marker
    }
}

fn first_set(env: Option<String>, context: Option<String>) -> Option<String> {
    env.or(context.filter(|v| !v.is_empty()))
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing required configuration value '{0}'")]
    Missing(&'static str),

    #[error("invalid value '{value}' for '{key}'")]
    Invalid { key: &'static str, value: String },

    #[error("environment marker file '{}' is empty", .0.display())]
    EnvironmentMarker(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn context() -> ContextFile {
        ContextFile {
            top_level_domain_name: Some("example.com".to_string()),
            app_name: Some("releasable".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = SynthConfig::from_sources(context(), &HashMap::new()).unwrap();
        assert_eq!(config.top_level_domain, "example.com");
        assert_eq!(config.app_name, "releasable");
        assert_eq!(config.accounts_profile, None);
        assert!(!config.use_role_arn);
        assert_eq!(config.production_marker, "prod");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.global_region, "us-east-1");
        assert_eq!(config.terraform_state, TerraformStateSource::default());
    }

    #[test]
    fn test_env_overrides_context() {
        let env = vars(&[
            (env_vars::TOP_LEVEL_DOMAIN_NAME, "example.org"),
            (env_vars::ACCOUNT_PROFILE, "org-admin"),
            (env_vars::USE_TERRAFORM_STATE_ROLE_ARN, "TRUE"),
        ]);
        let config = SynthConfig::from_sources(context(), &env).unwrap();
        assert_eq!(config.top_level_domain, "example.org");
        assert_eq!(config.app_name, "releasable");
        assert_eq!(config.accounts_profile.as_deref(), Some("org-admin"));
        assert!(config.use_role_arn);
    }

    #[test]
    fn test_empty_env_var_falls_through_to_context() {
        let env = vars(&[(env_vars::APP_NAME, "")]);
        let config = SynthConfig::from_sources(context(), &env).unwrap();
        assert_eq!(config.app_name, "releasable");
    }

    #[test]
    fn test_empty_context_value_falls_through_to_default() {
        let mut ctx = context();
        ctx.production_environment = Some(String::new());
        let config = SynthConfig::from_sources(ctx, &HashMap::new()).unwrap();
        assert_eq!(config.production_marker, "prod");
    }

    #[test]
    fn test_context_bool_used_without_env() {
        let mut ctx = context();
        ctx.use_terraform_state_role_arn = Some(true);
        let config = SynthConfig::from_sources(ctx, &HashMap::new()).unwrap();
        assert!(config.use_role_arn);

        let env = vars(&[(env_vars::USE_TERRAFORM_STATE_ROLE_ARN, "no")]);
        let mut ctx = context();
        ctx.use_terraform_state_role_arn = Some(true);
        let config = SynthConfig::from_sources(ctx, &env).unwrap();
        assert!(!config.use_role_arn);
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let env = vars(&[(env_vars::USE_TERRAFORM_STATE_ROLE_ARN, "maybe")]);
        let err = SynthConfig::from_sources(context(), &env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: env_vars::USE_TERRAFORM_STATE_ROLE_ARN,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_domain() {
        let ctx = ContextFile {
            app_name: Some("releasable".to_string()),
            ..Default::default()
        };
        let err = SynthConfig::from_sources(ctx, &HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("top_level_domain_name")));
    }

    #[test]
    fn test_is_production() {
        let config = SynthConfig::from_sources(context(), &HashMap::new()).unwrap();
        assert!(config.is_production("prod"));
        assert!(!config.is_production("staging"));
    }

    #[test]
    fn test_context_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagroot.yaml");
        std::fs::write(
            &path,
            "top_level_domain_name: example.net\napp_name: web\nglobal_aws_region: us-west-2\n",
        )
        .unwrap();

        let ctx = ContextFile::from_file(&path).unwrap();
        let config = SynthConfig::from_sources(ctx, &HashMap::new()).unwrap();
        assert_eq!(config.top_level_domain, "example.net");
        assert_eq!(config.global_region, "us-west-2");
    }
}
