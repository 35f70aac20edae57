//! Remote-state backend and provider settings.
//!
//! Terraform state lives in the terraform state account. It is reached
//! either by assuming a role there (pipelines) or through a named credential
//! profile (workstations). [`BackendAccess`] makes the two modes mutually
//! exclusive.

use serde::{Deserialize, Serialize};

use crate::config::SynthConfig;
use crate::naming::NamingContext;

pub const STATE_ACCESS_ROLE: &str = "TerraformStateAccess";
pub const STATE_BUCKET_ACL: &str = "bucket-owner-full-control";
pub const GLOBAL_PROVIDER_ALIAS: &str = "global";

/// How terraform state is accessed. Serialized as a single `role_arn` or
/// `profile` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendAccess {
    RoleArn(String),
    Profile(String),
}

impl BackendAccess {
    /// Access to the state account `account_id`.
    pub fn for_state_account(account_id: &str, use_role_arn: bool) -> Self {
        if use_role_arn {
            BackendAccess::RoleArn(format!(
                "arn:aws:iam::{}:role/{}",
                account_id, STATE_ACCESS_ROLE
            ))
        } else {
            BackendAccess::Profile(format!("{}_{}", account_id, STATE_ACCESS_ROLE))
        }
    }

    pub fn role_arn(&self) -> Option<&str> {
        match self {
            BackendAccess::RoleArn(arn) => Some(arn),
            BackendAccess::Profile(_) => None,
        }
    }

    pub fn profile(&self) -> Option<&str> {
        match self {
            BackendAccess::RoleArn(_) => None,
            BackendAccess::Profile(profile) => Some(profile),
        }
    }
}

/// S3 remote-state backend configuration for one stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub region: String,
    /// `{namespace}/terraform.tfstate`
    pub key: String,
    pub bucket: String,
    pub dynamodb_table: String,
    pub acl: String,
    #[serde(flatten)]
    pub access: BackendAccess,
}

impl BackendConfig {
    /// Backend for the stack `namespace`.
    pub fn new(config: &SynthConfig, names: &NamingContext, namespace: &str) -> Self {
        Self {
            region: config.region.clone(),
            key: state_key(namespace),
            bucket: names.terraform_bucket_name.clone(),
            dynamodb_table: names.terraform_lock_table_name.clone(),
            acl: STATE_BUCKET_ACL.to_string(),
            access: names.state_access.clone(),
        }
    }
}

/// Object key of a stack's state file.
pub fn state_key(namespace: &str) -> String {
    format!("{}/terraform.tfstate", namespace)
}

/// How an AWS provider authenticates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderAuth {
    Profile(String),
    AssumeRole { role_arn: String },
}

/// Settings for one AWS provider instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub id: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Absent when no profile could be derived (the environment names no
    /// account); the provider then uses the default credential chain.
    #[serde(flatten)]
    pub auth: Option<ProviderAuth>,
}

/// Builds provider settings that share one authentication mode.
#[derive(Debug, Clone)]
pub struct ProviderFactory {
    auth: Option<ProviderAuth>,
}

impl ProviderFactory {
    /// Pipelines assume the pipeline role; otherwise the environment's
    /// power-user profile is used.
    pub fn new(config: &SynthConfig, names: &NamingContext) -> Self {
        let auth = if config.use_role_arn {
            Some(ProviderAuth::AssumeRole {
                role_arn: names.pipeline_role_arn.clone(),
            })
        } else {
            names.aws_profile.clone().map(ProviderAuth::Profile)
        };
        Self { auth }
    }

    pub fn build(&self, region: &str, id: &str, alias: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            id: id.to_string(),
            region: region.to_string(),
            alias: alias.map(str::to_string),
            auth: self.auth.clone(),
        }
    }

    /// The default provider plus the `global` alias.
    pub fn standard(&self, config: &SynthConfig) -> Vec<ProviderSettings> {
        vec![
            self.build(&config.region, "aws", None),
            self.build(&config.global_region, "global_aws", Some(GLOBAL_PROVIDER_ALIAS)),
        ]
    }
}
