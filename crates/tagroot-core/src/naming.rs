//! Name derivation.
//!
//! Every name here is a pure function of the configuration, the environment
//! and the resolved bindings. Running the derivation twice over the same
//! inputs yields byte-identical output; infrastructure keyed by these names
//! must never drift between runs.

use serde::{Deserialize, Serialize};

use crate::backend::BackendAccess;
use crate::config::SynthConfig;
use crate::role::{RoleBindingSet, RoleKey};

pub const WEB_ACL_NAME: &str = "IPWhiteListWebACL";

/// The labels of an FQDN, most specific first.
///
/// `releasable.staging.example.com` is app `releasable`, environment
/// `staging`, domain `example`, `com`. The environment label is omitted when
/// `production` is set, and empty labels are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FqdnParts {
    app: Option<String>,
    environment: Option<String>,
    domain: Vec<String>,
}

impl FqdnParts {
    pub fn new(
        top_level_domain: &str,
        app_name: &str,
        environment: &str,
        production: bool,
    ) -> Self {
        let label = |s: &str| (!s.is_empty()).then(|| s.to_string());
        let environment = if production { None } else { label(environment) };

        Self {
            app: label(app_name),
            environment,
            domain: top_level_domain
                .split('.')
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// All labels, most specific first.
    pub fn labels(&self) -> Vec<&str> {
        self.app
            .iter()
            .chain(self.environment.iter())
            .chain(self.domain.iter())
            .map(String::as_str)
            .collect()
    }

    /// Labels without the application label.
    pub fn without_app(&self) -> Vec<&str> {
        self.environment
            .iter()
            .chain(self.domain.iter())
            .map(String::as_str)
            .collect()
    }

    /// Labels without the application and environment labels.
    pub fn without_env(&self) -> Vec<&str> {
        self.domain.iter().map(String::as_str).collect()
    }
}

/// The three spellings of a label sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Joined {
    forward: String,
    reverse: String,
    reverse_dash: String,
}

impl Joined {
    fn of(labels: &[&str]) -> Self {
        let reversed: Vec<&str> = labels.iter().rev().copied().collect();
        Self {
            forward: labels.join("."),
            reverse: reversed.join("."),
            reverse_dash: reversed.join("-"),
        }
    }
}

/// The naming bundle consumed by infrastructure declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingContext {
    pub environment: String,

    /// FQDN labels, most specific first.
    pub fqdn_parts: Vec<String>,

    pub fqdn: String,
    pub fqdn_reverse: String,
    pub fqdn_reverse_dash: String,
    pub fqdn_no_app: String,
    pub fqdn_no_app_reverse: String,
    pub fqdn_no_app_reverse_dash: String,
    pub fqdn_no_env: String,
    pub fqdn_no_env_reverse: String,
    pub fqdn_no_env_reverse_dash: String,

    /// Domain of the environment's hosted zone.
    pub environment_domain_name: String,

    pub web_acl_name: String,

    pub artifacts_bucket_name: String,
    pub destination_builds_bucket_name: String,
    /// Builds bucket in the build account; absent without a `build` role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_build_bucket_name: Option<String>,
    pub cloudtrail_logs_bucket_name: String,

    pub terraform_state_account_id: String,
    pub terraform_state_account_name: String,
    pub terraform_bucket_name: String,
    pub terraform_lock_table_name: String,

    pub env_build_notification_topic: String,
    pub build_notification_topic: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_account_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_account_profile: Option<String>,

    /// Role assumed by the deployment pipeline.
    pub pipeline_role_arn: String,

    /// How terraform state is accessed.
    #[serde(flatten)]
    pub state_access: BackendAccess,
}

/// Derives a [`NamingContext`] from configuration and resolved bindings.
#[derive(Debug, Clone, Copy)]
pub struct NameDeriver<'a> {
    config: &'a SynthConfig,
}

impl<'a> NameDeriver<'a> {
    pub fn new(config: &'a SynthConfig) -> Self {
        Self { config }
    }

    /// Derive every name for the environment the bindings were resolved for.
    ///
    /// Never fails: malformed inputs (an empty domain, say) produce degenerate
    /// names rather than errors.
    pub fn derive(&self, bindings: &RoleBindingSet) -> NamingContext {
        let config = self.config;
        let environment = bindings.environment.as_str();
        let tld = config.top_level_domain.as_str();

        let parts = FqdnParts::new(
            tld,
            &config.app_name,
            environment,
            config.is_production(environment),
        );
        let full = Joined::of(&parts.labels());
        let no_app = Joined::of(&parts.without_app());
        let no_env = Joined::of(&parts.without_env());

        let state_account = &bindings.terraform_state;

        NamingContext {
            environment: environment.to_string(),
            fqdn_parts: parts.labels().into_iter().map(str::to_string).collect(),

            fqdn: full.forward,
            fqdn_reverse: full.reverse,
            fqdn_reverse_dash: full.reverse_dash,
            environment_domain_name: no_app.forward.clone(),
            fqdn_no_app: no_app.forward,
            fqdn_no_app_reverse: no_app.reverse,
            env_build_notification_topic: format!("{}-build-notifications", no_app.reverse_dash),
            fqdn_no_app_reverse_dash: no_app.reverse_dash,
            fqdn_no_env: no_env.forward,
            fqdn_no_env_reverse: no_env.reverse,
            build_notification_topic: format!("{}-build-notifications", no_env.reverse_dash),
            fqdn_no_env_reverse_dash: no_env.reverse_dash,

            web_acl_name: WEB_ACL_NAME.to_string(),

            artifacts_bucket_name: format!("{}.{}.artifacts", tld, environment),
            destination_builds_bucket_name: format!("{}.{}.builds", tld, environment),
            source_build_bucket_name: bindings
                .account_name(RoleKey::Build)
                .map(|name| format!("{}.{}.builds", tld, name)),
            cloudtrail_logs_bucket_name: format!("{}.{}.cloudtrails.logs", tld, environment),

            terraform_state_account_id: state_account.id.clone(),
            terraform_state_account_name: state_account.name.clone(),
            terraform_bucket_name: terraform_bucket_name(tld, &state_account.name),
            terraform_lock_table_name: terraform_lock_table_name(tld, &state_account.name),

            aws_profile: bindings.aws_account_id().map(power_user_profile),
            build_account_profile: bindings.account_id(RoleKey::Build).map(power_user_profile),
            dns_account_profile: bindings
                .account_id(RoleKey::Dns)
                .map(|id| format!("{}_NetworkAdministrator", id)),

            pipeline_role_arn: format!(
                "arn:aws:iam::{}:role/{}-terraform-pipeline-CodeBuildRole",
                state_account.id, config.app_name
            ),

            state_access: BackendAccess::for_state_account(&state_account.id, config.use_role_arn),
        }
    }
}

/// `{tld}.{account}.terraform`
pub fn terraform_bucket_name(tld: &str, state_account_name: &str) -> String {
    format!("{}.{}.terraform", tld, state_account_name)
}

/// `{tld}.{account}.terraform.lock`
pub fn terraform_lock_table_name(tld: &str, state_account_name: &str) -> String {
    format!("{}.{}.terraform.lock", tld, state_account_name)
}

fn power_user_profile(account_id: &str) -> String {
    format!("{}_AWSPowerUserAccess", account_id)
}
