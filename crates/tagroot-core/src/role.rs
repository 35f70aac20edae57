//! Semantic account roles and their resolved bindings.
//!
//! Accounts declare their relationships with tags: a tag `dns = dns-acct` on
//! the `staging` account says "staging's DNS lives in the account named
//! `dns-acct`". Tag keys are normalized (hyphens become underscores) and only
//! the keys enumerated by [`RoleKey`] are recognized.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::account::AccountRef;

/// Normalize a raw tag key: `terraform-state` becomes `terraform_state`.
pub fn normalize_tag_key(raw: &str) -> String {
    raw.replace('-', "_")
}

/// Recognized role tag keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKey {
    /// Account that hosts build pipelines and build artifacts.
    Build,
    /// Account that owns the DNS zones.
    Dns,
    /// Account that holds the terraform state bucket and lock table.
    TerraformState,
}

impl RoleKey {
    pub const ALL: [RoleKey; 3] = [RoleKey::Build, RoleKey::Dns, RoleKey::TerraformState];

    /// Map a raw tag key onto a role, normalizing it first.
    ///
    /// Returns `None` for tags that do not name a role (cost centers, owners, ...).
    pub fn from_tag_key(raw: &str) -> Option<Self> {
        let key = normalize_tag_key(raw);
        RoleKey::ALL.into_iter().find(|role| role.as_str() == key)
    }

    /// The normalized key string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKey::Build => "build",
            RoleKey::Dns => "dns",
            RoleKey::TerraformState => "terraform_state",
        }
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role of the environment's account, resolved to a concrete account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    pub role_key: RoleKey,
    pub account_id: String,
    pub account_name: String,
    /// Accounts whose tag under `role_key` names the environment.
    /// Unordered; duplicates are kept.
    #[serde(default)]
    pub children_account_ids: Vec<String>,
}

/// Everything resolved for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBindingSet {
    /// Environment the set was resolved for.
    pub environment: String,

    /// The account whose name equals the environment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<AccountRef>,

    /// Account holding terraform state.
    pub terraform_state: AccountRef,

    /// Forward bindings, one per role tag present on the subject account.
    #[serde(default)]
    pub bindings: BTreeMap<RoleKey, RoleBinding>,

    /// Inverse index: for each role, accounts that point at the environment.
    #[serde(default)]
    pub children: BTreeMap<RoleKey, Vec<String>>,
}

impl RoleBindingSet {
    /// Id of the environment's own account.
    pub fn aws_account_id(&self) -> Option<&str> {
        self.subject.as_ref().map(|a| a.id.as_str())
    }

    pub fn binding(&self, role: RoleKey) -> Option<&RoleBinding> {
        self.bindings.get(&role)
    }

    pub fn account_id(&self, role: RoleKey) -> Option<&str> {
        self.binding(role).map(|b| b.account_id.as_str())
    }

    pub fn account_name(&self, role: RoleKey) -> Option<&str> {
        self.binding(role).map(|b| b.account_name.as_str())
    }

    /// Accounts tagged `role = <environment>`. Empty when none point here.
    pub fn children_account_ids(&self, role: RoleKey) -> &[String] {
        self.children.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_replaces_every_hyphen() {
        assert_eq!(normalize_tag_key("terraform-state"), "terraform_state");
        assert_eq!(normalize_tag_key("a-b-c"), "a_b_c");
        assert_eq!(normalize_tag_key("dns"), "dns");
    }

    #[test]
    fn test_role_key_from_tag_key() {
        assert_eq!(
            RoleKey::from_tag_key("terraform-state"),
            Some(RoleKey::TerraformState)
        );
        assert_eq!(
            RoleKey::from_tag_key("terraform_state"),
            Some(RoleKey::TerraformState)
        );
        assert_eq!(RoleKey::from_tag_key("dns"), Some(RoleKey::Dns));
        assert_eq!(RoleKey::from_tag_key("build"), Some(RoleKey::Build));
        assert_eq!(RoleKey::from_tag_key("cost-center"), None);
        assert_eq!(RoleKey::from_tag_key("DNS"), None);
    }

    #[test]
    fn test_role_key_roundtrips_through_as_str() {
        for role in RoleKey::ALL {
            assert_eq!(RoleKey::from_tag_key(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_children_default_to_empty() {
        let set = RoleBindingSet {
            environment: "staging".to_string(),
            subject: None,
            terraform_state: AccountRef {
                id: "111".to_string(),
                name: "build".to_string(),
            },
            bindings: BTreeMap::new(),
            children: BTreeMap::new(),
        };
        assert!(set.children_account_ids(RoleKey::Dns).is_empty());
        assert_eq!(set.account_id(RoleKey::Dns), None);
        assert_eq!(set.aws_account_id(), None);
    }

    #[test]
    fn test_binding_set_serializes_role_keys_as_strings() {
        let mut bindings = BTreeMap::new();
        bindings.insert(
            RoleKey::TerraformState,
            RoleBinding {
                role_key: RoleKey::TerraformState,
                account_id: "111".to_string(),
                account_name: "build".to_string(),
                children_account_ids: vec![],
            },
        );
        let set = RoleBindingSet {
            environment: "staging".to_string(),
            subject: None,
            terraform_state: AccountRef {
                id: "111".to_string(),
                name: "build".to_string(),
            },
            bindings,
            children: BTreeMap::new(),
        };

        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(
            value["bindings"]["terraform_state"]["account_name"],
            serde_json::json!("build")
        );
        assert!(value.get("subject").is_none());
    }
}
