//! Account role resolution.
//!
//! Given the organization's accounts and an environment name, derive which
//! account plays which role for that environment.
//!
//! The environment's own account (the *subject*) is the account whose name
//! equals the environment. Every recognized role tag on the subject becomes a
//! forward binding: `dns = dns-acct` binds the `dns` role to the account named
//! `dns-acct`. Independently, every account tagged `<role> = <environment>`
//! is recorded as a child of the environment under that role.

use std::collections::{BTreeMap, HashMap};

use crate::account::{Account, AccountRef};
use crate::config::TerraformStateSource;
use crate::error::ResolveError;
use crate::role::{RoleBinding, RoleBindingSet, RoleKey};

/// Resolves role bindings over an account listing.
#[derive(Debug, Clone, Default)]
pub struct AccountResolver {
    terraform_state: TerraformStateSource,
}

impl AccountResolver {
    pub fn new(terraform_state: TerraformStateSource) -> Self {
        Self { terraform_state }
    }

    /// Resolve bindings for `environment`.
    ///
    /// An environment that names no account is not an error: the result simply
    /// has no subject and no forward bindings. A role tag on the subject whose
    /// value names no account is an error, as are two spellings of one role tag
    /// that disagree and a terraform state account that cannot be located.
    pub fn resolve(
        &self,
        environment: &str,
        accounts: &[Account],
    ) -> Result<RoleBindingSet, ResolveError> {
        let ids_by_name: HashMap<&str, &str> = accounts
            .iter()
            .map(|a| (a.name.as_str(), a.id.as_str()))
            .collect();

        let subject = accounts
            .iter()
            .find(|a| a.name == environment)
            .map(Account::to_ref);
        if subject.is_none() {
            tracing::warn!(environment, "No account is named after the environment");
        }

        let mut bindings: BTreeMap<RoleKey, RoleBinding> = BTreeMap::new();
        let mut children: BTreeMap<RoleKey, Vec<String>> = BTreeMap::new();

        for account in accounts {
            let is_subject = account.name == environment;

            for (key, value) in &account.tags {
                let Some(role) = RoleKey::from_tag_key(key) else {
                    tracing::debug!(account = %account.name, tag = %key, "Ignoring unrecognized tag");
                    continue;
                };

                if value == environment {
                    children.entry(role).or_default().push(account.id.clone());
                }

                if is_subject {
                    let account_id =
                        ids_by_name
                            .get(value.as_str())
                            .ok_or_else(|| ResolveError::DanglingTag {
                                account: account.name.clone(),
                                tag_key: key.clone(),
                                tag_value: value.clone(),
                            })?;

                    if let Some(existing) = bindings.get(&role)
                        && existing.account_name != *value
                    {
                        return Err(ResolveError::ConflictingTags {
                            account: account.name.clone(),
                            role: role.to_string(),
                            first: existing.account_name.clone(),
                            second: value.clone(),
                        });
                    }

                    tracing::debug!(role = %role, account = %value, "Bound role");
                    bindings.insert(
                        role,
                        RoleBinding {
                            role_key: role,
                            account_id: account_id.to_string(),
                            account_name: value.clone(),
                            children_account_ids: Vec::new(),
                        },
                    );
                }
            }
        }

        for (role, binding) in bindings.iter_mut() {
            if let Some(ids) = children.get(role) {
                binding.children_account_ids = ids.clone();
            }
        }

        let terraform_state = self.terraform_state_account(&ids_by_name, &bindings)?;

        tracing::info!(
            environment,
            subject = subject.as_ref().map(|s| s.id.as_str()).unwrap_or("-"),
            roles = bindings.len(),
            terraform_state = %terraform_state.name,
            "Resolved account roles"
        );

        Ok(RoleBindingSet {
            environment: environment.to_string(),
            subject,
            terraform_state,
            bindings,
            children,
        })
    }

    fn terraform_state_account(
        &self,
        ids_by_name: &HashMap<&str, &str>,
        bindings: &BTreeMap<RoleKey, RoleBinding>,
    ) -> Result<AccountRef, ResolveError> {
        match &self.terraform_state {
            TerraformStateSource::Account { name } => {
                let id = ids_by_name.get(name.as_str()).ok_or_else(|| {
                    ResolveError::MissingTerraformStateAccount {
                        reason: format!("no account is named '{}'", name),
                    }
                })?;

                if let Some(tagged) = bindings.get(&RoleKey::TerraformState)
                    && tagged.account_name != *name
                {
                    tracing::warn!(
                        tagged = %tagged.account_name,
                        configured = %name,
                        "terraform-state tag disagrees with the configured account; using the configured account"
                    );
                }

                Ok(AccountRef {
                    id: id.to_string(),
                    name: name.clone(),
                })
            }
            TerraformStateSource::Tag => bindings
                .get(&RoleKey::TerraformState)
                .map(|b| AccountRef {
                    id: b.account_id.clone(),
                    name: b.account_name.clone(),
                })
                .ok_or_else(|| ResolveError::MissingTerraformStateAccount {
                    reason: "the environment account has no terraform-state tag".to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn org() -> Vec<Account> {
        vec![
            Account::new("111", "build"),
            Account::new("222", "staging")
                .with_tag("dns", "dns-acct")
                .with_tag("build", "build")
                .with_tag("cost-center", "platform"),
            Account::new("333", "dns-acct"),
            Account::new("444", "feature-x").with_tag("build", "staging"),
        ]
    }

    #[test]
    fn test_forward_binding_from_subject_tags() {
        let set = AccountResolver::default().resolve("staging", &org()).unwrap();

        assert_eq!(set.aws_account_id(), Some("222"));
        assert_eq!(set.account_id(RoleKey::Dns), Some("333"));
        assert_eq!(set.account_name(RoleKey::Dns), Some("dns-acct"));
        assert_eq!(set.account_id(RoleKey::Build), Some("111"));
        assert_eq!(set.binding(RoleKey::TerraformState), None);
    }

    #[test]
    fn test_children_point_at_environment() {
        let set = AccountResolver::default().resolve("dns-acct", &org()).unwrap();

        assert_eq!(set.aws_account_id(), Some("333"));
        assert_eq!(set.children_account_ids(RoleKey::Dns), ["222".to_string()]);
        assert!(set.bindings.is_empty());
    }

    #[test]
    fn test_children_are_copied_into_forward_binding() {
        let set = AccountResolver::default().resolve("staging", &org()).unwrap();

        // feature-x builds in staging
        assert_eq!(set.children_account_ids(RoleKey::Build), ["444".to_string()]);
        assert_eq!(
            set.binding(RoleKey::Build).unwrap().children_account_ids,
            vec!["444".to_string()]
        );
    }

    #[test]
    fn test_children_keep_duplicates_in_listing_order() {
        let accounts = vec![
            Account::new("111", "build"),
            Account::new("500", "a").with_tag("dns", "hub"),
            Account::new("600", "hub"),
            Account::new("500", "a-again").with_tag("dns", "hub"),
            Account::new("400", "b").with_tag("dns", "hub"),
        ];
        let set = AccountResolver::default().resolve("hub", &accounts).unwrap();
        assert_eq!(
            set.children_account_ids(RoleKey::Dns),
            ["500".to_string(), "500".to_string(), "400".to_string()]
        );
    }

    #[test]
    fn test_hyphenated_tag_key_is_normalized() {
        let accounts = vec![
            Account::new("111", "build"),
            Account::new("777", "state"),
            Account::new("222", "staging").with_tag("terraform-state", "state"),
        ];
        let set = AccountResolver::new(TerraformStateSource::Tag)
            .resolve("staging", &accounts)
            .unwrap();

        assert_eq!(set.account_id(RoleKey::TerraformState), Some("777"));
        assert_eq!(set.terraform_state.id, "777");
        assert_eq!(set.terraform_state.name, "state");
    }

    #[test]
    fn test_conflicting_tag_spellings_fail() {
        let accounts = vec![
            Account::new("111", "build"),
            Account::new("777", "state"),
            Account::new("222", "staging")
                .with_tag("terraform_state", "build")
                .with_tag("terraform-state", "state"),
        ];
        let err = AccountResolver::new(TerraformStateSource::Tag)
            .resolve("staging", &accounts)
            .unwrap_err();

        match err {
            ResolveError::ConflictingTags {
                ref account,
                ref role,
                ref first,
                ref second,
            } => {
                assert_eq!(account, "staging");
                assert_eq!(role, "terraform_state");
                assert_eq!(first, "state");
                assert_eq!(second, "build");
            }
            ref other => panic!("expected ConflictingTags, got {:?}", other),
        }
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_agreeing_tag_spellings_bind_once() {
        let accounts = vec![
            Account::new("777", "state"),
            Account::new("222", "staging")
                .with_tag("terraform_state", "state")
                .with_tag("terraform-state", "state"),
        ];
        let set = AccountResolver::new(TerraformStateSource::Tag)
            .resolve("staging", &accounts)
            .unwrap();

        assert_eq!(set.bindings.len(), 1);
        assert_eq!(set.terraform_state.id, "777");
    }

    #[test]
    fn test_unknown_environment_is_partial_not_error() {
        let set = AccountResolver::default().resolve("nowhere", &org()).unwrap();

        assert_eq!(set.subject, None);
        assert!(set.bindings.is_empty());
        assert!(set.children.is_empty());
        assert_eq!(set.terraform_state.id, "111");
    }

    #[test]
    fn test_dangling_tag_on_subject_fails() {
        let accounts = vec![
            Account::new("111", "build"),
            Account::new("222", "staging").with_tag("dns", "nonexistent-account"),
        ];
        let err = AccountResolver::default()
            .resolve("staging", &accounts)
            .unwrap_err();

        match err {
            ResolveError::DanglingTag {
                account,
                tag_key,
                tag_value,
            } => {
                assert_eq!(account, "staging");
                assert_eq!(tag_key, "dns");
                assert_eq!(tag_value, "nonexistent-account");
            }
            other => panic!("expected DanglingTag, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_tag_on_other_account_is_ignored() {
        let accounts = vec![
            Account::new("111", "build"),
            Account::new("222", "staging"),
            Account::new("333", "other").with_tag("dns", "nonexistent-account"),
        ];
        let set = AccountResolver::default().resolve("staging", &accounts).unwrap();
        assert!(set.bindings.is_empty());
    }

    #[test]
    fn test_unrecognized_tags_are_ignored() {
        let accounts = vec![
            Account::new("111", "build"),
            Account::new("222", "staging").with_tag("owner", "someone-not-an-account"),
        ];
        let set = AccountResolver::default().resolve("staging", &accounts).unwrap();
        assert!(set.bindings.is_empty());
    }

    #[test]
    fn test_fixed_terraform_state_account() {
        let set = AccountResolver::new(TerraformStateSource::Account {
            name: "dns-acct".to_string(),
        })
        .resolve("staging", &org())
        .unwrap();
        assert_eq!(
            set.terraform_state,
            AccountRef {
                id: "333".to_string(),
                name: "dns-acct".to_string()
            }
        );
    }

    #[test]
    fn test_fixed_terraform_state_account_missing() {
        let accounts = vec![Account::new("222", "staging")];
        let err = AccountResolver::default()
            .resolve("staging", &accounts)
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingTerraformStateAccount { .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_tagged_terraform_state_requires_tag() {
        let err = AccountResolver::new(TerraformStateSource::Tag)
            .resolve("staging", &org())
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingTerraformStateAccount { .. }));
    }

    #[test]
    fn test_configured_account_wins_over_tag() {
        let accounts = vec![
            Account::new("111", "build"),
            Account::new("777", "state"),
            Account::new("222", "staging").with_tag("terraform-state", "state"),
        ];
        let set = AccountResolver::default().resolve("staging", &accounts).unwrap();

        assert_eq!(set.terraform_state.name, "build");
        assert_eq!(set.account_name(RoleKey::TerraformState), Some("state"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = AccountResolver::default();
        let first = resolver.resolve("staging", &org()).unwrap();
        let second = resolver.resolve("staging", &org()).unwrap();
        assert_eq!(first, second);
    }
}
