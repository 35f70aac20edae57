//! AWS Organizations account directory.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_organizations::Client;
use aws_sdk_organizations::error::DisplayErrorContext;
use std::collections::BTreeMap;

use tagroot_core::{AccountDirectory, AccountRef, ResolveError};

/// OrganizationsDirectory implements AccountDirectory over the Organizations API.
///
/// Must be used with credentials for the organization's management account
/// (or a delegated administrator).
#[derive(Clone)]
pub struct OrganizationsDirectory {
    client: Client,
}

impl OrganizationsDirectory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default credential chain, optionally pinned to
    /// a named profile.
    pub async fn from_profile(profile: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;
        tracing::debug!(profile = profile.unwrap_or("default"), "Loaded AWS configuration");
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl AccountDirectory for OrganizationsDirectory {
    async fn list_accounts(&self) -> Result<Vec<AccountRef>, ResolveError> {
        let mut accounts = Vec::new();
        let mut pages = self.client.list_accounts().into_paginator().send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                ResolveError::AccountListing(format!(
                    "Organizations ListAccounts failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

            for account in page.accounts() {
                let (Some(id), Some(name)) = (account.id(), account.name()) else {
                    return Err(ResolveError::AccountListing(
                        "Organizations ListAccounts returned an account without id or name"
                            .to_string(),
                    ));
                };
                accounts.push(AccountRef {
                    id: id.to_string(),
                    name: name.to_string(),
                });
            }
        }

        Ok(accounts)
    }

    async fn list_tags(&self, account_id: &str) -> Result<BTreeMap<String, String>, ResolveError> {
        let mut tags = BTreeMap::new();
        let mut pages = self
            .client
            .list_tags_for_resource()
            .resource_id(account_id)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                ResolveError::AccountListing(format!(
                    "Organizations ListTagsForResource failed for '{}': {}",
                    account_id,
                    DisplayErrorContext(&e)
                ))
            })?;

            for tag in page.tags() {
                tags.insert(tag.key().to_string(), tag.value().to_string());
            }
        }

        tracing::debug!(account_id, tags = tags.len(), "Fetched account tags");
        Ok(tags)
    }
}
