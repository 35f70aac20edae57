//! The account directory capability.
//!
//! Resolution itself is pure; the directory is the one place accounts and
//! their tags are fetched from. [`collect_accounts`] lists the organization
//! once and fetches each account's tags exactly once per call. Nothing is
//! cached across calls.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::account::{Account, AccountRef, AccountSnapshot};
use crate::error::ResolveError;

/// Source of organizational accounts and their tags.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// List every account in the organization (ids and names only).
    async fn list_accounts(&self) -> Result<Vec<AccountRef>, ResolveError>;

    /// Fetch the tags of one account.
    async fn list_tags(&self, account_id: &str) -> Result<BTreeMap<String, String>, ResolveError>;
}

/// List all accounts and attach their tags.
///
/// Account order is the directory's listing order.
pub async fn collect_accounts(
    directory: &dyn AccountDirectory,
) -> Result<Vec<Account>, ResolveError> {
    let refs = directory.list_accounts().await?;
    tracing::debug!(count = refs.len(), "Listed organization accounts");

    let mut accounts = Vec::with_capacity(refs.len());
    for account in refs {
        let tags = directory.list_tags(&account.id).await?;
        accounts.push(Account {
            id: account.id,
            name: account.name,
            tags,
        });
    }
    Ok(accounts)
}

/// In-memory directory, usually loaded from a snapshot file.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    accounts: Vec<Account>,
}

impl StaticDirectory {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }
}

impl From<AccountSnapshot> for StaticDirectory {
    fn from(snapshot: AccountSnapshot) -> Self {
        Self::new(snapshot.accounts)
    }
}

#[async_trait]
impl AccountDirectory for StaticDirectory {
    async fn list_accounts(&self) -> Result<Vec<AccountRef>, ResolveError> {
        Ok(self.accounts.iter().map(Account::to_ref).collect())
    }

    async fn list_tags(&self, account_id: &str) -> Result<BTreeMap<String, String>, ResolveError> {
        self.accounts
            .iter()
            .find(|a| a.id == account_id)
            .map(|a| a.tags.clone())
            .ok_or_else(|| ResolveError::AccountListing(format!("unknown account id '{}'", account_id)))
    }
}
