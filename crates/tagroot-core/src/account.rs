//! Organizational accounts as read from the account directory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::ConfigError;

/// One account in the organization.
///
/// `name` is the join key for role tags: a tag value refers to another
/// account by its exact name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Builder-style tag insertion.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// A reference to this account without its tags.
    pub fn to_ref(&self) -> AccountRef {
        AccountRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// An account identified by id and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: String,
    pub name: String,
}

/// A point-in-time listing of the organization, as stored in snapshot files.
///
/// ```yaml
/// accounts:
///   - id: "111111111111"
///     name: build
///   - id: "222222222222"
///     name: staging
///     tags:
///       dns: dns-acct
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl AccountSnapshot {
    /// Load a snapshot from a YAML (or JSON) file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse a snapshot from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }
}
