//! # tagroot-core
//!
//! Account role resolution and naming derivation for multi-account
//! infrastructure synthesis.
//!
//! Resolution runs first: given the organization's accounts (with tags) and
//! an environment name, [`AccountResolver`] works out which account plays
//! which role for that environment. [`NameDeriver`] then turns the bindings,
//! plus static configuration, into every name downstream infrastructure
//! needs: domain names, buckets, lock tables, topics, profiles and role ARNs.
//!
//! ```rust
//! use tagroot_core::{Account, AccountResolver, NameDeriver, RoleKey, SynthConfig};
//! use tagroot_core::config::ContextFile;
//! use std::collections::HashMap;
//!
//! let context = ContextFile {
//!     top_level_domain_name: Some("example.com".to_string()),
//!     app_name: Some("releasable".to_string()),
//!     ..Default::default()
//! };
//! let config = SynthConfig::from_sources(context, &HashMap::new()).unwrap();
//!
//! let accounts = vec![
//!     Account::new("111", "build"),
//!     Account::new("222", "staging").with_tag("dns", "dns-acct"),
//!     Account::new("333", "dns-acct"),
//! ];
//! let bindings = AccountResolver::default().resolve("staging", &accounts).unwrap();
//! assert_eq!(bindings.account_id(RoleKey::Dns), Some("333"));
//!
//! let names = NameDeriver::new(&config).derive(&bindings);
//! assert_eq!(names.fqdn, "releasable.staging.example.com");
//! assert_eq!(names.terraform_bucket_name, "example.com.build.terraform");
//! ```

pub mod account;
pub mod backend;
pub mod config;
pub mod directory;
pub mod environment;
pub mod error;
pub mod naming;
pub mod resolver;
pub mod role;
pub mod synth;

pub use account::{Account, AccountRef, AccountSnapshot};
pub use backend::{BackendAccess, BackendConfig, ProviderAuth, ProviderFactory, ProviderSettings};
pub use config::{ConfigError, SynthConfig, TerraformStateSource};
pub use directory::{AccountDirectory, StaticDirectory, collect_accounts};
pub use error::ResolveError;
pub use naming::{FqdnParts, NameDeriver, NamingContext};
pub use resolver::AccountResolver;
pub use role::{RoleBinding, RoleBindingSet, RoleKey, normalize_tag_key};
pub use synth::Synthesis;
