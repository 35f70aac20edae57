//! # tagroot-aws
//!
//! [`AccountDirectory`](tagroot_core::AccountDirectory) backed by AWS
//! Organizations. Accounts come from `ListAccounts`, tags from
//! `ListTagsForResource`; both are paginated to completion. Failures surface
//! as `ResolveError::AccountListing` and are not retried.

pub mod organizations;

pub use organizations::OrganizationsDirectory;
