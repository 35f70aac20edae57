//! Error types for role resolution.

use thiserror::Error;

/// Errors that abort a resolution run.
///
/// No partial bindings or names are produced once one of these is raised.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The account directory is unreachable or denied access.
    #[error("failed to list accounts: {0}")]
    AccountListing(String),

    /// A role tag on the environment's account names an account that does not exist.
    #[error(
        "account '{account}' has tag '{tag_key}' = '{tag_value}' but no account is named '{tag_value}'"
    )]
    DanglingTag {
        account: String,
        tag_key: String,
        tag_value: String,
    },

    /// Two spellings of the same role tag (`terraform-state`, `terraform_state`)
    /// on the environment's account name different accounts.
    #[error(
        "account '{account}' binds role '{role}' to both '{first}' and '{second}'"
    )]
    ConflictingTags {
        account: String,
        role: String,
        first: String,
        second: String,
    },

    /// The account holding terraform state could not be located.
    #[error("terraform state account could not be resolved: {reason}")]
    MissingTerraformStateAccount { reason: String },
}

impl ResolveError {
    /// Returns true for errors caused by a broken tag-to-account mapping
    /// rather than by the directory itself.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ResolveError::DanglingTag { .. }
                | ResolveError::ConflictingTags { .. }
                | ResolveError::MissingTerraformStateAccount { .. }
        )
    }
}
