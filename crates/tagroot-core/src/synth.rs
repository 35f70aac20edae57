//! The full bundle handed to infrastructure declarations.

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::backend::{BackendConfig, ProviderFactory, ProviderSettings};
use crate::config::SynthConfig;
use crate::error::ResolveError;
use crate::naming::{NameDeriver, NamingContext};
use crate::resolver::AccountResolver;
use crate::role::RoleBindingSet;

/// Bindings, names, backend and providers for one stack in one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synthesis {
    pub bindings: RoleBindingSet,
    pub names: NamingContext,
    pub backend: BackendConfig,
    pub providers: Vec<ProviderSettings>,
}

impl Synthesis {
    /// Resolve and derive everything for `namespace` in `environment`.
    ///
    /// A resolution error aborts before any name is derived.
    pub fn build(
        config: &SynthConfig,
        environment: &str,
        namespace: &str,
        accounts: &[Account],
    ) -> Result<Self, ResolveError> {
        let bindings =
            AccountResolver::new(config.terraform_state.clone()).resolve(environment, accounts)?;
        let names = NameDeriver::new(config).derive(&bindings);
        let backend = BackendConfig::new(config, &names, namespace);
        let providers = ProviderFactory::new(config, &names).standard(config);

        Ok(Self {
            bindings,
            names,
            backend,
            providers,
        })
    }
}
