//! Selecting the environment, stack and account source for a run.

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::PathBuf;

use tagroot_aws::OrganizationsDirectory;
use tagroot_core::{
    Account, AccountDirectory, AccountSnapshot, StaticDirectory, SynthConfig, collect_accounts,
    environment,
};

/// Arguments shared by every synthesis command.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Target environment. Defaults to the marker file under --outdir.
    #[arg(long, short = 'e')]
    pub environment: Option<String>,

    /// Synthesis output directory holding `stacks/<namespace>/.terraform/environment`.
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Stack namespace (state key prefix). Defaults to the app name.
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Account snapshot file (YAML/JSON). Without it, AWS Organizations is queried.
    #[arg(long)]
    pub accounts: Option<PathBuf>,
}

impl TargetArgs {
    pub fn namespace(&self, config: &SynthConfig) -> String {
        self.namespace
            .clone()
            .unwrap_or_else(|| config.app_name.clone())
    }

    /// The explicit --environment, else the marker file for the namespace.
    pub fn environment(&self, config: &SynthConfig) -> Result<String> {
        if let Some(environment) = &self.environment {
            if environment.is_empty() {
                bail!("--environment must not be empty");
            }
            return Ok(environment.clone());
        }

        let Some(outdir) = &self.outdir else {
            bail!("no environment given: pass --environment or --outdir with an environment marker");
        };
        let namespace = self.namespace(config);
        environment::read_marker(outdir, &namespace).with_context(|| {
            format!(
                "failed to read environment marker {}",
                environment::marker_path(outdir, &namespace).display()
            )
        })
    }

    /// List the organization's accounts with their tags.
    pub async fn load_accounts(&self, config: &SynthConfig) -> Result<Vec<Account>> {
        let directory: Box<dyn AccountDirectory> = match &self.accounts {
            Some(path) => {
                let snapshot = AccountSnapshot::from_file(path).with_context(|| {
                    format!("failed to load account snapshot {}", path.display())
                })?;
                tracing::info!(path = %path.display(), "Using account snapshot");
                Box::new(StaticDirectory::from(snapshot))
            }
            None => {
                tracing::info!(
                    profile = config.accounts_profile.as_deref().unwrap_or("default"),
                    "Listing accounts from AWS Organizations"
                );
                Box::new(OrganizationsDirectory::from_profile(config.accounts_profile.as_deref()).await)
            }
        };

        let accounts = collect_accounts(&*directory)
            .await
            .context("failed to list organization accounts")?;
        Ok(accounts)
    }
}
