//! `tagroot resolve|names|backend|providers|synth`.
//!
//! All five commands run the same pipeline (config, environment, accounts,
//! resolution, naming) and differ only in which part of the result they
//! print.

use anyhow::{Context, Result};
use std::path::Path;

use tagroot_core::{Account, SynthConfig, Synthesis};

use super::output::{OutputFormat, render};
use super::target::TargetArgs;

/// Which part of the synthesis to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Bindings,
    Names,
    Backend,
    Providers,
    All,
}

/// Run a synthesis command and print the requested part to stdout.
pub async fn run(
    config_path: Option<&Path>,
    target: &TargetArgs,
    part: Part,
    format: OutputFormat,
) -> Result<()> {
    let config = SynthConfig::load(config_path).context("failed to load configuration")?;
    let environment = target.environment(&config)?;
    let accounts = target.load_accounts(&config).await?;

    let namespace = target.namespace(&config);
    let document = synthesize(&config, &environment, &namespace, &accounts, part, format)?;
    println!("{}", document);
    Ok(())
}

/// Resolve and render without touching the process environment or network.
pub fn synthesize(
    config: &SynthConfig,
    environment: &str,
    namespace: &str,
    accounts: &[Account],
    part: Part,
    format: OutputFormat,
) -> Result<String> {
    let synthesis = Synthesis::build(config, environment, namespace, accounts)
        .with_context(|| format!("failed to resolve accounts for environment '{}'", environment))?;

    tracing::info!(
        environment,
        namespace,
        fqdn = %synthesis.names.fqdn,
        "Synthesized naming bundle"
    );

    match part {
        Part::Bindings => render(&synthesis.bindings, format),
        Part::Names => render(&synthesis.names, format),
        Part::Backend => render(&synthesis.backend, format),
        Part::Providers => render(&synthesis.providers, format),
        Part::All => render(&synthesis, format),
    }
}
