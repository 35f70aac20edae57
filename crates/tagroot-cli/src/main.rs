use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::output::OutputFormat;
use commands::synth::{self, Part};
use commands::target::TargetArgs;

#[derive(Parser, Debug)]
#[command(
    name = "tagroot",
    version,
    about = "Resolve account roles from organization tags and derive infrastructure names"
)]
struct Cli {
    /// Context file (YAML). Values are overridden by CDKTF_* environment variables.
    #[arg(long, short = 'c', global = true, env = "TAGROOT_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved role bindings.
    Resolve {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print the derived names.
    Names {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print the remote-state backend configuration.
    Backend {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print the AWS provider settings.
    Providers {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print bindings, names, backend and providers as one document.
    Synth {
        #[command(flatten)]
        target: TargetArgs,
    },
}

impl Command {
    fn into_parts(self) -> (TargetArgs, Part) {
        match self {
            Command::Resolve { target } => (target, Part::Bindings),
            Command::Names { target } => (target, Part::Names),
            Command::Backend { target } => (target, Part::Backend),
            Command::Providers { target } => (target, Part::Providers),
            Command::Synth { target } => (target, Part::All),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the document; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let (target, part) = cli.cmd.into_parts();
    synth::run(cli.config.as_deref(), &target, part, cli.format).await
}
