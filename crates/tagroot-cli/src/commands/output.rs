//! Output rendering. Everything printed to stdout goes through here.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Render `value` as a document in `format`.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(rendered)
}
