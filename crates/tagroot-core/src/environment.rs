//! The environment marker file written by the build before synthesis.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Location of the marker for `namespace` under the synthesis output directory.
pub fn marker_path(outdir: &Path, namespace: &str) -> PathBuf {
    outdir
        .join("stacks")
        .join(namespace)
        .join(".terraform")
        .join("environment")
}

/// Read the target environment for `namespace`.
///
/// Only the first whitespace-separated token counts; the file usually ends
/// with a newline.
pub fn read_marker(outdir: &Path, namespace: &str) -> Result<String, ConfigError> {
    let path = marker_path(outdir, namespace);
    let content = fs::read_to_string(&path)?;
    content
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or(ConfigError::EnvironmentMarker(path))
}
