//! CLI command implementations for tagroot.

pub mod output;
pub mod synth;
pub mod target;
