//! nativenav library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod bridge;
pub mod core;
pub mod render;

#[cfg(test)]
pub mod test_support;

/// How the registry names components the caller did not name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `_component1`, `_component2`, ...
    #[default]
    Counter,
    /// Random v4 UUIDs.
    Uuid,
}
