//! Configuration
//!
//! Settings shared by the `grid` and `grider` binaries. Sources are layered
//! by [`merge::service::MergeService`]; [`ConfigLoader`] is the entry point.

pub mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}
