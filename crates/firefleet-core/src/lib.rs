pub mod config;
pub mod types;

pub use config::{ClusterConfig, ConfigError, NodeGroup};
pub use types::*;
