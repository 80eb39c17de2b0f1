//! Cluster definition file parsing.
//!
//! A cluster is declared in TOML: a `[cluster]` section naming the cluster
//! and its images, plus optional `[master]` and `[worker]` groups with
//! replica counts and resource sizing.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{NodeKind, NodeSpec};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid cluster config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid cluster config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub cluster: ClusterSection,
    pub master: Option<NodeGroup>,
    pub worker: Option<NodeGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSection {
    pub name: String,
    pub image: String,
    pub kernel_image: String,
    #[serde(default)]
    pub kernel_args: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGroup {
    pub count: u32,
    pub cpus: u32,
    pub memory: String,
    pub disk_size: String,
}

impl ClusterConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: ClusterConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs the node manager could not act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster.name.is_empty() {
            return Err(ConfigError::Invalid("cluster name is empty".to_string()));
        }
        if self.cluster.image.is_empty() {
            return Err(ConfigError::Invalid("cluster image is empty".to_string()));
        }
        if self.master.is_none() && self.worker.is_none() {
            return Err(ConfigError::Invalid(
                "config declares neither a master nor a worker group".to_string(),
            ));
        }
        for (kind, group) in [(NodeKind::Master, &self.master), (NodeKind::Worker, &self.worker)] {
            if let Some(group) = group {
                if group.count == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "{kind} group has count 0"
                    )));
                }
            }
        }
        Ok(())
    }

    /// The node group declared for `kind`, if any.
    pub fn group(&self, kind: NodeKind) -> Option<&NodeGroup> {
        match kind {
            NodeKind::Master => self.master.as_ref(),
            NodeKind::Worker => self.worker.as_ref(),
        }
    }

    /// Build the [`NodeSpec`] for `kind` from this config.
    pub fn node_spec(&self, kind: NodeKind) -> Option<NodeSpec> {
        let group = self.group(kind)?;
        Some(NodeSpec {
            cluster: self.cluster.name.clone(),
            image: self.cluster.image.clone(),
            kernel_image: self.cluster.kernel_image.clone(),
            kernel_args: self.cluster.kernel_args.clone(),
            count: group.count,
            cpus: group.cpus,
            memory: group.memory.clone(),
            disk_size: group.disk_size.clone(),
        })
    }
}
