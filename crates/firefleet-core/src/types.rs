//! Shared types used across firefleet crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a node plays within a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Master,
    Worker,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Master => "master",
            NodeKind::Worker => "worker",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired-state description of one node group.
///
/// Built from a [`crate::ClusterConfig`] and consumed by the node manager;
/// immutable once passed into an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Cluster the nodes belong to.
    pub cluster: String,
    /// VM image reference, e.g. `weaveworks/ignite-ubuntu`.
    pub image: String,
    /// Kernel image reference.
    pub kernel_image: String,
    /// Extra kernel boot arguments. May be empty.
    pub kernel_args: String,
    /// Number of replicas to manage.
    pub count: u32,
    pub cpus: u32,
    /// Memory size as the hypervisor CLI expects it, e.g. `2GB`.
    pub memory: String,
    /// Root disk size, e.g. `10GB`.
    pub disk_size: String,
}

/// Observed-state description returned by query operations.
///
/// Resource fields hold whatever the hypervisor CLI reported; fields the
/// tool omitted or reformatted keep their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub cpus: i64,
    pub memory: String,
    pub disk_size: String,
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub running: bool,
}

impl NodeRecord {
    /// A fresh record for `name` with all reported fields at their zero value.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Derive the canonical node name for an ordinal within a cluster/kind group.
///
/// The name is both the creation-time identifier and the lookup key for
/// delete/get; the hypervisor keys its objects on this string.
pub fn node_name(cluster: &str, kind: NodeKind, ordinal: u32) -> String {
    format!("{cluster}-{kind}-{ordinal}")
}
