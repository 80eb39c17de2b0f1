//! Node manager — orchestrates create/delete/get/list against the
//! hypervisor CLI.
//!
//! Every operation is stateless with respect to prior calls; the hypervisor
//! is the only durable state holder. Bulk creation fans out concurrently
//! under a permit cap, deletion and queries run strictly sequentially.

use std::sync::Arc;

use regex::Regex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use firefleet_core::{NodeKind, NodeRecord, NodeSpec, node_name};

use crate::command::HypervisorCli;
use crate::error::{NodeError, NodeResult};
use crate::exec;
use crate::output::{NodeField, node_names};

/// Cap on concurrent VM bring-ups during bulk creation. Large replica
/// counts would otherwise spawn one hypervisor process per replica at once.
const DEFAULT_CREATE_PERMITS: usize = 8;

pub struct NodeManager {
    cli: HypervisorCli,
    create_permits: usize,
}

impl Default for NodeManager {
    fn default() -> Self {
        Self::new(HypervisorCli::default())
    }
}

impl NodeManager {
    pub fn new(cli: HypervisorCli) -> Self {
        Self {
            cli,
            create_permits: DEFAULT_CREATE_PERMITS,
        }
    }

    pub fn with_create_permits(mut self, permits: usize) -> Self {
        self.create_permits = permits.max(1);
        self
    }

    /// Create `spec.count` nodes of `kind` concurrently.
    ///
    /// All invocations are rendered up front, so a template error aborts
    /// before anything launches. After that the operation is best-effort:
    /// per-node failures are logged and do not fail the call. Returns once
    /// every launched invocation has been waited on.
    pub async fn create_nodes(&self, kind: NodeKind, spec: &NodeSpec) -> NodeResult<()> {
        info!(cluster = %spec.cluster, %kind, count = spec.count, "creating nodes");

        let mut batch = Vec::with_capacity(spec.count as usize);
        for ordinal in 1..=spec.count {
            let name = node_name(&spec.cluster, kind, ordinal);
            let invocation = self.cli.create(spec, &name)?;
            batch.push((name, invocation));
        }

        let permits = Arc::new(Semaphore::new(self.create_permits));
        let mut tasks = JoinSet::new();
        for (name, invocation) in batch {
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    // The semaphore is never closed.
                    return;
                };
                info!(node = %name, "creating node");
                if let Err(cause) = exec::run_streaming(&invocation).await {
                    error!(node = %name, %cause, "failed to create node");
                }
            });
        }
        while tasks.join_next().await.is_some() {}

        Ok(())
    }

    /// Delete all nodes of `kind`, ordinal by ordinal. Stops at the first
    /// failure; remaining ordinals are not attempted.
    pub async fn delete_nodes(&self, kind: NodeKind, spec: &NodeSpec) -> NodeResult<()> {
        info!(cluster = %spec.cluster, %kind, count = spec.count, "deleting nodes");

        for ordinal in 1..=spec.count {
            self.delete_node(&node_name(&spec.cluster, kind, ordinal))
                .await?;
        }
        Ok(())
    }

    /// Delete a single node by name, running the forced removal to
    /// completion.
    pub async fn delete_node(&self, name: &str) -> NodeResult<()> {
        info!(node = %name, "deleting node");

        let invocation = self.cli.delete(name)?;
        exec::run_streaming(&invocation).await
    }

    /// Fetch one node's record, field by field.
    ///
    /// The presence check fails fast without attempting any field fetch.
    /// Field-level process failures propagate; unparsable field values do
    /// not (the record keeps the zero value).
    pub async fn get_node(&self, name: &str) -> NodeResult<NodeRecord> {
        debug!(node = %name, "fetching node");

        let presence = self.cli.query_presence(name)?;
        if let Err(cause) = exec::run_captured(&presence).await {
            debug!(node = %name, %cause, "presence check failed");
            return Err(NodeError::NotFound(name.to_string()));
        }

        let mut record = NodeRecord::named(name);
        for field in NodeField::ALL {
            let invocation = self.cli.query_field(name, field.selector())?;
            let raw = exec::run_captured(&invocation).await?;
            field.apply(&mut record, &raw);
        }
        Ok(record)
    }

    /// List all nodes, optionally restricted to names matching `filter`.
    ///
    /// The filter is handed to the hypervisor as an `=~` match and mirrored
    /// client-side, so results stay consistent even when the tool returns a
    /// superset. Fails on the first unfetchable node.
    pub async fn list_nodes(&self, filter: &str) -> NodeResult<Vec<NodeRecord>> {
        debug!(%filter, "listing nodes");

        let pattern = match filter {
            "" => None,
            expr => Some(Regex::new(expr).map_err(|cause| NodeError::Template {
                parameter: "filter",
                reason: cause.to_string(),
            })?),
        };

        let invocation = self.cli.list_names(pattern.as_ref().map(|_| filter))?;
        let raw = exec::run_captured(&invocation).await?;

        let mut records = Vec::new();
        for name in node_names(&raw) {
            if let Some(pattern) = &pattern {
                if !pattern.is_match(&name) {
                    continue;
                }
            }
            records.push(self.get_node(&name).await?);
        }
        Ok(records)
    }
}
