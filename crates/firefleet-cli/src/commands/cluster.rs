use std::path::Path;

use anyhow::Context as _;
use tracing::info;

use firefleet_core::{ClusterConfig, NodeKind};
use firefleet_node::NodeManager;

fn load(config_path: &str) -> anyhow::Result<ClusterConfig> {
    ClusterConfig::from_file(Path::new(config_path))
        .with_context(|| format!("loading cluster config {config_path}"))
}

pub async fn create(manager: &NodeManager, config_path: &str) -> anyhow::Result<()> {
    let config = load(config_path)?;

    info!("Creating cluster ({}) from {}", config.cluster.name, config_path);

    // Masters come up before workers so join targets exist first.
    for kind in [NodeKind::Master, NodeKind::Worker] {
        if let Some(spec) = config.node_spec(kind) {
            manager
                .create_nodes(kind, &spec)
                .await
                .with_context(|| format!("creating {kind} nodes"))?;
        }
    }

    println!("✓ Cluster {} created", config.cluster.name);
    Ok(())
}

pub async fn delete(manager: &NodeManager, config_path: &str) -> anyhow::Result<()> {
    let config = load(config_path)?;

    info!("Deleting cluster ({}) from {}", config.cluster.name, config_path);

    // Teardown in reverse bring-up order.
    for kind in [NodeKind::Worker, NodeKind::Master] {
        if let Some(spec) = config.node_spec(kind) {
            manager
                .delete_nodes(kind, &spec)
                .await
                .with_context(|| format!("deleting {kind} nodes"))?;
        }
    }

    println!("✓ Cluster {} deleted", config.cluster.name);
    Ok(())
}
