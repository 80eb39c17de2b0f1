use tracing::{debug, info};

use firefleet_core::NodeRecord;
use firefleet_node::NodeManager;

fn print_record(record: &NodeRecord) {
    println!(
        "{}\tcpus={}\tmemory={}\tdisk={}\trunning={}",
        record.name, record.cpus, record.memory, record.disk_size, record.status.running
    );
}

pub async fn list(manager: &NodeManager, filter: &str, json: bool) -> anyhow::Result<()> {
    debug!("Listing nodes (filter {:?})", filter);

    let records = manager.list_nodes(filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No nodes found");
        return Ok(());
    }
    for record in &records {
        print_record(record);
    }
    Ok(())
}

pub async fn get(manager: &NodeManager, name: &str, json: bool) -> anyhow::Result<()> {
    debug!("Fetching node ({})", name);

    let record = manager.get_node(name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(())
}

pub async fn delete(manager: &NodeManager, name: &str) -> anyhow::Result<()> {
    info!("Deleting node ({})", name);

    manager.delete_node(name).await?;
    println!("✓ Node {name} deleted");
    Ok(())
}
