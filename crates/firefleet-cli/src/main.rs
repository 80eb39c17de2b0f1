use clap::{Parser, Subcommand};

use firefleet_node::{HypervisorCli, NodeManager};

mod commands;

#[derive(Parser)]
#[command(
    name = "firefleet",
    about = "firefleet — microVM cluster bootstrapper",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Hypervisor control binary to invoke.
    #[arg(long, global = true, default_value = "ignite")]
    hypervisor: String,

    /// Invoke the hypervisor binary directly instead of through sudo.
    #[arg(long, global = true)]
    no_sudo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or tear down a cluster defined in a TOML config file
    Cluster {
        #[command(subcommand)]
        action: ClusterAction,
    },
    /// Inspect and manage individual nodes
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
    /// Download and run the prerequisite install script
    Install {
        /// Re-download the script even when already cached.
        #[arg(long)]
        force: bool,
    },
    /// Download and run the prerequisite uninstall script
    Uninstall,
}

#[derive(Subcommand)]
enum ClusterAction {
    /// Bring up all node groups declared in the config
    Create {
        /// Path to the cluster TOML file
        #[arg(short, long)]
        config: String,
    },
    /// Delete all node groups declared in the config
    Delete {
        #[arg(short, long)]
        config: String,
    },
}

#[derive(Subcommand)]
enum NodeAction {
    /// List nodes, optionally filtered by a name pattern
    List {
        /// Regex the node names must match
        #[arg(short, long, default_value = "")]
        filter: String,
        /// Emit records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one node's record
    Get {
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// Force-delete one node
    Delete { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("firefleet=info".parse()?)
                .add_directive("firefleet_node=info".parse()?)
                .add_directive("firefleet_script=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let manager = NodeManager::new(HypervisorCli::new(cli.hypervisor, !cli.no_sudo));

    match cli.command {
        Commands::Cluster { action } => match action {
            ClusterAction::Create { config } => commands::cluster::create(&manager, &config).await,
            ClusterAction::Delete { config } => commands::cluster::delete(&manager, &config).await,
        },
        Commands::Node { action } => match action {
            NodeAction::List { filter, json } => commands::node::list(&manager, &filter, json).await,
            NodeAction::Get { name, json } => commands::node::get(&manager, &name, json).await,
            NodeAction::Delete { name } => commands::node::delete(&manager, &name).await,
        },
        Commands::Install { force } => commands::setup::install(force).await,
        Commands::Uninstall => commands::setup::uninstall().await,
    }
}
